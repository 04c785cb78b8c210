use crate::reticle::controller::ReticleColorController;
use crate::reticle::host::{
    HostServices, ModRegistration, PlayerAvatar, SettingsWindowRequest, VehicleEnteredListener,
};
use crate::reticle::input_hook::RightClickHook;
use crate::reticle::settings::{ReticleSettings, MOD_DESCRIPTION, MOD_ID, MOD_NAME};
use crate::reticle::settings_store::SettingsStore;
use crate::reticle::settings_ui::{commit_payload, settings_controls};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::{Rc, Weak};

/// GUI space id the host reports when a battle is loaded.
pub const BATTLE_SPACE_ID: u32 = 1;

/// Composition root. Built once by the host's extension loader and torn
/// down with [`ReticleToggleMod::shutdown`].
pub struct ReticleToggleMod {
    host: HostServices,
    store: RefCell<SettingsStore>,
    controller: Rc<RefCell<ReticleColorController>>,
    hook: RefCell<RightClickHook>,
    weak_self: Weak<ReticleToggleMod>,
    vehicle_listener: VehicleEnteredListener,
    subscribed_player: RefCell<Option<Rc<dyn PlayerAvatar>>>,
    shut_down: Cell<bool>,
}

impl ReticleToggleMod {
    pub fn init(settings_path: impl Into<PathBuf>, host: HostServices) -> Rc<Self> {
        let store = SettingsStore::open(settings_path);
        let controller = Rc::new(RefCell::new(ReticleColorController::new(
            store.settings().clone(),
            host.backends.clone(),
        )));
        let hook = RightClickHook::new(&controller);

        let this = Rc::new_cyclic(|weak: &Weak<ReticleToggleMod>| {
            let listener_target = weak.clone();
            let vehicle_listener: VehicleEnteredListener = Rc::new(move || {
                if let Some(this) = listener_target.upgrade() {
                    this.on_vehicle_enter_world();
                }
            });
            Self {
                host,
                store: RefCell::new(store),
                controller,
                hook: RefCell::new(hook),
                weak_self: weak.clone(),
                vehicle_listener,
                subscribed_player: RefCell::new(None),
                shut_down: Cell::new(false),
            }
        });

        this.register_settings_entry();
        this.install_battle_listeners();
        if let Some(registry) = this.host.control_modes.as_ref() {
            this.hook.borrow_mut().install(&**registry);
        } else {
            tracing::debug!("control modes unavailable, right click hook not installed");
        }
        this.controller.borrow_mut().install();
        tracing::info!(mod_id = MOD_ID, "initialization complete");
        this
    }

    pub fn controller(&self) -> Rc<RefCell<ReticleColorController>> {
        self.controller.clone()
    }

    pub fn settings(&self) -> ReticleSettings {
        self.store.borrow().settings().clone()
    }

    pub fn hooked_modes(&self) -> Vec<String> {
        self.hook.borrow().patched_modes()
    }

    pub fn is_listening_for_vehicles(&self) -> bool {
        self.subscribed_player.borrow().is_some()
    }

    fn register_settings_entry(&self) {
        let Some(mods_list) = self.host.mods_list.as_ref() else {
            tracing::info!("mods list api is not available; settings window disabled");
            return;
        };
        let target = self.weak_self.clone();
        let registration = ModRegistration {
            id: MOD_ID.to_string(),
            name: MOD_NAME.to_string(),
            description: MOD_DESCRIPTION.to_string(),
            enabled: self.store.borrow().settings().enabled,
            on_open: Rc::new(move || {
                if let Some(this) = target.upgrade() {
                    this.open_settings_window();
                }
            }),
        };
        if let Err(err) = mods_list.add_mod(registration) {
            tracing::warn!(?err, "unable to register with mods list api");
        }
    }

    pub fn open_settings_window(&self) {
        if self.shut_down.get() {
            return;
        }
        let Some(mods_list) = self.host.mods_list.as_ref() else {
            return;
        };
        let controls = settings_controls(self.store.borrow().settings());
        let target = self.weak_self.clone();
        let request = SettingsWindowRequest {
            mod_id: MOD_ID.to_string(),
            title: MOD_NAME.to_string(),
            controls,
            on_commit: Rc::new(move |payload: &Value| {
                if let Some(this) = target.upgrade() {
                    this.on_settings_changed(payload);
                }
            }),
        };
        if let Err(err) = mods_list.show_settings(request) {
            tracing::warn!(?err, "unable to open settings window via mods list api");
        }
    }

    pub fn on_settings_changed(&self, payload: &Value) {
        if self.shut_down.get() {
            return;
        }
        let Some(changes) = commit_payload(payload) else {
            return;
        };
        let settings = {
            let mut store = self.store.borrow_mut();
            store.settings_mut().apply_mapping(changes);
            store.save();
            store.settings().clone()
        };
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.refresh_from_config(settings),
            Err(_) => tracing::warn!("reticle controller busy, settings refresh skipped"),
        }
    }

    fn install_battle_listeners(&self) {
        let Some(loader) = self.host.app_loader.as_ref() else {
            return;
        };
        let target = self.weak_self.clone();
        let listener = Rc::new(move |space_id: u32| {
            if let Some(this) = target.upgrade() {
                this.on_gui_space_entered(space_id);
            }
        });
        if let Err(err) = loader.subscribe_gui_space_entered(listener) {
            tracing::warn!(?err, "unable to subscribe to GUI space events");
        }
    }

    pub fn on_gui_space_entered(&self, space_id: u32) {
        if self.shut_down.get() {
            return;
        }
        let Some(player) = self.host.players.as_ref().and_then(|players| players.player()) else {
            return;
        };
        if space_id == BATTLE_SPACE_ID {
            self.subscribe_vehicle_listener(player);
        } else {
            self.unsubscribe_vehicle_listener();
        }
    }

    fn subscribe_vehicle_listener(&self, player: Rc<dyn PlayerAvatar>) {
        if let Some(current) = self.subscribed_player.borrow().as_ref() {
            if Rc::ptr_eq(current, &player) {
                return;
            }
        }
        self.unsubscribe_vehicle_listener();
        match player.subscribe_vehicle_enter_world(self.vehicle_listener.clone()) {
            Ok(()) => {
                *self.subscribed_player.borrow_mut() = Some(player);
            }
            Err(err) => {
                tracing::warn!(?err, "failed to subscribe to vehicle enter event");
            }
        }
    }

    fn unsubscribe_vehicle_listener(&self) {
        let Some(player) = self.subscribed_player.borrow_mut().take() else {
            return;
        };
        if let Err(err) = player.unsubscribe_vehicle_enter_world(&self.vehicle_listener) {
            tracing::debug!(?err, "vehicle enter unsubscribe failed");
        }
    }

    pub fn on_vehicle_enter_world(&self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.on_session_object_ready(),
            Err(_) => tracing::warn!("reticle controller busy, session ready retry skipped"),
        }
    }

    pub fn shutdown(&self) {
        if self.shut_down.replace(true) {
            return;
        }
        self.unsubscribe_vehicle_listener();
        self.hook.borrow_mut().uninstall();
        self.controller.borrow_mut().uninstall();
        tracing::info!(mod_id = MOD_ID, "shut down");
    }
}
