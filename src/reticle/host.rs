//! Traits for the parts of the host client this extension talks to.
//!
//! All of these are implemented by the host bridge (and by test doubles).
//! The extension runs on the host's single dispatch thread, so shared handles
//! are `Rc` rather than `Arc`.

use crate::reticle::settings::ColorHex;
use anyhow::Result;
use serde_json::Value;
use std::rc::Rc;

/// Ways a crosshair controller can accept a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrosshairCapability {
    /// Newer clients: overrides the marker color without touching settings.
    OverrideColor,
    /// Older clients.
    LegacyColor,
}

/// Session-scoped gun marker controller.
pub trait CrosshairController {
    /// Capabilities this build of the client exposes. Read once per
    /// controller instance.
    fn capabilities(&self) -> Vec<CrosshairCapability>;
    fn set_override_reticle_color(&self, color: &ColorHex) -> Result<()>;
    fn set_reticle_color(&self, color: &ColorHex) -> Result<()>;
}

/// Provider of objects that exist only inside an active battle session.
pub trait SessionProvider {
    fn crosshair(&self) -> Option<Rc<dyn CrosshairController>>;
}

/// A single entry of the host's settings registry.
pub trait HostSetting {
    fn system_value(&self) -> Result<Value>;
    fn set_system_value(&self, value: Value) -> Result<()>;
    /// Pushes the stored value into the running client.
    fn apply(&self) -> Result<()>;
}

pub trait SettingsOptions {
    fn setting(&self, key: &str) -> Option<Rc<dyn HostSetting>>;
}

pub trait SettingsCore {
    fn options(&self) -> Option<Rc<dyn SettingsOptions>>;
}

/// A mouse event as delivered to a control mode. Field access may fail on
/// host objects that are half torn down.
pub trait MouseEvent {
    fn is_button_down(&self) -> Result<bool>;
    fn button(&self) -> Result<Option<u32>>;
    /// Some event kinds carry the identifier here instead of in `button`.
    fn key(&self) -> Result<Option<u32>> {
        Ok(None)
    }
}

/// Calling contract of a control mode's mouse handler. Returns `true` when
/// the event was consumed.
pub trait MouseEventHandler {
    fn handle_mouse_event(&self, event: Option<&dyn MouseEvent>) -> bool;
}

/// A control mode type whose mouse handler slot can be swapped.
pub trait ControlModeType {
    fn name(&self) -> &str;
    fn mouse_handler(&self) -> Option<Rc<dyn MouseEventHandler>>;
    fn set_mouse_handler(&self, handler: Rc<dyn MouseEventHandler>);
}

pub trait ControlModeRegistry {
    fn control_mode(&self, name: &str) -> Option<Rc<dyn ControlModeType>>;
}

pub type OpenSettingsCallback = Rc<dyn Fn()>;
pub type CommitSettingsCallback = Rc<dyn Fn(&Value)>;

pub struct ModRegistration {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub on_open: OpenSettingsCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    CheckBox,
    Color,
}

impl ControlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::CheckBox => "CheckBox",
            ControlKind::Color => "Color",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsControl {
    pub kind: ControlKind,
    pub label: String,
    pub setting: String,
    pub value: Value,
}

pub struct SettingsWindowRequest {
    pub mod_id: String,
    pub title: String,
    pub controls: Vec<SettingsControl>,
    pub on_commit: CommitSettingsCallback,
}

/// External mods-list settings surface.
pub trait ModsListApi {
    fn add_mod(&self, registration: ModRegistration) -> Result<()>;
    fn show_settings(&self, request: SettingsWindowRequest) -> Result<()>;
}

pub type SpaceEnteredListener = Rc<dyn Fn(u32)>;
pub type VehicleEnteredListener = Rc<dyn Fn()>;

pub trait AppLoader {
    fn subscribe_gui_space_entered(&self, listener: SpaceEnteredListener) -> Result<()>;
}

/// The local player's avatar. Listeners are matched by `Rc` identity on
/// unsubscribe.
pub trait PlayerAvatar {
    fn subscribe_vehicle_enter_world(&self, listener: VehicleEnteredListener) -> Result<()>;
    fn unsubscribe_vehicle_enter_world(&self, listener: &VehicleEnteredListener) -> Result<()>;
}

pub trait PlayerProvider {
    fn player(&self) -> Option<Rc<dyn PlayerAvatar>>;
}

/// Backends the color controller may push through.
#[derive(Clone, Default)]
pub struct ColorBackends {
    pub session: Option<Rc<dyn SessionProvider>>,
    pub settings_core: Option<Rc<dyn SettingsCore>>,
}

/// Everything the host hands the extension at load time. Any entry may be
/// absent depending on client version.
#[derive(Clone, Default)]
pub struct HostServices {
    pub backends: ColorBackends,
    pub control_modes: Option<Rc<dyn ControlModeRegistry>>,
    pub mods_list: Option<Rc<dyn ModsListApi>>,
    pub app_loader: Option<Rc<dyn AppLoader>>,
    pub players: Option<Rc<dyn PlayerProvider>>,
}
