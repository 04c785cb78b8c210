use crate::reticle::controller::ReticleColorController;
use crate::reticle::host::{ControlModeRegistry, ControlModeType, MouseEvent, MouseEventHandler};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Host key code of the right mouse button.
pub const KEY_RIGHTMOUSE: u32 = 257;

pub const TARGET_CONTROL_MODES: [&str; 4] = [
    "ArcadeControlMode",
    "SniperControlMode",
    "StrategicControlMode",
    "DualGunControlMode",
];

/// `true` only for a press of `toggle_button`. Inspection errors count as
/// "do not toggle".
pub fn should_toggle(event: Option<&dyn MouseEvent>, toggle_button: u32) -> bool {
    let Some(event) = event else {
        return false;
    };
    match classify(event, toggle_button) {
        Ok(hit) => hit,
        Err(err) => {
            tracing::warn!(?err, "error while processing mouse event");
            false
        }
    }
}

fn classify(event: &dyn MouseEvent, toggle_button: u32) -> Result<bool> {
    if !event.is_button_down()? {
        return Ok(false);
    }
    let id = match event.button()? {
        Some(button) => Some(button),
        None => event.key()?,
    };
    Ok(id == Some(toggle_button))
}

/// Handler installed in place of a control mode's own one. Consumes toggle
/// presses and forwards everything else to `next`.
pub struct ToggleInterceptHandler {
    controller: Weak<RefCell<ReticleColorController>>,
    toggle_button: u32,
    next: Rc<dyn MouseEventHandler>,
}

impl ToggleInterceptHandler {
    pub fn new(
        controller: Weak<RefCell<ReticleColorController>>,
        toggle_button: u32,
        next: Rc<dyn MouseEventHandler>,
    ) -> Self {
        Self {
            controller,
            toggle_button,
            next,
        }
    }

    fn try_toggle(&self) -> bool {
        let Some(controller) = self.controller.upgrade() else {
            return false;
        };
        let Ok(mut controller) = controller.try_borrow_mut() else {
            tracing::warn!("reticle controller busy, passing mouse event through");
            return false;
        };
        controller.toggle();
        true
    }
}

impl MouseEventHandler for ToggleInterceptHandler {
    fn handle_mouse_event(&self, event: Option<&dyn MouseEvent>) -> bool {
        if should_toggle(event, self.toggle_button) && self.try_toggle() {
            return true;
        }
        self.next.handle_mouse_event(event)
    }
}

struct PatchedMode {
    mode: Rc<dyn ControlModeType>,
    original: Rc<dyn MouseEventHandler>,
}

/// Event Interception Layer for the reticle toggle button.
pub struct RightClickHook {
    controller: Weak<RefCell<ReticleColorController>>,
    toggle_button: u32,
    patched: Vec<PatchedMode>,
}

impl RightClickHook {
    pub fn new(controller: &Rc<RefCell<ReticleColorController>>) -> Self {
        Self::with_button(controller, KEY_RIGHTMOUSE)
    }

    pub fn with_button(controller: &Rc<RefCell<ReticleColorController>>, toggle_button: u32) -> Self {
        Self {
            controller: Rc::downgrade(controller),
            toggle_button,
            patched: Vec::new(),
        }
    }

    pub fn is_installed(&self) -> bool {
        !self.patched.is_empty()
    }

    /// Names of the control modes currently wrapped.
    pub fn patched_modes(&self) -> Vec<String> {
        self.patched
            .iter()
            .map(|patched| patched.mode.name().to_string())
            .collect()
    }

    pub fn install(&mut self, registry: &dyn ControlModeRegistry) {
        for name in TARGET_CONTROL_MODES {
            let Some(mode) = registry.control_mode(name) else {
                tracing::debug!(mode = name, "control mode not present, skipping");
                continue;
            };
            if self.is_patched(&mode) {
                continue;
            }
            let Some(original) = mode.mouse_handler() else {
                tracing::debug!(mode = name, "control mode has no mouse handler, skipping");
                continue;
            };
            let wrapper = ToggleInterceptHandler::new(
                self.controller.clone(),
                self.toggle_button,
                original.clone(),
            );
            mode.set_mouse_handler(Rc::new(wrapper));
            self.patched.push(PatchedMode { mode, original });
        }
        tracing::debug!(modes = ?self.patched_modes(), "right click hook installed");
    }

    pub fn uninstall(&mut self) {
        for patched in self.patched.drain(..) {
            patched.mode.set_mouse_handler(patched.original);
        }
    }

    fn is_patched(&self, mode: &Rc<dyn ControlModeType>) -> bool {
        self.patched
            .iter()
            .any(|patched| Rc::ptr_eq(&patched.mode, mode) || patched.mode.name() == mode.name())
    }
}

impl Drop for RightClickHook {
    fn drop(&mut self) {
        self.uninstall();
    }
}
