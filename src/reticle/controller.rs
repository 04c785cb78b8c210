use crate::reticle::host::{ColorBackends, CrosshairCapability, CrosshairController};
use crate::reticle::settings::{ColorHex, ReticleSettings};
use anyhow::{Context, Result};
use serde_json::Value;
use std::rc::{Rc, Weak};

/// Host settings key holding the gun marker color per aiming context.
pub const GUN_MARKER_COLOR_SETTING: &str = "gunMarkerColor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerLifecycle {
    Uninstalled,
    Applied,
    Pending,
}

/// Backend that accepted a color, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStrategy {
    OverrideColor,
    LegacyColor,
    SettingsFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(ApplyStrategy),
    Deferred,
}

/// Capabilities of the crosshair controller they were read from.
struct ResolvedCrosshair {
    controller: Weak<dyn CrosshairController>,
    capabilities: Vec<CrosshairCapability>,
}

/// Keeps the toggle position and pushes the matching color into the session.
pub struct ReticleColorController {
    settings: ReticleSettings,
    backends: ColorBackends,
    use_alternate: bool,
    pending_update: bool,
    installed: bool,
    resolved_crosshair: Option<ResolvedCrosshair>,
}

impl ReticleColorController {
    pub fn new(settings: ReticleSettings, backends: ColorBackends) -> Self {
        let use_alternate = settings.start_with_alternate_color;
        Self {
            settings,
            backends,
            use_alternate,
            pending_update: false,
            installed: false,
            resolved_crosshair: None,
        }
    }

    pub fn settings(&self) -> &ReticleSettings {
        &self.settings
    }

    pub fn uses_alternate(&self) -> bool {
        self.use_alternate
    }

    pub fn is_pending(&self) -> bool {
        self.pending_update
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn lifecycle(&self) -> ControllerLifecycle {
        match (self.installed, self.pending_update) {
            (false, _) => ControllerLifecycle::Uninstalled,
            (true, false) => ControllerLifecycle::Applied,
            (true, true) => ControllerLifecycle::Pending,
        }
    }

    pub fn current_color(&self) -> &ColorHex {
        self.settings.color_for(self.use_alternate)
    }

    pub fn install(&mut self) {
        if self.installed {
            return;
        }
        self.installed = true;
        if self.settings.enabled {
            self.apply_current_color();
        }
    }

    /// Already applied colors stay as they are.
    pub fn uninstall(&mut self) {
        self.installed = false;
    }

    pub fn toggle(&mut self) {
        if !self.settings.enabled {
            return;
        }
        self.use_alternate = !self.use_alternate;
        tracing::info!(alternate = self.use_alternate, "toggled reticle color");
        self.apply_current_color();
    }

    pub fn refresh_from_config(&mut self, settings: ReticleSettings) {
        self.use_alternate = settings.start_with_alternate_color;
        self.settings = settings;
        self.apply_current_color();
    }

    /// Retries a deferred apply once the session has the objects it needs.
    pub fn on_session_object_ready(&mut self) {
        if self.pending_update {
            self.apply_current_color();
        }
    }

    pub fn apply_current_color(&mut self) -> ApplyOutcome {
        let color = self.current_color().clone();
        if !color.is_well_formed() {
            tracing::warn!(%color, "reticle color is not #RRGGBB, passing it through");
        }
        match self.push_color(&color) {
            Some(strategy) => {
                tracing::debug!(%color, ?strategy, "applied reticle color");
                self.pending_update = false;
                ApplyOutcome::Applied(strategy)
            }
            None => {
                tracing::info!(%color, "gun marker controller not ready, defer color update");
                self.pending_update = true;
                ApplyOutcome::Deferred
            }
        }
    }

    fn push_color(&mut self, color: &ColorHex) -> Option<ApplyStrategy> {
        if let Some(crosshair) = self
            .backends
            .session
            .as_ref()
            .and_then(|session| session.crosshair())
        {
            let capabilities = self.crosshair_capabilities(&crosshair);
            if let Some(strategy) = apply_through_crosshair(&*crosshair, &capabilities, color) {
                return Some(strategy);
            }
        }

        match self.apply_through_settings(color) {
            Ok(true) => Some(ApplyStrategy::SettingsFallback),
            Ok(false) => None,
            Err(err) => {
                tracing::warn!(?err, "unable to write color through settings core");
                None
            }
        }
    }

    /// Reads capabilities once per crosshair controller instance; a new
    /// session object is resolved again.
    fn crosshair_capabilities(
        &mut self,
        crosshair: &Rc<dyn CrosshairController>,
    ) -> Vec<CrosshairCapability> {
        let downgraded = Rc::downgrade(crosshair);
        if let Some(resolved) = self.resolved_crosshair.as_ref() {
            if Weak::ptr_eq(&resolved.controller, &downgraded) {
                return resolved.capabilities.clone();
            }
        }
        let capabilities = crosshair.capabilities();
        tracing::debug!(?capabilities, "resolved crosshair controller capabilities");
        self.resolved_crosshair = Some(ResolvedCrosshair {
            controller: downgraded,
            capabilities: capabilities.clone(),
        });
        capabilities
    }

    /// `Ok(false)` when the settings path is unreachable.
    fn apply_through_settings(&self, color: &ColorHex) -> Result<bool> {
        let Some(core) = self.backends.settings_core.as_ref() else {
            return Ok(false);
        };
        let Some(options) = core.options() else {
            return Ok(false);
        };
        let Some(setting) = options.setting(GUN_MARKER_COLOR_SETTING) else {
            return Ok(false);
        };

        let current = setting
            .system_value()
            .context("read gun marker color setting")?;
        setting
            .set_system_value(recolor_setting_value(current, color))
            .context("store gun marker color setting")?;
        setting.apply().context("apply gun marker color setting")?;
        Ok(true)
    }
}

fn apply_through_crosshair(
    crosshair: &dyn CrosshairController,
    capabilities: &[CrosshairCapability],
    color: &ColorHex,
) -> Option<ApplyStrategy> {
    let chain = [
        (CrosshairCapability::OverrideColor, ApplyStrategy::OverrideColor),
        (CrosshairCapability::LegacyColor, ApplyStrategy::LegacyColor),
    ];
    for (capability, strategy) in chain {
        if !capabilities.contains(&capability) {
            continue;
        }
        let result = match capability {
            CrosshairCapability::OverrideColor => crosshair.set_override_reticle_color(color),
            CrosshairCapability::LegacyColor => crosshair.set_reticle_color(color),
        };
        match result {
            Ok(()) => return Some(strategy),
            Err(err) => {
                let err = err.context(format!("crosshair {capability:?} setter"));
                tracing::warn!(?err, "failed to apply color through crosshair controller");
            }
        }
    }
    None
}

/// Per-context mappings get every entry overwritten; any other shape is
/// replaced by the plain color string.
fn recolor_setting_value(current: Value, color: &ColorHex) -> Value {
    match current {
        Value::Object(mut contexts) => {
            for value in contexts.values_mut() {
                *value = Value::String(color.as_str().to_string());
            }
            Value::Object(contexts)
        }
        _ => Value::String(color.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{recolor_setting_value, ControllerLifecycle, ReticleColorController};
    use crate::reticle::host::ColorBackends;
    use crate::reticle::settings::{ColorHex, ReticleSettings};
    use serde_json::json;

    #[test]
    fn per_context_mapping_is_recolored_everywhere() {
        let value = json!({"arcade": "#000000", "sniper": "#111111", "strategic": "#222222"});
        let recolored = recolor_setting_value(value, &ColorHex::from("#ABCDEF"));
        assert_eq!(
            recolored,
            json!({"arcade": "#ABCDEF", "sniper": "#ABCDEF", "strategic": "#ABCDEF"})
        );
    }

    #[test]
    fn scalar_setting_value_is_replaced() {
        let recolored = recolor_setting_value(json!(3), &ColorHex::from("#ABCDEF"));
        assert_eq!(recolored, json!("#ABCDEF"));
    }

    #[test]
    fn install_without_backends_goes_pending() {
        let mut controller =
            ReticleColorController::new(ReticleSettings::default(), ColorBackends::default());
        assert_eq!(controller.lifecycle(), ControllerLifecycle::Uninstalled);

        controller.install();
        assert_eq!(controller.lifecycle(), ControllerLifecycle::Pending);

        controller.uninstall();
        assert_eq!(controller.lifecycle(), ControllerLifecycle::Uninstalled);
    }

    #[test]
    fn disabled_toggle_keeps_position() {
        let settings = ReticleSettings {
            enabled: false,
            ..ReticleSettings::default()
        };
        let mut controller = ReticleColorController::new(settings, ColorBackends::default());
        controller.toggle();
        assert!(!controller.uses_alternate());
        assert!(!controller.is_pending());
    }

    #[test]
    fn refresh_reseeds_toggle_position() {
        let mut controller =
            ReticleColorController::new(ReticleSettings::default(), ColorBackends::default());
        controller.toggle();
        assert!(controller.uses_alternate());

        controller.refresh_from_config(ReticleSettings::default());
        assert!(!controller.uses_alternate());

        controller.refresh_from_config(ReticleSettings {
            start_with_alternate_color: true,
            ..ReticleSettings::default()
        });
        assert!(controller.uses_alternate());
        assert_eq!(controller.current_color().as_str(), "#00FFDE");
    }
}
