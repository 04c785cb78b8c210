use crate::reticle::host::{ControlKind, SettingsControl};
use crate::reticle::settings::{
    ReticleSettings, KEY_ALTERNATE_COLOR, KEY_BASE_COLOR, KEY_ENABLED,
    KEY_START_WITH_ALTERNATE_COLOR,
};
use serde_json::{Map, Value};

const LABEL_ENABLED: &str = "Enable mod";
const LABEL_BASE_COLOR: &str = "Base reticle color";
const LABEL_ALTERNATE_COLOR: &str = "Alternate reticle color";
const LABEL_START_WITH_ALTERNATE: &str = "Start battles with the alternate color";

/// Controls shown in the mods-list settings window, seeded with current values.
pub fn settings_controls(settings: &ReticleSettings) -> Vec<SettingsControl> {
    let values = settings.as_mapping();
    [
        (ControlKind::CheckBox, LABEL_ENABLED, KEY_ENABLED),
        (ControlKind::Color, LABEL_BASE_COLOR, KEY_BASE_COLOR),
        (ControlKind::Color, LABEL_ALTERNATE_COLOR, KEY_ALTERNATE_COLOR),
        (
            ControlKind::CheckBox,
            LABEL_START_WITH_ALTERNATE,
            KEY_START_WITH_ALTERNATE_COLOR,
        ),
    ]
    .into_iter()
    .map(|(kind, label, setting)| SettingsControl {
        kind,
        label: label.to_string(),
        setting: setting.to_string(),
        value: values.get(setting).cloned().unwrap_or(Value::Null),
    })
    .collect()
}

/// Commit payloads must be JSON objects; anything else is dropped.
pub fn commit_payload(payload: &Value) -> Option<&Map<String, Value>> {
    let map = payload.as_object();
    if map.is_none() {
        tracing::debug!(%payload, "ignoring settings commit that is not a mapping");
    }
    map
}

#[cfg(test)]
mod tests {
    use super::{commit_payload, settings_controls};
    use crate::reticle::host::ControlKind;
    use crate::reticle::settings::ReticleSettings;
    use serde_json::json;

    #[test]
    fn controls_follow_window_order() {
        let controls = settings_controls(&ReticleSettings::default());
        let layout: Vec<(ControlKind, &str)> = controls
            .iter()
            .map(|control| (control.kind, control.setting.as_str()))
            .collect();
        assert_eq!(
            layout,
            vec![
                (ControlKind::CheckBox, "enabled"),
                (ControlKind::Color, "baseColor"),
                (ControlKind::Color, "alternateColor"),
                (ControlKind::CheckBox, "startWithAlternateColor"),
            ]
        );
        assert_eq!(controls[1].value, json!("#FFCC00"));
        assert_eq!(controls[3].value, json!(false));
    }

    #[test]
    fn non_mapping_payloads_are_rejected() {
        assert!(commit_payload(&json!(["enabled"])).is_none());
        assert!(commit_payload(&json!(null)).is_none());
        assert!(commit_payload(&json!({"enabled": false})).is_some());
    }
}
