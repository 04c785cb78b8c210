use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub const MOD_ID: &str = "reticleLightToggle";
pub const MOD_NAME: &str = "Reticle Light Toggle";
pub const MOD_DESCRIPTION: &str =
    "Toggles the reticle color with the right mouse button and lets you configure the colors.";

pub const KEY_ENABLED: &str = "enabled";
pub const KEY_BASE_COLOR: &str = "baseColor";
pub const KEY_ALTERNATE_COLOR: &str = "alternateColor";
pub const KEY_START_WITH_ALTERNATE_COLOR: &str = "startWithAlternateColor";

/// Every key the settings document understands, in serialized order.
pub const SETTING_KEYS: [&str; 4] = [
    KEY_ALTERNATE_COLOR,
    KEY_BASE_COLOR,
    KEY_ENABLED,
    KEY_START_WITH_ALTERNATE_COLOR,
];

const DEFAULT_BASE_COLOR: &str = "#FFCC00";
const DEFAULT_ALTERNATE_COLOR: &str = "#00FFDE";

/// A `#RRGGBB` color string as the host expects it.
///
/// The value is carried opaquely: nothing rejects a malformed string, it is
/// handed to the host backends as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColorHex(String);

impl ColorHex {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        let Some(digits) = self.0.strip_prefix('#') else {
            return false;
        };
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for ColorHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColorHex {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReticleSettings {
    pub enabled: bool,
    pub base_color: ColorHex,
    pub alternate_color: ColorHex,
    pub start_with_alternate_color: bool,
}

impl Default for ReticleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_color: ColorHex::new(DEFAULT_BASE_COLOR),
            alternate_color: ColorHex::new(DEFAULT_ALTERNATE_COLOR),
            start_with_alternate_color: false,
        }
    }
}

impl ReticleSettings {
    /// Color selected for the given toggle position.
    pub fn color_for(&self, use_alternate: bool) -> &ColorHex {
        if use_alternate {
            &self.alternate_color
        } else {
            &self.base_color
        }
    }

    pub fn as_mapping(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(KEY_ENABLED.to_string(), Value::Bool(self.enabled));
        map.insert(
            KEY_BASE_COLOR.to_string(),
            Value::String(self.base_color.as_str().to_string()),
        );
        map.insert(
            KEY_ALTERNATE_COLOR.to_string(),
            Value::String(self.alternate_color.as_str().to_string()),
        );
        map.insert(
            KEY_START_WITH_ALTERNATE_COLOR.to_string(),
            Value::Bool(self.start_with_alternate_color),
        );
        map
    }

    /// Overlays the recognised keys present in `map`.
    ///
    /// Unknown keys are ignored. A recognised key holding the wrong JSON type
    /// keeps its prior value. Returns the keys that were applied.
    pub fn apply_mapping(&mut self, map: &Map<String, Value>) -> Vec<&'static str> {
        let mut applied = Vec::new();
        for key in SETTING_KEYS {
            let Some(value) = map.get(key) else {
                continue;
            };
            let accepted = match key {
                KEY_ENABLED => assign_bool(&mut self.enabled, value),
                KEY_START_WITH_ALTERNATE_COLOR => {
                    assign_bool(&mut self.start_with_alternate_color, value)
                }
                KEY_BASE_COLOR => assign_color(&mut self.base_color, value),
                KEY_ALTERNATE_COLOR => assign_color(&mut self.alternate_color, value),
                _ => false,
            };
            if accepted {
                applied.push(key);
            } else {
                tracing::warn!(key, %value, "ignoring setting with unexpected type");
            }
        }
        applied
    }
}

fn assign_bool(slot: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

fn assign_color(slot: &mut ColorHex, value: &Value) -> bool {
    match value.as_str() {
        Some(v) => {
            *slot = ColorHex::new(v);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorHex, ReticleSettings};
    use serde_json::json;

    #[test]
    fn defaults_match_shipped_colors() {
        let settings = ReticleSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.base_color, ColorHex::from("#FFCC00"));
        assert_eq!(settings.alternate_color, ColorHex::from("#00FFDE"));
        assert!(!settings.start_with_alternate_color);
    }

    #[test]
    fn apply_mapping_skips_unknown_and_mistyped_keys() {
        let mut settings = ReticleSettings::default();
        let payload = json!({
            "enabled": "yes",
            "baseColor": "#112233",
            "somethingElse": 5,
        });
        let applied = settings.apply_mapping(payload.as_object().expect("object"));

        assert_eq!(applied, vec!["baseColor"]);
        assert!(settings.enabled);
        assert_eq!(settings.base_color.as_str(), "#112233");
    }

    #[test]
    fn mapping_uses_document_key_names() {
        let map = ReticleSettings::default().as_mapping();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "alternateColor",
                "baseColor",
                "enabled",
                "startWithAlternateColor"
            ]
        );
        assert_eq!(map["baseColor"], json!("#FFCC00"));
    }

    #[test]
    fn color_shape_check() {
        assert!(ColorHex::from("#00ffDE").is_well_formed());
        assert!(!ColorHex::from("00FFDE").is_well_formed());
        assert!(!ColorHex::from("#00FFD").is_well_formed());
        assert!(!ColorHex::from("#GGFFDE").is_well_formed());
    }

    #[test]
    fn color_for_follows_toggle_position() {
        let settings = ReticleSettings::default();
        assert_eq!(settings.color_for(false).as_str(), "#FFCC00");
        assert_eq!(settings.color_for(true).as_str(), "#00FFDE");
    }
}
