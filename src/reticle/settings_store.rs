use crate::reticle::settings::ReticleSettings;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_DIR_NAME: &str = "reticle_light_toggle";

/// The extension is loaded from `<game>/res_mods/<version>/scripts/client/gui/mods`
/// style folders; configs live three levels up next to `scripts`.
pub fn settings_path_from_mod_dir(mod_dir: &Path) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in mod_dir.join("../../../configs").components() {
        match component {
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(anyhow!(
                        "mod directory is too shallow to hold configs: {}",
                        mod_dir.display()
                    ));
                }
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Configuration Store: the persisted settings plus the file they live in.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: ReticleSettings,
}

impl SettingsStore {
    /// Store holding defaults; nothing is read until [`SettingsStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: ReticleSettings::default(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &ReticleSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ReticleSettings {
        &mut self.settings
    }

    pub fn as_mapping(&self) -> Map<String, Value> {
        self.settings.as_mapping()
    }

    /// Overlays persisted values. Missing or unreadable files leave the
    /// current values untouched.
    pub fn load(&mut self) {
        ensure_parent_dir(&self.path);
        match read_document(&self.path) {
            Ok(Some(document)) => {
                let applied = self.settings.apply_mapping(&document);
                tracing::debug!(path = %self.path.display(), ?applied, "loaded reticle settings");
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no reticle settings file, using defaults");
            }
            Err(err) => {
                tracing::warn!(?err, "unable to read reticle settings, using defaults");
            }
        }
    }

    /// Best effort: failures are logged and the in-memory values are kept.
    pub fn save(&self) {
        ensure_parent_dir(&self.path);
        if let Err(err) = write_document(&self.path, &self.settings) {
            tracing::warn!(?err, "unable to save reticle settings");
        }
    }
}

fn ensure_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return;
    }
    if let Err(err) = std::fs::create_dir_all(parent)
        .with_context(|| format!("create reticle settings folder {}", parent.display()))
    {
        tracing::warn!(?err, "failed to create config directory");
    }
}

fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read reticle settings file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("deserialize reticle settings file {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(anyhow!(
            "reticle settings file {} holds {} instead of an object",
            path.display(),
            json_kind(&other)
        )),
    }
}

fn write_document(path: &Path, settings: &ReticleSettings) -> Result<()> {
    // `Map` is ordered, so the document comes out with sorted keys.
    let document = serde_json::to_value(settings).context("serialize reticle settings")?;
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .context("serialize reticle settings")?;
    std::fs::write(path, buffer)
        .with_context(|| format!("write reticle settings file {}", path.display()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
