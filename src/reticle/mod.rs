pub mod controller;
pub mod host;
pub mod input_hook;
pub mod service;
pub mod settings;
pub mod settings_store;
pub mod settings_ui;

pub use controller::{ApplyOutcome, ApplyStrategy, ControllerLifecycle, ReticleColorController};
pub use input_hook::RightClickHook;
pub use service::ReticleToggleMod;
pub use settings::{ColorHex, ReticleSettings};
pub use settings_store::{settings_path_from_mod_dir, SettingsStore};
