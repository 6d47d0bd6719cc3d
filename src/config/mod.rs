mod settings;

pub use settings::{ArchiveCompression, Settings, SettingsError, TomlSettings};
