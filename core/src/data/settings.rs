use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::config::Settings;


/// Name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.yaml";


/// Returns defaults for all settings fields.
pub fn default_settings() -> Settings {
    Settings::default()
}


/// Load `Settings` for a config directory.
///
/// Reads `<config_dir>/settings.yaml` if present, otherwise starts from the
/// defaults. Relative `save_dir`, `fields_path` and `log_file` values are
/// resolved against `config_dir`.
pub fn load_from_dir(config_dir: &Path) -> Result<Settings, ConfigError> {
    let path = config_dir.join(SETTINGS_FILE);
    let settings = if path.exists() {
        load(&path)?
    } else {
        default_settings()
    };
    Ok(resolve_paths(settings, config_dir))
}


/// Load `Settings` from a YAML or JSON file, chosen by extension.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        parse_json(&content)
    } else {
        parse(&content)
    }
}


/// Parse settings from a YAML string. Missing keys take their defaults.
pub fn parse(content: &str) -> Result<Settings, ConfigError> {
    if content.trim().is_empty() {
        return Ok(default_settings());
    }
    let settings: Settings = serde_yaml::from_str(content)?;
    validate(settings)
}


/// Parse settings from a JSON string. Missing keys take their defaults.
pub fn parse_json(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(content)?;
    validate(settings)
}


fn validate(settings: Settings) -> Result<Settings, ConfigError> {
    if settings.prefix.is_empty() {
        return Err(ConfigError::Invalid {
            key: "prefix".into(),
            reason: "must not be empty".into(),
        });
    }
    if settings.log_filter.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key: "log_filter".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(settings)
}


fn resolve_paths(mut settings: Settings, base: &Path) -> Settings {
    settings.save_dir = resolve(base, &settings.save_dir);
    settings.fields_path = resolve(base, &settings.fields_path);
    settings.log_file = settings.log_file.map(|p| resolve(base, &p));
    settings
}


fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
