//! Settings loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::SettingsError;
use crate::schema::Settings;

/// File name looked up in the data directory when no path is given.
pub const SETTINGS_FILE_NAME: &str = "stagehand.toml";

/// Settings loader with environment variable substitution.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load settings from a string.
    pub fn load_str(content: &str) -> Result<Settings, SettingsError> {
        let expanded = Self::expand_env_vars(content)?;
        let settings: Settings = toml::from_str(&expanded)?;
        Ok(settings)
    }

    /// Load an explicit file, or the default file if it exists, or built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Settings, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }

    /// `<data dir>/stagehand.toml`.
    pub fn default_path() -> PathBuf {
        crate::schema::default_data_dir().join(SETTINGS_FILE_NAME)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, SettingsError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SettingsError::InvalidValue {
            field: "env pattern".to_string(),
            message: e.to_string(),
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| SettingsError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.local/share`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_settings() {
        let settings = SettingsLoader::load_str("").unwrap();
        assert_eq!(settings.remote.cache_ttl_secs, 1800);
        assert!(settings.storage.enabled);
    }

    #[test]
    fn test_load_remote_overrides() {
        let content = r#"
            [remote]
            config_url = "https://config.example.test/plugin-config.json"
            cache_ttl_secs = 60
        "#;
        let settings = SettingsLoader::load_str(content).unwrap();
        assert_eq!(
            settings.remote.config_url,
            "https://config.example.test/plugin-config.json"
        );
        assert_eq!(settings.remote.cache_ttl_secs, 60);
        assert_eq!(settings.remote.request_timeout_secs, 15);
    }

    #[test]
    fn test_load_crm_and_navigator_sections() {
        let content = r#"
            [crm]
            origin = "https://recruit.zoho.eu"
            frame_rule_domain = "recruit.zoho.eu"
            monitored_patterns = ["https://recruit.zoho.eu/recruit/*/ShowDetails.do*"]

            [navigator]
            guard_window_ms = 5000
        "#;
        let settings = SettingsLoader::load_str(content).unwrap();
        assert_eq!(settings.crm.origin, "https://recruit.zoho.eu");
        assert_eq!(settings.crm.monitored_patterns.len(), 1);
        assert_eq!(settings.navigator.guard_window_ms, 5000);
        assert_eq!(settings.navigator.popup_window_ms, 30_000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();

        let settings = SettingsLoader::load(file.path()).unwrap();
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SettingsLoader::load(Path::new("/nonexistent/path/stagehand.toml"));
        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_with_explicit_missing_path_fails() {
        let result = SettingsLoader::load_or_default(Some(Path::new("/nonexistent/stagehand.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = SettingsLoader::load_str("remote = [unclosed");
        assert!(matches!(result, Err(SettingsError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test-only variable name, not read elsewhere
        unsafe {
            std::env::set_var("STAGEHAND_TEST_CONFIG_URL", "https://cfg.test/c.json");
        }
        let content = "[remote]\nconfig_url = \"${STAGEHAND_TEST_CONFIG_URL}\"";
        let settings = SettingsLoader::load_str(content).unwrap();
        assert_eq!(settings.remote.config_url, "https://cfg.test/c.json");
        unsafe {
            std::env::remove_var("STAGEHAND_TEST_CONFIG_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${STAGEHAND_NONEXISTENT_VAR_12345}\"";
        let result = SettingsLoader::expand_env_vars(content);
        assert!(matches!(result, Err(SettingsError::EnvVarNotSet(name)) if name == "STAGEHAND_NONEXISTENT_VAR_12345"));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = SettingsLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = SettingsLoader::expand_path("~/stagehand");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/stagehand"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(SettingsLoader::expand_path("/var/lib/x"), "/var/lib/x");
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(SettingsLoader::default_path().ends_with(SETTINGS_FILE_NAME));
    }
}
