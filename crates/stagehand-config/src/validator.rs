//! Settings validation.

use crate::schema::Settings;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Settings validator.
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &Settings) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_remote(settings, &mut result);
        Self::validate_crm(settings, &mut result);
        Self::validate_navigator(settings, &mut result);

        result
    }

    fn validate_remote(settings: &Settings, result: &mut ValidationResult) {
        let remote = &settings.remote;
        if !is_http_url(&remote.config_url) {
            result.add_error(ValidationError::new(
                "remote.config_url",
                "config_url must start with http:// or https://",
            ));
        }

        if remote.cache_ttl_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "remote.cache_ttl_secs",
                "cache_ttl_secs is 0, every lookup will fetch the remote document",
            ));
        }

        if remote.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "remote.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_crm(settings: &Settings, result: &mut ValidationResult) {
        let crm = &settings.crm;
        if !is_http_url(&crm.origin) {
            result.add_error(ValidationError::new(
                "crm.origin",
                "origin must start with http:// or https://",
            ));
        }

        if crm.monitored_patterns.is_empty() {
            result.add_warning(ValidationWarning::new(
                "crm.monitored_patterns",
                "No monitored patterns, pages will never be notified of completed requests",
            ));
        }

        for pattern in &crm.monitored_patterns {
            if !is_http_url(pattern) {
                result.add_error(ValidationError::new(
                    "crm.monitored_patterns",
                    format!("Pattern '{}' must be an absolute http(s) URL glob", pattern),
                ));
            }
        }

        if crm.frame_rule_domain.trim().is_empty() {
            result.add_error(ValidationError::new(
                "crm.frame_rule_domain",
                "frame_rule_domain cannot be empty",
            ));
        }
    }

    fn validate_navigator(settings: &Settings, result: &mut ValidationResult) {
        let nav = &settings.navigator;
        if nav.popup_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "navigator.popup_interval_ms",
                "popup_interval_ms must be greater than 0",
            ));
        }

        if nav.popup_window_ms < nav.popup_interval_ms {
            result.add_warning(ValidationWarning::new(
                "navigator.popup_window_ms",
                "popup_window_ms is shorter than one interval, popups will be checked once",
            ));
        }

        if nav.guard_window_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "navigator.guard_window_ms",
                "guard_window_ms is 0, wrong-job redirects will not be blocked",
            ));
        }
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
