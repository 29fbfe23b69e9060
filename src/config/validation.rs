//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that base domains and override names are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, StoreBackend};
use crate::routing::slug::is_valid_slug;

/// A single semantic problem, with the dotted path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    // Resolver
    if config.resolver.base_domains.is_empty() {
        errors.push(ValidationError::new("resolver.base_domains", "at least one base domain is required"));
    }
    for (i, domain) in config.resolver.base_domains.iter().enumerate() {
        let labels: Vec<&str> = domain.trim().trim_end_matches('.').split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            errors.push(ValidationError::new(
                format!("resolver.base_domains[{i}]"),
                format!("'{domain}' is not a domain name"),
            ));
        }
    }
    if config.resolver.allow_slug_override {
        if config.resolver.override_query_param.trim().is_empty() {
            errors.push(ValidationError::new("resolver.override_query_param", "must not be empty"));
        }
        if !is_valid_slug(config.resolver.override_path_prefix.trim_matches('/')) {
            errors.push(ValidationError::new(
                "resolver.override_path_prefix",
                "must be a single path segment",
            ));
        }
    }

    // Store
    if config.store.backend == StoreBackend::Postgres {
        if config.store.database_url.is_empty() {
            errors.push(ValidationError::new("store.database_url", "required for the postgres backend"));
        }
        if config.store.max_connections == 0 {
            errors.push(ValidationError::new("store.max_connections", "must be greater than 0"));
        }
        if config.store.acquire_timeout_secs == 0 {
            errors.push(ValidationError::new("store.acquire_timeout_secs", "must be greater than 0"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !matches!(
        config.observability.log_level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty when admin is enabled"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.resolver.base_domains = vec!["localhost".into(), "example..com".into()];
        config.store.backend = StoreBackend::Postgres;
        config.store.database_url = String::new();
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();
        config.admin.enabled = true;
        config.admin.api_key = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "resolver.base_domains[0]",
                "resolver.base_domains[1]",
                "store.database_url",
                "timeouts.request_secs",
                "observability.log_level",
                "admin.api_key",
            ]
        );
    }

    #[test]
    fn test_override_settings_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.resolver.override_path_prefix = "a/b".into();
        assert!(validate_config(&config).is_ok());

        config.resolver.allow_slug_override = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "resolver.override_path_prefix");
    }
}
