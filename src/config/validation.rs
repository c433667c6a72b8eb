//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint URLs must parse
//! - Deadlines and durations must be non-zero
//! - Token amounts must be non-negative decimal strings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Credentials are not checked here; the handshake reports bad keys

use std::fmt;

use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `lotus.api_url`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("lotus.api_url", &config.lotus.api_url),
        ("lotus.miner_api_url", &config.lotus.miner_api_url),
        ("swan.api_url", &config.swan.api_url),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
        }
    }

    if config.transport.request_timeout_secs == 0 {
        errors.push(ValidationError::new("transport.request_timeout_secs", "must be greater than 0"));
    }
    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("transport.connect_timeout_secs", "must be greater than 0"));
    }

    if config.deal.duration == 0 {
        errors.push(ValidationError::new("deal.duration", "must be greater than 0"));
    }
    if config.deal.epoch_price().is_none() {
        errors.push(ValidationError::new(
            "deal.price_per_epoch",
            format!("'{}' is not a non-negative integer attoFIL amount", config.deal.price_per_epoch),
        ));
    }
    if config.deal.collateral().is_none() {
        errors.push(ValidationError::new(
            "deal.provider_collateral",
            format!("'{}' is not a non-negative integer attoFIL amount", config.deal.provider_collateral),
        ));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", other),
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.lotus.api_url = "not a url".to_string();
        config.transport.request_timeout_secs = 0;
        config.deal.price_per_epoch = "-1".to_string();
        config.observability.log_format = "xml".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "lotus.api_url",
                "transport.request_timeout_secs",
                "deal.price_per_epoch",
                "observability.log_format",
            ]
        );
    }

    #[test]
    fn test_fractional_amounts_rejected() {
        let mut config = ClientConfig::default();
        config.deal.price_per_epoch = "0.5".to_string();
        config.deal.provider_collateral = "0.25".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["deal.price_per_epoch", "deal.provider_collateral"]);
        assert!(errors[0].message.contains("'0.5'"));
    }

    #[test]
    fn test_integer_amounts_accepted() {
        let mut config = ClientConfig::default();
        config.deal.price_per_epoch = "500000000".to_string();
        config.deal.provider_collateral = "1e18".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ClientConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
