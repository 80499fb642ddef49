pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod bom;

pub use self::config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use bom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.draft_store.backend, StorageBackend::Memory);
        assert!(config.draft_api.base_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.draft_api.base_url = Some("ftp://drafts".to_string());
        let error = config.validate().unwrap_err();
        assert_eq!(error.error_code(), "CONFIGURATION_ERROR");

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.draft_store.backend = StorageBackend::Redis;
        config.draft_store.redis_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_error_handling() {
        let error = PortalError::validation("partCode", "must not be blank");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);

        let error = PortalError::invalid_transition(RevisionState::Idle.to_string(), "save");
        assert_eq!(error.http_status_code(), 409);
    }
}
