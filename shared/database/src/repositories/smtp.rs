use tracing::info;
use ykk_models::SmtpSettings;
use ykk_utils::{validate_model, PortalResult};

use super::storage_error;
use crate::kv::KvBackend;

pub struct SmtpConfigRepository {
    kv: KvBackend,
    key: String,
}

impl SmtpConfigRepository {
    pub fn new(kv: KvBackend, prefix: &str) -> Self {
        Self {
            kv,
            key: format!("{}smtp-config", prefix),
        }
    }

    pub async fn save(&self, settings: &SmtpSettings) -> PortalResult<()> {
        validate_model(settings)?;
        let body = serde_json::to_string(settings)?;
        self.kv.set(&self.key, body).await.map_err(storage_error)?;

        info!(host = %settings.host, port = settings.port, "Saved SMTP settings");
        Ok(())
    }

    pub async fn load(&self) -> PortalResult<Option<SmtpSettings>> {
        let raw = self.kv.get(&self.key).await.map_err(storage_error)?;
        match raw {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from_email: "quotes@example.com".to_string(),
            from_name: "Quotations".to_string(),
            secure: true,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = SmtpConfigRepository::new(KvBackend::memory(), "test:");
        assert!(repo.load().await.unwrap().is_none());

        repo.save(&settings()).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(settings()));
    }

    #[tokio::test]
    async fn test_invalid_settings_not_stored() {
        let repo = SmtpConfigRepository::new(KvBackend::memory(), "test:");
        let mut bad = settings();
        bad.from_email = "not-an-email".to_string();

        assert!(repo.save(&bad).await.is_err());
        assert!(repo.load().await.unwrap().is_none());
    }
}
