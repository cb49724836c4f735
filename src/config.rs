use thiserror::Error;

/// Errors when loading or validating verification configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyConfigError {
    /// One or more required environment variables were not provided.
    #[error("missing env vars: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    /// Configuration failed validation checks.
    #[error("invalid verify config: {0}")]
    Invalid(String),
}

/// Email verification configuration.
///
/// Built once per process and passed by reference into the handlers; business
/// logic never reads the ambient environment.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Base URL of the identity service (e.g. "https://project.example.co").
    pub identity_url: String,

    /// Anonymous API key, used to resolve the caller from their bearer credential.
    pub identity_anon_key: String,

    /// Privileged API key, used for admin account lookup and metadata updates.
    pub identity_admin_key: String,

    /// API key for the transactional email provider.
    pub resend_api_key: String,

    /// Sender address for verification emails.
    pub resend_from: String,

    /// Base URL the verification token is appended to as a query parameter.
    pub verify_url: String,

    /// Shared secret for signing and verifying tokens.
    pub verify_secret: String,

    /// Where to redirect the browser after successful verification (optional).
    pub redirect_url: Option<String>,
}

impl VerifyConfig {
    /// Build verification config from environment variables.
    ///
    /// Required:
    /// - `VERIFY_IDENTITY_URL`
    /// - `VERIFY_IDENTITY_ANON_KEY`
    /// - `VERIFY_IDENTITY_ADMIN_KEY`
    /// - `VERIFY_RESEND_API_KEY`
    /// - `VERIFY_RESEND_FROM`
    /// - `VERIFY_LINK_URL`
    /// - `VERIFY_JWT_SECRET`
    ///
    /// Optional:
    /// - `VERIFY_REDIRECT_URL`
    ///
    /// All missing required variables are collected and reported together, by
    /// name only. Values never appear in errors or logs.
    pub fn from_env() -> Result<Self, VerifyConfigError> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match env_var_optional(key) {
            Some(v) => v,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let cfg = Self {
            identity_url: required("VERIFY_IDENTITY_URL"),
            identity_anon_key: required("VERIFY_IDENTITY_ANON_KEY"),
            identity_admin_key: required("VERIFY_IDENTITY_ADMIN_KEY"),
            resend_api_key: required("VERIFY_RESEND_API_KEY"),
            resend_from: required("VERIFY_RESEND_FROM"),
            verify_url: required("VERIFY_LINK_URL"),
            verify_secret: required("VERIFY_JWT_SECRET"),
            redirect_url: env_var_optional("VERIFY_REDIRECT_URL"),
        };

        if !missing.is_empty() {
            return Err(VerifyConfigError::MissingEnv(missing));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), VerifyConfigError> {
        if self.verify_secret.len() < 32 {
            return Err(VerifyConfigError::Invalid(
                "signing secret must be at least 32 characters".to_string(),
            ));
        }

        if self.identity_url.trim().is_empty() {
            return Err(VerifyConfigError::Invalid(
                "identity service URL cannot be empty".to_string(),
            ));
        }

        if self.verify_url.trim().is_empty() {
            return Err(VerifyConfigError::Invalid(
                "verification link base URL cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const REQUIRED_KEYS: [&str; 7] = [
        "VERIFY_IDENTITY_URL",
        "VERIFY_IDENTITY_ANON_KEY",
        "VERIFY_IDENTITY_ADMIN_KEY",
        "VERIFY_RESEND_API_KEY",
        "VERIFY_RESEND_FROM",
        "VERIFY_LINK_URL",
        "VERIFY_JWT_SECRET",
    ];

    fn env_clear() {
        for key in REQUIRED_KEYS {
            unsafe { std::env::remove_var(key) };
        }
        unsafe { std::env::remove_var("VERIFY_REDIRECT_URL") };
    }

    fn env_set_all() {
        unsafe {
            std::env::set_var("VERIFY_IDENTITY_URL", "https://identity.example.com");
            std::env::set_var("VERIFY_IDENTITY_ANON_KEY", "anon-key");
            std::env::set_var("VERIFY_IDENTITY_ADMIN_KEY", "admin-key");
            std::env::set_var("VERIFY_RESEND_API_KEY", "re_123");
            std::env::set_var("VERIFY_RESEND_FROM", "noreply@example.com");
            std::env::set_var("VERIFY_LINK_URL", "https://app.example.com/verify");
            std::env::set_var("VERIFY_JWT_SECRET", &"s".repeat(32));
        }
    }

    fn test_config() -> VerifyConfig {
        VerifyConfig {
            identity_url: "https://identity.example.com".to_string(),
            identity_anon_key: "anon-key".to_string(),
            identity_admin_key: "admin-key".to_string(),
            resend_api_key: "re_123".to_string(),
            resend_from: "noreply@example.com".to_string(),
            verify_url: "https://app.example.com/verify".to_string(),
            verify_secret: "s".repeat(32),
            redirect_url: None,
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_all_settings() {
        env_clear();
        env_set_all();
        unsafe { std::env::set_var("VERIFY_REDIRECT_URL", "https://app.example.com/done") };

        let cfg = VerifyConfig::from_env().expect("config loads");
        assert_eq!(cfg.identity_url, "https://identity.example.com");
        assert_eq!(cfg.resend_from, "noreply@example.com");
        assert_eq!(
            cfg.redirect_url.as_deref(),
            Some("https://app.example.com/done")
        );
        env_clear();
    }

    #[test]
    #[serial]
    fn from_env_reports_every_missing_setting() {
        env_clear();
        env_set_all();
        unsafe {
            std::env::remove_var("VERIFY_RESEND_API_KEY");
            std::env::remove_var("VERIFY_JWT_SECRET");
        }

        let err = VerifyConfig::from_env().expect_err("missing vars");
        assert_eq!(
            err,
            VerifyConfigError::MissingEnv(vec!["VERIFY_RESEND_API_KEY", "VERIFY_JWT_SECRET"])
        );
        env_clear();
    }

    #[test]
    #[serial]
    fn from_env_redirect_url_is_optional() {
        env_clear();
        env_set_all();

        let cfg = VerifyConfig::from_env().expect("config loads");
        assert!(cfg.redirect_url.is_none());
        env_clear();
    }

    #[test]
    fn validate_fails_short_secret() {
        let cfg = VerifyConfig {
            verify_secret: "short".to_string(),
            ..test_config()
        };
        assert!(matches!(cfg.validate(), Err(VerifyConfigError::Invalid(_))));
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert_eq!(test_config().validate(), Ok(()));
    }

    #[test]
    fn missing_env_error_lists_names_only() {
        let err = VerifyConfigError::MissingEnv(vec!["VERIFY_JWT_SECRET", "VERIFY_LINK_URL"]);
        assert_eq!(
            err.to_string(),
            "missing env vars: VERIFY_JWT_SECRET, VERIFY_LINK_URL"
        );
    }
}
