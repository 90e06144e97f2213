//! Configuration types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default listen port for the messaging endpoint.
pub const DEFAULT_PORT: u16 = 3978;

/// Bot configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Port the `/api/messages` endpoint listens on.
    pub port: u16,
    /// LUIS model endpoint. Carries the subscription key in its query string.
    pub luis_model_url: Option<SecretString>,
    /// Path of the libSQL database holding profiles and dialog state.
    pub db_path: PathBuf,
    /// Identity the bot uses for conversations it opens itself (CLI mode).
    pub bot_id: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            luis_model_url: None,
            db_path: PathBuf::from("./data/bank-bot.db"),
            bot_id: "bank-bot".to_string(),
        }
    }
}

impl BotConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from the process environment, falling back to a `.env`
    /// file in the working directory or its parents.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable env file"),
        }
        Self::from_env()
    }

    /// Build config from the process environment, with `path` supplying any
    /// variable the environment does not set.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let file: HashMap<String, String> = dotenvy::from_path_iter(path)
            .map_err(env_file_error)?
            .collect::<Result<_, _>>()
            .map_err(env_file_error)?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// `port` takes precedence over `PORT`, matching the hosting convention
    /// where the platform injects the lower-case variant.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("port").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "PORT".to_string(),
                    message: format!("{raw:?} is not a valid port: {e}"),
                })?,
            None => defaults.port,
        };

        let luis_model_url = lookup("LUIS_MODEL_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let db_path = lookup("BANK_BOT_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bot_id = lookup("BANK_BOT_ID")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.bot_id);

        Ok(Self {
            port,
            luis_model_url,
            db_path,
            bot_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = BotConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3978);
        assert!(config.luis_model_url.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/bank-bot.db"));
        assert_eq!(config.bot_id, "bank-bot");
    }

    #[test]
    fn lower_case_port_wins() {
        let config =
            BotConfig::from_lookup(lookup_from(&[("port", "8080"), ("PORT", "9090")])).unwrap();
        assert_eq!(config.port, 8080);

        let config = BotConfig::from_lookup(lookup_from(&[("PORT", "9090")])).unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn blank_luis_url_is_ignored() {
        let config = BotConfig::from_lookup(lookup_from(&[("LUIS_MODEL_URL", "  ")])).unwrap();
        assert!(config.luis_model_url.is_none());

        let config = BotConfig::from_lookup(lookup_from(&[(
            "LUIS_MODEL_URL",
            "https://example.test/luis/v2.0/apps/abc?subscription-key=k",
        )]))
        .unwrap();
        assert_eq!(
            config.luis_model_url.unwrap().expose_secret(),
            "https://example.test/luis/v2.0/apps/abc?subscription-key=k"
        );
    }

    #[test]
    fn env_file_fills_unset_variables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# local overrides").unwrap();
        writeln!(file, "BANK_BOT_TEST_UNUSED=1").unwrap();
        writeln!(file, "LUIS_MODEL_URL=\"https://example.test/luis?subscription-key=k\"").unwrap();
        writeln!(file, "BANK_BOT_DB_PATH=/tmp/from-env-file.db").unwrap();

        let config = BotConfig::from_env_file(file.path()).unwrap();
        if std::env::var("BANK_BOT_DB_PATH").is_err() {
            assert_eq!(config.db_path, PathBuf::from("/tmp/from-env-file.db"));
        }
        if std::env::var("LUIS_MODEL_URL").is_err() {
            assert_eq!(
                config.luis_model_url.unwrap().expose_secret(),
                "https://example.test/luis?subscription-key=k"
            );
        }
    }

    #[test]
    fn missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BotConfig::from_env_file(&dir.path().join("absent.env")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }
}
