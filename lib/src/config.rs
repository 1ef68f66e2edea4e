use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::api::{SENDGRID_BASE_URL, SENDGRID_REQUEST_TIMEOUT};
use crate::logger::Logger;
use crate::Error;

pub const DEFAULT_PATH: &str = "/etc/sendgrid/sendgrid.toml";
const ENV_PREFIX: &str = "SENDGRID";

/// Mailer settings. Read-only once a `Mailer` is built from it.
///
/// `bcc_addresses` and `cc_addresses` use the `"name,email|name,email"`
/// format; see `recipients::split_emails`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub sender_mail: String,
    pub sender_name: String,
    pub bcc_addresses: String,
    pub cc_addresses: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Report failed responses without a parseable error body as
    /// `Error::Status` instead of success
    pub strict_errors: bool,
    #[serde(skip)]
    pub logger: Option<Arc<dyn Logger>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender_mail: String::new(),
            sender_name: String::new(),
            bcc_addresses: String::new(),
            cc_addresses: String::new(),
            base_url: SENDGRID_BASE_URL.to_string(),
            timeout_secs: SENDGRID_REQUEST_TIMEOUT,
            strict_errors: false,
            logger: None,
        }
    }
}

impl Config {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_sender(mut self, mail: &str, name: &str) -> Self {
        self.sender_mail = mail.to_string();
        self.sender_name = name.to_string();
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("sender_mail", &self.sender_mail)
            .field("sender_name", &self.sender_name)
            .field("bcc_addresses", &self.bcc_addresses)
            .field("cc_addresses", &self.cc_addresses)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("strict_errors", &self.strict_errors)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Loads mailer config from the filesystem and merges it with any
/// environment variables prefixed with SENDGRID_ (e.g. `SENDGRID_API_KEY`).
///
/// A missing config file is not an error. The API key is not checked
/// here; `Mailer::try_new` does that.
pub fn load_config(path: Option<&str>) -> Result<Config, Error> {
    let settings = ::config::Config::builder()
        .add_source(::config::File::with_name(path.unwrap_or(DEFAULT_PATH)).required(false))
        .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard};

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes env access and clears any SENDGRID_* variables
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for (key, _) in std::env::vars() {
            if key.starts_with("SENDGRID_") {
                std::env::remove_var(key);
            }
        }
        guard
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let file_name = format!("sendgrid-mailer-{}-{}.toml", name, std::process::id());
        let path = std::env::temp_dir().join(file_name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("key").with_sender("shop@x.com", "Shop");

        assert_eq!(config.base_url, "https://api.sendgrid.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.strict_errors);
        assert!(config.logger.is_none());
        assert_eq!(config.sender_name, "Shop");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::new("SG.very-secret");
        assert!(!format!("{:?}", config).contains("SG.very-secret"));
    }

    #[test]
    fn test_load_config_from_file() {
        let _env = clean_env();
        let path = write_config(
            "file",
            r#"
api_key = "SG.file"
sender_mail = "shop@x.com"
sender_name = "Shop"
bcc_addresses = "Audit,audit@x.com"
strict_errors = true
"#,
        );

        let config = load_config(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.api_key, "SG.file");
        assert_eq!(config.sender_mail, "shop@x.com");
        assert_eq!(config.bcc_addresses, "Audit,audit@x.com");
        assert_eq!(config.cc_addresses, "");
        assert_eq!(config.base_url, SENDGRID_BASE_URL);
        assert!(config.strict_errors);
    }

    #[test]
    fn test_load_config_missing_file() {
        let _env = clean_env();
        let config = load_config(Some("/nonexistent/sendgrid-mailer.toml")).unwrap();
        assert_eq!(config.timeout_secs, SENDGRID_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = clean_env();
        let path = write_config(
            "env",
            r#"
api_key = "SG.file"
cc_addresses = "File,file@x.com"
sender_mail = "shop@x.com"
"#,
        );

        std::env::set_var("SENDGRID_API_KEY", "SG.env");
        std::env::set_var("SENDGRID_CC_ADDRESSES", "A,a@x.com");
        std::env::set_var("SENDGRID_TIMEOUT_SECS", "5");

        let result = load_config(path.to_str());

        std::env::remove_var("SENDGRID_API_KEY");
        std::env::remove_var("SENDGRID_CC_ADDRESSES");
        std::env::remove_var("SENDGRID_TIMEOUT_SECS");
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        assert_eq!(config.api_key, "SG.env");
        assert_eq!(config.cc_addresses, "A,a@x.com");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.sender_mail, "shop@x.com");
    }
}
