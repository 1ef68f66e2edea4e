//! Thin wrapper around the SendGrid v3 mail-send API.
//!
//! ```no_run
//! use sendgrid_mailer::{Config, Mailer, SendMailParams};
//!
//! let config = Config::new("SG.xxxx").with_sender("noreply@example.com", "Example");
//! let mailer = Mailer::new(config);
//!
//! let params = SendMailParams {
//!     name: "Alice".to_string(),
//!     email: "alice@example.com".to_string(),
//!     subject: "Hello".to_string(),
//!     html_content: Some("<div>Hello world</div>".to_string()),
//!     ..Default::default()
//! };
//!
//! if let Err(e) = mailer.send_mail(&params) {
//!     eprintln!("send failed: {}", e);
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod mail;
pub mod mailer;
pub mod recipients;

pub use crate::api::{ApiError, ErrorResponse, Errors};
pub use crate::client::{HttpTransport, Transport};
pub use crate::config::{load_config, Config};
pub use crate::error::Error;
pub use crate::logger::{LevelLogger, LogCrateLogger, Logger, StdoutLogger};
pub use crate::mail::{Attachment, Email};
pub use crate::mailer::{Mailer, SendMailParams};
pub use crate::recipients::split_emails;
