use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::api::{self, MAIL_SEND_PATH};
use crate::client::{HttpTransport, Transport};
use crate::config::Config;
use crate::logger::{Logger, StdoutLogger};
use crate::mail::{Asm, Attachment, Content, Email, Message, Personalization};
use crate::recipients::split_emails;
use crate::Error;

/// Per-call parameters for `Mailer::send_mail`.
#[derive(Clone, Debug, Default)]
pub struct SendMailParams {
    pub subject: String,
    /// Recipient display name
    pub name: String,
    /// Recipient address
    pub email: String,
    pub attachments: Vec<Attachment>,

    pub html_content: Option<String>,

    // Dynamic template
    pub template_id: Option<String>,
    pub data: HashMap<String, serde_json::Value>,

    pub asm_group_id: i64,
    pub asm_groups_to_display: Vec<i64>,
}

/// Sends transactional email through the provider's mail-send endpoint.
///
/// A `Mailer` never mutates its config, so one instance can be shared
/// between threads and reused for any number of sends.
pub struct Mailer {
    config: Config,
    logger: Arc<dyn Logger>,
    transport: Box<dyn Transport>,
}

impl Mailer {
    /// Builds a mailer that talks HTTP to `config.base_url`.
    ///
    /// # Panics
    ///
    /// Panics if the config has no API key, a zero timeout or an invalid
    /// base URL, or if the HTTP client cannot be created. Use `try_new` to get an error
    /// instead.
    pub fn new(config: Config) -> Self {
        match Self::try_new(config) {
            Ok(mailer) => mailer,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(config: Config) -> Result<Self, Error> {
        validate(&config)?;
        let transport = HttpTransport::with_timeout(Duration::from_secs(config.timeout_secs))?;
        Self::with_transport(config, transport)
    }

    /// Builds a mailer that submits requests through a custom transport.
    pub fn with_transport(
        config: Config,
        transport: impl Transport + 'static,
    ) -> Result<Self, Error> {
        validate(&config)?;

        let logger = match config.logger {
            Some(ref logger) => Arc::clone(logger),
            None => Arc::new(StdoutLogger) as Arc<dyn Logger>,
        };

        Ok(Self {
            config,
            logger,
            transport: Box::new(transport),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assembles the outbound message for `params` without sending it.
    ///
    /// A template reference and an HTML content block can both end up in
    /// the message; how they combine is up to the provider.
    pub fn build_message(&self, params: &SendMailParams) -> Message {
        let mut m = Message::new();
        m.set_from(Email::new(&self.config.sender_name, &self.config.sender_mail));

        if params.asm_group_id > 0 && !params.asm_groups_to_display.is_empty() {
            m.set_asm(Asm {
                group_id: params.asm_group_id,
                groups_to_display: params.asm_groups_to_display.clone(),
            });
        }

        let mut p = Personalization::new();
        p.add_tos(vec![Email::new(&params.name, &params.email)]);
        p.add_bccs(split_emails(&self.config.bcc_addresses, &params.email));
        p.add_ccs(split_emails(&self.config.cc_addresses, &params.email));

        m.subject = params.subject.clone();

        if let Some(template_id) = non_empty(&params.template_id) {
            m.set_template_id(template_id);
            for (key, value) in &params.data {
                p.set_dynamic_template_data(key, value.clone());
            }
        }

        m.add_personalization(p);

        if let Some(html) = non_empty(&params.html_content) {
            m.add_content(Content::html(html));
        }

        for attachment in &params.attachments {
            m.add_attachment(attachment.clone());
        }

        m
    }

    /// Sends one message and waits for the provider's answer.
    ///
    /// Transport failures are returned as-is. A 4xx/5xx response carrying
    /// a provider error list becomes `Error::Provider`. A 4xx/5xx response
    /// without one counts as sent unless `Config::strict_errors` is set.
    pub fn send_mail(&self, params: &SendMailParams) -> Result<(), Error> {
        let message = self.build_message(params);

        let mut request =
            api::build_request(&self.config.api_key, MAIL_SEND_PATH, &self.config.base_url)?;
        request.method = Method::POST;
        request.body = message.to_body()?;

        log::debug!(
            "Sending \"{}\" to {} ({} attachments)",
            params.subject,
            params.email,
            params.attachments.len()
        );

        let response = match self.transport.submit(&request) {
            Ok(response) => response,
            Err(e) => {
                self.logger.print(format_args!("Send mail error: {}", e));
                return Err(e);
            }
        };

        if response.status_code >= 400 {
            self.logger.print(format_args!(
                "Send mail status_code = {} response = {}",
                response.status_code, response.body
            ));
        }

        api::map_status(&response, self.config.strict_errors)
    }
}

fn validate(config: &Config) -> Result<(), Error> {
    if config.api_key.is_empty() {
        return Err(Error::Config("SendGrid API key is required".to_string()));
    }
    if config.timeout_secs == 0 {
        return Err(Error::Config("timeout_secs must be greater than zero".to_string()));
    }
    reqwest::Url::parse(&config.base_url)?;
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
