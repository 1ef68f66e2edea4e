//! Outbound message types in the provider's v3 mail-send JSON schema.

use std::collections::HashMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// An address with an optional display name.
/// Address syntax is not validated here.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Email {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "email")]
    pub address: String,
}

impl Email {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
        }
    }
}

/// Recipients and per-recipient template data for one logical email
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Personalization {
    pub to: Vec<Email>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Email>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dynamic_template_data: HashMap<String, serde_json::Value>,
}

impl Personalization {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_tos(&mut self, tos: impl IntoIterator<Item = Email>) {
        self.to.extend(tos);
    }

    pub fn add_ccs(&mut self, ccs: impl IntoIterator<Item = Email>) {
        self.cc.extend(ccs);
    }

    pub fn add_bccs(&mut self, bccs: impl IntoIterator<Item = Email>) {
        self.bcc.extend(bccs);
    }

    pub fn set_dynamic_template_data(&mut self, key: &str, value: serde_json::Value) {
        self.dynamic_template_data.insert(key.to_string(), value);
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl Content {
    pub fn new(content_type: &str, value: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            value: value.to_string(),
        }
    }

    pub fn html(value: &str) -> Self {
        Self::new("text/html", value)
    }
}

/// A file attached to the message.
/// `content` must already be base64 encoded; empty fields are left out
/// of the serialized message.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub disposition: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_id: String,
}

impl Attachment {
    /// Creates an attachment from raw file contents
    pub fn from_bytes(filename: &str, mime_type: &str, data: &[u8]) -> Self {
        Self {
            content: base64::engine::general_purpose::STANDARD.encode(data),
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
            disposition: "attachment".to_string(),
            ..Default::default()
        }
    }
}

/// Unsubscribe group settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Asm {
    pub group_id: i64,
    pub groups_to_display: Vec<i64>,
}

/// A complete outbound message
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Message {
    pub from: Email,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    pub personalizations: Vec<Personalization>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asm: Option<Asm>,
}

impl Message {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_from(&mut self, from: Email) {
        self.from = from;
    }

    pub fn set_asm(&mut self, asm: Asm) {
        self.asm = Some(asm);
    }

    pub fn set_template_id(&mut self, template_id: &str) {
        self.template_id = Some(template_id.to_string());
    }

    pub fn add_personalization(&mut self, p: Personalization) {
        self.personalizations.push(p);
    }

    pub fn add_content(&mut self, content: Content) {
        self.content.push(content);
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Serialize into the JSON request body
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_json_shape() {
        let mut p = Personalization::new();
        p.add_tos(vec![Email::new("Bob", "bob@x.com")]);
        p.add_bccs(vec![Email::new("", "audit@x.com")]);
        p.set_dynamic_template_data("code", json!(1234));

        let mut m = Message::new();
        m.set_from(Email::new("Shop", "shop@x.com"));
        m.subject = "Hi".to_string();
        m.add_personalization(p);
        m.add_content(Content::html("<b>hi</b>"));
        m.set_template_id("d-123");
        m.set_asm(Asm {
            group_id: 7,
            groups_to_display: vec![7, 8],
        });

        let value: serde_json::Value = serde_json::from_slice(&m.to_body().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "from": {"name": "Shop", "email": "shop@x.com"},
                "subject": "Hi",
                "personalizations": [{
                    "to": [{"name": "Bob", "email": "bob@x.com"}],
                    "bcc": [{"email": "audit@x.com"}],
                    "dynamic_template_data": {"code": 1234}
                }],
                "content": [{"type": "text/html", "value": "<b>hi</b>"}],
                "template_id": "d-123",
                "asm": {"group_id": 7, "groups_to_display": [7, 8]}
            })
        );
    }

    #[test]
    fn test_attachment_omits_empty_fields() {
        let attachment = Attachment {
            content: "aGVsbG8=".to_string(),
            filename: "hello.txt".to_string(),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&attachment).unwrap(),
            json!({"content": "aGVsbG8=", "filename": "hello.txt"})
        );
    }

    #[test]
    fn test_attachment_from_bytes() {
        let attachment = Attachment::from_bytes("hello.txt", "text/plain", b"hello");

        assert_eq!(attachment.content, "aGVsbG8=");
        assert_eq!(attachment.mime_type, "text/plain");
        assert_eq!(attachment.disposition, "attachment");
        assert!(attachment.content_id.is_empty());
    }
}
