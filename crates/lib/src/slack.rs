//! Chat webhook payload types (Slack-compatible incoming webhook JSON).
//!
//! Field order in each struct is the serialized key order.

use serde::{Deserialize, Serialize};

/// Top-level message posted to the chat webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Attachment: colored side bar, optional pretext, text and short/long fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Which of the attachment's string members are rendered with markup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub short: bool,
    pub value: String,
}

impl Message {
    /// Compact JSON document as posted to the gateway.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_members_are_omitted() {
        let m = Message {
            text: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(m.to_json().unwrap(), r#"{"text":"hi"}"#);
    }

    #[test]
    fn field_keys_serialize_in_title_short_value_order() {
        let f = Field {
            title: "Disk".to_string(),
            short: true,
            value: "91%".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&f).unwrap(),
            r#"{"title":"Disk","short":true,"value":"91%"}"#
        );
    }
}
