//! Turns a finished [`Draft`] into the webhook [`Message`].

use super::parser::Draft;
use crate::slack::{Attachment, Message};

/// Substituted when a session produced neither text nor pretext.
pub const EMPTY_TEXT: &str = "<empty> (no text received)";

/// Attachment-style when any LEVEL/FIELD/PRETEXT was seen, plain text otherwise.
pub fn assemble(draft: Draft) -> Message {
    let Draft {
        channel,
        color,
        mut text,
        pretext,
        fields,
        as_attachment,
    } = draft;

    if text.is_empty() && pretext.is_empty() {
        text = EMPTY_TEXT.to_string();
    }

    if !as_attachment {
        return Message {
            channel,
            text: Some(text),
            attachments: Vec::new(),
        };
    }

    let attachment = Attachment {
        fallback: None,
        color,
        pretext: Some(pretext).filter(|s| !s.is_empty()),
        text: Some(text).filter(|s| !s.is_empty()),
        mrkdwn_in: vec!["text".to_string(), "pretext".to_string()],
        fields,
    };
    Message {
        channel,
        text: None,
        attachments: vec![attachment],
    }
}
