//! Monit alert notifier: builds a fixed-shape attachment from the `MONIT_*` environment
//! that monit exports to alert scripts and posts it straight to the webhook.

use crate::slack::{Attachment, Field, Message};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_OPTIONS_FILE: &str = "/etc/slack-monit.conf";
pub const DEFAULT_CHANNEL: &str = "#random";

#[derive(Debug, thiserror::Error)]
pub enum MonitError {
    #[error("unable to read config file {path}: {source}")]
    ReadOptions {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse config file {path}: {source}")]
    ParseOptions {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("slack webhook POST URL is required")]
    MissingPostUrl,
    #[error("failed to create JSON payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to send message to slack: {0}")]
    Request(#[from] reqwest::Error),
    #[error("error status received: {status}\nBody:\n{body}")]
    Status { status: u16, body: String },
}

/// Options file contents (YAML). Only fills values not given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsFile {
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

/// Resolved notifier options.
#[derive(Debug, Clone, Default)]
pub struct MonitOptions {
    pub post_url: Option<String>,
    pub channel: Option<String>,
    pub color: Option<String>,
}

impl MonitOptions {
    /// Fill unset values from the options file at `path` (missing file is fine) and
    /// default the channel.
    pub fn merge_file(mut self, path: &Path) -> Result<Self, MonitError> {
        if path.exists() {
            let s = std::fs::read_to_string(path).map_err(|source| MonitError::ReadOptions {
                path: path.to_path_buf(),
                source,
            })?;
            let file: OptionsFile =
                serde_yaml::from_str(&s).map_err(|source| MonitError::ParseOptions {
                    path: path.to_path_buf(),
                    source,
                })?;
            log::debug!("configuration from file {}: {:?}", path.display(), file);
            self.post_url = self.post_url.or(file.post_url);
            self.channel = self.channel.or(file.channel);
        }
        if self.channel.as_deref().map_or(true, str::is_empty) {
            self.channel = Some(DEFAULT_CHANNEL.to_string());
        }
        Ok(self)
    }
}

/// What monit reports about the event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitEvent {
    pub service: String,
    pub event: String,
    pub description: String,
    pub host: String,
    pub date: String,
}

impl MonitEvent {
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).unwrap_or_default();
        Self {
            service: var("MONIT_SERVICE"),
            event: var("MONIT_EVENT"),
            description: var("MONIT_DESCRIPTION"),
            host: var("MONIT_HOST"),
            date: var("MONIT_DATE"),
        }
    }

    /// "good" for recoveries (e.g. "Connection succeeded", "Exists"), "danger" otherwise.
    pub fn guess_color(&self) -> &'static str {
        if self.event.contains("succe") || self.event.contains("Exists") {
            "good"
        } else {
            "danger"
        }
    }

    pub fn to_message(&self, channel: &str, color: Option<&str>) -> Message {
        let color = color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.guess_color());
        let attachment = Attachment {
            fallback: Some(format!(
                "{}: {} on {}\n{}",
                self.service, self.event, self.host, self.description
            )),
            color: Some(color.to_string()),
            pretext: None,
            text: Some(format!(
                "`{}`: *{}*\n{}",
                self.service, self.event, self.description
            )),
            mrkdwn_in: vec!["text".to_string()],
            fields: vec![
                Field {
                    title: "Date".to_string(),
                    short: true,
                    value: self.date.clone(),
                },
                Field {
                    title: "Host".to_string(),
                    short: true,
                    value: self.host.clone(),
                },
            ],
        };
        Message {
            channel: Some(channel.to_string()),
            text: None,
            attachments: vec![attachment],
        }
    }
}

/// Build the alert for `event` and POST it to the webhook.
pub async fn notify(options: &MonitOptions, event: &MonitEvent) -> Result<(), MonitError> {
    let post_url = options
        .post_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(MonitError::MissingPostUrl)?;
    let channel = options.channel.as_deref().unwrap_or(DEFAULT_CHANNEL);
    let message = event.to_message(channel, options.color.as_deref());
    let buf = serde_json::to_string_pretty(&message)?;

    log::debug!("sending to {}, payload:\n{}", post_url, buf);
    let res = reqwest::Client::new()
        .post(post_url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(buf)
        .send()
        .await?;
    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("reading response body failed: {}", e);
            String::new()
        }
    };
    log::debug!("response received, status: {}\nBody:\n{}", status, body);

    if status != reqwest::StatusCode::OK {
        return Err(MonitError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> MonitEvent {
        MonitEvent {
            service: "nginx".to_string(),
            event: name.to_string(),
            description: "process is running".to_string(),
            host: "web-01".to_string(),
            date: "Thu, 01 Oct 2026 10:00:00".to_string(),
        }
    }

    #[test]
    fn color_guessing() {
        assert_eq!(event("Connection succeeded").guess_color(), "good");
        assert_eq!(event("Exists").guess_color(), "good");
        assert_eq!(event("Does not exist").guess_color(), "danger");
    }

    #[test]
    fn explicit_color_wins() {
        let m = event("Exists").to_message("#ops", Some("warning"));
        assert_eq!(m.attachments[0].color.as_deref(), Some("warning"));
    }

    #[test]
    fn payload_shape() {
        let m = event("Does not exist").to_message("#ops", None);
        let v: serde_json::Value = serde_json::to_value(&m).unwrap();
        assert_eq!(v["channel"], "#ops");
        let a = &v["attachments"][0];
        assert_eq!(a["fallback"], "nginx: Does not exist on web-01\nprocess is running");
        assert_eq!(a["color"], "danger");
        assert_eq!(a["text"], "`nginx`: *Does not exist*\nprocess is running");
        assert_eq!(a["mrkdwn_in"], serde_json::json!(["text"]));
        assert_eq!(
            a["fields"],
            serde_json::json!([
                {"title": "Date", "short": true, "value": "Thu, 01 Oct 2026 10:00:00"},
                {"title": "Host", "short": true, "value": "web-01"}
            ])
        );
    }

    #[test]
    fn options_file_fills_unset_values_only() {
        let path = std::env::temp_dir().join(format!("slack-monit-{}.conf", uuid::Uuid::new_v4()));
        std::fs::write(&path, "post_url: http://hooks.local/x\nchannel: \"#file\"\n").unwrap();
        let opts = MonitOptions {
            channel: Some("#cli".to_string()),
            ..Default::default()
        }
        .merge_file(&path)
        .unwrap();
        assert_eq!(opts.post_url.as_deref(), Some("http://hooks.local/x"));
        assert_eq!(opts.channel.as_deref(), Some("#cli"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_options_file_defaults_channel() {
        let path = std::env::temp_dir().join(format!("slack-monit-none-{}.conf", uuid::Uuid::new_v4()));
        let opts = MonitOptions::default().merge_file(&path).unwrap();
        assert_eq!(opts.channel.as_deref(), Some(DEFAULT_CHANNEL));
        assert!(opts.post_url.is_none());
    }

    #[tokio::test]
    async fn notify_requires_post_url() {
        let err = notify(&MonitOptions::default(), &event("x")).await.unwrap_err();
        assert!(matches!(err, MonitError::MissingPostUrl));
    }
}
