//! Public types for the emails API
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage format for `email.timestamp`. Sorts lexically in
/// chronological order.
pub const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// Accepts any number of fractional digits
const PARSE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Display format used in serialized emails, e.g. "Jan 05 2026, 03:04 PM".
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%b %d %Y, %I:%M %p";

#[derive(Deserialize)]
pub struct ComposeRequest {
    // Comma separated email addresses
    #[serde(default)]
    pub recipients: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Serialize)]
pub struct ComposeResponse {
    pub message: String,
}

/// Partial update of an email's flags. Fields that are absent (or
/// null) are left as they are.
#[derive(Deserialize)]
pub struct UpdateEmailRequest {
    pub read: Option<bool>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailResponse {
    pub id: i64,
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
    pub read: bool,
    pub archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mailbox {
    Inbox,
    Sent,
    Archive,
}

impl FromStr for Mailbox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Mailbox::Inbox),
            "sent" => Ok(Mailbox::Sent),
            "archive" => Ok(Mailbox::Archive),
            other => Err(format!("Unknown mailbox {}", other)),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mailbox::Inbox => "inbox",
            Mailbox::Sent => "sent",
            Mailbox::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// Split a comma separated recipient string into trimmed addresses.
/// Blank entries are dropped and repeated addresses keep only their
/// first position.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    let mut addresses: Vec<String> = Vec::new();
    for address in raw.split(',').map(str::trim) {
        if !address.is_empty() && !addresses.iter().any(|a| a == address) {
            addresses.push(address.to_string());
        }
    }
    addresses
}

/// Reformat a stored timestamp for display. Values that don't parse
/// are passed through untouched.
pub fn format_timestamp(stored: &str) -> String {
    match NaiveDateTime::parse_from_str(stored, PARSE_TIMESTAMP_FORMAT) {
        Ok(ts) => ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        Err(e) => {
            tracing::warn!("Unparseable email timestamp {}: {}", stored, e);
            stored.to_string()
        }
    }
}
