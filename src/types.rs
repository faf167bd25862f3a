//! Message shapes exchanged at the crate boundary.
//!
//! [`MessageData`] and [`Mention`] mirror the Signal side, where mention
//! spans are measured in UTF-16 code units. [`RichContent`] mirrors a Matrix
//! `m.room.message` text event, optionally carrying an HTML body.
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A Matrix user ID such as `@alice:example.org`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a user ID, requiring the `@localpart:server` shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use signal_formatter::UserId;
    ///
    /// assert!(UserId::parse("@alice:example.org").is_some());
    /// assert!(UserId::parse("#room:example.org").is_none());
    /// assert!(UserId::parse("@nobody").is_none());
    /// ```
    pub fn parse(id: &str) -> Option<Self> {
        let (localpart, server) = id.strip_prefix('@')?.split_once(':')?;
        if localpart.is_empty() || server.is_empty() {
            return None;
        }
        Some(Self(id.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A Signal mention: `length` code units starting at `start` refer to the
/// account `uuid`. Both numbers count UTF-16 code units of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    pub uuid: Uuid,
    pub start: usize,
    pub length: usize,
}

impl Mention {
    #[inline]
    pub fn new(uuid: Uuid, start: usize, length: usize) -> Self {
        Self {
            uuid,
            start,
            length,
        }
    }

    /// Exclusive end offset, or `None` on overflow.
    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.length)
    }
}

/// The text part of a Signal message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub body: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl MessageData {
    #[inline]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mentions: Vec::new(),
        }
    }

    #[inline]
    pub fn with_mentions(mut self, mentions: Vec<Mention>) -> Self {
        self.mentions = mentions;
        self
    }
}

/// Matrix message type of a text event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    #[serde(rename = "m.text")]
    Text,
    #[serde(rename = "m.emote")]
    Emote,
    #[serde(rename = "m.notice")]
    Notice,
}

/// Body format of a Matrix text event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    /// Only the plain `body` is meaningful
    #[default]
    #[serde(rename = "plain")]
    Plain,
    /// `formatted_body` holds Matrix HTML
    #[serde(rename = "org.matrix.custom.html")]
    Html,
}

impl Format {
    #[inline]
    pub fn is_plain(&self) -> bool {
        matches!(self, Format::Plain)
    }
}

/// Content of a Matrix text message event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichContent {
    pub msgtype: MessageType,
    pub body: String,
    #[serde(default, skip_serializing_if = "Format::is_plain")]
    pub format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_body: Option<String>,
}

impl RichContent {
    /// Plain `m.text` content.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            msgtype: MessageType::Text,
            body: body.into(),
            format: Format::Plain,
            formatted_body: None,
        }
    }

    /// `m.text` content with an HTML body.
    pub fn html(body: impl Into<String>, formatted_body: impl Into<String>) -> Self {
        Self {
            msgtype: MessageType::Text,
            body: body.into(),
            format: Format::Html,
            formatted_body: Some(formatted_body.into()),
        }
    }

    #[inline]
    pub fn with_msgtype(mut self, msgtype: MessageType) -> Self {
        self.msgtype = msgtype;
        self
    }

    /// The HTML body, if the content is HTML and the body is non-empty.
    pub fn html_body(&self) -> Option<&str> {
        match self.format {
            Format::Html => self.formatted_body.as_deref().filter(|body| !body.is_empty()),
            Format::Plain => None,
        }
    }
}
