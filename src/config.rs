//! Configuration for message conversion.
//!
//! These options cover the few bridge-specific strings the formatter writes
//! or recognizes. Loading them from a config file is left to the caller; the
//! struct derives serde so it can be embedded in a larger config section.
use serde::{Deserialize, Serialize};

/// Configuration options for message conversion.
///
/// # Examples
///
/// ```rust
/// use signal_formatter::FormatterOptions;
///
/// // Create with defaults
/// let options = FormatterOptions::default();
/// assert_eq!(options.emote_prefix, "/me ");
///
/// // Or customize
/// let options = FormatterOptions::new()
///     .with_emote_prefix("* ")
///     .with_permalink_base("https://matrix.example.org/#/");
/// assert_eq!(options.permalink_base, "https://matrix.example.org/#/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// Marker prepended to emote messages sent to Signal
    pub emote_prefix: String,
    /// Permalink prefix used for generated mention links and for
    /// recognizing user pills
    pub permalink_base: String,
    /// Bullets for unordered list items, cycled by nesting depth
    pub list_bullets: Vec<String>,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            emote_prefix: "/me ".to_string(),
            permalink_base: "https://matrix.to/#/".to_string(),
            list_bullets: ["●", "○", "■", "‣"].map(String::from).to_vec(),
        }
    }
}

impl FormatterOptions {
    /// Create a new `FormatterOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker prepended to emotes.
    #[inline]
    pub fn with_emote_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.emote_prefix = prefix.into();
        self
    }

    /// Set the permalink prefix for mention links.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use signal_formatter::FormatterOptions;
    ///
    /// let options = FormatterOptions::new().with_permalink_base("https://chat.example/#/");
    /// assert_eq!(options.permalink("@alice:example.org"), "https://chat.example/#/@alice:example.org");
    /// ```
    #[inline]
    pub fn with_permalink_base(mut self, base: impl Into<String>) -> Self {
        self.permalink_base = base.into();
        self
    }

    /// Set the bullets used for unordered lists.
    #[inline]
    pub fn with_list_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    /// Permalink for a Matrix user ID.
    #[inline]
    pub fn permalink(&self, target: &str) -> String {
        format!("{}{}", self.permalink_base, target)
    }

    /// Bullet for a list nested `depth` levels deep (1 = outermost).
    pub fn list_bullet(&self, depth: usize) -> &str {
        if self.list_bullets.is_empty() {
            return "*";
        }
        let index = depth.saturating_sub(1) % self.list_bullets.len();
        &self.list_bullets[index]
    }
}
