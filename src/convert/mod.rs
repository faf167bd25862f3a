//! Message conversion in both directions.
//!
//! [`Formatter`] bundles a [`Directory`] with [`FormatterOptions`] and
//! exposes the two conversions:
//!
//! - [`Formatter::signal_to_matrix`]: body with mention spans to plain and
//!   HTML Matrix bodies
//! - [`Formatter::matrix_to_signal`]: Matrix content to a Signal body with
//!   UTF-16 mention spans
//!
//! Conversions build new values only; a failed conversion leaves nothing
//! half-written behind.

mod inbound;
mod outbound;

use crate::common::Result;
use crate::config::FormatterOptions;
use crate::directory::Directory;
use crate::entity::FormattedText;
use crate::html::HtmlParser;
use crate::types::{Mention, MessageData, RichContent};

/// Converter between Signal and Matrix message formats.
///
/// # Examples
///
/// ```no_run
/// use signal_formatter::{Directory, Formatter, MessageData, Mention};
/// # async fn demo(directory: impl Directory, uuid: uuid::Uuid) -> signal_formatter::Result<()> {
/// let formatter = Formatter::new(directory);
/// let message = MessageData::new("Hi \u{fffc}").with_mentions(vec![Mention::new(uuid, 3, 1)]);
/// let content = formatter.signal_to_matrix(&message).await?;
/// println!("{}", content.formatted_body.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Formatter<D> {
    directory: D,
    options: FormatterOptions,
}

impl<D: Directory> Formatter<D> {
    /// Create a formatter with default options.
    pub fn new(directory: D) -> Self {
        Self::with_options(directory, FormatterOptions::default())
    }

    pub fn with_options(directory: D, options: FormatterOptions) -> Self {
        Self { directory, options }
    }

    #[inline]
    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    #[inline]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Convert a Signal message into Matrix content.
    ///
    /// Fails with [`Error::OffsetOutOfBounds`](crate::Error::OffsetOutOfBounds)
    /// when a mention reaches past the body, with
    /// [`Error::UnpairedSurrogate`](crate::Error::UnpairedSurrogate) when a
    /// mention boundary splits a surrogate pair, and with the directory's
    /// error when a puppet lookup fails.
    pub async fn signal_to_matrix(&self, message: &MessageData) -> Result<RichContent> {
        inbound::signal_to_matrix(&self.directory, &self.options, message).await
    }

    /// Convert Matrix content into a Signal body and mentions.
    ///
    /// Pills that do not resolve to a Signal account stay plain text.
    pub async fn matrix_to_signal(&self, content: &RichContent) -> Result<(String, Vec<Mention>)> {
        outbound::matrix_to_signal(&self.directory, &self.options, content).await
    }

    /// Parse an HTML fragment into formatted text without flattening it.
    pub async fn parse_html(&self, html: &str) -> Result<FormattedText> {
        HtmlParser::new(&self.directory, &self.options).parse(html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::entity::{Entity, MarkupKind};
    use crate::test_support::MemoryDirectory;
    use crate::types::{Format, MessageType};
    use std::sync::Arc;
    use uuid::Uuid;

    const ALICE: Uuid = Uuid::from_u128(0xa11ce);
    const BOB: Uuid = Uuid::from_u128(0xb0b);

    fn formatter() -> Formatter<Arc<MemoryDirectory>> {
        Formatter::new(Arc::new(
            MemoryDirectory::new()
                .with_puppet(ALICE, Some("Alice"), "@signal_alice:example.org")
                .with_puppet(BOB, Some("Bob"), "@signal_bob:example.org"),
        ))
    }

    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    #[tokio::test]
    async fn test_plain_round_trip() {
        let formatter = formatter();
        let message = MessageData::new("nothing special 😀 <here>");
        let content = formatter.signal_to_matrix(&message).await.unwrap();
        assert_eq!(content.format, Format::Plain);
        assert_eq!(content.formatted_body, None);

        let (body, mentions) = formatter.matrix_to_signal(&content).await.unwrap();
        assert_eq!(body, message.body);
        assert!(mentions.is_empty());
    }

    #[tokio::test]
    async fn test_mentions_round_trip() {
        let formatter = formatter();
        let message = MessageData::new("Hi \u{fffc} and \u{fffc}").with_mentions(vec![
            Mention::new(ALICE, 3, 1),
            Mention::new(BOB, 9, 1),
        ]);
        let content = formatter.signal_to_matrix(&message).await.unwrap();
        assert_eq!(content.body, "Hi Alice and Bob");

        let (body, mentions) = formatter.matrix_to_signal(&content).await.unwrap();
        assert_eq!(body, "Hi Alice and Bob");
        assert_eq!(
            mentions,
            vec![Mention::new(ALICE, 3, 5), Mention::new(BOB, 13, 3)]
        );
    }

    #[tokio::test]
    async fn test_astral_round_trip() {
        let formatter = formatter();
        let message =
            MessageData::new("🎉🎉 \u{fffc}").with_mentions(vec![Mention::new(BOB, 5, 1)]);
        let content = formatter.signal_to_matrix(&message).await.unwrap();
        let (body, mentions) = formatter.matrix_to_signal(&content).await.unwrap();
        assert_eq!(body, "🎉🎉 Bob");
        assert_eq!(mentions, vec![Mention::new(BOB, 5, 3)]);
    }

    #[tokio::test]
    async fn test_emote_is_not_mutated() {
        let formatter = formatter();
        let content = RichContent::html("hugs Alice", "hugs <b>Alice</b>")
            .with_msgtype(MessageType::Emote);
        let (body, _) = formatter.matrix_to_signal(&content).await.unwrap();
        assert_eq!(body, "/me hugs **Alice**");
        assert_eq!(content.formatted_body.as_deref(), Some("hugs <b>Alice</b>"));
    }

    #[tokio::test]
    async fn test_rich_document() {
        let formatter = formatter();
        let html = concat!(
            "<h1>Notes</h1>",
            "<blockquote>quoted <i>text</i></blockquote>",
            "<ul><li>one</li><li>two</li></ul>",
            "<pre><code class=\"language-sh\">ls -la\n</code></pre>",
            "<p>see <a href=\"https://example.org\">this</a></p>",
        );
        let text = formatter.parse_html(html).await.unwrap();
        assert_eq!(
            text.to_string_lossy(),
            "# Notes\n> quoted _text_\n● one\n● two\n```sh\nls -la\n```\nsee this (https://example.org)"
        );
        let kinds: Vec<_> = text
            .entities()
            .iter()
            .filter_map(|entity| match entity {
                Entity::Markup(markup) => Some(markup.kind),
                Entity::Mention(_) => None,
            })
            .collect();
        for kind in [
            MarkupKind::Header,
            MarkupKind::Blockquote,
            MarkupKind::Italic,
            MarkupKind::Preformatted,
            MarkupKind::Url,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
    }

    #[tokio::test]
    async fn test_malformed_input_errors() {
        let formatter = formatter();
        let message = MessageData::new("hi").with_mentions(vec![Mention::new(ALICE, 2, 1)]);
        let err = formatter.signal_to_matrix(&message).await.unwrap_err();
        assert!(err.is_malformed_offset());

        let content = RichContent::html("deep", "<b>".repeat(5000));
        let err = formatter.matrix_to_signal(&content).await.unwrap_err();
        assert!(matches!(err, Error::Markup(_)));
    }

    #[tokio::test]
    async fn test_formatter_is_shareable_across_tasks() {
        let formatter = Arc::new(formatter());
        assert_send_sync(&formatter);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let formatter = Arc::clone(&formatter);
                tokio::spawn(async move {
                    let message = MessageData::new(format!("{i} \u{fffc}"))
                        .with_mentions(vec![Mention::new(ALICE, 2, 1)]);
                    formatter.signal_to_matrix(&message).await
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let content = handle.await.unwrap().unwrap();
            assert_eq!(content.body, format!("{i} Alice"));
        }
    }

    #[tokio::test]
    async fn test_custom_permalink_base() {
        let directory =
            MemoryDirectory::new().with_puppet(ALICE, Some("Alice"), "@signal_alice:example.org");
        let options = FormatterOptions::new().with_permalink_base("https://chat.example/#/");
        let formatter = Formatter::with_options(directory, options);

        let message = MessageData::new("\u{fffc}").with_mentions(vec![Mention::new(ALICE, 0, 1)]);
        let content = formatter.signal_to_matrix(&message).await.unwrap();
        assert_eq!(
            content.formatted_body.as_deref(),
            Some(r##"<a href="https://chat.example/#/@signal_alice:example.org">Alice</a>"##)
        );
        let (_, mentions) = formatter.matrix_to_signal(&content).await.unwrap();
        assert_eq!(mentions, vec![Mention::new(ALICE, 0, 5)]);
    }
}
