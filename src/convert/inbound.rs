//! Signal to Matrix: substitute mention spans with display names and pills.
use crate::common::escape::escape_html;
use crate::common::utf16::{Utf16Text, collapse, expand};
use crate::common::{Error, Result};
use crate::config::FormatterOptions;
use crate::directory::Directory;
use crate::types::{Format, Mention, MessageData, RichContent};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Convert a Signal message into Matrix content.
///
/// Every mention span is replaced by the mentioned puppet's display name in
/// the plain body, and by a permalink pill in the HTML body. The text
/// between mentions is copied unchanged (and HTML-escaped for the HTML
/// body). Messages without mentions pass through as plain text.
pub(crate) async fn signal_to_matrix<D: Directory>(
    directory: &D,
    options: &FormatterOptions,
    message: &MessageData,
) -> Result<RichContent> {
    if message.mentions.is_empty() {
        trace!("Signal message has no mentions, passing body through");
        return Ok(RichContent::text(message.body.as_str()));
    }

    let body = expand(&message.body);
    let mentions = sorted_mentions(&message.mentions);
    for mention in mentions.iter() {
        check_bounds(mention, &body)?;
    }

    let mut plain = Utf16Text::with_capacity(body.len());
    let mut html = String::with_capacity(message.body.len() * 2);
    let mut cursor = 0;
    for mention in mentions.iter() {
        if mention.start < cursor {
            debug!(
                start = mention.start,
                cursor, "Mention overlaps the previous one, emitting it without leading text"
            );
        } else {
            let before = body.slice(cursor..mention.start)?;
            plain.extend_from_units(before);
            html.push_str(&escape_html(&collapse(before)?));
        }
        // Overlaps are not corrected: the cursor follows the latest mention
        // even when that moves it backwards. The bounds check above
        // guarantees the end exists.
        cursor = mention.start + mention.length;

        let puppet = directory.puppet_by_uuid(mention.uuid).await?;
        let name = puppet.display_name();
        plain.push_str(name);
        html.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            escape_html(&options.permalink(puppet.mxid.as_str())),
            escape_html(name)
        ));
    }

    let tail = body.slice(cursor..body.len())?;
    plain.extend_from_units(tail);
    html.push_str(&escape_html(&collapse(tail)?));

    trace!(mentions = mentions.len(), "Converted Signal mentions to pills");
    Ok(RichContent {
        body: plain.collapse()?,
        format: Format::Html,
        formatted_body: Some(html),
        ..RichContent::default()
    })
}

/// Mentions in ascending `start` order, copying only when the caller's
/// list is out of order.
fn sorted_mentions(mentions: &[Mention]) -> Cow<'_, [Mention]> {
    if mentions.is_sorted_by_key(|mention| mention.start) {
        return Cow::Borrowed(mentions);
    }
    debug!(count = mentions.len(), "Signal mentions are out of order, sorting by start");
    let mut sorted = mentions.to_vec();
    sorted.sort_by_key(|mention| mention.start);
    Cow::Owned(sorted)
}

fn check_bounds(mention: &Mention, body: &Utf16Text) -> Result<()> {
    match mention.end() {
        Some(end) if end <= body.len() => Ok(()),
        _ => Err(Error::OffsetOutOfBounds {
            start: mention.start,
            length: mention.length,
            len: body.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryDirectory;
    use uuid::Uuid;

    const ALICE: Uuid = Uuid::from_u128(0xa11ce);
    const BOB: Uuid = Uuid::from_u128(0xb0b);

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_puppet(ALICE, Some("Alice"), "@signal_alice:example.org")
            .with_puppet(BOB, Some("Bob <3"), "@signal_bob:example.org")
    }

    async fn convert(message: &MessageData) -> Result<RichContent> {
        signal_to_matrix(&directory(), &FormatterOptions::default(), message).await
    }

    #[tokio::test]
    async fn test_plain_message_passes_through() {
        let message = MessageData::new("no <b>mentions</b> here");
        let content = convert(&message).await.unwrap();
        assert_eq!(content, RichContent::text("no <b>mentions</b> here"));
    }

    #[tokio::test]
    async fn test_mentions_become_pills() {
        let message = MessageData::new("Hi \u{fffc} & \u{fffc}!").with_mentions(vec![
            Mention::new(ALICE, 3, 1),
            Mention::new(BOB, 7, 1),
        ]);
        let content = convert(&message).await.unwrap();
        assert_eq!(content.body, "Hi Alice & Bob <3!");
        assert_eq!(content.format, Format::Html);
        assert_eq!(
            content.formatted_body.as_deref(),
            Some(concat!(
                r##"Hi <a href="https://matrix.to/#/@signal_alice:example.org">Alice</a>"##,
                r##" &amp; <a href="https://matrix.to/#/@signal_bob:example.org">Bob &lt;3</a>!"##,
            ))
        );
    }

    #[tokio::test]
    async fn test_offsets_count_utf16_units() {
        // The emoji occupies two code units, so the mention starts at 3.
        let message =
            MessageData::new("😀 \u{fffc} ok").with_mentions(vec![Mention::new(ALICE, 3, 1)]);
        let content = convert(&message).await.unwrap();
        assert_eq!(content.body, "😀 Alice ok");
    }

    #[tokio::test]
    async fn test_unknown_account_gets_puppet() {
        let directory = MemoryDirectory::new();
        let uuid = Uuid::from_u128(7);
        let message = MessageData::new("\u{fffc}").with_mentions(vec![Mention::new(uuid, 0, 1)]);
        let content = signal_to_matrix(&directory, &FormatterOptions::default(), &message)
            .await
            .unwrap();
        let mxid = format!("@signal_{uuid}:example.org");
        assert_eq!(content.body, mxid);
        assert_eq!(directory.puppet_count(), 1);
    }

    #[tokio::test]
    async fn test_unsorted_mentions_are_sorted() {
        let message = MessageData::new("\u{fffc} \u{fffc}").with_mentions(vec![
            Mention::new(BOB, 2, 1),
            Mention::new(ALICE, 0, 1),
        ]);
        let content = convert(&message).await.unwrap();
        assert_eq!(content.body, "Alice Bob <3");
    }

    #[tokio::test]
    async fn test_overlapping_mentions_follow_latest_end() {
        let message = MessageData::new("abcdef").with_mentions(vec![
            Mention::new(ALICE, 1, 3),
            Mention::new(BOB, 2, 1),
        ]);
        let content = convert(&message).await.unwrap();
        // Bob's span ends inside Alice's, so the tail restarts at "d".
        assert_eq!(content.body, "aAliceBob <3def");
    }

    #[tokio::test]
    async fn test_out_of_bounds_mention() {
        let message = MessageData::new("short").with_mentions(vec![Mention::new(ALICE, 3, 5)]);
        let err = convert(&message).await.unwrap_err();
        assert!(matches!(
            err,
            Error::OffsetOutOfBounds {
                start: 3,
                length: 5,
                len: 5
            }
        ));

        let message = MessageData::new("x").with_mentions(vec![Mention::new(ALICE, usize::MAX, 2)]);
        assert!(convert(&message).await.unwrap_err().is_malformed_offset());
    }

    #[tokio::test]
    async fn test_mention_splitting_surrogate_pair() {
        let message = MessageData::new("😀").with_mentions(vec![Mention::new(ALICE, 1, 1)]);
        let err = convert(&message).await.unwrap_err();
        assert!(matches!(err, Error::UnpairedSurrogate { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let directory = MemoryDirectory::new().unavailable();
        let message = MessageData::new("\u{fffc}").with_mentions(vec![Mention::new(ALICE, 0, 1)]);
        let result = signal_to_matrix(&directory, &FormatterOptions::default(), &message).await;
        assert!(matches!(result, Err(Error::Directory(_))));
    }

    #[tokio::test]
    async fn test_zero_length_mention_inserts_name() {
        let message = MessageData::new("hi ").with_mentions(vec![Mention::new(ALICE, 3, 0)]);
        let content = convert(&message).await.unwrap();
        assert_eq!(content.body, "hi Alice");
    }
}
