//! Matrix to Signal: flatten rich content into a body and mention list.
use crate::common::Result;
use crate::config::FormatterOptions;
use crate::directory::Directory;
use crate::entity::FormattedText;
use crate::html::HtmlParser;
use crate::types::{Mention, MessageType, RichContent};
use std::borrow::Cow;
use tracing::trace;

/// Convert Matrix content into a Signal body and its mentions.
///
/// HTML content is parsed and flattened; anything else yields the plain
/// body with no mentions. Emotes get the configured prefix on both bodies
/// first. `content` itself is never modified.
pub(crate) async fn matrix_to_signal<D: Directory>(
    directory: &D,
    options: &FormatterOptions,
    content: &RichContent,
) -> Result<(String, Vec<Mention>)> {
    let content = match content.msgtype {
        MessageType::Emote => Cow::Owned(with_emote_prefix(content, &options.emote_prefix)),
        MessageType::Text | MessageType::Notice => Cow::Borrowed(content),
    };

    let Some(html) = content.html_body() else {
        trace!("Matrix message has no HTML body, sending plain body");
        return Ok((content.body.clone(), Vec::new()));
    };

    let parsed = HtmlParser::new(directory, options).parse(html).await?;
    let (body, mentions) = flatten(parsed)?;
    trace!(mentions = mentions.len(), "Converted Matrix pills to Signal mentions");
    Ok((body, mentions))
}

fn with_emote_prefix(content: &RichContent, prefix: &str) -> RichContent {
    let mut content = content.clone();
    content.body.insert_str(0, prefix);
    if let Some(formatted_body) = content.formatted_body.as_mut() {
        formatted_body.insert_str(0, prefix);
    }
    content
}

/// Collapse the text and keep only mention entities, ordered by start.
fn flatten(text: FormattedText) -> Result<(String, Vec<Mention>)> {
    let (units, entities) = text.into_parts();
    let mut mentions: Vec<Mention> = entities
        .iter()
        .filter_map(|entity| entity.as_mention())
        .map(|mention| mention.to_mention())
        .collect();
    mentions.sort_by_key(|mention| mention.start);
    Ok((units.collapse()?, mentions))
}
