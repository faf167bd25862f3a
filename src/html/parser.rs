//! Conversion of Matrix HTML into formatted text for Signal.
//!
//! The parser walks the fragment tree and builds a [`FormattedText`] bottom
//! up: children first, then the element's markup applied through
//! [`FormattedText::format`]. User pills are resolved to Signal accounts
//! through the [`Directory`]; the walk suspends only at those lookups.
use super::dom::{self, Element, Node};
use crate::common::Result;
use crate::config::FormatterOptions;
use crate::directory::Directory;
use crate::entity::{EntityType, FormattedText};
use crate::types::UserId;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;
use uuid::Uuid;

/// Tags rendered on lines of their own.
const BLOCK_TAGS: &[&str] = &[
    "p", "pre", "blockquote", "ol", "ul", "li", "h1", "h2", "h3", "h4", "h5", "h6", "div", "hr",
    "table",
];

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[inline]
fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// State inherited from ancestors during the walk.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    /// Inside `pre` or `code`: keep whitespace exactly as written
    preserve_whitespace: bool,
    /// Number of enclosing `ol`/`ul` elements
    list_depth: usize,
}

impl Context {
    fn enter_list(self) -> Self {
        Self {
            list_depth: self.list_depth + 1,
            ..self
        }
    }

    fn enter_code_block(self) -> Self {
        Self {
            preserve_whitespace: true,
            ..self
        }
    }
}

/// Parser turning Matrix HTML into Signal-flavoured formatted text.
pub struct HtmlParser<'a, D> {
    directory: &'a D,
    options: &'a FormatterOptions,
}

impl<'a, D: Directory> HtmlParser<'a, D> {
    pub fn new(directory: &'a D, options: &'a FormatterOptions) -> Self {
        Self { directory, options }
    }

    /// Parse an HTML fragment.
    ///
    /// The result's text is trimmed, and its mention entities point at the
    /// display text of every pill that resolved to a Signal account.
    pub async fn parse(&self, html: &str) -> Result<FormattedText> {
        let body = dom::parse_fragment(html)?;
        self.element_to_text(&body, Context::default()).await
    }

    fn element_to_text<'s>(
        &'s self,
        element: &'s Element,
        ctx: Context,
    ) -> BoxFuture<'s, Result<FormattedText>> {
        Box::pin(async move {
            let text = match element.tag.as_str() {
                "mx-reply" => FormattedText::new(),
                "blockquote" => self
                    .tag_aware_parse(element, ctx)
                    .await?
                    .format(EntityType::Blockquote),
                "ol" | "ul" => self.list_to_text(element, ctx.enter_list()).await?,
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let size = element.tag[1..].parse::<u8>().unwrap_or(1);
                    self.parse_children(element, ctx)
                        .await?
                        .format(EntityType::Header { size })
                },
                "br" => FormattedText::from("\n"),
                "hr" => FormattedText::from("---"),
                "b" | "strong" | "i" | "em" | "s" | "strike" | "del" | "u" | "ins" => {
                    self.basic_format_to_text(element, ctx).await?
                },
                "a" => self.link_to_text(element, ctx).await?,
                "p" => self.tag_aware_parse(element, ctx).await?.append_str("\n"),
                "font" | "span" => self.span_to_text(element, ctx).await?,
                "pre" => self.preformatted_to_text(element, ctx).await?,
                "code" => self
                    .parse_children(element, ctx.enter_code_block())
                    .await?
                    .format(EntityType::InlineCode),
                _ => self.tag_aware_parse(element, ctx).await?,
            };
            Ok(text)
        })
    }

    /// Convert each child, pairing it with its tag (`None` for text).
    async fn tagged_children<'e>(
        &self,
        element: &'e Element,
        ctx: Context,
    ) -> Result<Vec<(FormattedText, Option<&'e str>)>> {
        let mut output = Vec::with_capacity(element.children.len());
        for (index, child) in element.children.iter().enumerate() {
            match child {
                Node::Text(text) => {
                    if !ctx.preserve_whitespace
                        && text.bytes().all(|b| b.is_ascii_whitespace())
                        && is_layout_whitespace(element, index)
                    {
                        continue;
                    }
                    output.push((text_to_formatted(text, ctx), None));
                },
                Node::Element(child) => {
                    let text = self.element_to_text(child, ctx).await?;
                    output.push((text, Some(child.tag.as_str())));
                },
            }
        }
        Ok(output)
    }

    /// Children concatenated as-is.
    async fn parse_children(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let children = self.tagged_children(element, ctx).await?;
        Ok(FormattedText::join(children.into_iter().map(|(text, _)| text), ""))
    }

    /// Children concatenated with block elements on their own lines, then
    /// trimmed.
    async fn tag_aware_parse(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let mut output = FormattedText::new();
        let mut prev_was_block = false;
        for (text, tag) in self.tagged_children(element, ctx).await? {
            let text = if tag.is_some_and(is_block_tag) {
                let text = text.append_str("\n");
                let text = if prev_was_block { text } else { text.prepend_str("\n") };
                prev_was_block = true;
                text
            } else {
                prev_was_block = false;
                text
            };
            output = output.append(text);
        }
        Ok(output.trim())
    }

    async fn basic_format_to_text(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let text = self.tag_aware_parse(element, ctx).await?;
        let entity_type = match element.tag.as_str() {
            "b" | "strong" => EntityType::Bold,
            "i" | "em" => EntityType::Italic,
            "s" | "strike" | "del" => EntityType::Strikethrough,
            "u" | "ins" => EntityType::Underline,
            _ => return Ok(text),
        };
        Ok(text.format(entity_type))
    }

    async fn list_to_text(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let ordered = element.tag == "ol";
        let items: Vec<FormattedText> = self
            .tagged_children(element, ctx)
            .await?
            .into_iter()
            .filter(|(_, tag)| *tag == Some("li"))
            .map(|(text, _)| text)
            .collect();

        let mut counter: i64 = if ordered {
            element
                .attribute("start")
                .and_then(|start| start.trim().parse().ok())
                .unwrap_or(1)
        } else {
            1
        };
        let indent_length = if ordered {
            let last = counter.saturating_add(items.len().saturating_sub(1) as i64);
            last.to_string().len()
        } else {
            0
        };
        let indent = " ".repeat(indent_length + 2);

        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let prefix = if ordered {
                let prefix = format!("{counter}. ");
                counter = counter.saturating_add(1);
                prefix
            } else {
                format!("{} ", self.options.list_bullet(ctx.list_depth))
            };
            let mut lines = item.prepend_str(&prefix).split("\n").into_iter();
            let first = lines.next().unwrap_or_default();
            let rest = lines.map(|line| line.prepend_str(&indent));
            rendered.push(FormattedText::join(std::iter::once(first).chain(rest), "\n"));
        }
        Ok(FormattedText::join(rendered, "\n"))
    }

    async fn link_to_text(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let text = self.tag_aware_parse(element, ctx).await?;
        let Some(href) = element.attribute("href").filter(|href| !href.is_empty()) else {
            return Ok(text);
        };

        if let Some(address) = href.strip_prefix("mailto:") {
            return Ok(FormattedText::from(address).format(EntityType::Email {
                address: address.to_string(),
            }));
        }

        if let Some(target) = self.permalink_target(href) {
            if let Some(mxid) = UserId::parse(&target) {
                return Ok(match self.resolve_pill(&mxid).await? {
                    Some(uuid) => text.format(EntityType::UserMention { uuid }),
                    None => text,
                });
            }
            if target.starts_with('#') && target.contains(':') {
                return Ok(text.format(EntityType::RoomMention { alias: target }));
            }
        }

        Ok(text.format(EntityType::Url {
            url: href.to_string(),
        }))
    }

    async fn span_to_text(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let text = self.tag_aware_parse(element, ctx).await?;
        if let Some(reason) = element.attribute("data-mx-spoiler") {
            return Ok(text.format(EntityType::Spoiler {
                reason: reason.to_string(),
            }));
        }
        let color = element
            .attribute("data-mx-color")
            .or_else(|| element.attribute("color"));
        Ok(match color {
            Some(color) => text.format(EntityType::Color {
                color: color.to_string(),
            }),
            None => text,
        })
    }

    async fn preformatted_to_text(&self, element: &Element, ctx: Context) -> Result<FormattedText> {
        let (node, language) = match element.first_element_child() {
            Some(code) if code.tag == "code" => {
                let language = code
                    .attribute("class")
                    .and_then(|class| {
                        class
                            .split_whitespace()
                            .find_map(|name| name.strip_prefix("language-"))
                    })
                    .unwrap_or_default();
                (code, language)
            },
            _ => (element, ""),
        };

        let text = self.parse_children(node, ctx.enter_code_block()).await?;
        // The final newline of a code block belongs to the closing fence.
        let text = if text.text().ends_with_str("\n") {
            let len = text.len() - 1;
            text.truncate(len)
        } else {
            text
        };
        Ok(text.format(EntityType::Preformatted {
            language: language.to_string(),
        }))
    }

    /// Target of a permalink, percent-decoded and without query string.
    fn permalink_target(&self, href: &str) -> Option<String> {
        let target = href.strip_prefix(self.options.permalink_base.as_str())?;
        let target = target.split('?').next().unwrap_or(target);
        urlencoding::decode(target).ok().map(|decoded| decoded.into_owned())
    }

    /// Signal account behind a user pill: a logged-in bridge user's own
    /// account first, then a puppet.
    async fn resolve_pill(&self, mxid: &UserId) -> Result<Option<Uuid>> {
        if let Some(uuid) = self.directory.user_by_mxid(mxid).await? {
            return Ok(Some(uuid));
        }
        let uuid = self.directory.puppet_by_mxid(mxid).await?;
        if uuid.is_none() {
            debug!(%mxid, "Pill target has no Signal account, keeping it as plain text");
        }
        Ok(uuid)
    }
}

/// Whether whitespace-only text at `index` only separates blocks (or pads
/// the element), in which case it carries no content.
fn is_layout_whitespace(parent: &Element, index: usize) -> bool {
    let is_block = |node: Option<&Node>| match node {
        Some(Node::Element(element)) => is_block_tag(&element.tag),
        Some(Node::Text(_)) => false,
        None => true,
    };
    let previous = index.checked_sub(1).and_then(|i| parent.children.get(i));
    let next = parent.children.get(index + 1);
    is_block(previous) || is_block(next)
}

fn text_to_formatted(text: &str, ctx: Context) -> FormattedText {
    if ctx.preserve_whitespace {
        return FormattedText::from(text);
    }
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }
    FormattedText::from(collapsed)
}
