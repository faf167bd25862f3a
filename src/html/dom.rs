//! Lightweight element tree for Matrix HTML fragments.
//!
//! Matrix HTML is a fragment, not a document, and it is not XML: void
//! elements such as `<br>` have no closing tag, attribute values may be
//! unquoted, and clients occasionally emit stray closing tags. The reader
//! below drives quick-xml in its most permissive configuration and repairs
//! nesting itself, so the tree it returns is always well formed.
use crate::common::escape::{decode_reference, unescape_html};
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::borrow::Cow;
use tracing::debug;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Maximum element nesting depth, the limit Matrix recommends for HTML
/// bodies. Conversion recurses once per level, so this also bounds stack use.
pub(crate) const MAX_DEPTH: usize = 100;

/// A node of the fragment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Decoded character data
    Text(String),
}

/// An element with lowercase tag and attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: SmallVec<[(String, String); 2]>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Value of the attribute `name`; valueless attributes yield `""`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child that is an element, ignoring text.
    pub fn first_element_child(&self) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(previous)) = self.children.last_mut() {
            previous.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(element, out),
        }
    }
}

/// Parse an HTML fragment into a tree rooted at a synthetic `body` element.
///
/// # Examples
///
/// ```
/// use signal_formatter::html::dom::{Node, parse_fragment};
///
/// let body = parse_fragment("a<br>b &amp; <b>c</b>").unwrap();
/// assert_eq!(body.tag, "body");
/// assert_eq!(body.children.len(), 4);
/// assert!(matches!(&body.children[2], Node::Text(text) if text == "b & "));
/// assert_eq!(body.text_content(), "ab & c");
/// ```
pub fn parse_fragment(html: &str) -> Result<Element> {
    let html = escape_stray_brackets(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut stack = vec![Element::new("body")];
    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let element = read_start(e);
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    push_child(&mut stack, Node::Element(element));
                } else {
                    if stack.len() > MAX_DEPTH {
                        return Err(Error::Markup(format!(
                            "Maximum HTML depth {} exceeded",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(element);
                }
            },
            Event::Empty(ref e) => {
                push_child(&mut stack, Node::Element(read_start(e)));
            },
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                // Closing an outer element implicitly closes everything opened
                // inside it; a closing tag with no open element is ignored.
                match stack.iter().rposition(|element| element.tag == tag) {
                    Some(pos) if pos > 0 => {
                        if pos + 1 < stack.len() {
                            debug!(
                                %tag,
                                unclosed = stack.len() - pos - 1,
                                "Closing tag ends inner elements"
                            );
                        }
                        while stack.len() > pos {
                            close_top(&mut stack);
                        }
                    },
                    _ => debug!(%tag, "Ignoring closing tag without open element"),
                }
            },
            Event::Text(ref t) => {
                let raw = String::from_utf8_lossy(t);
                push_text(&mut stack, &unescape_html(&raw));
            },
            Event::CData(ref t) => {
                push_text(&mut stack, &String::from_utf8_lossy(t));
            },
            Event::GeneralRef(ref r) => {
                let name = String::from_utf8_lossy(r);
                match decode_reference(&name) {
                    Some(ch) => push_text(&mut stack, ch.encode_utf8(&mut [0; 4])),
                    None => push_text(&mut stack, &format!("&{name};")),
                }
            },
            Event::Eof => break,
            _ => {}, // Comments, doctype and processing instructions carry no text
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    Ok(stack.pop().unwrap_or_else(|| Element::new("body")))
}

/// Escape every `<` that cannot open markup, so it reads as text.
///
/// A `<` opens markup only when followed by a letter, `/` and a letter, `!`
/// or `?`, and only when a `>` follows somewhere later. Anything else (`1 <
/// 2`, `<3`, a tag cut off at the end of the body) is literal text.
fn escape_stray_brackets(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let last_close = html.rfind('>');
    let mut escaped: Option<String> = None;
    let mut copied = 0;
    for (pos, _) in html.match_indices('<') {
        let is_letter =
            |offset: usize| bytes.get(pos + offset).is_some_and(u8::is_ascii_alphabetic);
        let opens_markup = match bytes.get(pos + 1) {
            Some(b'!' | b'?') => true,
            Some(b'/') => is_letter(2),
            Some(_) => is_letter(1),
            None => false,
        };
        if opens_markup && last_close.is_some_and(|close| close > pos) {
            continue;
        }
        let out = escaped.get_or_insert_with(|| String::with_capacity(html.len() + 8));
        out.push_str(&html[copied..pos]);
        out.push_str("&lt;");
        copied = pos + 1;
    }
    match escaped {
        Some(mut out) => {
            debug!("Escaping stray '<' in HTML body");
            out.push_str(&html[copied..]);
            Cow::Owned(out)
        },
        None => Cow::Borrowed(html),
    }
}

fn read_start(e: &BytesStart<'_>) -> Element {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let mut element = Element::new(tag);
    for attr in e.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&attr.value);
        element.attributes.push((key, unescape_html(&raw).into_owned()));
    }
    element
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.push_text(text);
    }
}

fn close_top(stack: &mut Vec<Element>) {
    if let Some(element) = stack.pop() {
        push_child(stack, Node::Element(element));
    }
}
