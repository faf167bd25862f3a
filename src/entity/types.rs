//! Entities attached to a [`FormattedText`](super::FormattedText).
use crate::types::Mention;
use uuid::Uuid;

/// A mention of a Signal account covering `length` units at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MentionEntity {
    pub uuid: Uuid,
    pub offset: usize,
    pub length: usize,
}

impl MentionEntity {
    /// The Signal mention this entity flattens to. Offsets are already
    /// UTF-16 code units, so no conversion is involved.
    #[inline]
    pub fn to_mention(&self) -> Mention {
        Mention::new(self.uuid, self.offset, self.length)
    }
}

/// Markup kinds that leave a trace in the produced text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    Bold,
    Italic,
    Strikethrough,
    Url,
    Preformatted,
    InlineCode,
    Blockquote,
    Header,
}

/// The span a markup kind produced, including its decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkupEntity {
    pub kind: MarkupKind,
    pub offset: usize,
    pub length: usize,
}

/// An annotation on a span of text, in UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Mention(MentionEntity),
    Markup(MarkupEntity),
}

impl Entity {
    #[inline]
    pub fn offset(&self) -> usize {
        match self {
            Entity::Mention(mention) => mention.offset,
            Entity::Markup(markup) => markup.offset,
        }
    }

    #[inline]
    pub fn length(&self) -> usize {
        match self {
            Entity::Mention(mention) => mention.length,
            Entity::Markup(markup) => markup.length,
        }
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset() + self.length()
    }

    #[inline]
    pub fn as_mention(&self) -> Option<&MentionEntity> {
        match self {
            Entity::Mention(mention) => Some(mention),
            Entity::Markup(_) => None,
        }
    }

    /// Same entity moved to a new range.
    pub(crate) fn with_range(self, offset: usize, length: usize) -> Self {
        match self {
            Entity::Mention(mention) => Entity::Mention(MentionEntity {
                offset,
                length,
                ..mention
            }),
            Entity::Markup(markup) => Entity::Markup(MarkupEntity {
                offset,
                length,
                ..markup
            }),
        }
    }

    /// Same entity moved `delta` units to the right.
    #[inline]
    pub(crate) fn shifted(self, delta: usize) -> Self {
        let length = self.length();
        self.with_range(self.offset() + delta, length)
    }
}

impl From<MentionEntity> for Entity {
    fn from(mention: MentionEntity) -> Self {
        Entity::Mention(mention)
    }
}

impl From<MarkupEntity> for Entity {
    fn from(markup: MarkupEntity) -> Self {
        Entity::Markup(markup)
    }
}

/// Every markup kind the HTML parser can apply, with its parameters.
///
/// Kinds Signal has no rendering for (underline, e-mail links, room pills,
/// colors, spoilers) are accepted and leave the text untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityType {
    UserMention { uuid: Uuid },
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Url { url: String },
    Email { address: String },
    RoomMention { alias: String },
    Preformatted { language: String },
    InlineCode,
    Blockquote,
    /// Header level; clamped to 1..=6 when applied
    Header { size: u8 },
    Color { color: String },
    Spoiler { reason: String },
}
