//! Structural operations on formatted text.
//!
//! Every operation consumes or borrows its input and returns a new value;
//! entity offsets are recomputed as part of building that value, so no
//! caller ever observes a text whose entities point at stale positions.
use super::types::{Entity, MentionEntity};
use crate::common::utf16::{Utf16Text, expand, utf16_len};
use tracing::trace;

/// Text plus the entities attached to it.
///
/// Offsets and lengths of all entities are UTF-16 code units of `text`, and
/// `offset + length <= text.len()` holds for every entity.
///
/// # Examples
///
/// ```
/// use signal_formatter::entity::{EntityType, FormattedText};
/// use uuid::Uuid;
///
/// let uuid = Uuid::nil();
/// let mention = FormattedText::from("Alice").format(EntityType::UserMention { uuid });
/// let text = FormattedText::from("hi ")
///     .append(mention)
///     .format(EntityType::Bold);
///
/// assert_eq!(text.to_string_lossy(), "**hi Alice**");
/// let mention = text.mentions().next().unwrap();
/// assert_eq!((mention.offset, mention.length), (5, 5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText {
    text: Utf16Text,
    entities: Vec<Entity>,
}

impl FormattedText {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain text without entities.
    #[inline]
    pub fn from_units(text: Utf16Text) -> Self {
        Self {
            text,
            entities: Vec::new(),
        }
    }

    #[inline]
    pub fn text(&self) -> &Utf16Text {
        &self.text
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Length in UTF-16 code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mention entities in attachment order.
    pub fn mentions(&self) -> impl Iterator<Item = &MentionEntity> {
        self.entities.iter().filter_map(Entity::as_mention)
    }

    #[inline]
    pub fn into_parts(self) -> (Utf16Text, Vec<Entity>) {
        (self.text, self.entities)
    }

    /// Text for logs and assertions; see [`Utf16Text::to_string_lossy`].
    #[inline]
    pub fn to_string_lossy(&self) -> String {
        self.text.to_string_lossy()
    }

    /// Attach an entity. The entity must lie inside the text.
    pub fn push_entity(&mut self, entity: impl Into<Entity>) {
        let entity = entity.into();
        debug_assert!(
            entity.end() <= self.text.len(),
            "entity {entity:?} exceeds text length {}",
            self.text.len()
        );
        self.entities.push(entity);
    }

    /// Builder form of [`push_entity`](Self::push_entity).
    #[inline]
    pub fn with_entity(mut self, entity: impl Into<Entity>) -> Self {
        self.push_entity(entity);
        self
    }

    /// Concatenate `other` after `self`.
    pub fn append(mut self, other: FormattedText) -> Self {
        let shift = self.text.len();
        self.text.append(other.text);
        self.entities
            .extend(other.entities.into_iter().map(|entity| entity.shifted(shift)));
        self
    }

    pub fn append_str(mut self, suffix: &str) -> Self {
        self.text.push_str(suffix);
        self
    }

    /// Concatenate `other` before `self`.
    #[inline]
    pub fn prepend(self, other: FormattedText) -> Self {
        other.append(self)
    }

    #[inline]
    pub fn prepend_str(self, prefix: &str) -> Self {
        self.wrap(prefix, "")
    }

    /// Surround the text with `prefix` and `suffix`, shifting every entity
    /// by the length of `prefix`.
    pub fn wrap(self, prefix: &str, suffix: &str) -> Self {
        let mut text = Utf16Text::with_capacity(
            utf16_len(prefix) + self.text.len() + utf16_len(suffix),
        );
        text.push_str(prefix);
        let shift = text.len();
        text.append(self.text);
        text.push_str(suffix);

        let entities = self
            .entities
            .into_iter()
            .map(|entity| entity.shifted(shift))
            .collect();
        Self { text, entities }
    }

    /// Keep only the first `len` units, clipping entities that reach past
    /// the new end and dropping those that start beyond it.
    pub fn truncate(mut self, len: usize) -> Self {
        if len >= self.text.len() {
            return self;
        }
        self.text.truncate(len);
        self.entities = self
            .entities
            .into_iter()
            .filter(|entity| entity.offset() <= len)
            .map(|entity| {
                let length = entity.length().min(len - entity.offset());
                entity.with_range(entity.offset(), length)
            })
            .collect();
        self
    }

    /// Split on every exact occurrence of `separator`.
    ///
    /// An entity belongs to the segment it starts in and is clipped to that
    /// segment's end. An empty separator yields the text as its only part.
    pub fn split(&self, separator: &str) -> Vec<FormattedText> {
        let separator = expand(separator);
        if separator.is_empty() {
            return vec![self.clone()];
        }

        let units = self.text.as_units();
        let mut parts = Vec::new();
        let mut start = 0;
        loop {
            let end = self
                .text
                .find(separator.as_units(), start)
                .unwrap_or(units.len());

            let segment = Utf16Text::from_units(units[start..end].to_vec());
            let mut part = FormattedText::from_units(segment);
            for entity in &self.entities {
                let offset = entity.offset();
                let starts_here =
                    offset >= start && (offset < end || (offset == end && entity.length() == 0));
                if !starts_here {
                    continue;
                }
                let length = entity.length().min(end - offset);
                if length < entity.length() {
                    trace!(?entity, segment_end = end, "Clipping entity at separator");
                }
                part.entities.push(entity.with_range(offset - start, length));
            }
            parts.push(part);

            if end == units.len() {
                break;
            }
            start = end + separator.len();
        }
        parts
    }

    /// Concatenate `parts` with `separator` between each pair.
    pub fn join<I>(parts: I, separator: &str) -> FormattedText
    where
        I: IntoIterator<Item = FormattedText>,
    {
        let mut joined = FormattedText::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                joined.text.push_str(separator);
            }
            joined = joined.append(part);
        }
        joined
    }

    /// Strip leading and trailing whitespace.
    ///
    /// Entities inside the remainder keep their position relative to the
    /// text, entities overlapping a stripped region are clipped, and entities
    /// lying entirely in a stripped region are dropped.
    pub fn trim(self) -> Self {
        let bounds = self.text.trim_bounds();
        if bounds.start == 0 && bounds.end == self.text.len() {
            return self;
        }

        let text = Utf16Text::from_units(self.text.as_units()[bounds.clone()].to_vec());
        let entities = self
            .entities
            .into_iter()
            .filter_map(|entity| {
                let start = entity.offset().max(bounds.start);
                let end = entity.end().min(bounds.end);
                if start > end || (start == end && entity.length() > 0) {
                    return None;
                }
                Some(entity.with_range(start - bounds.start, end - start))
            })
            .collect();
        Self { text, entities }
    }
}

impl From<&str> for FormattedText {
    #[inline]
    fn from(text: &str) -> Self {
        Self::from_units(expand(text))
    }
}

impl From<String> for FormattedText {
    #[inline]
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}
