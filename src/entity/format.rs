//! Applying markup kinds to formatted text.
//!
//! Signal has no rich text besides mentions, so markup is rendered as the
//! markdown-like decoration Signal users type by hand. Offsets compose
//! bottom-up: each level wraps text whose entities are already correct.
use super::text::FormattedText;
use super::types::{EntityType, MarkupEntity, MarkupKind, MentionEntity};
use std::borrow::Cow;

impl FormattedText {
    /// Apply one markup kind to the whole text.
    ///
    /// | Kind | Effect |
    /// |---|---|
    /// | `UserMention` | mention entity over the whole text |
    /// | `Bold` / `Italic` / `Strikethrough` | wrap with `**` / `_` / `~~` |
    /// | `Url` | append ` (url)` unless the text already is the url |
    /// | `Preformatted` | fenced block with the language tag |
    /// | `InlineCode` | wrap with backticks |
    /// | `Blockquote` | `> ` before every line |
    /// | `Header` | `#` per level and a space |
    /// | others | unchanged |
    pub fn format(self, entity_type: EntityType) -> FormattedText {
        let (kind, prefix, suffix): (MarkupKind, Cow<'static, str>, Cow<'static, str>) =
            match entity_type {
                EntityType::UserMention { uuid } => {
                    let length = self.len();
                    return self.with_entity(MentionEntity {
                        uuid,
                        offset: 0,
                        length,
                    });
                },
                EntityType::Bold => (MarkupKind::Bold, "**".into(), "**".into()),
                EntityType::Italic => (MarkupKind::Italic, "_".into(), "_".into()),
                EntityType::Strikethrough => (MarkupKind::Strikethrough, "~~".into(), "~~".into()),
                EntityType::Url { url } => {
                    if self.text().eq_str(&url) {
                        return self;
                    }
                    (MarkupKind::Url, "".into(), format!(" ({url})").into())
                },
                EntityType::Preformatted { language } => (
                    MarkupKind::Preformatted,
                    format!("```{language}\n").into(),
                    "\n```".into(),
                ),
                EntityType::InlineCode => (MarkupKind::InlineCode, "`".into(), "`".into()),
                EntityType::Blockquote => {
                    let lines = self
                        .trim()
                        .split("\n")
                        .into_iter()
                        .map(|line| line.prepend_str("> "));
                    return FormattedText::join(lines, "\n").with_markup(MarkupKind::Blockquote);
                },
                EntityType::Header { size } => {
                    let level = usize::from(size.clamp(1, 6));
                    (MarkupKind::Header, format!("{} ", "#".repeat(level)).into(), "".into())
                },
                EntityType::Underline
                | EntityType::Email { .. }
                | EntityType::RoomMention { .. }
                | EntityType::Color { .. }
                | EntityType::Spoiler { .. } => return self,
            };

        self.wrap(&prefix, &suffix).with_markup(kind)
    }

    /// Record that `kind` produced the whole current text.
    fn with_markup(self, kind: MarkupKind) -> FormattedText {
        let length = self.len();
        self.with_entity(MarkupEntity {
            kind,
            offset: 0,
            length,
        })
    }
}
