//! Formatted text with offset-tracked entities.
//!
//! [`FormattedText`] is the intermediate value both conversion directions
//! share: a UTF-16 text buffer plus the mention and markup entities attached
//! to it. Structural operations (`wrap`, `split`, `join`, `trim`) rebuild
//! the entity list alongside the text, and [`FormattedText::format`] is the
//! single place where a markup kind turns into decoration.

mod format;
mod text;
mod types;

pub use text::FormattedText;
pub use types::{Entity, EntityType, MarkupEntity, MarkupKind, MentionEntity};
