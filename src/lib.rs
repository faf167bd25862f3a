//! Signal Formatter - rich text conversion between Signal and Matrix messages
//!
//! Signal messages are a plain body plus mention spans addressed in UTF-16
//! code units. Matrix messages carry a plain body and, optionally, an HTML
//! body with user pills and markup. This crate converts in both directions
//! while keeping every mention offset exact, including around characters
//! outside the Basic Multilingual Plane.
//!
//! # Features
//!
//! - **UTF-16 offset model**: text is expanded to code units before any
//!   offset arithmetic and collapsed back afterwards
//! - **Offset-safe entity tree**: wrap, split, join and trim shift mention
//!   entities together with the text
//! - **Permissive HTML reader**: void tags, stray closing tags and character
//!   references handled without failing the message
//! - **Pluggable directory**: puppet and user lookups behind an async trait
//!
//! # Example - Building formatted text
//!
//! ```
//! use signal_formatter::entity::{EntityType, FormattedText};
//! use uuid::Uuid;
//!
//! let uuid = Uuid::nil();
//! let text = FormattedText::from("ping ")
//!     .append(FormattedText::from("Alice").format(EntityType::UserMention { uuid }))
//!     .format(EntityType::Italic)
//!     .format(EntityType::Blockquote);
//!
//! assert_eq!(text.to_string_lossy(), "> _ping Alice_");
//! let mention = text.mentions().next().unwrap();
//! assert_eq!((mention.offset, mention.length), (8, 5));
//! ```
//!
//! # Example - Converting messages
//!
//! ```no_run
//! use signal_formatter::{Directory, Formatter, RichContent};
//!
//! # async fn demo(directory: impl Directory) -> signal_formatter::Result<()> {
//! let formatter = Formatter::new(directory);
//! let content = RichContent::html("hello **world**", "hello <b>world</b>");
//! let (body, mentions) = formatter.matrix_to_signal(&content).await?;
//! assert_eq!(body, "hello **world**");
//! assert!(mentions.is_empty());
//! # Ok(())
//! # }
//! ```

/// Shared building blocks: errors, UTF-16 text and HTML escaping
pub mod common;

/// Formatter options
pub mod config;

/// Signal/Matrix conversion entry points
pub mod convert;

/// User and puppet lookups
pub mod directory;

/// Formatted text and its entities
pub mod entity;

/// Matrix HTML reading
pub mod html;

/// Message types at the crate boundary
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use config::FormatterOptions;
pub use convert::Formatter;
pub use directory::{Directory, Puppet};
pub use entity::FormattedText;
pub use types::{Format, Mention, MessageData, MessageType, RichContent, UserId};
