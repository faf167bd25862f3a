//! Matrix HTML support.
//!
//! - [`dom`]: permissive fragment reader producing an element tree
//! - [`HtmlParser`]: element tree to [`FormattedText`](crate::entity::FormattedText)

pub mod dom;
mod parser;

pub use parser::HtmlParser;
