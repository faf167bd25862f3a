//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors from
//! the parsing stack into the unified Error type.

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Markup(err.to_string())
    }
}
