//! HTML escaping and character reference decoding.
//!
//! Escaping covers the five characters that are significant in element
//! content and quoted attribute values. Decoding understands decimal and
//! hexadecimal references plus the named references Matrix clients emit in
//! practice; anything else is left as written.
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use phf::phf_map;
use std::borrow::Cow;

// Static initialization: automaton is built only once, thread-safe
static HTML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build HTML escaper")
});

/// Longest reference name we try to decode, excluding `&` and `;`.
const MAX_REFERENCE_LEN: usize = 32;

/// Named character references.
static NAMED_REFERENCES: phf::Map<&'static str, char> = phf_map! {
    "amp" => '&',
    "lt" => '<',
    "gt" => '>',
    "quot" => '"',
    "apos" => '\'',
    "nbsp" => '\u{00A0}',
    "ensp" => '\u{2002}',
    "emsp" => '\u{2003}',
    "thinsp" => '\u{2009}',
    "zwnj" => '\u{200C}',
    "zwj" => '\u{200D}',
    "shy" => '\u{00AD}',
    "ndash" => '–',
    "mdash" => '—',
    "lsquo" => '‘',
    "rsquo" => '’',
    "ldquo" => '“',
    "rdquo" => '”',
    "laquo" => '«',
    "raquo" => '»',
    "hellip" => '…',
    "middot" => '·',
    "bull" => '•',
    "deg" => '°',
    "times" => '×',
    "divide" => '÷',
    "copy" => '©',
    "reg" => '®',
    "trade" => '™',
    "sect" => '§',
    "para" => '¶',
    "cent" => '¢',
    "pound" => '£',
    "yen" => '¥',
    "euro" => '€',
};

/// Escape HTML special characters.
///
/// Quotes are escaped as well, so the result is safe inside a quoted
/// attribute value.
///
/// # Examples
///
/// ```
/// use signal_formatter::common::escape::escape_html;
/// assert_eq!(escape_html("a & b"), "a &amp; b");
/// assert_eq!(escape_html("<b>\"hi\"</b>"), "&lt;b&gt;&quot;hi&quot;&lt;/b&gt;");
/// assert_eq!(escape_html("it's"), "it&#x27;s");
/// ```
#[inline]
pub fn escape_html(s: &str) -> String {
    HTML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;"])
}

/// Decode the body of a character reference (the part between `&` and `;`).
///
/// # Examples
///
/// ```
/// use signal_formatter::common::escape::decode_reference;
/// assert_eq!(decode_reference("amp"), Some('&'));
/// assert_eq!(decode_reference("#39"), Some('\''));
/// assert_eq!(decode_reference("#x1F600"), Some('😀'));
/// assert_eq!(decode_reference("bogus"), None);
/// ```
pub fn decode_reference(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    NAMED_REFERENCES.get(name).copied()
}

/// Replace every decodable character reference in `s`.
///
/// Unknown or unterminated references are kept verbatim.
///
/// # Examples
///
/// ```
/// use signal_formatter::common::escape::unescape_html;
/// assert_eq!(unescape_html("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_html("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_html("a & b"), "a & b");
/// assert_eq!(unescape_html("&invalid;"), "&invalid;");
/// ```
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= MAX_REFERENCE_LEN)
            .and_then(|end| decode_reference(&tail[..end]).map(|ch| (end, ch)));
        match decoded {
            Some((end, ch)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            },
            None => {
                out.push('&');
                rest = tail;
            },
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("hello 😀 world"), "hello 😀 world");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_reference("#65"), Some('A'));
        assert_eq!(decode_reference("#X41"), Some('A'));
        assert_eq!(decode_reference("#xD800"), None);
        assert_eq!(decode_reference("#"), None);
        assert_eq!(decode_reference("#xZZ"), None);
    }

    #[test]
    fn test_unescape_borrowed_without_ampersand() {
        assert!(matches!(unescape_html("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_unescape_mixed() {
        assert_eq!(unescape_html("&quot;x&quot;&nbsp;&#x1F44B;"), "\"x\"\u{a0}👋");
        assert_eq!(unescape_html("trailing &"), "trailing &");
        assert_eq!(unescape_html("&amp"), "&amp");
    }

    #[test]
    fn test_escape_then_unescape_restores_text() {
        let text = "<a href=\"x\">Tom & 'Jerry'</a>";
        assert_eq!(unescape_html(&escape_html(text)), text);
    }
}
