//! List marker recognition.

use regex::Regex;
use std::sync::OnceLock;

/// Glyphs recognized as bullet markers.
pub const BULLET_GLYPHS: &[char] = &[
    '-', '–', '—', '•', '·', '*', '○', '▪', '◦', '▸', '▹', '►', '■', '●', '※', '□', '◆', '◇',
    '▶', '▷', '☞', '➤', '➜',
];

/// Kind of a leading list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Decimal numeral followed by `.` or `)`
    Numeral {
        /// Parsed number
        number: u64,
        /// `.` or `)`
        delimiter: char,
    },
    /// Bullet glyph
    Bullet(char),
}

/// A list marker found at the start of a line, with the text after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'a> {
    /// Marker kind
    pub kind: MarkerKind,
    /// Text after the marker, trimmed
    pub content: &'a str,
}

impl ListMarker<'_> {
    /// Check if nothing follows the marker.
    pub fn is_bare(&self) -> bool {
        self.content.is_empty()
    }
}

fn numeral_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{1,9})([.)])(?:\s+(.*))?$").expect("numeral marker pattern")
    })
}

/// Dashes and asterisks only count as bullets when followed by whitespace.
fn needs_separator(c: char) -> bool {
    matches!(c, '-' | '–' | '—' | '*' | '·')
}

/// Parse a leading list marker from `text`.
pub fn parse_marker(text: &str) -> Option<ListMarker<'_>> {
    let text = text.trim();
    let first = text.chars().next()?;

    if first.is_ascii_digit() {
        let caps = numeral_pattern().captures(text)?;
        let number = caps.get(1)?.as_str().parse::<u64>().ok()?;
        let delimiter = caps.get(2)?.as_str().chars().next()?;
        let content = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");
        return Some(ListMarker {
            kind: MarkerKind::Numeral { number, delimiter },
            content,
        });
    }

    if BULLET_GLYPHS.contains(&first) {
        let rest = &text[first.len_utf8()..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some(ListMarker {
                kind: MarkerKind::Bullet(first),
                content: rest.trim(),
            });
        }
        if !needs_separator(first) && !rest.starts_with(|c: char| BULLET_GLYPHS.contains(&c)) {
            return Some(ListMarker {
                kind: MarkerKind::Bullet(first),
                content: rest.trim(),
            });
        }
    }

    None
}

/// Check if text is a list marker and nothing else (`1.`, `•`, `-`).
pub fn is_bare_marker(text: &str) -> bool {
    parse_marker(text).is_some_and(|m| m.is_bare())
}

/// Check if text is a lone bullet glyph.
pub fn is_bullet_marker(text: &str) -> bool {
    parse_marker(text).is_some_and(|m| m.is_bare() && matches!(m.kind, MarkerKind::Bullet(_)))
}

/// Check if text is a lone numeral marker (`1.`, `12)`).
pub fn is_number_marker(text: &str) -> bool {
    parse_marker(text)
        .is_some_and(|m| m.is_bare() && matches!(m.kind, MarkerKind::Numeral { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeral_markers() {
        let m = parse_marker("12. Twelfth item").unwrap();
        assert_eq!(
            m.kind,
            MarkerKind::Numeral {
                number: 12,
                delimiter: '.'
            }
        );
        assert_eq!(m.content, "Twelfth item");

        let m = parse_marker("3) Third").unwrap();
        assert_eq!(
            m.kind,
            MarkerKind::Numeral {
                number: 3,
                delimiter: ')'
            }
        );

        assert!(parse_marker("3.14 is pi").is_none());
        assert!(parse_marker("2024 was a year").is_none());
        assert!(parse_marker("1)text").is_none());
    }

    #[test]
    fn test_bullet_markers() {
        let m = parse_marker("• Apples").unwrap();
        assert_eq!(m.kind, MarkerKind::Bullet('•'));
        assert_eq!(m.content, "Apples");

        let m = parse_marker("●Pears").unwrap();
        assert_eq!(m.content, "Pears");

        let m = parse_marker("- Plums").unwrap();
        assert_eq!(m.kind, MarkerKind::Bullet('-'));

        assert!(parse_marker("-5 degrees").is_none());
        assert!(parse_marker("*emphasis*").is_none());
        assert!(parse_marker("Plain text").is_none());
        assert!(parse_marker("").is_none());
    }

    #[test]
    fn test_bare_markers() {
        assert!(is_bare_marker("1."));
        assert!(is_bare_marker(" 12) "));
        assert!(is_bare_marker("•"));
        assert!(is_bare_marker("-"));
        assert!(!is_bare_marker("1. Item"));
        assert!(!is_bare_marker("Name"));

        assert!(is_bullet_marker("–"));
        assert!(!is_bullet_marker("1."));
        assert!(is_number_marker("7)"));
        assert!(!is_number_marker("•"));
    }
}
