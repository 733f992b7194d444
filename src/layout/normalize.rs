//! Text normalization applied to every decoded run.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Normalizes decoded run text: Unicode NFC, ligature expansion, soft hyphen
/// and replacement character removal, whitespace collapsing.
///
/// Leading and trailing whitespace is collapsed but kept, so the extractor
/// can tell explicit word boundaries between runs.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    whitespace: Regex,
    ligatures: Vec<(char, &'static str)>,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").expect("whitespace pattern"),
            ligatures: vec![
                ('\u{FB00}', "ff"),
                ('\u{FB01}', "fi"),
                ('\u{FB02}', "fl"),
                ('\u{FB03}', "ffi"),
                ('\u{FB04}', "ffl"),
                ('\u{FB05}', "st"),
                ('\u{FB06}', "st"),
            ],
        }
    }

    /// Normalize one run of text.
    pub fn normalize(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for c in text.nfc() {
            match c {
                '\u{00AD}' | '\u{FFFD}' | '\u{200B}' | '\u{FEFF}' => {}
                c if c.is_control() && !c.is_whitespace() => {}
                c => match self.ligatures.iter().find(|(lig, _)| *lig == c) {
                    Some((_, expansion)) => result.push_str(expansion),
                    None => result.push(c),
                },
            }
        }

        self.whitespace.replace_all(&result, " ").into_owned()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words; Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK symbols and punctuation
        || (0x3000..=0x303F).contains(&code)
        // Halfwidth and fullwidth forms
        || (0xFF00..=0xFFEF).contains(&code)
}

/// Join two pieces of text with a space unless the boundary is between two
/// spaceless-script characters or either side already has whitespace.
pub fn join_words(left: &str, right: &str) -> String {
    let mut joined = String::with_capacity(left.len() + right.len() + 1);
    joined.push_str(left);
    if needs_space(left, right) {
        joined.push(' ');
    }
    joined.push_str(right);
    joined
}

pub(crate) fn needs_space(left: &str, right: &str) -> bool {
    let (Some(last), Some(first)) = (left.chars().last(), right.chars().next()) else {
        return false;
    };
    if last.is_whitespace() || first.is_whitespace() {
        return false;
    }
    !(is_spaceless_script_char(last) && is_spaceless_script_char(first))
}
