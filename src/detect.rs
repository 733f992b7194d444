//! Page stream format detection and loading.

use crate::error::{Error, Result};
use crate::model::{SourceDocument, SourcePage};
use std::fs;
use std::path::Path;

/// Layout of a decoded page stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A JSON object with `pages` and optional `metadata`
    Document,
    /// A bare JSON array of pages
    PageArray,
    /// One page object per line
    JsonLines,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Document => write!(f, "JSON document"),
            InputFormat::PageArray => write!(f, "JSON page array"),
            InputFormat::JsonLines => write!(f, "JSON Lines"),
        }
    }
}

/// Detect the format of a page stream.
///
/// # Returns
/// * `Ok(InputFormat)` if the text looks like one of the supported layouts
/// * `Err(Error::UnknownFormat)` otherwise
///
/// # Example
/// ```
/// use pagemark::detect::{detect_format, InputFormat};
///
/// let format = detect_format(r#"[{"number": 1}]"#).unwrap();
/// assert_eq!(format, InputFormat::PageArray);
/// ```
pub fn detect_format(text: &str) -> Result<InputFormat> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(InputFormat::PageArray);
    }
    if !trimmed.starts_with('{') {
        return Err(Error::UnknownFormat);
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) if value.get("pages").is_some() => Ok(InputFormat::Document),
        Ok(value) if value.is_object() => Ok(InputFormat::JsonLines),
        Ok(_) => Err(Error::UnknownFormat),
        Err(_) => {
            let all_objects = trimmed
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .all(|line| line.starts_with('{') && line.ends_with('}'));
            if all_objects {
                Ok(InputFormat::JsonLines)
            } else {
                Err(Error::UnknownFormat)
            }
        }
    }
}

/// Parse a page stream in any supported format.
pub fn load_document(text: &str) -> Result<SourceDocument> {
    let format = detect_format(text)?;
    log::debug!("detect: reading {}", format);

    let document = match format {
        InputFormat::Document => SourceDocument::from_json(text)?,
        InputFormat::PageArray => SourceDocument::new(serde_json::from_str(text)?),
        InputFormat::JsonLines => {
            let pages = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str::<SourcePage>)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            SourceDocument::new(pages)
        }
    };
    Ok(document)
}

/// Read and parse a page stream file.
///
/// # Example
/// ```no_run
/// use pagemark::detect::load_file;
///
/// let document = load_file("document.json").unwrap();
/// println!("Pages: {}", document.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    let text = fs::read_to_string(path)?;
    load_document(&text)
}

/// Check if a file holds a readable page stream.
pub fn is_page_stream<P: AsRef<Path>>(path: P) -> bool {
    fs::read_to_string(path)
        .map(|text| detect_format(&text).is_ok())
        .unwrap_or(false)
}
