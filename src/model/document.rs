//! Document-level metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata carried through from the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Producer application
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.producer.is_none()
            && self.created.is_none()
    }

    /// Convert metadata to YAML frontmatter, including the page count.
    pub fn to_yaml_frontmatter(&self, pages: u32) -> String {
        let mut lines = vec!["---".to_string()];

        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("subject", &self.subject),
            ("producer", &self.producer),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(format!("{}: \"{}\"", key, escape_yaml(value)));
            }
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        lines.push(format!("pages: {}", pages));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frontmatter() {
        let meta = Metadata {
            title: Some("Quarterly \"Report\"".to_string()),
            author: Some("Finance".to_string()),
            created: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };

        let yaml = meta.to_yaml_frontmatter(4);
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("title: \"Quarterly \\\"Report\\\"\""));
        assert!(yaml.contains("author: \"Finance\""));
        assert!(yaml.contains("created: 2024-03-01T12:00:00+00:00"));
        assert!(yaml.contains("pages: 4"));
        assert!(!yaml.contains("subject"));
        assert!(yaml.ends_with("---\n"));
    }

    #[test]
    fn test_is_empty() {
        assert!(Metadata::default().is_empty());
        assert!(!Metadata::with_title("x").is_empty());
    }
}
