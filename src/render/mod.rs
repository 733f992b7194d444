//! Rendering of classified pages to Markdown and JSON.

mod json;
mod markdown;
mod options;
mod result;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownEmitter};
pub use options::{PageSelection, PageSeparator, RenderOptions, TableHeader};
pub use result::{EmissionStats, PageMarkdown, RenderResult};
