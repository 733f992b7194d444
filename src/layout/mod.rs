//! Layout extraction.
//!
//! Groups a page's positioned objects into line bands, orders them for
//! reading, and merges adjacent text runs into blocks.

mod extractor;
mod normalize;
mod options;

pub use extractor::{LayoutExtractor, PageBlocks};
pub use normalize::{is_spaceless_script_char, join_words, TextNormalizer};
pub(crate) use normalize::needs_space;
pub use options::ExtractOptions;
