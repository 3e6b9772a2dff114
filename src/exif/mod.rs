//! EXIF metadata reading and writing.
//!
//! - [`load_exif`] / [`read_store`]: Load a file's EXIF and extract the tags
//!   the banner and the copyright rewrite care about into a [`MetadataStore`]
//! - [`merge_store`] / [`encode_exif`]: Merge the store's changes back over
//!   the source EXIF and serialize the result for the output JPEG

mod reader;
mod store;
mod writer;

pub use reader::{load_exif, read_store};
pub use store::{MetadataStore, Rational, Tag, TagValue};
pub use writer::{encode_exif, merge_store};
