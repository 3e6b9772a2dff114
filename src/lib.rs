//! # exif-banner
//!
//! Batch photo stamper: reads each photo's EXIF, rewrites the copyright tags
//! on the owner's own photos, burns a darkened, blurred information banner
//! (copyright, camera and exposure, GPS location, capture time) into the
//! bottom edge, and saves the result as a `.jpg` in place of the original.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_banner::config::Config;
//! use exif_banner::pipeline::{self, CancellationToken};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let cancel = CancellationToken::default();
//!
//!     let files = vec![PathBuf::from("DSC_0042.tif"), PathBuf::from("DSC_0043.png")];
//!     let summary = pipeline::run(&files, &config, &cancel).await?;
//!     println!("{} stamped", summary.processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The banner text can be produced without touching any image:
//!
//! ```rust,no_run
//! use exif_banner::config::Config;
//! use exif_banner::exif::{load_exif, read_store};
//! use exif_banner::format::FieldFormatter;
//! use exif_banner::rewrite;
//! use std::path::Path;
//!
//! let config = Config::default();
//! let metadata = load_exif(Path::new("photo.jpg")).unwrap();
//! let mut store = read_store(&metadata);
//!
//! rewrite::apply(&mut store, &config.owner, 2025);
//! let lines = FieldFormatter::new(&store, &config.replacements, &config.owner, 2025)
//!     .display_lines();
//! println!("{}", lines.left_line2);
//! ```
//!
//! ## Modules
//!
//! - [`banner`]: Banner geometry, draw sequence and the raster canvas
//! - [`config`]: Configuration types and loading
//! - [`exif`]: EXIF tag store, reading and merging
//! - [`format`]: Metadata to banner text
//! - [`pipeline`]: Per-file processing and the batch driver
//! - [`rewrite`]: Copyright rewrite for the owner's photos

pub mod banner;
pub mod config;
pub mod exif;
pub mod format;
pub mod pipeline;
pub mod rewrite;
