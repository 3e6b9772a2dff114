use ab_glyph::FontVec;
use anyhow::{Context, Result};
use chrono::Datelike;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use img_parts::jpeg::{Jpeg, JpegSegment, markers};
use img_parts::{Bytes, DynImage, ImageEXIF, ImageICC};
use little_exif::metadata::Metadata;
use std::fmt;
use std::fs::FileTimes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::banner::raster::RasterCanvas;
use crate::banner::{self, BannerSpec, DisplayLines};
use crate::config::{BannerConfig, Config};
use crate::exif::{self, MetadataStore};
use crate::format::FieldFormatter;
use crate::rewrite;

/// Shared flag checked between files; set it to stop the batch.
pub type CancellationToken = Arc<AtomicBool>;

/// Checks if the cancellation token has been triggered.
#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// Returned by [`run`] when there is nothing to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageError;

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no filenames specified")
    }
}

impl std::error::Error for UsageError {}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    /// Only non-zero with `output.continue_on_error`.
    pub failed: usize,
    /// The token fired before every file was handled.
    pub cancelled: bool,
}

/// Where the output for `path` is written: same directory and stem, `.jpg`.
pub fn output_path(path: &Path) -> PathBuf {
    path.with_extension("jpg")
}

/// Process every file in order.
///
/// Fails with [`UsageError`] on an empty list before touching the
/// filesystem. The banner font is resolved once, before the first file; a
/// missing font aborts the run with every input left in place.
///
/// # Example
///
/// ```rust,no_run
/// use exif_banner::config::Config;
/// use exif_banner::pipeline::{self, CancellationToken};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load(None)?;
/// let cancel = CancellationToken::default();
/// let summary = pipeline::run(&[PathBuf::from("IMG_0001.tif")], &config, &cancel).await?;
/// println!("{} file(s) stamped", summary.processed);
/// # Ok(())
/// # }
/// ```
pub async fn run(
    files: &[PathBuf],
    config: &Config,
    cancel: &CancellationToken,
) -> Result<BatchSummary> {
    if files.is_empty() {
        return Err(UsageError.into());
    }

    let font = banner::font::resolve_font(&config.banner)?;
    run_with_font(files, config, Arc::new(font), cancel).await
}

/// [`run`] with the banner font already parsed.
pub async fn run_with_font(
    files: &[PathBuf],
    config: &Config,
    font: Arc<FontVec>,
    cancel: &CancellationToken,
) -> Result<BatchSummary> {
    if files.is_empty() {
        return Err(UsageError.into());
    }

    let year = chrono::Local::now().year();
    let mut summary = BatchSummary::default();

    for (i, path) in files.iter().enumerate() {
        if is_cancelled(cancel) {
            log::warn!("Cancelled, {} file(s) left unprocessed", files.len() - i);
            summary.cancelled = true;
            break;
        }

        match process_image(path, config, Arc::clone(&font), year).await {
            Ok(_) => summary.processed += 1,
            Err(e) if config.output.continue_on_error => {
                log::error!("{}: {e:#}", path.display());
                summary.failed += 1;
            }
            Err(e) => return Err(e.context(format!("Failed to process {}", path.display()))),
        }
    }

    log::info!(
        "{} processed, {} failed{}",
        summary.processed,
        summary.failed,
        if summary.cancelled { ", cancelled" } else { "" }
    );
    Ok(summary)
}

/// Stamp one photo and replace it with a `.jpg` next to it.
///
/// 1. **Read**: decode the first frame and load its EXIF, ICC profile and,
///    for JPEG sources, the XMP/IPTC segments
/// 2. **Rewrite**: apply the copyright rule to the metadata
/// 3. **Render**: draw the banner and encode a JPEG carrying the merged
///    EXIF, the original ICC profile and the carried segments
/// 4. **Replace**: write the output, carry over the source timestamps and
///    delete the source
///
/// Progress goes to stdout. Returns the output path.
pub async fn process_image(
    path: &Path,
    config: &Config,
    font: Arc<FontVec>,
    year: i32,
) -> Result<PathBuf> {
    println!("processing {}", path.display());

    let times = source_times(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let source = path.to_path_buf();
    let Decoded {
        mut image,
        exif: source_exif,
        icc,
        carried,
    } = tokio::task::spawn_blocking(move || decode(&source, bytes))
        .await
        .context("Decode task failed")??;
    println!("  {} x {}", image.width(), image.height());

    let mut store = source_exif
        .as_ref()
        .map_or_else(MetadataStore::new, exif::read_store);
    rewrite::apply(&mut store, &config.owner, year);
    let lines =
        FieldFormatter::new(&store, &config.replacements, &config.owner, year).display_lines();
    for (slot, text) in lines.visible() {
        println!("  {} {text}", slot.label());
    }

    let banner_config = config.banner.clone();
    let quality = config.output.quality;
    let encoded = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        draw_banner(&mut image, &lines, &font, &banner_config);
        let payload = exif::encode_exif(&exif::merge_store(source_exif.as_ref(), &store))?;
        encode_jpeg(&image, quality, payload, icc, carried)
    })
    .await
    .context("Render task failed")??;

    let output = output_path(path);
    tokio::fs::write(&output, &encoded)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    apply_times(&output, times)?;

    println!("   Done!");

    if is_same_file(path, &output) {
        log::debug!("Output replaced {} in place", path.display());
    } else {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))?;
    }

    Ok(output)
}

struct Decoded {
    image: RgbImage,
    exif: Option<Metadata>,
    icc: Option<Bytes>,
    carried: Vec<JpegSegment>,
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<Decoded> {
    let icc = icc_profile(&bytes);
    let carried = carried_segments(&bytes);
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgb8();
    let exif = exif::load_exif(path);

    Ok(Decoded {
        image,
        exif,
        icc,
        carried,
    })
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Whether a source APPn segment is copied into the output as-is.
///
/// EXIF and ICC are rebuilt separately. JFIF (APP0) and Adobe (APP14)
/// describe the source encoding and APP2 also holds MPF offsets, so none of
/// those carry over. XMP (APP1) and IPTC (APP13) do.
fn is_carried_segment(segment: &JpegSegment) -> bool {
    match segment.marker() {
        markers::APP1 => !segment.contents().starts_with(EXIF_HEADER),
        markers::APP0 | markers::APP2 | markers::APP14 => false,
        marker => (markers::APP3..=markers::APP15).contains(&marker),
    }
}

/// APPn segments of a JPEG source that the output keeps verbatim.
fn carried_segments(bytes: &[u8]) -> Vec<JpegSegment> {
    let Ok(jpeg) = Jpeg::from_bytes(Bytes::copy_from_slice(bytes)) else {
        return Vec::new();
    };
    jpeg.segments()
        .iter()
        .filter(|segment| is_carried_segment(segment))
        .cloned()
        .collect()
}

/// ICC profile of a JPEG, PNG or WebP container.
fn icc_profile(bytes: &[u8]) -> Option<Bytes> {
    match DynImage::from_bytes(Bytes::copy_from_slice(bytes)) {
        Ok(Some(container)) => container.icc_profile(),
        Ok(None) => None,
        Err(e) => {
            log::debug!("Could not read ICC profile: {e}");
            None
        }
    }
}

fn draw_banner(image: &mut RgbImage, lines: &DisplayLines, font: &FontVec, config: &BannerConfig) {
    let Some(spec) = BannerSpec::for_height(image.height()) else {
        log::warn!("  Image too small for a banner, saving it unstamped");
        return;
    };
    let mut canvas = RasterCanvas::new(image, font);
    banner::compose(&mut canvas, &spec, lines, config);
}

/// Encode `image` as a JPEG and splice in the EXIF payload, the ICC profile
/// and the carried source segments.
fn encode_jpeg(
    image: &RgbImage,
    quality: u8,
    exif: Option<Bytes>,
    icc: Option<Bytes>,
    carried: Vec<JpegSegment>,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(image)
        .context("Failed to encode JPEG")?;

    if exif.is_none() && icc.is_none() && carried.is_empty() {
        return Ok(buf);
    }

    let mut jpeg = Jpeg::from_bytes(Bytes::from(buf))
        .map_err(|e| anyhow::anyhow!("Failed to parse encoded JPEG: {e}"))?;
    if icc.is_some() {
        jpeg.set_icc_profile(icc);
    }
    if exif.is_some() {
        jpeg.set_exif(exif);
    }
    jpeg.segments_mut().extend(carried);
    // img-parts inserts new segments after the quantization tables and the
    // carried ones sit after the scan; APPn segments belong right after SOI,
    // in their original order.
    jpeg.segments_mut()
        .sort_by_key(|segment| !(0xE0..=0xEF).contains(&segment.marker()));

    Ok(jpeg.encoder().bytes().to_vec())
}

fn source_times(path: &Path) -> Result<FileTimes> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(created) = meta.created() {
        times = with_created(times, created);
    }
    Ok(times)
}

#[cfg(windows)]
fn with_created(times: FileTimes, created: SystemTime) -> FileTimes {
    use std::os::windows::fs::FileTimesExt;
    times.set_created(created)
}

#[cfg(target_os = "macos")]
fn with_created(times: FileTimes, created: SystemTime) -> FileTimes {
    use std::os::macos::fs::FileTimesExt;
    times.set_created(created)
}

// Creation time can't be set here; the modification time still carries over.
#[cfg(not(any(windows, target_os = "macos")))]
fn with_created(times: FileTimes, _created: SystemTime) -> FileTimes {
    times
}

fn apply_times(path: &Path, times: FileTimes) -> Result<()> {
    std::fs::File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_times(times))
        .with_context(|| format!("Failed to set timestamps on {}", path.display()))
}

/// Whether two existing paths name the same file, so `a.JPG` and `a.jpg`
/// match on case-insensitive filesystems.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    if a == b {
        return true;
    }
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
