use anyhow::Result;
use img_parts::Bytes;
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use std::mem::discriminant;

use super::reader::template;
use super::store::{MetadataStore, Rational, Tag, TagValue};

/// Build the EXIF block for the output file.
///
/// Starts from the source EXIF (if any), drops IFD pointers and thumbnail/strip
/// layout tags (little_exif regenerates those), drops every tag the store
/// changed, then writes the store's current value for each changed tag that is
/// still present. Tags the store never touched pass through as read.
pub fn merge_store(source: Option<&Metadata>, store: &MetadataStore) -> Metadata {
    let mut out = Metadata::new();

    let changed: Vec<ExifTag> = store.changed_tags().map(template).collect();

    if let Some(source) = source {
        for tag in source {
            if is_layout_tag(tag) {
                continue;
            }
            if changed.iter().any(|c| discriminant(c) == discriminant(tag)) {
                continue;
            }
            out.set_tag(tag.clone());
        }
    }

    for tag in store.changed_tags() {
        let Some(value) = store.get(tag) else {
            continue;
        };
        match to_exif_tag(tag, value) {
            Some(entry) => out.set_tag(entry),
            None => log::warn!("Cannot encode {tag:?} value {value:?} as EXIF, dropped"),
        }
    }

    out
}

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data
const JPEG_EXIF_OVERHEAD: usize = 10;

/// Serialize `metadata` as the TIFF payload of a JPEG EXIF segment.
///
/// Returns None for metadata without tags. The payload is spliced into the
/// encoded JPEG in memory; little_exif never touches the output file.
pub fn encode_exif(metadata: &Metadata) -> Result<Option<Bytes>> {
    if metadata.into_iter().next().is_none() {
        return Ok(None);
    }

    let app1 = metadata
        .as_u8_vec(FileExtension::JPEG)
        .map_err(|e| anyhow::anyhow!("Failed to encode EXIF: {e:?}"))?;
    if app1.len() <= JPEG_EXIF_OVERHEAD {
        return Ok(None);
    }
    Ok(Some(Bytes::copy_from_slice(&app1[JPEG_EXIF_OVERHEAD..])))
}

fn is_layout_tag(tag: &ExifTag) -> bool {
    matches!(
        tag,
        ExifTag::ExifOffset(_)
            | ExifTag::GPSInfo(_)
            | ExifTag::InteropOffset(_)
            | ExifTag::ThumbnailOffset(..)
            | ExifTag::ThumbnailLength(_)
            | ExifTag::StripOffsets(..)
            | ExifTag::StripByteCounts(_)
    )
}

/// Convert a typed value back into the little_exif variant for `tag`.
/// Returns None when the value kind doesn't fit the tag.
fn to_exif_tag(tag: Tag, value: &TagValue) -> Option<ExifTag> {
    let entry = match (tag, value) {
        (Tag::Copyright, TagValue::Text(s)) => ExifTag::Copyright(s.clone()),
        (Tag::OwnerName, TagValue::Text(s)) => ExifTag::OwnerName(s.clone()),
        (Tag::Artist, TagValue::Text(s)) => ExifTag::Artist(s.clone()),
        (Tag::Software, TagValue::Text(s)) => ExifTag::Software(s.clone()),
        (Tag::HostComputer, TagValue::Text(s)) => ExifTag::HostComputer(s.clone()),
        (Tag::SerialNumber, TagValue::Text(s)) => ExifTag::SerialNumber(s.clone()),
        (Tag::LensSerialNumber, TagValue::Text(s)) => ExifTag::LensSerialNumber(s.clone()),
        (Tag::Make, TagValue::Text(s)) => ExifTag::Make(s.clone()),
        (Tag::Model, TagValue::Text(s)) => ExifTag::Model(s.clone()),
        (Tag::LensMake, TagValue::Text(s)) => ExifTag::LensMake(s.clone()),
        (Tag::LensModel, TagValue::Text(s)) => ExifTag::LensModel(s.clone()),
        (Tag::DateTimeOriginal, TagValue::Text(s)) => ExifTag::DateTimeOriginal(s.clone()),
        (Tag::GpsLatitude, TagValue::Triple(t)) => ExifTag::GPSLatitude(to_ur64_vec(t)?),
        (Tag::GpsLongitude, TagValue::Triple(t)) => ExifTag::GPSLongitude(to_ur64_vec(t)?),
        (Tag::FocalLength, TagValue::Rational(r)) => ExifTag::FocalLength(vec![to_ur64(r)?]),
        (Tag::ExposureTime, TagValue::Rational(r)) => ExifTag::ExposureTime(vec![to_ur64(r)?]),
        (Tag::ApertureValue, TagValue::Rational(r)) => ExifTag::ApertureValue(vec![to_ur64(r)?]),
        (Tag::IsoSpeed, TagValue::Unsigned(n)) => ExifTag::ISOSpeed(vec![*n]),
        (Tag::RecommendedExposureIndex, TagValue::Unsigned(n)) => {
            ExifTag::RecommendedExposureIndex(vec![*n])
        }
        _ => return None,
    };
    Some(entry)
}

fn to_ur64(r: &Rational) -> Option<uR64> {
    Some(uR64 {
        nominator: u32::try_from(r.numerator).ok()?,
        denominator: u32::try_from(r.denominator).ok()?,
    })
}

fn to_ur64_vec(t: &[Rational; 3]) -> Option<Vec<uR64>> {
    t.iter().map(to_ur64).collect()
}
