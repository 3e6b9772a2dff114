use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use std::path::Path;

use super::store::{MetadataStore, Rational, Tag, TagValue};

/// The `little_exif` variant for a vocabulary tag, with an empty payload.
/// Used both as a lookup key and for variant comparison.
pub(super) fn template(tag: Tag) -> ExifTag {
    match tag {
        Tag::Copyright => ExifTag::Copyright(String::new()),
        Tag::OwnerName => ExifTag::OwnerName(String::new()),
        Tag::Artist => ExifTag::Artist(String::new()),
        Tag::Software => ExifTag::Software(String::new()),
        Tag::HostComputer => ExifTag::HostComputer(String::new()),
        Tag::SerialNumber => ExifTag::SerialNumber(String::new()),
        Tag::LensSerialNumber => ExifTag::LensSerialNumber(String::new()),
        Tag::Make => ExifTag::Make(String::new()),
        Tag::Model => ExifTag::Model(String::new()),
        Tag::LensMake => ExifTag::LensMake(String::new()),
        Tag::LensModel => ExifTag::LensModel(String::new()),
        Tag::DateTimeOriginal => ExifTag::DateTimeOriginal(String::new()),
        Tag::GpsLatitude => ExifTag::GPSLatitude(Vec::new()),
        Tag::GpsLongitude => ExifTag::GPSLongitude(Vec::new()),
        Tag::FocalLength => ExifTag::FocalLength(Vec::new()),
        Tag::ExposureTime => ExifTag::ExposureTime(Vec::new()),
        Tag::ApertureValue => ExifTag::ApertureValue(Vec::new()),
        Tag::IsoSpeed => ExifTag::ISOSpeed(Vec::new()),
        Tag::RecommendedExposureIndex => ExifTag::RecommendedExposureIndex(Vec::new()),
    }
}

/// Load EXIF from an image file with little_exif.
/// Returns None when the file carries no EXIF or it can't be parsed.
pub fn load_exif(path: &Path) -> Option<Metadata> {
    let path_owned = path.to_path_buf();
    // Suppress panics from little_exif
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(move || Metadata::new_from_path(&path_owned));
    std::panic::set_hook(prev_hook);

    match result {
        Ok(Ok(m)) => Some(m),
        Ok(Err(e)) => {
            log::debug!("No EXIF read from {}: {e}", path.display());
            None
        }
        Err(_) => {
            log::debug!("little_exif panicked parsing EXIF in {}", path.display());
            None
        }
    }
}

/// Extract every vocabulary tag present in `metadata` into a [`MetadataStore`].
pub fn read_store(metadata: &Metadata) -> MetadataStore {
    MetadataStore::from_values(Tag::ALL.iter().filter_map(|&tag| {
        let entry = metadata.get_tag(&template(tag)).next()?;
        let value = entry_to_value(entry)?;
        Some((tag, value))
    }))
}

/// Convert a little_exif entry to a typed value.
fn entry_to_value(entry: &ExifTag) -> Option<TagValue> {
    match entry {
        ExifTag::Copyright(s)
        | ExifTag::OwnerName(s)
        | ExifTag::Artist(s)
        | ExifTag::Software(s)
        | ExifTag::HostComputer(s)
        | ExifTag::SerialNumber(s)
        | ExifTag::LensSerialNumber(s)
        | ExifTag::Make(s)
        | ExifTag::Model(s)
        | ExifTag::LensMake(s)
        | ExifTag::LensModel(s)
        | ExifTag::DateTimeOriginal(s) => Some(TagValue::Text(clean_text(s))),
        ExifTag::GPSLatitude(rats) | ExifTag::GPSLongitude(rats) if rats.len() >= 3 => {
            Some(TagValue::Triple([
                from_ur64(&rats[0]),
                from_ur64(&rats[1]),
                from_ur64(&rats[2]),
            ]))
        }
        ExifTag::FocalLength(rats) | ExifTag::ExposureTime(rats) | ExifTag::ApertureValue(rats) => {
            rats.first().map(|r| TagValue::Rational(from_ur64(r)))
        }
        ExifTag::ISOSpeed(v) | ExifTag::RecommendedExposureIndex(v) => {
            v.first().map(|&n| TagValue::Unsigned(n))
        }
        _ => None,
    }
}

/// Tidy an EXIF string: NUL-separated parts (Copyright may hold the
/// photographer and the editor) are joined with `", "`, trailing padding is
/// dropped and any other control characters are stripped.
fn clean_text(s: &str) -> String {
    s.split('\0')
        .map(|part| part.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn from_ur64(r: &uR64) -> Rational {
    Rational::new(i64::from(r.nominator), i64::from(r.denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ur64(nominator: u32, denominator: u32) -> uR64 {
        uR64 {
            nominator,
            denominator,
        }
    }

    #[test]
    fn empty_metadata_gives_empty_store() {
        let store = read_store(&Metadata::new());
        assert!(store.is_empty());
    }

    #[test]
    fn reads_text_tags() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::Make("Canon".into()));
        exif.set_tag(ExifTag::Model("Canon EOS R5".into()));
        exif.set_tag(ExifTag::Copyright("Jane Doe".into()));

        let store = read_store(&exif);
        assert_eq!(store.text(Tag::Make), Some("Canon"));
        assert_eq!(store.text(Tag::Model), Some("Canon EOS R5"));
        assert_eq!(store.text(Tag::Copyright), Some("Jane Doe"));
        assert!(store.text(Tag::LensModel).is_none());
    }

    #[test]
    fn strips_control_characters() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::Artist("Jane\0\0".into()));
        exif.set_tag(ExifTag::Software("v1\r\n".into()));

        let store = read_store(&exif);
        assert_eq!(store.text(Tag::Artist), Some("Jane"));
        assert_eq!(store.text(Tag::Software), Some("v1"));
    }

    #[test]
    fn nul_separated_parts_keep_a_gap() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::Copyright("Alice\0Bob\0".into()));

        let store = read_store(&exif);
        assert_eq!(store.text(Tag::Copyright), Some("Alice, Bob"));
    }

    #[test]
    fn clean_text_edge_cases() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\0\0\0"), "");
        assert_eq!(clean_text("Alice\0\0Bob"), "Alice, Bob");
        assert_eq!(clean_text("\0Bob"), "Bob");
        assert_eq!(clean_text("Al\x07ice"), "Alice");
    }

    #[test]
    fn reads_rationals_and_unsigned() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::ExposureTime(vec![ur64(1, 250)]));
        exif.set_tag(ExifTag::FocalLength(vec![ur64(50, 1)]));
        exif.set_tag(ExifTag::ISOSpeed(vec![400]));

        let store = read_store(&exif);
        assert_eq!(store.rational(Tag::ExposureTime), Some(Rational::new(1, 250)));
        assert_eq!(store.rational(Tag::FocalLength), Some(Rational::whole(50)));
        assert_eq!(store.unsigned(Tag::IsoSpeed), Some(400));
        assert!(store.unsigned(Tag::RecommendedExposureIndex).is_none());
    }

    #[test]
    fn reads_gps_triples() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::GPSLatitude(vec![ur64(45, 1), ur64(30, 1), ur64(1525, 100)]));

        let store = read_store(&exif);
        assert_eq!(
            store.triple(Tag::GpsLatitude),
            Some([Rational::whole(45), Rational::whole(30), Rational::new(1525, 100)])
        );
        assert!(store.triple(Tag::GpsLongitude).is_none());
    }

    #[test]
    fn short_gps_is_absent() {
        let mut exif = Metadata::new();
        exif.set_tag(ExifTag::GPSLongitude(vec![ur64(73, 1)]));
        assert!(read_store(&exif).triple(Tag::GpsLongitude).is_none());
    }

    #[test]
    fn load_exif_missing_file_is_none() {
        assert!(load_exif(Path::new("/nonexistent/photo.jpg")).is_none());
    }
}
