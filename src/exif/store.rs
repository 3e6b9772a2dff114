use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The EXIF tags this crate reads, rewrites, or renders into the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Copyright,
    OwnerName,
    Artist,
    Software,
    HostComputer,
    SerialNumber,
    LensSerialNumber,
    Make,
    Model,
    LensMake,
    LensModel,
    DateTimeOriginal,
    GpsLatitude,
    GpsLongitude,
    FocalLength,
    ExposureTime,
    ApertureValue,
    IsoSpeed,
    RecommendedExposureIndex,
}

impl Tag {
    /// Every tag in the vocabulary, in a stable order.
    pub const ALL: [Tag; 19] = [
        Tag::Copyright,
        Tag::OwnerName,
        Tag::Artist,
        Tag::Software,
        Tag::HostComputer,
        Tag::SerialNumber,
        Tag::LensSerialNumber,
        Tag::Make,
        Tag::Model,
        Tag::LensMake,
        Tag::LensModel,
        Tag::DateTimeOriginal,
        Tag::GpsLatitude,
        Tag::GpsLongitude,
        Tag::FocalLength,
        Tag::ExposureTime,
        Tag::ApertureValue,
        Tag::IsoSpeed,
        Tag::RecommendedExposureIndex,
    ];
}

/// A numerator/denominator pair as stored in EXIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self { numerator, denominator }
    }

    pub const fn whole(value: i64) -> Self {
        Self::new(value, 1)
    }

    /// Floating value. A zero denominator yields NaN or an infinity.
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Fraction form, as cameras write it: `1/250`, `2`, `0`. Never simplified.
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else if self.numerator == 0 && self.denominator != 0 {
            f.write_str("0")
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// A typed tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Unsigned(u32),
    Rational(Rational),
    /// Degrees, minutes, seconds.
    Triple([Rational; 3]),
}

/// Partial, typed view of an image's EXIF tags.
///
/// Lookups never fail: a missing tag, or a tag holding a value of another
/// kind than the accessor asks for, is reported as `None`.
///
/// The store remembers which tags were set or removed after it was built so
/// the writer can merge exactly those changes back over the source EXIF.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    values: BTreeMap<Tag, TagValue>,
    changed: BTreeSet<Tag>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from values read off a file. Nothing is marked changed.
    pub fn from_values(values: impl IntoIterator<Item = (Tag, TagValue)>) -> Self {
        Self {
            values: values.into_iter().collect(),
            changed: BTreeSet::new(),
        }
    }

    pub fn get(&self, tag: Tag) -> Option<&TagValue> {
        self.values.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.values.contains_key(&tag)
    }

    pub fn text(&self, tag: Tag) -> Option<&str> {
        match self.values.get(&tag)? {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn unsigned(&self, tag: Tag) -> Option<u32> {
        match self.values.get(&tag)? {
            TagValue::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn rational(&self, tag: Tag) -> Option<Rational> {
        match self.values.get(&tag)? {
            TagValue::Rational(r) => Some(*r),
            _ => None,
        }
    }

    pub fn triple(&self, tag: Tag) -> Option<[Rational; 3]> {
        match self.values.get(&tag)? {
            TagValue::Triple(t) => Some(*t),
            _ => None,
        }
    }

    pub fn set(&mut self, tag: Tag, value: TagValue) {
        self.values.insert(tag, value);
        self.changed.insert(tag);
    }

    pub fn set_text(&mut self, tag: Tag, value: impl Into<String>) {
        self.set(tag, TagValue::Text(value.into()));
    }

    /// Remove a tag. Returns the previous value, if any.
    pub fn remove(&mut self, tag: Tag) -> Option<TagValue> {
        self.changed.insert(tag);
        self.values.remove(&tag)
    }

    /// Tags set or removed since the store was built.
    pub fn changed_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.changed.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
