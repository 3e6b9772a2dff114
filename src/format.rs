//! Banner text derived from image metadata.
//!
//! Every function here is total: a missing tag never fails, it just shortens
//! or empties the resulting line. All "absent → empty string" decisions live
//! in this module.

use regex::Regex;
use std::sync::LazyLock;

use crate::banner::DisplayLines;
use crate::config::{OwnerConfig, Replacements};
use crate::exif::{MetadataStore, Rational, Tag};

/// EXIF `DateTimeOriginal` layout: `YYYY:MM:DD HH:MM:SS`.
static EXIF_DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<yyyy>\d{4}):(?<mm>\d{2}):(?<dd>\d{2}) (?<t>\d{2}:\d{2}:\d{2})$")
        .expect("date regex should compile")
});

/// Formats the four banner lines from a (post-rewrite) metadata store.
#[derive(Debug, Clone, Copy)]
pub struct FieldFormatter<'a> {
    store: &'a MetadataStore,
    replacements: &'a Replacements,
    owner: &'a OwnerConfig,
    year: i32,
}

impl<'a> FieldFormatter<'a> {
    /// `year` is used for the synthesized copyright line.
    pub fn new(
        store: &'a MetadataStore,
        replacements: &'a Replacements,
        owner: &'a OwnerConfig,
        year: i32,
    ) -> Self {
        Self {
            store,
            replacements,
            owner,
            year,
        }
    }

    pub fn display_lines(&self) -> DisplayLines {
        DisplayLines {
            left_line1: self.copyright(),
            left_line2: self.camera_line(),
            right_line1: self.location(),
            right_line2: self.date_time(),
        }
    }

    /// The Copyright tag as-is, or a generated `Copyright {year} {owner}`.
    pub fn copyright(&self) -> String {
        match self.store.text(Tag::Copyright) {
            Some(copyright) => copyright.to_string(),
            None => format!("Copyright {} {}", self.year, self.owner.full_name),
        }
    }

    /// `{camera} + {lens}`, or whichever of the two is known.
    pub fn camera_and_lens(&self) -> String {
        let camera = self.display_name(Tag::Make, Tag::Model);
        let lens = self.display_name(Tag::LensMake, Tag::LensModel);

        match (camera, lens) {
            (Some(camera), Some(lens)) => format!("{camera} + {lens}"),
            (Some(name), None) | (None, Some(name)) => name,
            (None, None) => String::new(),
        }
    }

    /// Focal length, exposure time, aperture and ISO, space separated.
    pub fn exposure_triple(&self) -> String {
        let focal_length = self
            .store
            .rational(Tag::FocalLength)
            .map(|r| format!("{}mm", r.to_f64().round() as i64));
        let exposure_time = self
            .store
            .rational(Tag::ExposureTime)
            .map(|r| format!("{r}s"));
        let aperture = self
            .store
            .rational(Tag::ApertureValue)
            .map(|r| format!("f/{:.1}", round_tenths(r.to_f64())));
        let iso = self
            .store
            .unsigned(Tag::IsoSpeed)
            .or_else(|| self.store.unsigned(Tag::RecommendedExposureIndex))
            .map(|n| format!("ISO {n}"));

        [focal_length, exposure_time, aperture, iso]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `{camera_and_lens} @ {exposure_triple}`. The separator is always
    /// present, even when one or both sides are empty.
    pub fn camera_line(&self) -> String {
        format!("{} @ {}", self.camera_and_lens(), self.exposure_triple())
    }

    /// `45°30'15.0" N, 73°45'00.0" E`, or empty without both coordinates.
    ///
    /// Both hemisphere letters follow the sign of the latitude degrees.
    pub fn location(&self) -> String {
        let (Some(latitude), Some(longitude)) = (
            self.store.triple(Tag::GpsLatitude),
            self.store.triple(Tag::GpsLongitude),
        ) else {
            return String::new();
        };

        let northern = latitude[0].to_f64() > 0.0;
        format!(
            "{}, {}",
            dms(&latitude, if northern { 'N' } else { 'S' }),
            dms(&longitude, if northern { 'E' } else { 'W' }),
        )
    }

    /// `YYYY/MM/DD HH:MM:SS` from an EXIF timestamp; unrecognised values
    /// pass through unchanged.
    pub fn date_time(&self) -> String {
        let Some(value) = self.store.text(Tag::DateTimeOriginal) else {
            return String::new();
        };

        match EXIF_DATE_TIME.captures(value) {
            Some(caps) => format!("{}/{}/{} {}", &caps["yyyy"], &caps["mm"], &caps["dd"], &caps["t"]),
            None => value.to_string(),
        }
    }

    fn display_name(&self, make: Tag, model: Tag) -> Option<String> {
        coalesce_make_model(self.store.text(make), self.store.text(model))
            .map(|name| self.replacements.apply(name))
    }
}

/// Combine a make and model into one display name.
///
/// Models usually repeat the make ("Canon" / "Canon EOS R5"); in that case the
/// model alone is used. A make without a model yields nothing.
pub fn coalesce_make_model(make: Option<&str>, model: Option<&str>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) => {
            let make = make.trim();
            if model.to_uppercase().contains(&make.to_uppercase()) {
                Some(model.to_string())
            } else {
                Some(format!("{make} {model}"))
            }
        }
        (None, Some(model)) => Some(model.to_string()),
        (_, None) => None,
    }
}

/// `{deg}°{min:00}'{sec:00.0}" {hemisphere}` with the degrees unsigned.
fn dms(parts: &[Rational; 3], hemisphere: char) -> String {
    let degrees = parts[0].to_f64().abs().round() as i64;
    let minutes = parts[1].to_f64().round() as i64;
    let seconds = round_tenths(parts[2].to_f64());
    format!("{degrees}\u{00B0}{minutes:02}'{seconds:04.1}\" {hemisphere}")
}

/// Round half away from zero to one decimal place.
fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
