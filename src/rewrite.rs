//! Copyright and ownership rewrite for the owner's own photos.
//!
//! Runs on the metadata store before any banner text is derived, so the
//! banner shows the rewritten copyright.

use crate::config::OwnerConfig;
use crate::exif::{MetadataStore, Tag};

/// Tags that identify equipment or machines and are stripped on rewrite.
const REMOVED_TAGS: [Tag; 3] = [Tag::HostComputer, Tag::SerialNumber, Tag::LensSerialNumber];

/// Whether the Copyright tag names the owner (first and last name, both
/// case-sensitive, in any order).
pub fn is_owner_copyright(store: &MetadataStore, owner: &OwnerConfig) -> bool {
    store.text(Tag::Copyright).is_some_and(|copyright| {
        copyright.contains(owner.first_name.as_str()) && copyright.contains(owner.last_name.as_str())
    })
}

/// Rewrite ownership tags if the copyright belongs to `owner`.
///
/// Sets Copyright, OwnerName, Artist and Software, and removes HostComputer,
/// SerialNumber and LensSerialNumber. Leaves the store untouched otherwise.
/// Returns whether the rewrite happened.
pub fn apply(store: &mut MetadataStore, owner: &OwnerConfig, year: i32) -> bool {
    if !is_owner_copyright(store, owner) {
        return false;
    }

    store.set_text(
        Tag::Copyright,
        format!(
            "Copyright \u{00A9} {} {year}, All rights reserved",
            owner.full_name
        ),
    );
    store.set_text(Tag::OwnerName, owner.full_name.as_str());
    store.set_text(Tag::Artist, owner.full_name.as_str());
    store.set_text(Tag::Software, owner.software.as_str());

    for tag in REMOVED_TAGS {
        store.remove(tag);
    }

    log::debug!("  Rewrote copyright for {}", owner.full_name);
    true
}
