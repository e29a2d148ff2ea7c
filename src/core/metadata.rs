//! Capture time from photo metadata.
//!
//! Photos record when they were taken in EXIF. The first usable of
//! `DateTimeOriginal`, `DateTimeDigitized` and `DateTime` is taken, refined
//! by its sub-second and offset tags. Without an offset tag the wall-clock
//! value is read as UTC, so the UTC time basis renders it unchanged.

use crate::utils::fs::get_extension;
use crate::Result;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use exif::{Exif, In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

/// Containers the EXIF reader understands (JPEG, TIFF and TIFF-based raw, HEIF, PNG, WebP).
const EXIF_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "tif", "tiff", "dng", "cr2", "nef", "arw", "orf", "rw2", "heic", "heif", "png",
    "webp",
];

/// Date tag with its sub-second and offset companions, in order of preference.
const DATE_TAGS: [(Tag, Tag, Tag); 3] = [
    (
        Tag::DateTimeOriginal,
        Tag::SubSecTimeOriginal,
        Tag::OffsetTimeOriginal,
    ),
    (
        Tag::DateTimeDigitized,
        Tag::SubSecTimeDigitized,
        Tag::OffsetTimeDigitized,
    ),
    (Tag::DateTime, Tag::SubSecTime, Tag::OffsetTime),
];

/// Whether the file type can carry EXIF data.
pub fn has_exif_container(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| EXIF_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Read the capture time of a photo, `None` when it has none.
pub fn read_capture_time(path: &Path) -> Option<SystemTime> {
    if !has_exif_container(path) {
        return None;
    }
    match read_exif(path) {
        Ok(exif) => capture_time(&exif),
        Err(e) => {
            tracing::debug!("No EXIF data in {}: {}", path.display(), e);
            None
        }
    }
}

fn read_exif(path: &Path) -> Result<Exif> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    Ok(exif::Reader::new().read_from_container(&mut reader)?)
}

/// Capture time from parsed EXIF fields.
pub fn capture_time(exif: &Exif) -> Option<SystemTime> {
    DATE_TAGS.iter().find_map(|&(date, subsec, offset)| {
        let mut dt = exif::DateTime::from_ascii(ascii_field(exif, date)?).ok()?;
        if let Some(value) = ascii_field(exif, subsec) {
            let _ = dt.parse_subsec(value);
        }
        if let Some(value) = ascii_field(exif, offset) {
            let _ = dt.parse_offset(value);
        }
        to_system_time(&dt)
    })
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<&[u8]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|v| v.as_slice())
            .filter(|v| !v.is_empty()),
        _ => None,
    }
}

/// `None` for unset dates such as `0000:00:00 00:00:00`.
fn to_system_time(dt: &exif::DateTime) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
        .and_hms_nano_opt(
            dt.hour.into(),
            dt.minute.into(),
            dt.second.into(),
            dt.nanosecond.unwrap_or(0),
        )?;

    let utc = match dt.offset {
        Some(minutes) => FixedOffset::east_opt(i32::from(minutes) * 60)?
            .from_local_datetime(&naive)
            .single()?
            .with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    };
    Some(utc.into())
}
