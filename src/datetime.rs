//! The exiftool date string contract.
//!
//! Every read passes `-d %Y:%m:%d %H:%M:%S` so exiftool renders date tags in
//! the classic EXIF shape regardless of its own defaults, and every write
//! emits the same shape. Precision is one second; sub-second and timezone
//! information is not carried.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Format string handed to exiftool via `-d` and used for all parsing.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d";

/// Render a datetime the way exiftool expects it.
pub fn format(when: &NaiveDateTime) -> String {
    when.format(EXIF_DATETIME_FORMAT).to_string()
}

/// Strict parse of a datetime exactly as exiftool reports it.
pub fn parse(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT)
}

/// Lenient parse for user-supplied input: accepts a full datetime or a bare
/// `YYYY:MM:DD` date, which is taken to mean midnight.
pub fn parse_lenient(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    parse(text).or_else(|err| {
        NaiveDate::parse_from_str(text, EXIF_DATE_FORMAT)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| err)
    })
}
