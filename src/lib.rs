//! # exifedit
//!
//! Read and write EXIF/IPTC metadata by shelling out to the
//! [exiftool](https://exiftool.org) command-line utility.
//!
//! This crate contains no image-format code at all. Every operation builds
//! an exiftool argument vector, spawns the tool, and parses what it prints;
//! exiftool owns the actual metadata engineering. What this crate adds is a
//! typed surface over that process boundary: keyword lists as `Vec<String>`,
//! dates as [`chrono::NaiveDateTime`], orientation as checked quarter-turn
//! arithmetic, and absence as `None` instead of a stringly sentinel.
//!
//! ```no_run
//! use exifedit::ExifEditor;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), exifedit::Error> {
//! let editor = ExifEditor::new()?;
//! let image = Path::new("photos/dawn.jpg");
//!
//! editor.add_keywords(image, &["landscape", "iceland"])?;
//! for keyword in editor.get_keywords(image)? {
//!     println!("{keyword}");
//! }
//! if let Some(taken) = editor.get_original_date_time(image)? {
//!     println!("taken {taken}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | High-level operations: keywords, arbitrary tags, dates, orientation |
//! | [`invoker`] | Subprocess boundary — the [`ToolRunner`] trait and the production exiftool runner |
//! | [`orientation`] | Pure arithmetic over the 8 EXIF orientation codes |
//! | [`datetime`] | The pinned `%Y:%m:%d %H:%M:%S` date string contract |
//! | [`value`] | Typed shape of a tag value as exiftool reports it in JSON mode |
//!
//! # Design Decisions
//!
//! ## Argument vectors, never a shell
//!
//! Invocations pass arguments directly to the process, so tag values with
//! spaces, quotes, or `&` need no escaping and cannot be reinterpreted by a
//! shell.
//!
//! ## Fail fast when the tool is missing
//!
//! The binary is resolved once, at construction, with a `-ver` probe.
//! Operations never re-probe: a missing tool is a configuration error
//! surfaced immediately, not something to retry per call.
//!
//! ## Absence is `None`, not an error
//!
//! Reading a tag the image does not carry returns `Ok(None)`. Errors are
//! reserved for a failing subprocess, a rejected tag name on write, and
//! unparseable output.
//!
//! ## No automatic retries
//!
//! exiftool mutates files in place, so a failed write may have partially
//! applied and is not safe to repeat blindly. The single exception is the
//! damaged-ExifIFD repair cycle: when exiftool reports a bad directory, the
//! editor rebuilds the metadata and retries the original invocation exactly
//! once. Callers that need concurrent access to the same file must also
//! bring their own locking; nothing here serializes writers.

pub mod datetime;
pub mod editor;
pub mod invoker;
pub mod orientation;
pub mod value;

pub use editor::{EditorOptions, Error, ExifEditor};
pub use invoker::{ExifToolRunner, InvokeError, ToolOutput, ToolRunner};
pub use orientation::Orientation;
pub use value::TagValue;
