//! High-level tag access.
//!
//! [`ExifEditor`] translates metadata operations into exiftool invocations
//! and parses the results. Reads go through JSON mode (`-j`) with the date
//! format pinned by [`datetime::EXIF_DATETIME_FORMAT`]; writes assemble
//! `-TAG=VALUE` arguments and by default overwrite the file in place.
//!
//! Every operation is a single synchronous request/response cycle against
//! the external process. Nothing is cached between calls, and concurrent
//! callers mutating the same file are not synchronized here: exiftool
//! rewrites files in place, so callers that share paths across threads must
//! bring their own locking. Writes are likewise not safe to retry blindly,
//! since a failed invocation may have partially applied.

use crate::datetime;
use crate::invoker::{ExifToolRunner, InvokeError, ToolOutput, ToolRunner};
use crate::orientation::Orientation;
use crate::value::TagValue;
use chrono::NaiveDateTime;
use log::warn;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    /// exiftool exited non-zero. Carries the trimmed stderr text.
    #[error("exiftool exited with status {status}: {stderr}")]
    Tool { status: i32, stderr: String },
    /// A write named a tag exiftool does not recognize.
    #[error("exiftool does not recognize the tag `{0}`")]
    UnknownTag(String),
    /// Tool output could not be parsed into the expected shape. The raw
    /// text is attached for diagnosis.
    #[error("cannot parse exiftool output ({reason}): {raw}")]
    Parse { reason: String, raw: String },
}

/// Per-editor behavior switches.
#[derive(Debug, Clone, Default)]
pub struct EditorOptions {
    /// Keep exiftool's `<file>_original` backup on every write instead of
    /// overwriting in place.
    pub keep_backup: bool,
    /// Arguments prepended to every write invocation (e.g. `-P` to preserve
    /// the filesystem modification date).
    pub extra_args: Vec<String>,
}

/// Tag accessor over a resolved exiftool binary.
///
/// Construction fails fast when the tool cannot be resolved; no operation
/// retries the lookup. The editor holds no per-image state; image paths
/// are parameters, owned by the caller.
pub struct ExifEditor<R = ExifToolRunner> {
    runner: R,
    options: EditorOptions,
}

const BAD_IFD_WARNING: &str = "Warning: Bad ExifIFD directory";

impl ExifEditor<ExifToolRunner> {
    /// Locate `exiftool` on the search path.
    pub fn new() -> Result<Self, Error> {
        Ok(Self::with_runner(ExifToolRunner::locate()?))
    }

    /// Use an explicit exiftool binary instead of searching the path.
    pub fn with_program(program: impl Into<PathBuf>) -> Result<Self, Error> {
        Ok(Self::with_runner(ExifToolRunner::with_program(program)?))
    }
}

impl<R: ToolRunner> ExifEditor<R> {
    /// Wrap an already-constructed runner. This is the seam tests use to
    /// substitute a scripted mock.
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            options: EditorOptions::default(),
        }
    }

    pub fn options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    // ---------------------------------------------------------------------
    // Keywords
    // ---------------------------------------------------------------------

    /// The image's keyword list, in the order exiftool reports it. An unset
    /// keyword tag yields an empty list; a single keyword comes back as a
    /// one-element list.
    pub fn get_keywords(&self, image: &Path) -> Result<Vec<String>, Error> {
        Ok(self
            .get_tag(image, "Keywords")?
            .map(TagValue::into_strings)
            .unwrap_or_default())
    }

    /// Replace the keyword list entirely.
    pub fn set_keywords(&self, image: &Path, keywords: &[&str]) -> Result<(), Error> {
        self.clear_keywords(image)?;
        self.add_keywords(image, keywords)
    }

    /// Append one keyword, preserving existing ones.
    pub fn add_keyword(&self, image: &Path, keyword: &str) -> Result<(), Error> {
        self.add_keywords(image, &[keyword])
    }

    /// Append keywords, preserving existing ones. Merge and de-duplication
    /// semantics belong to exiftool's `+=` operator, not to this crate.
    pub fn add_keywords(&self, image: &Path, keywords: &[&str]) -> Result<(), Error> {
        if keywords.is_empty() {
            return Ok(());
        }
        let ops = keywords
            .iter()
            .map(|keyword| format!("-iptc:keywords+={keyword}"));
        self.run_write(ops, image)
    }

    /// Remove one keyword; absent keywords are ignored.
    pub fn remove_keyword(&self, image: &Path, keyword: &str) -> Result<(), Error> {
        self.remove_keywords(image, &[keyword])
    }

    /// Remove several keywords; absent keywords are ignored.
    pub fn remove_keywords(&self, image: &Path, keywords: &[&str]) -> Result<(), Error> {
        let kept: Vec<String> = self
            .get_keywords(image)?
            .into_iter()
            .filter(|current| !keywords.contains(&current.as_str()))
            .collect();
        let kept: Vec<&str> = kept.iter().map(String::as_str).collect();
        self.set_keywords(image, &kept)
    }

    /// Remove every keyword.
    pub fn clear_keywords(&self, image: &Path) -> Result<(), Error> {
        self.set_tag(image, "Keywords", "")
    }

    // ---------------------------------------------------------------------
    // Arbitrary tags
    // ---------------------------------------------------------------------

    /// Read one tag. Absence is `None`, never an error.
    pub fn get_tag(&self, image: &Path, tag: &str) -> Result<Option<TagValue>, Error> {
        let mut report = self.read_report(Some(tag), image)?;
        Ok(report.remove(tag).and_then(TagValue::from_json))
    }

    /// Read every tag on the image, sorted by name. The synthetic
    /// `SourceFile` entry exiftool adds to JSON output is excluded.
    pub fn get_all_tags(&self, image: &Path) -> Result<BTreeMap<String, TagValue>, Error> {
        let report = self.read_report(None, image)?;
        Ok(report
            .into_iter()
            .filter(|(name, _)| name != "SourceFile")
            .filter_map(|(name, value)| TagValue::from_json(value).map(|value| (name, value)))
            .collect())
    }

    /// Set one tag. Fails with [`Error::UnknownTag`] when exiftool rejects
    /// the tag name.
    pub fn set_tag(&self, image: &Path, tag: &str, value: &str) -> Result<(), Error> {
        self.run_write([format!("-{tag}={value}")], image)
    }

    /// Set a multi-valued tag by repeating `-TAG=value` for each entry.
    pub fn set_tag_values(&self, image: &Path, tag: &str, values: &[&str]) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }
        self.run_write(values.iter().map(|value| format!("-{tag}={value}")), image)
    }

    /// Set several tags in a single invocation, in the order given.
    pub fn set_tags(&self, image: &Path, tags: &[(&str, &str)]) -> Result<(), Error> {
        if tags.is_empty() {
            return Ok(());
        }
        self.run_write(
            tags.iter().map(|(tag, value)| format!("-{tag}={value}")),
            image,
        )
    }

    // ---------------------------------------------------------------------
    // Dates
    // ---------------------------------------------------------------------

    /// When the picture was taken (`DateTimeOriginal`).
    pub fn get_original_date_time(&self, image: &Path) -> Result<Option<NaiveDateTime>, Error> {
        self.get_date_time_field(image, "DateTimeOriginal")
    }

    pub fn set_original_date_time(&self, image: &Path, when: NaiveDateTime) -> Result<(), Error> {
        self.set_date_time_field(image, "DateTimeOriginal", when)
    }

    /// The image's modification date (`FileModifyDate`).
    pub fn get_modification_date_time(
        &self,
        image: &Path,
    ) -> Result<Option<NaiveDateTime>, Error> {
        self.get_date_time_field(image, "FileModifyDate")
    }

    pub fn set_modification_date_time(
        &self,
        image: &Path,
        when: NaiveDateTime,
    ) -> Result<(), Error> {
        self.set_date_time_field(image, "FileModifyDate", when)
    }

    /// Set the modification date to the current local time.
    pub fn touch(&self, image: &Path) -> Result<(), Error> {
        self.set_modification_date_time(image, chrono::Local::now().naive_local())
    }

    fn get_date_time_field(
        &self,
        image: &Path,
        field: &str,
    ) -> Result<Option<NaiveDateTime>, Error> {
        match self.get_tag(image, field)? {
            None => Ok(None),
            Some(value) => {
                let text = value.to_string();
                let parsed = datetime::parse(&text).map_err(|err| Error::Parse {
                    reason: format!("`{field}` is not an EXIF datetime: {err}"),
                    raw: text,
                })?;
                Ok(Some(parsed))
            }
        }
    }

    fn set_date_time_field(
        &self,
        image: &Path,
        field: &str,
        when: NaiveDateTime,
    ) -> Result<(), Error> {
        self.run_write([format!("-{field}={}", datetime::format(&when))], image)
    }

    // ---------------------------------------------------------------------
    // Orientation
    // ---------------------------------------------------------------------

    /// The current orientation. Images without an Orientation tag count as
    /// upright.
    pub fn get_orientation(&self, image: &Path) -> Result<Orientation, Error> {
        let mut report = self.read_report(Some("Orientation#"), image)?;
        // exiftool versions differ on whether the numeric-mode key keeps
        // the `#` suffix in JSON output.
        let value = report
            .remove("Orientation#")
            .or_else(|| report.remove("Orientation"))
            .and_then(TagValue::from_json);
        match value {
            None => Ok(Orientation::NORMAL),
            Some(value) => value
                .as_u32()
                .and_then(|code| u8::try_from(code).ok())
                .and_then(Orientation::from_code)
                .ok_or_else(|| Error::Parse {
                    reason: "unexpected Orientation value".to_string(),
                    raw: value.to_string(),
                }),
        }
    }

    pub fn set_orientation(&self, image: &Path, orientation: Orientation) -> Result<(), Error> {
        self.run_write([format!("-Orientation#={}", orientation.code())], image)
    }

    /// Rotate clockwise in 90° steps. Returns the orientation written back.
    pub fn rotate_cw(&self, image: &Path, num: u32) -> Result<Orientation, Error> {
        self.rotate(image, num as i32)
    }

    /// Rotate counter-clockwise in 90° steps. Returns the orientation
    /// written back.
    pub fn rotate_ccw(&self, image: &Path, num: u32) -> Result<Orientation, Error> {
        self.rotate(image, -(num as i32))
    }

    fn rotate(&self, image: &Path, quarter_turns: i32) -> Result<Orientation, Error> {
        let next = self.get_orientation(image)?.rotated_cw(quarter_turns);
        self.set_orientation(image, next)?;
        Ok(next)
    }

    /// Flip the image left to right.
    pub fn mirror_horizontally(&self, image: &Path) -> Result<Orientation, Error> {
        let next = self.get_orientation(image)?.flipped();
        self.set_orientation(image, next)?;
        Ok(next)
    }

    /// Flip the image top to bottom.
    pub fn mirror_vertically(&self, image: &Path) -> Result<Orientation, Error> {
        let next = self.get_orientation(image)?.flipped_vertically();
        self.set_orientation(image, next)?;
        Ok(next)
    }

    // ---------------------------------------------------------------------
    // Invocation plumbing
    // ---------------------------------------------------------------------

    fn read_args(&self, tag: Option<&str>, image: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-j".into(),
            "-d".into(),
            datetime::EXIF_DATETIME_FORMAT.into(),
        ];
        if let Some(tag) = tag {
            args.push(format!("-{tag}").into());
        }
        args.push(image.as_os_str().into());
        args
    }

    fn write_args(
        &self,
        ops: impl IntoIterator<Item = String>,
        image: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            self.options.extra_args.iter().map(OsString::from).collect();
        if !self.options.keep_backup {
            args.push("-overwrite_original_in_place".into());
        }
        args.extend(ops.into_iter().map(OsString::from));
        args.push(image.as_os_str().into());
        args
    }

    fn repair_args(&self, image: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-overwrite_original_in_place".into(),
            "-all=".into(),
            "-tagsfromfile".into(),
            "@".into(),
            "-all:all".into(),
            "-unsafe".into(),
        ];
        args.push(image.as_os_str().into());
        args
    }

    fn run_write(
        &self,
        ops: impl IntoIterator<Item = String>,
        image: &Path,
    ) -> Result<(), Error> {
        self.run_on_image(self.write_args(ops, image), image)
            .map(drop)
    }

    fn read_report(
        &self,
        tag: Option<&str>,
        image: &Path,
    ) -> Result<serde_json::Map<String, serde_json::Value>, Error> {
        let output = self.run_on_image(self.read_args(tag, image), image)?;
        let mut reports: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&output.stdout).map_err(|err| Error::Parse {
                reason: err.to_string(),
                raw: output.stdout.clone(),
            })?;
        if reports.is_empty() {
            return Err(Error::Parse {
                reason: "empty report array".to_string(),
                raw: output.stdout,
            });
        }
        Ok(reports.remove(0))
    }

    /// Run one invocation, rebuilding a damaged ExifIFD directory and
    /// retrying once if exiftool reports one.
    fn run_on_image(&self, args: Vec<OsString>, image: &Path) -> Result<ToolOutput, Error> {
        let output = self.runner.run(&args)?;
        if output.stderr.starts_with(BAD_IFD_WARNING) {
            warn!(
                "damaged ExifIFD directory in {}; rebuilding metadata",
                image.display()
            );
            // The rebuild itself always reports a warning; log and move on.
            match self.runner.run(&self.repair_args(image)) {
                Ok(repair) if !repair.success() => {
                    warn!("metadata rebuild reported: {}", repair.stderr.trim());
                }
                Ok(_) => {}
                Err(err) => warn!("metadata rebuild failed: {err}"),
            }
            return self.check(self.runner.run(&args)?);
        }
        self.check(output)
    }

    fn check(&self, output: ToolOutput) -> Result<ToolOutput, Error> {
        if !output.success() {
            if let Some(tag) = unknown_tag(&output.stderr) {
                return Err(Error::UnknownTag(tag));
            }
            return Err(Error::Tool {
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        if !output.stderr.trim().is_empty() {
            warn!("exiftool: {}", output.stderr.trim());
        }
        Ok(output)
    }
}

/// Extract the tag name from exiftool's rejected-tag warning, if that is
/// what `stderr` contains.
fn unknown_tag(stderr: &str) -> Option<String> {
    let rest = stderr.strip_prefix("Warning: Tag '")?;
    let (tag, rest) = rest.split_once('\'')?;
    let rest = rest.trim_start();
    (rest.starts_with("does not exist") || rest.starts_with("is not defined"))
        .then(|| tag.to_string())
}
