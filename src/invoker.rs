//! Subprocess boundary for the exiftool binary.
//!
//! The [`ToolRunner`] trait is the single seam between this crate and the
//! outside world: one invocation in, captured output out. The production
//! implementation is [`ExifToolRunner`], which resolves the binary eagerly at
//! construction (a `-ver` probe) and spawns one process per call with an
//! argument vector, never a shell, so values containing spaces or quotes
//! need no escaping.
//!
//! Tests substitute a recording `MockRunner` (in this module's test code) to
//! pin the exact argument contract without exiftool installed.

use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvokeError {
    /// The binary could not be launched at all. Surfaced at construction
    /// time so every later operation can assume a working tool.
    #[error(
        "cannot find `{program}`: exifedit requires the exiftool command-line \
         utility (https://exiftool.org)"
    )]
    ToolNotFound { program: String },
    #[error("failed to run `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` produced output that is not valid UTF-8")]
    NonUtf8 { program: String },
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit status; -1 when the process died on a signal.
    pub status: i32,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// One synchronous tool invocation. `Sync` so an editor can be shared behind
/// a reference; no other concurrency support is implied.
pub trait ToolRunner: Sync {
    fn run(&self, args: &[OsString]) -> Result<ToolOutput, InvokeError>;
}

/// Production runner: a resolved exiftool binary plus its reported version.
/// Read-only after construction.
pub struct ExifToolRunner {
    program: PathBuf,
    version: String,
}

impl ExifToolRunner {
    pub const DEFAULT_PROGRAM: &'static str = "exiftool";

    /// Resolve `exiftool` on the search path.
    pub fn locate() -> Result<Self, InvokeError> {
        Self::with_program(Self::DEFAULT_PROGRAM)
    }

    /// Probe an explicit binary. Fails with [`InvokeError::ToolNotFound`]
    /// when the probe cannot launch or the program does not answer `-ver`.
    pub fn with_program(program: impl Into<PathBuf>) -> Result<Self, InvokeError> {
        let probe = Self {
            program: program.into(),
            version: String::new(),
        };
        let output = probe.run(&["-ver".into()])?;
        if !output.success() {
            return Err(InvokeError::ToolNotFound {
                program: probe.display_name(),
            });
        }
        Ok(Self {
            version: output.stdout.trim().to_string(),
            program: probe.program,
        })
    }

    /// The version string reported by `exiftool -ver`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl ToolRunner for ExifToolRunner {
    fn run(&self, args: &[OsString]) -> Result<ToolOutput, InvokeError> {
        debug!("running {} {:?}", self.program.display(), args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => InvokeError::ToolNotFound {
                    program: self.display_name(),
                },
                _ => InvokeError::Io {
                    program: self.display_name(),
                    source,
                },
            })?;
        let stdout = String::from_utf8(output.stdout).map_err(|_| InvokeError::NonUtf8 {
            program: self.display_name(),
        })?;
        let stderr = String::from_utf8(output.stderr).map_err(|_| InvokeError::NonUtf8 {
            program: self.display_name(),
        })?;
        Ok(ToolOutput {
            stdout,
            stderr,
            status: output.status.code().unwrap_or(-1),
        })
    }
}
