//! Subject extraction — the external background-removal collaborator.
//!
//! The pipeline never segments images itself; it consumes a
//! [`SubjectExtractor`] that turns an encoded photo into encoded bytes whose
//! alpha channel carries the cutout mask. The production implementation
//! shells out to an external tool ([`CommandExtractor`]); inputs that were
//! cut out ahead of time skip the step entirely ([`PrecutExtractor`]).
//!
//! Keeping this behind a trait means the rest of the crate is
//! collaborator-agnostic, and tests can inject canned cutouts or failures.

use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to run extraction command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("extraction produced no output")]
    EmptyOutput,
}

/// Turns an encoded photo into an encoded cutout with an alpha mask.
///
/// `Sync` so one extractor can serve rayon-parallel batch renders.
pub trait SubjectExtractor: Sync {
    fn extract(&self, encoded: &[u8]) -> Result<Vec<u8>, ExtractError>;
}

impl<T: SubjectExtractor + ?Sized> SubjectExtractor for &T {
    fn extract(&self, encoded: &[u8]) -> Result<Vec<u8>, ExtractError> {
        (**self).extract(encoded)
    }
}

/// Runs an external background-removal tool, photo on stdin, cutout on
/// stdout (the `rembg i` calling convention).
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line, e.g. `"rembg i"`.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl SubjectExtractor for CommandExtractor {
    fn extract(&self, encoded: &[u8]) -> Result<Vec<u8>, ExtractError> {
        let spawn_err = |source| ExtractError::Spawn {
            command: self.command_line(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // stdin is dropped after writing so the tool sees EOF. A tool that
        // exits before draining its input closes the pipe; its exit status
        // carries the real story, so BrokenPipe is not an error here.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(encoded) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(spawn_err(e));
                }
            }
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(ExtractError::CommandFailed {
                command: self.command_line(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(ExtractError::EmptyOutput);
        }
        Ok(output.stdout)
    }
}

/// Pass-through for inputs whose alpha channel is already the cutout mask
/// (e.g. a PNG exported from an editor).
pub struct PrecutExtractor;

impl SubjectExtractor for PrecutExtractor {
    fn extract(&self, encoded: &[u8]) -> Result<Vec<u8>, ExtractError> {
        if encoded.is_empty() {
            return Err(ExtractError::EmptyOutput);
        }
        Ok(encoded.to_vec())
    }
}
