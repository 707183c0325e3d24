//! The external format-conversion seam.
//!
//! The generic LaTeX→Markdown conversion is a black box from the pipeline's
//! point of view: text in, text out, or a fatal error. Hiding it behind
//! [`FormatConverter`] keeps the interesting stages testable without a pandoc
//! installation — tests inject a fake converter through
//! [`crate::config::ConversionConfig::converter`].

use crate::error::ConvertError;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// A black-box markup converter: raw text + source dialect → target dialect.
///
/// Failure is fatal for the whole document; the pipeline performs no partial
/// recovery around this call.
pub trait FormatConverter: Send + Sync {
    fn convert(&self, input: &str, from_format: &str) -> Result<String, ConvertError>;
}

/// Default converter: shells out to the `pandoc` binary.
///
/// Input is piped through stdin (`-f <format> -t markdown`) so no intermediate
/// file is needed; stderr is captured for the error message on failure.
pub struct PandocConverter {
    command: String,
}

impl PandocConverter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl FormatConverter for PandocConverter {
    fn convert(&self, input: &str, from_format: &str) -> Result<String, ConvertError> {
        debug!("Invoking {} ({} -> markdown)", self.command, from_format);

        let mut child = Command::new(&self.command)
            .args(["-f", from_format, "-t", "markdown"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::ConverterUnavailable {
                command: self.command.clone(),
                detail: e.to_string(),
            })?;

        // Scope the handle so stdin closes before we wait, or pandoc blocks
        // forever waiting for EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|e| ConvertError::ConversionFailed {
                    detail: format!("failed to write converter stdin: {e}"),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ConvertError::ConversionFailed {
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ConvertError::ConversionFailed {
                detail: format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
