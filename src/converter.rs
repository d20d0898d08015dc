use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use log::{debug, info};

use crate::constants::{Format, CONVERTER_PROGRAM, FALLBACK_DIAGNOSTIC};
use crate::error::{AppError, Result};

/// A single conversion as submitted from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source_text: String,
    pub from: Format,
    pub to: Format,
}

impl ConversionRequest {
    /// Builds a request from the raw input buffer. Trailing newlines are
    /// dropped; blank input is rejected before any process is spawned.
    pub fn new(source_text: &str, from: Format, to: Format) -> Result<Self> {
        let source_text = source_text.trim_end_matches(['\n', '\r']);
        if source_text.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }

        Ok(Self {
            source_text: source_text.to_string(),
            from,
            to,
        })
    }
}

/// Runs the external converter, one blocking process per call.
#[derive(Debug, Clone)]
pub struct Converter {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(CONVERTER_PROGRAM)
    }
}

impl Converter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed ahead of the `-f`/`-t` pair on every invocation.
    pub fn with_args<I, S>(program: impl Into<OsString>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args);
        command
    }

    /// Checks that the converter can be launched and reports its version line.
    pub fn verify(&self) -> Result<String> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AppError::ConverterUnavailable {
                program: self.program_name(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(AppError::ConverterUnavailable {
                program: self.program_name(),
                details: format!("'--version' exited with {}", output.status),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        info!("Found converter: {}", version);
        Ok(version)
    }

    pub fn convert_request(&self, request: &ConversionRequest) -> Result<String> {
        self.convert(&request.source_text, request.from, request.to)
    }

    /// Feeds `text` to the converter's stdin and returns its stdout.
    /// A non-zero exit yields `AppError::Conversion` with stderr verbatim.
    pub fn convert(&self, text: &str, from: Format, to: Format) -> Result<String> {
        debug!(
            "Running {} -f {} -t {} ({} bytes of input)",
            self.program_name(),
            from,
            to,
            text.len()
        );

        let mut child = self
            .command()
            .arg("-f")
            .arg(from.pandoc_name())
            .arg("-t")
            .arg(to.pandoc_name())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::new_io_error(e, format!("Failed to launch {}", self.program_name())))?;

        // Write stdin from a separate thread so a full stdout pipe can't stall us.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            AppError::new_io_error(
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin not captured"),
                "Failed to open converter stdin",
            )
        })?;
        let input = text.as_bytes().to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| AppError::new_io_error(e, "Failed to wait for converter"))?;

        let write_result = writer.join().unwrap_or_else(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "stdin writer panicked"))
        });

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr).into_owned();
            let diagnostic = if diagnostic.is_empty() {
                FALLBACK_DIAGNOSTIC.to_string()
            } else {
                diagnostic
            };
            debug!("Converter exited with {}", output.status);
            return Err(AppError::Conversion { diagnostic });
        }

        // A converter may exit successfully without reading all of stdin.
        if let Err(e) = write_result {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(AppError::new_io_error(e, "Failed to write converter stdin"));
            }
        }

        let text = String::from_utf8(output.stdout)?;
        debug!("Converter produced {} bytes", text.len());
        Ok(text)
    }
}
