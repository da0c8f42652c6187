use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{NagiosError, Result};

/// Where rendered command lines go.
pub trait CommandSink {
    fn write_command(&self, line: &str) -> Result<()>;

    /// Human-readable destination, for logs.
    fn describe(&self) -> String;
}

/// The Nagios external command file, usually a named pipe.
///
/// Each write opens the file, writes the line and closes it again; Nagios
/// reads discrete writes off the pipe. The file is opened with truncation
/// (which a FIFO ignores) and is never created, so a missing pipe is an
/// error instead of a stray regular file.
#[derive(Debug, Clone)]
pub struct CommandFile {
    path: PathBuf,
}

impl CommandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl CommandSink for CommandFile {
    fn write_command(&self, line: &str) -> Result<()> {
        self.write_line(line).map_err(|source| NagiosError::WriteError {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Echoes lines to a writer (stdout by default) instead of submitting them.
pub struct DryRunSink<W: Write = io::Stdout> {
    out: RefCell<W>,
    name: &'static str,
}

impl DryRunSink<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout(), "stdout")
    }
}

impl Default for DryRunSink<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DryRunSink<W> {
    /// `name` stands in for a path in logs and write errors.
    pub fn with_writer(out: W, name: &'static str) -> Self {
        Self {
            out: RefCell::new(out),
            name,
        }
    }
}

impl<W: Write> CommandSink for DryRunSink<W> {
    fn write_command(&self, line: &str) -> Result<()> {
        let mut out = self.out.borrow_mut();
        out.write_all(line.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|source| NagiosError::WriteError {
                path: PathBuf::from(format!("<{}>", self.name)),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("{} (dry run)", self.name)
    }
}
