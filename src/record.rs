use serde::{Deserialize, Serialize};

use crate::command::CommandId;
use crate::error::{NagiosError, Result};

pub const DEFAULT_AUTHOR: &str = "func";
pub const DEFAULT_COMMENT: &str = "Scheduling downtime";
pub const DEFAULT_MINUTES: i64 = 30;

/// Downtime window options. Ignored for notification toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downtime {
    pub minutes: i64,       // Length of the window, may be zero or negative
    pub start: Option<i64>, // Epoch seconds; None means "at render time"
    pub fixed: bool,        // false = flexible, starts when a problem shows up
    pub trigger_id: u64,    // 0 = not triggered by another downtime
    pub author: String,
    pub comment: String,
}

impl Default for Downtime {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_MINUTES,
            start: None,
            fixed: true,
            trigger_id: 0,
            author: DEFAULT_AUTHOR.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

impl Downtime {
    pub fn minutes(minutes: i64) -> Self {
        Self {
            minutes,
            ..Self::default()
        }
    }

    pub fn duration_seconds(&self) -> Result<i64> {
        self.minutes
            .checked_mul(60)
            .ok_or(NagiosError::DurationOutOfRange {
                minutes: self.minutes,
            })
    }

    /// End of a window starting at `start`.
    pub fn end_time(&self, start: i64) -> Result<i64> {
        start
            .checked_add(self.duration_seconds()?)
            .ok_or(NagiosError::DurationOutOfRange {
                minutes: self.minutes,
            })
    }

    pub(crate) fn check_fields(&self) -> Result<()> {
        check_field("author", &self.author, false)?;
        check_field("comment", &self.comment, true)
    }
}

/// A value must stay inside its own field of a single line. Only the last
/// field of a line (the comment) may contain `;`.
pub(crate) fn check_field(field: &'static str, value: &str, last: bool) -> Result<()> {
    let breaks_line = value.contains(|c: char| c == '\n' || c == '\r');
    if breaks_line || (!last && value.contains(';')) {
        return Err(NagiosError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// One caller-level unit of work, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: CommandId,
    pub target: String,             // host, hostgroup or servicegroup name
    pub service_names: Vec<String>, // empty = host/group level
    pub downtime: Downtime,
}

impl CommandRequest {
    pub fn new(command: CommandId, target: impl Into<String>) -> Self {
        Self {
            command,
            target: target.into(),
            service_names: Vec::new(),
            downtime: Downtime::default(),
        }
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_names = services.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_downtime(mut self, downtime: Downtime) -> Self {
        self.downtime = downtime;
        self
    }

    /// Reject requests that would render lines Nagios can't parse.
    pub fn validate(&self) -> Result<()> {
        if self.command.scope().takes_service() && self.service_names.is_empty() {
            return Err(NagiosError::MissingService(self.command));
        }
        if !self.command.scope().takes_service() && !self.service_names.is_empty() {
            return Err(NagiosError::UnexpectedService(self.command));
        }
        check_field("target", &self.target, false)?;
        for service in &self.service_names {
            check_field("service", service, false)?;
        }
        if self.command.is_downtime() {
            self.downtime.check_fields()?;
            self.downtime.duration_seconds()?;
        }
        Ok(())
    }
}

/// A rendered command-file line. Built once by the formatter, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    command: CommandId,
    entry_time: i64,
    service: Option<String>,
    line: String,
}

impl CommandRecord {
    pub(crate) fn new(
        command: CommandId,
        entry_time: i64,
        service: Option<String>,
        line: String,
    ) -> Self {
        Self {
            command,
            entry_time,
            service,
            line,
        }
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn entry_time(&self) -> i64 {
        self.entry_time
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// The full line, including the trailing newline.
    pub fn line(&self) -> &str {
        &self.line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub succeeded: bool,
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>, // cause of a failed write, for logs
}

/// Outcome of submitting every record of one or more requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub results: Vec<SubmissionResult>,
}

impl BatchResult {
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.succeeded).count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_result(self) -> Result<BatchResult> {
        let failed = self.failed();
        if failed > 0 {
            return Err(NagiosError::PartialFailure {
                failed,
                total: self.len(),
            });
        }
        Ok(self)
    }
}
