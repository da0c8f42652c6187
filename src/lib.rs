//! Write Nagios external commands: schedule downtime and toggle
//! notifications for hosts, services, hostgroups and servicegroups.
//!
//! ```no_run
//! use nagcmd::{CommandFile, Dispatcher, Downtime};
//!
//! let nagios = Dispatcher::new(CommandFile::new("/var/spool/nagios/cmd/nagios.cmd"));
//! let batch = nagios
//!     .schedule_svc_downtime("web01", &["HTTP".to_string()], &Downtime::minutes(30))
//!     .unwrap();
//! assert!(batch.succeeded());
//! ```

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod record;
pub mod sink;

pub use command::{CommandId, Scope};
pub use dispatcher::Dispatcher;
pub use error::NagiosError;
pub use formatter::{Clock, CommandFormatter, FixedClock, SystemClock};
pub use record::{BatchResult, CommandRecord, CommandRequest, Downtime, SubmissionResult};
pub use sink::{CommandFile, CommandSink, DryRunSink};
