use tracing::{debug, info, warn};

use crate::command::{CommandId, Scope};
use crate::error::Result;
use crate::formatter::{Clock, CommandFormatter, SystemClock};
use crate::record::{BatchResult, CommandRecord, CommandRequest, Downtime, SubmissionResult};
use crate::sink::CommandSink;

/// Renders requests and hands each line to a sink.
///
/// Calls are independent: nothing is held between them apart from the sink
/// and the clock.
pub struct Dispatcher<S: CommandSink, C: Clock = SystemClock> {
    formatter: CommandFormatter<C>,
    sink: S,
}

impl<S: CommandSink> Dispatcher<S, SystemClock> {
    pub fn new(sink: S) -> Self {
        Self {
            formatter: CommandFormatter::new(),
            sink,
        }
    }
}

impl<S: CommandSink, C: Clock> Dispatcher<S, C> {
    pub fn with_formatter(sink: S, formatter: CommandFormatter<C>) -> Self {
        Self { formatter, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Write one record. A failed write is reported, not raised.
    pub fn submit(&self, record: &CommandRecord) -> SubmissionResult {
        debug!(line = record.line().trim_end(), "submitting command");
        match self.sink.write_command(record.line()) {
            Ok(()) => SubmissionResult {
                succeeded: true,
                line: record.line().to_string(),
                error: None,
            },
            Err(e) => {
                warn!(
                    command = %record.command(),
                    sink = %self.sink.describe(),
                    error = %e,
                    "command was not submitted"
                );
                SubmissionResult {
                    succeeded: false,
                    line: record.line().to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Write every record in order. Failures don't stop later records.
    pub fn submit_many(&self, records: &[CommandRecord]) -> BatchResult {
        let results: Vec<SubmissionResult> = records.iter().map(|r| self.submit(r)).collect();
        let batch = BatchResult { results };
        info!(
            total = batch.len(),
            failed = batch.failed(),
            "submitted commands to {}",
            self.sink.describe()
        );
        batch
    }

    /// Render a request and submit all of its lines. Errors only when the
    /// request is rejected before anything is written.
    pub fn submit_request(&self, request: &CommandRequest) -> Result<BatchResult> {
        let records = self.formatter.render(request)?;
        Ok(self.submit_many(&records))
    }

    fn downtime(
        &self,
        command: CommandId,
        target: &str,
        services: &[String],
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        let request = CommandRequest::new(command, target)
            .with_services(services.iter().cloned())
            .with_downtime(downtime.clone());
        self.submit_request(&request)
    }

    fn notifications(
        &self,
        enable: bool,
        scope: Scope,
        target: &str,
        services: &[String],
    ) -> Result<BatchResult> {
        let request = CommandRequest::new(CommandId::notifications(enable, scope), target)
            .with_services(services.iter().cloned());
        self.submit_request(&request)
    }

    pub fn schedule_svc_downtime(
        &self,
        host: &str,
        services: &[String],
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleSvcDowntime, host, services, downtime)
    }

    pub fn schedule_host_downtime(&self, host: &str, downtime: &Downtime) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleHostDowntime, host, &[], downtime)
    }

    pub fn schedule_hostgroup_host_downtime(
        &self,
        hostgroup: &str,
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleHostgroupHostDowntime, hostgroup, &[], downtime)
    }

    pub fn schedule_hostgroup_svc_downtime(
        &self,
        hostgroup: &str,
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleHostgroupSvcDowntime, hostgroup, &[], downtime)
    }

    pub fn schedule_servicegroup_host_downtime(
        &self,
        servicegroup: &str,
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleServicegroupHostDowntime, servicegroup, &[], downtime)
    }

    pub fn schedule_servicegroup_svc_downtime(
        &self,
        servicegroup: &str,
        downtime: &Downtime,
    ) -> Result<BatchResult> {
        self.downtime(CommandId::ScheduleServicegroupSvcDowntime, servicegroup, &[], downtime)
    }

    pub fn enable_host_notifications(&self, host: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::Host, host, &[])
    }

    pub fn disable_host_notifications(&self, host: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::Host, host, &[])
    }

    pub fn enable_host_svc_notifications(&self, host: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::HostServices, host, &[])
    }

    pub fn disable_host_svc_notifications(&self, host: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::HostServices, host, &[])
    }

    pub fn enable_svc_notifications(&self, host: &str, services: &[String]) -> Result<BatchResult> {
        self.notifications(true, Scope::Service, host, services)
    }

    pub fn disable_svc_notifications(&self, host: &str, services: &[String]) -> Result<BatchResult> {
        self.notifications(false, Scope::Service, host, services)
    }

    pub fn enable_hostgroup_host_notifications(&self, hostgroup: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::HostGroupHosts, hostgroup, &[])
    }

    pub fn disable_hostgroup_host_notifications(&self, hostgroup: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::HostGroupHosts, hostgroup, &[])
    }

    pub fn enable_hostgroup_svc_notifications(&self, hostgroup: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::HostGroupServices, hostgroup, &[])
    }

    pub fn disable_hostgroup_svc_notifications(&self, hostgroup: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::HostGroupServices, hostgroup, &[])
    }

    pub fn enable_servicegroup_host_notifications(&self, servicegroup: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::ServiceGroupHosts, servicegroup, &[])
    }

    pub fn disable_servicegroup_host_notifications(&self, servicegroup: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::ServiceGroupHosts, servicegroup, &[])
    }

    pub fn enable_servicegroup_svc_notifications(&self, servicegroup: &str) -> Result<BatchResult> {
        self.notifications(true, Scope::ServiceGroupServices, servicegroup, &[])
    }

    pub fn disable_servicegroup_svc_notifications(&self, servicegroup: &str) -> Result<BatchResult> {
        self.notifications(false, Scope::ServiceGroupServices, servicegroup, &[])
    }
}
