//! Rendering of Nagios external-command lines.
//!
//! Every line has the shape `[<entry_time>] <COMMAND>;<arg>;...;<arg>\n`.
//! Downtime commands carry the window, notification toggles only carry
//! their target (and service, for service-scoped commands).

use chrono::Utc;

use crate::command::CommandId;
use crate::error::Result;
use crate::record::{check_field, CommandRecord, CommandRequest, Downtime};

/// Source of entry timestamps, in epoch seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Always returns the same instant. Makes rendering reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

fn command_line(entry_time: i64, command: CommandId, args: &[String]) -> String {
    let mut fields = Vec::with_capacity(args.len() + 1);
    fields.push(command.as_str().to_string());
    fields.extend(args.iter().cloned());
    format!("[{}] {}\n", entry_time, fields.join(";"))
}

fn target_args(target: &str, service: Option<&str>) -> Result<Vec<String>> {
    check_field("target", target, false)?;
    let mut args = vec![target.to_string()];
    if let Some(service) = service {
        check_field("service", service, false)?;
        args.push(service.to_string());
    }
    Ok(args)
}

fn downtime_args(
    target: &str,
    service: Option<&str>,
    start: i64,
    downtime: &Downtime,
) -> Result<Vec<String>> {
    downtime.check_fields()?;
    let duration = downtime.duration_seconds()?;
    let end = downtime.end_time(start)?;
    let mut args = target_args(target, service)?;
    args.extend([
        start.to_string(),
        end.to_string(),
        if downtime.fixed { "1" } else { "0" }.to_string(),
        downtime.trigger_id.to_string(),
        duration.to_string(),
        downtime.author.clone(),
        downtime.comment.clone(),
    ]);
    Ok(args)
}

pub struct CommandFormatter<C: Clock = SystemClock> {
    clock: C,
}

impl CommandFormatter<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for CommandFormatter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CommandFormatter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Render a downtime line. `downtime.start` defaults to the entry time,
    /// which is sampled once for this call. Fails for values that would
    /// not fit in one field of one line, or a window that overflows.
    pub fn format_downtime(
        &self,
        command: CommandId,
        target: &str,
        service: Option<&str>,
        downtime: &Downtime,
    ) -> Result<CommandRecord> {
        let now = self.clock.now();
        self.downtime_record(now, command, target, service, downtime)
    }

    pub fn format_notification(
        &self,
        command: CommandId,
        target: &str,
        service: Option<&str>,
    ) -> Result<CommandRecord> {
        let now = self.clock.now();
        self.notification_record(now, command, target, service)
    }

    /// Render every line of a request: one per service in input order, or a
    /// single host/group-level line when there are no services. All lines
    /// share one entry time.
    pub fn render(&self, request: &CommandRequest) -> Result<Vec<CommandRecord>> {
        request.validate()?;
        let now = self.clock.now();
        let target = request.target.as_str();

        let record = |service: Option<&str>| {
            if request.command.is_downtime() {
                self.downtime_record(now, request.command, target, service, &request.downtime)
            } else {
                self.notification_record(now, request.command, target, service)
            }
        };

        if request.service_names.is_empty() {
            return Ok(vec![record(None)?]);
        }
        request
            .service_names
            .iter()
            .map(|service| record(Some(service.as_str())))
            .collect()
    }

    fn downtime_record(
        &self,
        now: i64,
        command: CommandId,
        target: &str,
        service: Option<&str>,
        downtime: &Downtime,
    ) -> Result<CommandRecord> {
        let start = downtime.start.unwrap_or(now);
        let args = downtime_args(target, service, start, downtime)?;
        Ok(CommandRecord::new(
            command,
            now,
            service.map(str::to_string),
            command_line(now, command, &args),
        ))
    }

    fn notification_record(
        &self,
        now: i64,
        command: CommandId,
        target: &str,
        service: Option<&str>,
    ) -> Result<CommandRecord> {
        let args = target_args(target, service)?;
        Ok(CommandRecord::new(
            command,
            now,
            service.map(str::to_string),
            command_line(now, command, &args),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NagiosError;
    use std::cell::Cell;

    fn fields(line: &str) -> Vec<&str> {
        let body = line.trim_end_matches('\n');
        let (_, rest) = body.split_once("] ").unwrap();
        rest.split(';').collect()
    }

    #[test]
    fn host_downtime_line() {
        let f = CommandFormatter::with_clock(FixedClock(1000));
        let dt = Downtime {
            start: Some(1000),
            ..Downtime::minutes(30)
        };
        let record = f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &dt).unwrap();
        assert_eq!(
            record.line(),
            "[1000] SCHEDULE_HOST_DOWNTIME;web01;1000;2800;1;0;1800;func;Scheduling downtime\n"
        );
        assert_eq!(record.entry_time(), 1000);
        assert_eq!(record.service(), None);
    }

    #[test]
    fn service_downtime_puts_service_after_target() {
        let f = CommandFormatter::with_clock(FixedClock(5000));
        let dt = Downtime {
            start: Some(6000),
            fixed: false,
            trigger_id: 7,
            author: "ops".to_string(),
            comment: "kernel upgrade".to_string(),
            minutes: 5,
        };
        let host = f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &dt).unwrap();
        let svc = f.format_downtime(CommandId::ScheduleSvcDowntime, "web01", Some("HTTP"), &dt).unwrap();
        assert_eq!(
            svc.line(),
            "[5000] SCHEDULE_SVC_DOWNTIME;web01;HTTP;6000;6300;0;7;300;ops;kernel upgrade\n"
        );
        assert_eq!(fields(svc.line()).len(), fields(host.line()).len() + 1);
        assert_eq!(fields(svc.line())[2], "HTTP");
    }

    #[test]
    fn end_time_and_duration_follow_minutes() {
        let f = CommandFormatter::with_clock(FixedClock(0));
        for minutes in [0, 1, 30, 1440, -10] {
            let dt = Downtime {
                start: Some(1_700_000_000),
                ..Downtime::minutes(minutes)
            };
            let record = f.format_downtime(CommandId::ScheduleHostgroupHostDowntime, "int-servers", None, &dt).unwrap();
            let fields = fields(record.line());
            let start: i64 = fields[2].parse().unwrap();
            let end: i64 = fields[3].parse().unwrap();
            let duration: i64 = fields[6].parse().unwrap();
            assert_eq!(end, start + minutes * 60);
            assert_eq!(duration, minutes * 60);
        }
    }

    #[test]
    fn start_defaults_to_entry_time() {
        let f = CommandFormatter::with_clock(FixedClock(4242));
        let record = f.format_downtime(
            CommandId::ScheduleServicegroupSvcDowntime,
            "httpservers",
            None,
            &Downtime::minutes(1),
        )
        .unwrap();
        assert_eq!(
            record.line(),
            "[4242] SCHEDULE_SERVICEGROUP_SVC_DOWNTIME;httpservers;4242;4302;1;0;60;func;Scheduling downtime\n"
        );
    }

    #[test]
    fn rendering_is_deterministic_with_fixed_time() {
        let f = CommandFormatter::with_clock(FixedClock(1000));
        let dt = Downtime {
            start: Some(1000),
            ..Downtime::default()
        };
        let a = f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &dt).unwrap();
        let b = f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &dt).unwrap();
        assert_eq!(a.line().as_bytes(), b.line().as_bytes());
    }

    #[test]
    fn notification_lines() {
        let f = CommandFormatter::with_clock(FixedClock(2000));
        assert_eq!(
            f.format_notification(CommandId::DisableHostNotifications, "web01", None).unwrap()
                .line(),
            "[2000] DISABLE_HOST_NOTIFICATIONS;web01\n"
        );
        assert_eq!(
            f.format_notification(CommandId::EnableSvcNotifications, "web01", Some("HTTP")).unwrap()
                .line(),
            "[2000] ENABLE_SVC_NOTIFICATIONS;web01;HTTP\n"
        );
    }

    #[test]
    fn render_fans_out_per_service_in_order() {
        let f = CommandFormatter::with_clock(FixedClock(1000));
        let request = CommandRequest::new(CommandId::ScheduleSvcDowntime, "web01")
            .with_services(["a", "b", "c"])
            .with_downtime(Downtime {
                start: Some(1000),
                ..Downtime::minutes(30)
            });
        let records = f.render(&request).unwrap();
        assert_eq!(records.len(), 3);
        let services: Vec<_> = records.iter().map(|r| r.service().unwrap()).collect();
        assert_eq!(services, ["a", "b", "c"]);
        for record in &records {
            let service = record.service().unwrap();
            assert_eq!(
                record.line(),
                format!(
                    "[1000] SCHEDULE_SVC_DOWNTIME;web01;{};1000;2800;1;0;1800;func;Scheduling downtime\n",
                    service
                )
            );
        }
    }

    #[test]
    fn render_without_services_gives_one_line() {
        let f = CommandFormatter::with_clock(FixedClock(3000));
        let request = CommandRequest::new(CommandId::EnableHostgroupSvcNotifications, "linux-servers");
        let records = f.render(&request).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].line(),
            "[3000] ENABLE_HOSTGROUP_SVC_NOTIFICATIONS;linux-servers\n"
        );
    }

    #[test]
    fn render_rejects_service_command_without_services() {
        let f = CommandFormatter::with_clock(FixedClock(3000));
        let request = CommandRequest::new(CommandId::DisableSvcNotifications, "web01");
        assert!(matches!(
            f.render(&request),
            Err(NagiosError::MissingService(CommandId::DisableSvcNotifications))
        ));
    }

    #[test]
    fn a_record_is_always_exactly_one_line() {
        let f = CommandFormatter::with_clock(FixedClock(1));
        let injected = Downtime {
            start: Some(1),
            comment: "x\n[1] SHUTDOWN_PROGRAM".to_string(),
            ..Downtime::default()
        };
        assert!(matches!(
            f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &injected),
            Err(NagiosError::InvalidField { field: "comment", .. })
        ));
        assert!(matches!(
            f.format_notification(CommandId::EnableHostNotifications, "web01\n", None),
            Err(NagiosError::InvalidField { field: "target", .. })
        ));
        assert!(matches!(
            f.format_notification(CommandId::EnableSvcNotifications, "web01", Some("HTTP;SSH")),
            Err(NagiosError::InvalidField { field: "service", .. })
        ));

        let ok = Downtime {
            comment: "disk swap; ticket 42".to_string(),
            ..Downtime::minutes(1)
        };
        let record = f
            .format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &ok)
            .unwrap();
        assert_eq!(record.line().lines().count(), 1);
        assert!(record.line().ends_with(";func;disk swap; ticket 42\n"));
    }

    #[test]
    fn overflowing_window_is_an_error() {
        let f = CommandFormatter::with_clock(FixedClock(1));
        assert!(matches!(
            f.format_downtime(
                CommandId::ScheduleHostDowntime,
                "web01",
                None,
                &Downtime::minutes(i64::MAX)
            ),
            Err(NagiosError::DurationOutOfRange { minutes: i64::MAX })
        ));
        let late = Downtime {
            start: Some(i64::MAX - 10),
            ..Downtime::minutes(1)
        };
        assert!(matches!(
            f.format_downtime(CommandId::ScheduleHostDowntime, "web01", None, &late),
            Err(NagiosError::DurationOutOfRange { .. })
        ));
    }

    #[test]
    fn render_rejects_services_on_group_commands() {
        let f = CommandFormatter::with_clock(FixedClock(1));
        let request = CommandRequest::new(CommandId::ScheduleHostgroupHostDowntime, "g")
            .with_services(["HTTP"]);
        assert!(matches!(
            f.render(&request),
            Err(NagiosError::UnexpectedService(CommandId::ScheduleHostgroupHostDowntime))
        ));
    }

    struct TickingClock(Cell<i64>);

    impl Clock for TickingClock {
        fn now(&self) -> i64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }
    }

    #[test]
    fn render_samples_the_clock_once_per_request() {
        let f = CommandFormatter::with_clock(TickingClock(Cell::new(100)));
        let request = CommandRequest::new(CommandId::ScheduleSvcDowntime, "web01")
            .with_services(["HTTP", "SSH"]);
        let records = f.render(&request).unwrap();
        assert!(records.iter().all(|r| r.entry_time() == 100));
        assert!(records[0].line().contains(";100;1900;"));

        // a later request gets a fresh timestamp rather than a stale default
        let again = f.render(&request).unwrap();
        assert!(again.iter().all(|r| r.entry_time() == 101));
    }
}
