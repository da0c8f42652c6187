use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NagiosError;

/// What a command acts on. Decides which identifier the target field holds
/// and whether a service field follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Host,
    HostServices,
    Service,
    HostGroupHosts,
    HostGroupServices,
    ServiceGroupHosts,
    ServiceGroupServices,
}

impl Scope {
    pub const ALL: [Scope; 7] = [
        Scope::Host,
        Scope::HostServices,
        Scope::Service,
        Scope::HostGroupHosts,
        Scope::HostGroupServices,
        Scope::ServiceGroupHosts,
        Scope::ServiceGroupServices,
    ];

    pub fn takes_service(self) -> bool {
        matches!(self, Scope::Service)
    }
}

/// The Nagios external commands this tool knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandId {
    ScheduleSvcDowntime,
    ScheduleHostDowntime,
    ScheduleHostgroupHostDowntime,
    ScheduleHostgroupSvcDowntime,
    ScheduleServicegroupHostDowntime,
    ScheduleServicegroupSvcDowntime,
    DisableHostSvcNotifications,
    DisableHostNotifications,
    DisableSvcNotifications,
    DisableHostgroupHostNotifications,
    DisableHostgroupSvcNotifications,
    DisableServicegroupHostNotifications,
    DisableServicegroupSvcNotifications,
    EnableHostNotifications,
    EnableHostSvcNotifications,
    EnableSvcNotifications,
    EnableHostgroupHostNotifications,
    EnableHostgroupSvcNotifications,
    EnableServicegroupHostNotifications,
    EnableServicegroupSvcNotifications,
}

impl CommandId {
    pub const ALL: [CommandId; 20] = [
        CommandId::ScheduleSvcDowntime,
        CommandId::ScheduleHostDowntime,
        CommandId::ScheduleHostgroupHostDowntime,
        CommandId::ScheduleHostgroupSvcDowntime,
        CommandId::ScheduleServicegroupHostDowntime,
        CommandId::ScheduleServicegroupSvcDowntime,
        CommandId::DisableHostSvcNotifications,
        CommandId::DisableHostNotifications,
        CommandId::DisableSvcNotifications,
        CommandId::DisableHostgroupHostNotifications,
        CommandId::DisableHostgroupSvcNotifications,
        CommandId::DisableServicegroupHostNotifications,
        CommandId::DisableServicegroupSvcNotifications,
        CommandId::EnableHostNotifications,
        CommandId::EnableHostSvcNotifications,
        CommandId::EnableSvcNotifications,
        CommandId::EnableHostgroupHostNotifications,
        CommandId::EnableHostgroupSvcNotifications,
        CommandId::EnableServicegroupHostNotifications,
        CommandId::EnableServicegroupSvcNotifications,
    ];

    /// The exact name Nagios expects in the command file.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandId::ScheduleSvcDowntime => "SCHEDULE_SVC_DOWNTIME",
            CommandId::ScheduleHostDowntime => "SCHEDULE_HOST_DOWNTIME",
            CommandId::ScheduleHostgroupHostDowntime => "SCHEDULE_HOSTGROUP_HOST_DOWNTIME",
            CommandId::ScheduleHostgroupSvcDowntime => "SCHEDULE_HOSTGROUP_SVC_DOWNTIME",
            CommandId::ScheduleServicegroupHostDowntime => "SCHEDULE_SERVICEGROUP_HOST_DOWNTIME",
            CommandId::ScheduleServicegroupSvcDowntime => "SCHEDULE_SERVICEGROUP_SVC_DOWNTIME",
            CommandId::DisableHostSvcNotifications => "DISABLE_HOST_SVC_NOTIFICATIONS",
            CommandId::DisableHostNotifications => "DISABLE_HOST_NOTIFICATIONS",
            CommandId::DisableSvcNotifications => "DISABLE_SVC_NOTIFICATIONS",
            CommandId::DisableHostgroupHostNotifications => "DISABLE_HOSTGROUP_HOST_NOTIFICATIONS",
            CommandId::DisableHostgroupSvcNotifications => "DISABLE_HOSTGROUP_SVC_NOTIFICATIONS",
            CommandId::DisableServicegroupHostNotifications => {
                "DISABLE_SERVICEGROUP_HOST_NOTIFICATIONS"
            }
            CommandId::DisableServicegroupSvcNotifications => {
                "DISABLE_SERVICEGROUP_SVC_NOTIFICATIONS"
            }
            CommandId::EnableHostNotifications => "ENABLE_HOST_NOTIFICATIONS",
            CommandId::EnableHostSvcNotifications => "ENABLE_HOST_SVC_NOTIFICATIONS",
            CommandId::EnableSvcNotifications => "ENABLE_SVC_NOTIFICATIONS",
            CommandId::EnableHostgroupHostNotifications => "ENABLE_HOSTGROUP_HOST_NOTIFICATIONS",
            CommandId::EnableHostgroupSvcNotifications => "ENABLE_HOSTGROUP_SVC_NOTIFICATIONS",
            CommandId::EnableServicegroupHostNotifications => {
                "ENABLE_SERVICEGROUP_HOST_NOTIFICATIONS"
            }
            CommandId::EnableServicegroupSvcNotifications => {
                "ENABLE_SERVICEGROUP_SVC_NOTIFICATIONS"
            }
        }
    }

    pub fn scope(self) -> Scope {
        use CommandId::*;
        match self {
            ScheduleHostDowntime | DisableHostNotifications | EnableHostNotifications => {
                Scope::Host
            }
            DisableHostSvcNotifications | EnableHostSvcNotifications => Scope::HostServices,
            ScheduleSvcDowntime | DisableSvcNotifications | EnableSvcNotifications => {
                Scope::Service
            }
            ScheduleHostgroupHostDowntime
            | DisableHostgroupHostNotifications
            | EnableHostgroupHostNotifications => Scope::HostGroupHosts,
            ScheduleHostgroupSvcDowntime
            | DisableHostgroupSvcNotifications
            | EnableHostgroupSvcNotifications => Scope::HostGroupServices,
            ScheduleServicegroupHostDowntime
            | DisableServicegroupHostNotifications
            | EnableServicegroupHostNotifications => Scope::ServiceGroupHosts,
            ScheduleServicegroupSvcDowntime
            | DisableServicegroupSvcNotifications
            | EnableServicegroupSvcNotifications => Scope::ServiceGroupServices,
        }
    }

    pub fn is_downtime(self) -> bool {
        self.as_str().starts_with("SCHEDULE_")
    }

    /// Downtime command for a scope. There is no host-services downtime.
    pub fn downtime(scope: Scope) -> Result<CommandId, NagiosError> {
        match scope {
            Scope::Host => Ok(CommandId::ScheduleHostDowntime),
            Scope::Service => Ok(CommandId::ScheduleSvcDowntime),
            Scope::HostGroupHosts => Ok(CommandId::ScheduleHostgroupHostDowntime),
            Scope::HostGroupServices => Ok(CommandId::ScheduleHostgroupSvcDowntime),
            Scope::ServiceGroupHosts => Ok(CommandId::ScheduleServicegroupHostDowntime),
            Scope::ServiceGroupServices => Ok(CommandId::ScheduleServicegroupSvcDowntime),
            Scope::HostServices => Err(NagiosError::UnsupportedScope {
                action: "downtime",
                scope,
            }),
        }
    }

    /// Notification toggle for a scope; every scope has one.
    pub fn notifications(enable: bool, scope: Scope) -> CommandId {
        use CommandId::*;
        match (enable, scope) {
            (true, Scope::Host) => EnableHostNotifications,
            (true, Scope::HostServices) => EnableHostSvcNotifications,
            (true, Scope::Service) => EnableSvcNotifications,
            (true, Scope::HostGroupHosts) => EnableHostgroupHostNotifications,
            (true, Scope::HostGroupServices) => EnableHostgroupSvcNotifications,
            (true, Scope::ServiceGroupHosts) => EnableServicegroupHostNotifications,
            (true, Scope::ServiceGroupServices) => EnableServicegroupSvcNotifications,
            (false, Scope::Host) => DisableHostNotifications,
            (false, Scope::HostServices) => DisableHostSvcNotifications,
            (false, Scope::Service) => DisableSvcNotifications,
            (false, Scope::HostGroupHosts) => DisableHostgroupHostNotifications,
            (false, Scope::HostGroupServices) => DisableHostgroupSvcNotifications,
            (false, Scope::ServiceGroupHosts) => DisableServicegroupHostNotifications,
            (false, Scope::ServiceGroupServices) => DisableServicegroupSvcNotifications,
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Host => "host",
            Scope::HostServices => "host-svc",
            Scope::Service => "svc",
            Scope::HostGroupHosts => "hostgroup-host",
            Scope::HostGroupServices => "hostgroup-svc",
            Scope::ServiceGroupHosts => "servicegroup-host",
            Scope::ServiceGroupServices => "servicegroup-svc",
        };
        f.write_str(name)
    }
}

impl FromStr for CommandId {
    type Err = NagiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| NagiosError::UnknownCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for id in CommandId::ALL {
            assert_eq!(id.as_str().parse::<CommandId>().unwrap(), id);
        }
        assert!("SCHEDULE_EVERYTHING".parse::<CommandId>().is_err());
    }

    #[test]
    fn serde_uses_nagios_names() {
        let json = serde_json::to_string(&CommandId::ScheduleHostgroupSvcDowntime).unwrap();
        assert_eq!(json, "\"SCHEDULE_HOSTGROUP_SVC_DOWNTIME\"");
        let json = serde_json::to_string(&CommandId::DisableHostSvcNotifications).unwrap();
        assert_eq!(json, "\"DISABLE_HOST_SVC_NOTIFICATIONS\"");
    }

    #[test]
    fn only_service_scope_takes_a_service() {
        let with_service: Vec<_> = CommandId::ALL
            .iter()
            .filter(|id| id.scope().takes_service())
            .map(|id| id.as_str())
            .collect();
        assert_eq!(
            with_service,
            [
                "SCHEDULE_SVC_DOWNTIME",
                "DISABLE_SVC_NOTIFICATIONS",
                "ENABLE_SVC_NOTIFICATIONS"
            ]
        );
    }

    #[test]
    fn scope_lookups_cover_every_command() {
        let mut found = Vec::new();
        for scope in Scope::ALL {
            if let Ok(id) = CommandId::downtime(scope) {
                assert!(id.is_downtime());
                assert_eq!(id.scope(), scope);
                found.push(id);
            }
            for enable in [true, false] {
                let id = CommandId::notifications(enable, scope);
                assert!(!id.is_downtime());
                assert_eq!(id.scope(), scope);
                found.push(id);
            }
        }
        assert_eq!(found.len(), CommandId::ALL.len());
    }

    #[test]
    fn host_services_has_no_downtime() {
        assert!(matches!(
            CommandId::downtime(Scope::HostServices),
            Err(NagiosError::UnsupportedScope { .. })
        ));
    }
}
