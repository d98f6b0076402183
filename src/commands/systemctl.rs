//! Type-safe arguments for `systemctl`.
//!
//! # Verb to command mapping
//!
//! | Verb           | Command line                         | Mutating |
//! |----------------|--------------------------------------|----------|
//! | `DaemonReload` | `systemctl daemon-reload`            | yes      |
//! | `Enable`       | `systemctl enable <unit>`            | yes      |
//! | `Start`        | `systemctl start <unit>`             | yes      |
//! | `DisableNow`   | `systemctl disable --now <unit>`     | yes      |
//! | `IsEnabled`    | `systemctl is-enabled --quiet <unit>`| no       |
//! | `IsActive`     | `systemctl is-active --quiet <unit>` | no       |

use strum::Display;

use crate::command_traits::CommandArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SystemctlVerb {
    DaemonReload,
    Enable,
    Start,
    #[strum(serialize = "disable")]
    DisableNow,
    IsEnabled,
    IsActive,
}

impl SystemctlVerb {
    pub const fn is_query(self) -> bool {
        matches!(self, Self::IsEnabled | Self::IsActive)
    }
}

/// One `systemctl` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemctlArgs {
    pub verb: SystemctlVerb,
    /// Target unit; `None` only for `DaemonReload`
    pub unit: Option<String>,
}

impl SystemctlArgs {
    pub fn daemon_reload() -> Self {
        Self {
            verb: SystemctlVerb::DaemonReload,
            unit: None,
        }
    }

    pub fn unit(verb: SystemctlVerb, unit: impl Into<String>) -> Self {
        Self {
            verb,
            unit: Some(unit.into()),
        }
    }
}

impl CommandArgs for SystemctlArgs {
    fn program(&self) -> &'static str {
        "systemctl"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![self.verb.to_string()];
        match self.verb {
            SystemctlVerb::DisableNow => args.push("--now".to_string()),
            SystemctlVerb::IsEnabled | SystemctlVerb::IsActive => {
                args.push("--quiet".to_string())
            }
            _ => {}
        }
        if let Some(ref unit) = self.unit {
            args.push(unit.clone());
        }
        args
    }

    fn is_mutating(&self) -> bool {
        !self.verb.is_query()
    }
}
