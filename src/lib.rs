//! Client Timer Library
//!
//! Generates the systemd `.service`/`.timer` pair that runs the Chef Infra
//! Client periodically, and reconciles a machine's units against it.

pub mod builder;
pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config_file;
pub mod error;
pub mod manager;
pub mod process_guard;
pub mod provision;
pub mod reconciler;
pub mod systemd;
pub mod types;
pub mod unit;
pub mod version;

// Re-export main types for convenience
pub use builder::{build, build_command, UnitPair};
pub use command_runner::{run_command_safe, CommandOutput};
pub use command_traits::{disable_dry_run, enable_dry_run, is_dry_run, CommandArgs};
pub use config_file::JobSpec;
pub use error::{Result, TimerError};
pub use manager::{DirectoryProvisioner, DirectoryRequest, UnitManager};
pub use process_guard::{ChildRegistry, CommandProcessGroup};
pub use provision::FsDirectoryProvisioner;
pub use reconciler::Reconciler;
pub use systemd::SystemdUnitManager;
pub use types::{UnitAction, UnitKind, UnitState};
pub use unit::{Section, UnitDefinition, UnitValue};
pub use version::{license_flag_supported, LICENSE_FLAG_MIN_VERSION, TOOL_VERSION};
