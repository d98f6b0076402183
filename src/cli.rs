use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::{JobSpec, DEFAULT_JOB_NAME};
use crate::systemd::DEFAULT_UNIT_DIR;

/// Client Timer - run the Chef Infra Client periodically from a systemd timer
#[derive(Parser, Debug)]
#[command(name = "client-timer")]
#[command(about = "Install, render and remove the systemd timer that runs the Chef Infra Client")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: log unit writes and systemctl calls without making changes.
    ///
    /// Read-only queries (is-enabled, is-active) still run so `status` and the
    /// preview reflect the real system.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Directory unit files are written to
    #[arg(long, global = true, default_value = DEFAULT_UNIT_DIR)]
    pub unit_dir: PathBuf,

    /// Version used for the license flag check (defaults to this tool's version)
    #[arg(long, global = true)]
    pub tool_version: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the service and timer units, then enable and start the timer
    Add {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Stop and delete both units
    Remove {
        /// Job whose units should be removed
        #[arg(short, long, default_value = DEFAULT_JOB_NAME)]
        job_name: String,
    },
    /// Print the generated unit files without installing them
    Render {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Validate a job configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
    /// Show whether the job's timer is installed, enabled and running
    Status {
        #[arg(short, long, default_value = DEFAULT_JOB_NAME)]
        job_name: String,
    },
}

/// Job settings: an optional JSON file plus per-field overrides
#[derive(Args, Debug, Default, Clone)]
pub struct JobArgs {
    /// JSON job configuration; missing fields take their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base name of the .service/.timer pair
    #[arg(short, long)]
    pub job_name: Option<String>,

    /// Owner of the log directory
    #[arg(short, long)]
    pub user: Option<String>,

    /// Delay after boot before the first run (OnBootSec)
    #[arg(long)]
    pub delay_after_boot: Option<String>,

    /// Time between runs (OnUnitActiveSec)
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Maximum random delay in seconds (RandomizedDelaySec)
    #[arg(short, long, allow_negative_numbers = true)]
    pub splay: Option<i64>,

    /// Unit description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Pass `--chef-license accept` when the client supports it
    #[arg(long)]
    pub accept_chef_license: bool,

    /// Skip runs while the machine is on battery
    #[arg(long)]
    pub no_battery: bool,

    #[arg(long)]
    pub log_directory: Option<PathBuf>,

    #[arg(long)]
    pub log_file_name: Option<String>,

    #[arg(long)]
    pub chef_binary_path: Option<PathBuf>,

    /// Extra client argument, repeatable; replaces the configured list
    #[arg(long = "daemon-option", allow_hyphen_values = true)]
    pub daemon_options: Vec<String>,
}

impl JobArgs {
    /// Load the configuration file (or defaults) and apply the overrides
    pub fn resolve(&self) -> Result<JobSpec> {
        let mut spec = match self.config {
            Some(ref path) => JobSpec::load_from_file(path)?,
            None => JobSpec::default(),
        };

        if let Some(ref v) = self.job_name {
            spec.job_name = v.clone();
        }
        if let Some(ref v) = self.user {
            spec.user = v.clone();
        }
        if let Some(ref v) = self.delay_after_boot {
            spec.delay_after_boot = v.clone();
        }
        if let Some(ref v) = self.interval {
            spec.interval = v.clone();
        }
        if let Some(v) = self.splay {
            spec.splay = v;
        }
        if let Some(ref v) = self.description {
            spec.description = v.clone();
        }
        if self.accept_chef_license {
            spec.accept_chef_license = true;
        }
        if self.no_battery {
            spec.run_on_battery = false;
        }
        if let Some(ref v) = self.log_directory {
            spec.log_directory = v.clone();
        }
        if let Some(ref v) = self.log_file_name {
            spec.log_file_name = v.clone();
        }
        if let Some(ref v) = self.chef_binary_path {
            spec.chef_binary_path = v.clone();
        }
        if !self.daemon_options.is_empty() {
            spec.daemon_options = self.daemon_options.clone();
        }

        Ok(spec)
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
