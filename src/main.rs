//! Client Timer - main entry point

use anyhow::Result;
use tracing::{debug, error, info, warn};

use client_timer::cli::{Cli, Commands};
use client_timer::{
    enable_dry_run, process_guard, FsDirectoryProvisioner, JobSpec, Reconciler,
    SystemdUnitManager,
};

/// Initialize the logger; RUST_LOG overrides the default `info` level
fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logger();

    // Interrupted systemctl calls get cleaned up instead of orphaned
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.dry_run {
        info!("Dry-run mode: no unit files or services will be changed");
        enable_dry_run();
    }

    let mut reconciler = Reconciler::new(
        SystemdUnitManager::new(&cli.unit_dir),
        FsDirectoryProvisioner,
    );
    if let Some(version) = cli.tool_version {
        reconciler = reconciler.with_tool_version(version);
    }

    match cli.command {
        Commands::Add { job } => {
            let spec = job.resolve()?;
            reconciler.apply(&spec)?;
            println!(
                "✓ {} installed, enabled and started",
                spec.unit_name(client_timer::UnitKind::Timer)
            );
        }
        Commands::Remove { job_name } => {
            reconciler.remove(&job_name)?;
            println!("✓ {} units removed", job_name);
        }
        Commands::Render { job } => {
            let spec = job.resolve()?;
            let units = reconciler.render(&spec)?;
            println!("# {}", units.service.name());
            print!("{}", units.service.render());
            println!();
            println!("# {}", units.timer.name());
            print!("{}", units.timer.render());
        }
        Commands::Validate { config } => {
            info!("Validating configuration file: {:?}", config);
            let spec = JobSpec::load_from_file(&config)?;
            spec.validate()?;
            println!("✓ Configuration file is valid: {:?}", config);
        }
        Commands::Status { job_name } => {
            let state = reconciler.state(&job_name)?;
            println!("{}: {}", job_name, state);
        }
    }

    Ok(())
}
