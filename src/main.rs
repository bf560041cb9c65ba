use clap::{Args, Parser, Subcommand};
use db_backup_manager::config::{self, Config, Engine, TargetConfig};
use db_backup_manager::managers::backup::{BackupManager, CycleReport};
use db_backup_manager::managers::logging::{self, LogGuard, LoggingConfig};
use db_backup_manager::managers::restore::{self, RestoreManager};
use db_backup_manager::managers::scheduler::Scheduler;
use db_backup_manager::utils::locker::with_instance_lock;
use db_backup_manager::utils::preflight::missing_tools;
use db_backup_manager::utils::selector::human_size;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_SELECTION: i32 = 2;

const LOCK_NAME: &str = "cycle";

#[derive(Parser)]
#[command(name = "db-backup-manager")]
#[command(about = "Backup and restore PostgreSQL and MySQL/MariaDB databases", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "databases.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backup cycle over all configured targets
    Run,

    /// Run backup cycles forever
    Daemon {
        /// Seconds between cycles (defaults to global.interval_seconds)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// List dump files for a database
    List(TargetArgs),

    /// Restore a database from a dump file
    Restore {
        #[command(flatten)]
        target: TargetArgs,

        /// Dump file to restore (defaults to the newest matching file)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate configuration file and check required tools
    Validate,
}

#[derive(Args)]
struct TargetArgs {
    /// Database engine: postgres, mysql or mariadb
    #[arg(long = "type")]
    engine: Engine,

    /// Container name, required when several targets share an engine
    #[arg(long)]
    container: Option<String>,

    /// Database name (defaults to the target's db)
    #[arg(long)]
    db: Option<String>,

    /// Override the target's backup directory
    #[arg(long)]
    backup_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let code = run(cli);
    std::process::exit(code);
}

fn run(cli: Cli) -> i32 {
    match cli.command {
        Commands::Run => {
            let (config, _guard) = load_for_backups(&cli.config);
            let manager = BackupManager::new(config.clone());

            match with_instance_lock(&config.global.lock_directory, LOCK_NAME, || manager.run_cycle()) {
                Ok(report) => exit_code_for(&report),
                Err(e) => {
                    error!("{:#}", e);
                    EXIT_FAILURE
                }
            }
        }

        Commands::Daemon { interval } => {
            let (config, _guard) = load_for_backups(&cli.config);
            let interval = interval.unwrap_or(config.global.interval_seconds).max(1);
            let manager = BackupManager::new(config.clone());

            let scheduler = Scheduler::new(Duration::from_secs(interval));
            spawn_signal_watcher(scheduler.stop_handle());

            info!("Daemon started, {} target(s), interval {}s", manager.targets().len(), interval);
            scheduler.run(|| {
                if let Err(e) =
                    with_instance_lock(&config.global.lock_directory, LOCK_NAME, || manager.run_cycle())
                {
                    warn!("Skipping cycle: {:#}", e);
                }
            });
            info!("Daemon stopped");
            EXIT_OK
        }

        Commands::List(args) => {
            logging::init_console_logging();
            let target = match resolve_target(&cli.config, &args) {
                Ok(target) => target,
                Err(code) => return code,
            };

            let Some(database) = args.db.clone().or_else(|| target.database.clone()) else {
                eprintln!("A database name is required (--db or db in the configuration)");
                return EXIT_SELECTION;
            };

            let files = restore::list_backups(&target, &database);
            if files.is_empty() {
                println!("(sin backups)");
            }
            for file in files {
                println!(
                    "{}\t{}\t{}",
                    file.modified_local().format("%Y-%m-%d %H:%M:%S"),
                    human_size(file.size),
                    file.path.display()
                );
            }
            EXIT_OK
        }

        Commands::Restore { target: args, file } => {
            logging::init_console_logging();
            let (target, timeout) = match load_config(&cli.config)
                .and_then(|config| select(&config, &args).map(|t| (t, config.global.command_timeout())))
            {
                Ok(selected) => selected,
                Err(code) => return code,
            };

            let manager = RestoreManager::new(timeout);
            match manager.restore(&target, args.db.as_deref(), file.as_deref()) {
                Some(used) => {
                    println!("Restored from {}", used.display());
                    EXIT_OK
                }
                None => {
                    eprintln!("Restore failed, see the log for details");
                    EXIT_FAILURE
                }
            }
        }

        Commands::Validate => {
            logging::init_console_logging();
            let config = match config::load_config(&cli.config) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Configuration is invalid: {}", e);
                    return EXIT_FAILURE;
                }
            };

            println!("Configuration is valid: {} target(s)", config.databases.len());
            for target in &config.databases {
                println!("  {}", target);
                let missing = missing_tools(target);
                if !missing.is_empty() {
                    println!("    warning: missing tools on PATH: {}", missing.join(", "));
                }
            }
            EXIT_OK
        }
    }
}

/// Load the configuration for run/daemon; an invalid file yields no targets
fn load_for_backups(path: &Path) -> (Config, Option<LogGuard>) {
    match config::load_config(path) {
        Ok(config) => {
            let guard = match logging::init_logging(&LoggingConfig::from_global(&config.global)) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    logging::init_console_logging();
                    warn!("File logging unavailable, using console only: {:#}", e);
                    None
                }
            };
            (config, guard)
        }
        Err(e) => {
            logging::init_console_logging();
            error!("Failed to load configuration from {:?}: {}", path, e);
            (Config::default(), None)
        }
    }
}

fn load_config(path: &Path) -> Result<Config, i32> {
    config::load_config(path).map_err(|e| {
        eprintln!("Failed to load configuration from {:?}: {}", path, e);
        EXIT_SELECTION
    })
}

fn select(config: &Config, args: &TargetArgs) -> Result<TargetConfig, i32> {
    let mut target = config::select_target(config, args.engine, args.container.as_deref())
        .map_err(|e| {
            eprintln!("{}", e);
            EXIT_SELECTION
        })?
        .clone();

    if let Some(ref dir) = args.backup_dir {
        target.backup_dir = config::expand_tilde(dir);
    }
    Ok(target)
}

fn resolve_target(path: &Path, args: &TargetArgs) -> Result<TargetConfig, i32> {
    load_config(path).and_then(|config| select(&config, args))
}

fn exit_code_for(report: &CycleReport) -> i32 {
    if report.has_failures() {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}

/// Set `stop` on Ctrl-C so the daemon exits after the current cycle
fn spawn_signal_watcher(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Signal handling unavailable: {}", e);
                return;
            }
        };

        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            info!("Shutdown requested, stopping after the current cycle");
            stop.store(true, Ordering::SeqCst);
        }
    });
}
