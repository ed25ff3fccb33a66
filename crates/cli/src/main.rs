//! Burp Headless CLI - start, stop and inspect a headless Burp Suite instance
//! Every command prints its result as pretty JSON on stdout.

mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use burp_headless_core::application::constants::{
    DEFAULT_HEAP_SIZE_MB, DEFAULT_JAVA_PATH, DEFAULT_PROJECT_DIR, DEFAULT_PROJECT_NAME,
    DEFAULT_PROXY_PORT, DEFAULT_SCAN_THREADS,
};
use burp_headless_core::application::write_config;
use burp_headless_core::domain::{
    OutputMode, ScanConfig, StartOutcome, StartRequest, SupervisorSettings,
};
use burp_headless_core::port::time_provider::SystemTimeProvider;
use burp_headless_core::Supervisor;
use burp_headless_infra_system::{JsonConfigStore, JsonSessionStore, SubprocessLauncher};

/// Liveness check interval while `run` supervises in the foreground
const RUN_STATUS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "burp-headless")]
#[command(about = "Burp Suite Community headless wrapper", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to the Burp Suite JAR (required)
    #[arg(long, global = true, env = "BURP_HEADLESS_JAR")]
    jar: Option<String>,

    /// Directory for project, log and session files
    #[arg(long, global = true, env = "BURP_HEADLESS_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
    project_dir: String,

    /// Java executable
    #[arg(long, global = true, default_value = DEFAULT_JAVA_PATH)]
    java: PathBuf,

    /// JVM heap size in MiB
    #[arg(long, global = true, default_value_t = DEFAULT_HEAP_SIZE_MB)]
    heap_size: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Start Burp Suite detached (output goes to <project-dir>/<project-name>.log)
    Start(StartArgs),

    /// Stop the instance started by `start`
    Stop,

    /// Show whether the instance is running
    Status,

    /// Write a Burp configuration file
    Config {
        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_PROXY_PORT)]
        proxy_port: u16,

        #[arg(long, default_value_t = DEFAULT_SCAN_THREADS)]
        spider_threads: u32,

        #[arg(long, default_value_t = DEFAULT_SCAN_THREADS)]
        scanner_threads: u32,
    },

    /// Start Burp Suite in the foreground and stop it on Ctrl+C
    Run(StartArgs),
}

#[derive(Args)]
struct StartArgs {
    /// Proxy listener port
    #[arg(short, long, default_value_t = DEFAULT_PROXY_PORT)]
    port: u16,

    /// Project name (project file is <name>.burp)
    #[arg(long, default_value = DEFAULT_PROJECT_NAME)]
    project_name: String,

    /// Existing Burp config file (overrides --port)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl From<StartArgs> for StartRequest {
    fn from(args: StartArgs) -> Self {
        StartRequest {
            port: args.port,
            project_name: args.project_name,
            config_file: args.config,
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn build_supervisor(global: &GlobalArgs, output_mode: OutputMode) -> Result<Supervisor> {
    let jar = global
        .jar
        .as_deref()
        .context("--jar is required (or set BURP_HEADLESS_JAR)")?;

    let settings = SupervisorSettings::new(expand(jar), expand(&global.project_dir))
        .with_java_path(&global.java)
        .with_heap_size_mb(global.heap_size)
        .with_output_mode(output_mode);

    let session_store = Arc::new(JsonSessionStore::new(settings.session_file()));

    Supervisor::new(
        settings,
        Arc::new(SubprocessLauncher::new()),
        Arc::new(JsonConfigStore::new()),
        session_store,
        Arc::new(SystemTimeProvider),
    )
    .context("Failed to initialize supervisor")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Start Burp Suite and supervise it until `shutdown` resolves or it exits
///
/// `shutdown` is listened to from the first poll, so a signal that arrives
/// during the startup settle stops the child as soon as it is tracked.
async fn run_foreground<F>(
    mut supervisor: Supervisor,
    request: StartRequest,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);

    let (outcome, interrupted) = {
        let start = supervisor.start(request);
        tokio::pin!(start);

        let mut interrupted = false;
        let outcome = loop {
            tokio::select! {
                biased;
                signal = &mut shutdown, if !interrupted => {
                    signal.context("Failed to listen for Ctrl+C")?;
                    info!("Shutdown signal received during startup, stopping once launched");
                    interrupted = true;
                }
                outcome = &mut start => break outcome,
            }
        };
        (outcome, interrupted)
    };

    print_json(&outcome)?;
    if !matches!(outcome, StartOutcome::Started { .. }) {
        return Ok(());
    }
    if interrupted {
        print_json(&supervisor.stop().await)?;
        return Ok(());
    }

    info!("Press Ctrl+C to stop Burp Suite");

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("Failed to listen for Ctrl+C")?;
                info!("Shutdown signal received, stopping Burp Suite...");
                print_json(&supervisor.stop().await)?;
                return Ok(());
            }
            _ = tokio::time::sleep(RUN_STATUS_INTERVAL) => {
                let status = supervisor.get_status();
                if !status.is_running() {
                    print_json(&status)?;
                    // reap and clear the session record
                    supervisor.stop().await;
                    return Ok(());
                }
            }
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Start(args) => {
            let mut supervisor = build_supervisor(&cli.global, OutputMode::LogFile)?;
            supervisor.restore_session()?;
            print_json(&supervisor.start(args.into()).await)?;
        }

        Commands::Stop => {
            let mut supervisor = build_supervisor(&cli.global, OutputMode::LogFile)?;
            supervisor.restore_session()?;
            print_json(&supervisor.stop().await)?;
        }

        Commands::Status => {
            let mut supervisor = build_supervisor(&cli.global, OutputMode::LogFile)?;
            supervisor.restore_session()?;
            print_json(&supervisor.get_status())?;
        }

        Commands::Config {
            output,
            proxy_port,
            spider_threads,
            scanner_threads,
        } => {
            let config = ScanConfig::new(proxy_port, spider_threads, scanner_threads)?;
            let path = write_config(&JsonConfigStore::new(), &output, &config)?;
            print_json(&json!({ "config_file": path }))?;
        }

        Commands::Run(args) => {
            let mut supervisor = build_supervisor(&cli.global, OutputMode::Piped)?;
            supervisor.restore_session()?;
            run_foreground(supervisor, args.into(), tokio::signal::ctrl_c()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
