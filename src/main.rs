use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcs::{
    CameraCatalog, CameraId, EngineKind, RunOutcome, Session, SessionStatus, Shutdown,
};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};

/// RMCS - Host for a Remote Media Control Session
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Append diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Engine driving the session (loopback, playback)
    #[arg(short, long, default_value = "playback", value_parser = parse_engine)]
    engine: EngineKind,

    /// Camera catalog JSON file
    #[arg(long, value_name = "FILE")]
    cameras: Option<PathBuf>,

    /// Camera to select right after init
    #[arg(long, value_name = "ID", value_parser = parse_camera)]
    camera: Option<CameraId>,

    /// Status poll interval in milliseconds
    #[arg(long, default_value_t = rmcs::DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Upper bound for a graceful stop in seconds
    #[arg(long, default_value_t = rmcs::DEFAULT_STOP_TIMEOUT_SECS)]
    stop_timeout_secs: u64,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run until interrupted (Ctrl+C or SIGTERM; repeat to force quit)
    Run {
        /// Cameras to switch to, in order
        #[arg(short, long = "switch", value_name = "ID", value_parser = parse_camera)]
        switches: Vec<CameraId>,

        /// Delay before each switch in seconds
        #[arg(long, default_value_t = rmcs::DEFAULT_SWITCH_DELAY_SECS)]
        switch_delay_secs: u64,
    },

    /// Run until Enter is pressed
    Interactive,

    /// Print the camera catalog
    Cameras,
}

fn parse_engine(s: &str) -> std::result::Result<EngineKind, String> {
    s.parse().map_err(|e: rmcs::Error| e.to_string())
}

fn parse_camera(s: &str) -> std::result::Result<CameraId, String> {
    s.parse().map_err(|e: rmcs::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Configure logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    rmcs::logging::install(log_level, cli.log_file.as_deref())
        .context("Failed to configure logging")?;

    let catalog = match &cli.cameras {
        Some(path) => CameraCatalog::load(path)
            .with_context(|| format!("Failed to load camera catalog {}", path.display()))?,
        None => CameraCatalog::default(),
    };

    let command = cli.command.unwrap_or(Commands::Run {
        switches: Vec::new(),
        switch_delay_secs: rmcs::DEFAULT_SWITCH_DELAY_SECS,
    });

    if let Commands::Cameras = command {
        print_catalog(&catalog);
        return Ok(ExitCode::SUCCESS);
    }

    println!("=== RMCS ===");

    let mut builder = Session::builder()
        .engine_kind(cli.engine)
        .catalog(catalog)
        .poll_interval(cli.poll_interval_ms)
        .stop_timeout(cli.stop_timeout_secs);
    if let Some(camera) = cli.camera {
        builder = builder.initial_camera(camera);
    }

    // Initialize the session
    println!("Initializing RMCS...");
    let session = match builder.init().await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to initialize RMCS. Error code: {}", e.code());
            tracing::error!("Initialization failed: {}", e);
            return Ok(ExitCode::from(1));
        }
    };
    println!("RMCS initialized successfully!");
    println!("RMCS Status: {}", session.status());

    let shutdown = Shutdown::new();
    rmcs::spawn_signal_listener(shutdown.clone());

    let outcome = match command {
        Commands::Run {
            switches,
            switch_delay_secs,
        } => {
            if !switches.is_empty() {
                let session = session.clone();
                let shutdown = shutdown.clone();
                let delay = Duration::from_secs(switch_delay_secs);
                tokio::spawn(async move {
                    run_switches(&session, &shutdown, switches, delay).await;
                });
            }

            println!("\nRMCS is running. Press Ctrl+C to stop...");
            rmcs::run(&session, &shutdown).await
        }

        Commands::Interactive => {
            println!("\nRMCS is running. Press Enter to stop...");
            wait_for_enter(&shutdown).await;
            if !shutdown.is_requested() {
                shutdown.request();
            }
            rmcs::run(&session, &shutdown).await
        }

        Commands::Cameras => unreachable!("handled before init"),
    };

    match outcome {
        RunOutcome::Forced => {
            eprintln!("Forced quit");
        }
        RunOutcome::TimedOut => {
            eprintln!("RMCS did not stop in time");
        }
        RunOutcome::Graceful | RunOutcome::StoppedElsewhere => {
            println!("RMCS stopped. Goodbye!");
        }
    }

    // A pending stdin read would otherwise keep the runtime from shutting down.
    std::process::exit(i32::from(outcome.exit_code()))
}

/// Perform the scheduled camera switches, reporting each result
async fn run_switches(
    session: &Session,
    shutdown: &Shutdown,
    switches: Vec<CameraId>,
    delay: Duration,
) {
    println!("\nCamera switching example:");
    for camera in switches {
        tokio::select! {
            _ = shutdown.requested() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        if session.status() != SessionStatus::Running {
            return;
        }

        println!("Switching to camera {}...", camera);
        match session.switch_camera(camera).await {
            Ok(()) => println!("Successfully switched to camera {}", camera),
            Err(e) => eprintln!("Failed to switch camera. Error code: {}", e.code()),
        }
    }
}

/// Wait for a line on stdin or a shutdown request
async fn wait_for_enter(shutdown: &Shutdown) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        _ = shutdown.requested() => {}
        line = lines.next_line() => {
            if let Err(e) = line {
                tracing::warn!("Failed to read stdin: {}", e);
            }
        }
    }
}

fn print_catalog(catalog: &CameraCatalog) {
    for camera in catalog.cameras() {
        let marker = if camera == catalog.default_camera {
            " (default)"
        } else {
            ""
        };
        if let Ok(source) = catalog.source(camera) {
            println!("{:>3}  {}{}", camera.get(), source.display(), marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_flags_parse_to_ids() {
        let args = ["rmcs", "--camera", " 3", "run", "--switch", "2", "-s", "5"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.camera, Some(CameraId::new(3)));
        match cli.command {
            Some(Commands::Run { switches, .. }) => {
                assert_eq!(switches, vec![CameraId::new(2), CameraId::new(5)]);
            }
            _ => panic!("expected the run command"),
        }
    }

    #[test]
    fn test_camera_flags_reject_non_numbers() {
        assert!(Cli::try_parse_from(["rmcs", "--camera", "two"]).is_err());
        assert!(Cli::try_parse_from(["rmcs", "run", "--switch", "2x"]).is_err());
    }
}
