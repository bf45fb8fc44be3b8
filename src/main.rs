use anyhow::{Context, Result};
use audiobook_shell::bootstrap::sequencer::BootstrapSequencer;
use audiobook_shell::core::config::Config;
use audiobook_shell::core::startup::{build_session, build_state};
use audiobook_shell::core::state::AppState;
use audiobook_shell::core::tracing_init::init_tracing;
use audiobook_shell::ui::navigation::{AppUi, NavigationRegion};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first time running the shell, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    // The page runs on a single event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        backend = %config.backend.base_url,
        location = %config.page.location,
        readiness = ?config.bootstrap.readiness,
        log_level = %config.logging.level,
        "AudioBook shell starting"
    );

    let session = build_session(&config)?;
    let mount_delay = Duration::from_millis(config.bootstrap.ui_mount_delay_ms);
    let (state, signal) = build_state(config, session)?;

    // The navigation region mounts on its own schedule and announces itself
    let region = Arc::new(NavigationRegion::new());
    let mounting = Arc::clone(&region);
    tokio::spawn(async move {
        tokio::time::sleep(mount_delay).await;
        mounting.mount(&signal);
    });

    let report = BootstrapSequencer::new(state.clone()).run().await;
    if report.is_degraded() {
        warn!(degradations = ?report.degradations, "Page started with reduced functionality");
    }

    print_status(&state, &region);

    tokio::select! {
        result = drive(&state, &region) => result?,
        _ = shutdown_signal() => {},
    }

    info!("Shutting down");

    Ok(())
}

/// Read page commands from stdin until EOF or `quit`
async fn drive(state: &AppState, region: &NavigationRegion) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let argument = parts.next();
        debug!(command, argument = ?argument, "Page command");

        match (command, argument) {
            ("links", _) => {
                for (index, link) in state.page.links().iter().enumerate() {
                    let marker = if link.internal { "data-link" } else { "external" };
                    println!("{index:>2}  {:<24} {:<10} {}", link.href, marker, link.label);
                }
            }
            ("click", Some(index)) => {
                let link = index
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| state.page.link(index))
                    .cloned();
                match link {
                    Some(link) => println!("{:?}", state.page.click(&link)),
                    None => println!("no link at index {index}"),
                }
            }
            ("go", Some(path)) => println!("{:?}", state.router.navigate(path)),
            ("back", _) => println!("{:?}", state.router.back()),
            ("forward", _) => println!("{:?}", state.router.forward()),
            ("refresh", _) => match state.auth.refresh_user_data(true, false).await {
                Ok(()) => {
                    if let Some(user) = state.auth.current_user() {
                        region.create_user_navigation(&user);
                    }
                    println!("profile refreshed");
                }
                Err(e) => println!("refresh failed: {e}"),
            },
            ("status", _) => print_status(state, region),
            ("quit", _) | ("exit", _) => break,
            _ => println!("commands: links | click <n> | go <path> | back | forward | refresh | status | quit"),
        }
    }

    Ok(())
}

fn print_status(state: &AppState, region: &NavigationRegion) {
    println!(
        "location={} view={} user={} full_loads={}",
        state.page.location(),
        state.page.active_view().as_deref().unwrap_or("(server-rendered)"),
        region.displayed_name().as_deref().unwrap_or("(anonymous)"),
        state.page.full_loads(),
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
