//! hostboard - host metrics dashboard backend.
//!
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_snapshot};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Binds the listener and serves the dashboard until shutdown.
async fn serve(config: Config) -> anyhow::Result<()> {
    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR).to_string();
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", bind_ip_str, port))?;

    let tls_paths = if config.enable_tls.unwrap_or(false) {
        // Presence is guaranteed by validate_effective_config()
        config.tls_cert_path.clone().zip(config.tls_key_path.clone())
    } else {
        None
    };

    info!(
        "Metrics sub-query timeout: {}ms",
        config.query_timeout_ms()
    );
    let state = Arc::new(AppState::from_config(config));
    let app = handlers::router(state);

    match tls_paths {
        Some((cert_path, key_path)) => {
            info!("Loading TLS certificate from: {}", cert_path);
            info!("Loading TLS private key from: {}", key_path);

            let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
                .await
                .context("failed to load TLS configuration")?;

            info!("hostboard listening on https://{}:{}", bind_ip_str, port);

            let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

            tokio::select! {
                result = server => result.context("server error")?,
                _ = shutdown_signal() => info!("Shutdown signal received, exiting..."),
            }
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            info!("hostboard listening on http://{}:{}", bind_ip_str, port);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server error")?;
        }
    }

    info!("hostboard stopped gracefully");
    Ok(())
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented);
        }

        setup_logging(&args);
        let config = load_validated_config(&args)?;

        return match command {
            Commands::Check => command_check(&config).await,
            Commands::Snapshot { iterations, pretty } => {
                command_snapshot(*iterations, *pretty, &config).await
            }
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(&args);

    info!("Starting hostboard {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = serve(config).await {
        error!("{:#}", e);
        return Err(e.into());
    }

    Ok(())
}
