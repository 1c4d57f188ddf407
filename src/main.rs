//! git-blamer - find the commits behind the lines of a stack trace
//!
//! # Usage
//! ```bash
//! git-blamer --repo ~/src/app blame crash.txt           # Attribute every frame
//! git-blamer line root/Billing/InvoiceService.cs 42     # Attribute one line
//! git-blamer frames < crash.txt                         # Show resolved frames
//! git-blamer --branch release --pull serve --port 3001  # Run the HTTP API
//! git-blamer branches                                   # List branches
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_blamer::config::Config;
use git_blamer::git::attribution::history_command;
use git_blamer::git::{self, GitRepository, LineAttributor, ReplayRunner};
use git_blamer::report;
use git_blamer::routes::{self, AppState};

/// Find the commits that last touched the lines of a stack trace
#[derive(Parser)]
#[command(name = "git-blamer")]
#[command(about = "Attribute stack trace lines to the commits that changed them", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the frames of a stack trace that carry line information
    Frames {
        /// File holding the stack trace (stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Attribute every frame of a stack trace
    Blame {
        /// File holding the stack trace (stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Attribute a single line of a file
    Line {
        /// Repository-relative path, e.g. root/Billing/InvoiceService.cs
        path: String,

        /// 1-based line number
        line: u32,

        /// Read the history dump from a saved `git log -p -m` output instead of running git
        #[arg(long, value_name = "LOG_FILE")]
        log_file: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP API
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
    /// List local and remote branches
    Branches {
        /// Print JSON instead of a list
        #[arg(long)]
        json: bool,
    },
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stack trace from stdin")?;
            Ok(text)
        }
    }
}

fn print_output<T: Serialize>(value: &T, json: bool, render: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

fn handle_line(
    config: &Config,
    path: &str,
    line: u32,
    log_file: Option<&PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let offenders = match log_file {
        Some(log_file) => {
            let dump = read_input(Some(log_file))?;
            let mut runner = ReplayRunner::new().respond_text(&history_command(path), &dump);
            LineAttributor::new(&mut runner).attribute(path, line)?
        }
        None => {
            let mut session = config.open_session()?;
            LineAttributor::new(&mut session).attribute(path, line)?
        }
    };

    print_output(&offenders, json, |o| report::render_offenders(o))
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let session = config.open_session()?;
    let repo = GitRepository::open(&config.repo)?;
    let resolver = config.resolver()?;

    let canonical_path = std::fs::canonicalize(&config.repo)
        .unwrap_or_else(|_| config.repo.clone())
        .to_string_lossy()
        .to_string();

    let state = AppState::new(git::share(session), repo, resolver);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  Repository:  {}", canonical_path);
    println!("  Root marker: {}", config.root_marker);
    println!("  Server:      http://{}", addr);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config;

    match cli.command {
        Commands::Frames { file } => {
            let trace = read_input(file.as_ref())?;
            let frames = config.resolver()?.resolve_frames(&trace)?;
            print!("{}", report::render_frames(&frames));
        }
        Commands::Blame { file, json } => {
            let trace = read_input(file.as_ref())?;
            let resolver = config.resolver()?;
            let mut session = config.open_session()?;
            let reports = LineAttributor::new(&mut session).attribute_stack_trace(&resolver, &trace)?;
            print_output(&reports, json, |r| report::render_trace_reports(r))?;
        }
        Commands::Line {
            path,
            line,
            log_file,
            json,
        } => {
            handle_line(&config, &path, line, log_file.as_ref(), json)?;
        }
        Commands::Serve { port } => {
            serve(&config, port).await?;
        }
        Commands::Branches { json } => {
            // housekeeping flags still apply before listing
            config.open_session()?;
            let branches = GitRepository::open(&config.repo)?.list_branches()?;
            print_output(&branches, json, |b| report::render_branches(b))?;
        }
    }

    Ok(())
}
