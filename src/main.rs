use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use warden::cli::{describe_hydration, format_json, render_dashboard};
use warden::identity::FileSessionStore;
use warden::routing::{HistoryNavigator, DASHBOARD_PATH};
use warden::{AdminApp, ClientConfig};

#[derive(Debug, Parser)]
#[command(name = "warden", about = "Administrator session client")]
struct Cli {
    /// API root (overrides WARDEN_API_BASE)
    #[arg(long, global = true)]
    api: Option<String>,
    /// Directory holding the persisted session (overrides WARDEN_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Exchange email/password for a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session locally (and remotely when a logout path is configured)
    Logout,
    /// Show the current session as the dashboard would
    Status,
    /// Authorized GET against a path under the API root; prints the JSON body
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid RUST_LOG filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api) = &cli.api {
        let base = ClientConfig::with_base(api)?;
        config.api_base = base.api_base;
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir = dir.into();
    }
    info!(api = %config.api_base, state_dir = %config.state_dir.display(), scheme = %config.auth_scheme, "warden starting");

    let store = Arc::new(FileSessionStore::open(&config.state_dir)?);
    let nav = Arc::new(HistoryNavigator::new("/"));
    let app = AdminApp::start(config, store, nav.clone())?;

    match cli.command {
        Command::Login { email, password } => {
            let user = app.login(&email, &password).await?;
            println!("{}", render_dashboard(&user));
        }
        Command::Logout => {
            let _hooks = app.attach();
            app.logout().await;
            println!("logged out");
        }
        Command::Status => {
            println!("{}", describe_hydration(app.hydrated()));
            match app.open(DASHBOARD_PATH) {
                Some(_) => {
                    if let Some(user) = app.session.user() {
                        println!("{}", render_dashboard(&user));
                    }
                }
                None => println!("redirected to {}", nav.location()),
            }
        }
        Command::Get { path } => {
            if app.open(DASHBOARD_PATH).is_none() {
                bail!("not logged in; run `warden login` first");
            }
            let _hooks = app.attach();
            match app.secure.get_json::<serde_json::Value>(&path).await {
                Ok(val) => println!("{}", format_json(&val)),
                Err(e) if e.forces_logout() => bail!("{}; session ended, run `warden login` again", e),
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
