use clap::{Parser, Subcommand};
use sl_core::Settings;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sl", version, about = "User timeline aggregation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the timeline API.
    Serve {
        /// TOML settings file; falls back to `SIGHTLINE_CONFIG`.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        port: Option<u16>,
        /// Base URL of the system status endpoints.
        #[arg(long)]
        base_url: Option<String>,
        /// Listen on all interfaces instead of localhost.
        #[arg(long)]
        public: bool,
    },
    /// Print the OpenAPI document.
    Openapi,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            config,
            port,
            base_url,
            public,
        } => {
            init_tracing();
            let path = config.or_else(|| std::env::var_os("SIGHTLINE_CONFIG").map(PathBuf::from));
            let mut settings = match Settings::load(path.as_deref()) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::error!(error = %err, "invalid settings");
                    return ExitCode::FAILURE;
                }
            };
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(base_url) = base_url {
                settings.system_base_url = base_url;
            }
            if let Err(err) = settings.validate() {
                tracing::error!(error = %err, "invalid settings");
                return ExitCode::FAILURE;
            }

            let state = match sl_serve::AppState::new(&settings.system_base_url, settings.timeline())
            {
                Ok(state) => state,
                Err(err) => {
                    tracing::error!(error = %err, "failed to build upstream client");
                    return ExitCode::FAILURE;
                }
            };
            let ip = if public {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            };
            if let Err(err) = sl_serve::serve(state, SocketAddr::new(ip, settings.port)).await {
                tracing::error!(error = %err, "serve error");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Command::Openapi => {
            println!("{}", sl_serve::openapi::generate_spec());
            ExitCode::SUCCESS
        }
    }
}
