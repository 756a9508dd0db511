use anyhow::Result;
use art_machine::inference::RunPodClient;
use art_machine::models::{server_addr_from_env, Config};
use art_machine::server::{self, ServerState};
use art_machine::Error;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "art-server")]
#[command(about = "Serve the art generation proxy")]
struct CliArgs {
    /// Address to listen on. Overrides ART_SERVER_ADDR.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

/// Backend state for the loaded configuration. Only missing credentials
/// start the proxy unconfigured; any other configuration error is fatal.
fn build_state(config: art_machine::Result<Config>) -> art_machine::Result<ServerState> {
    match config {
        Ok(config) => {
            info!("Proxying to RunPod endpoint {}", config.runpod_endpoint_id);
            let client = RunPodClient::from_config(&config);
            Ok(ServerState::new(Arc::new(client)))
        }
        Err(Error::MissingEnv(key)) => {
            warn!(
                "{} not set; generation requests will be answered with a configuration error",
                key
            );
            Ok(ServerState::unconfigured())
        }
        Err(e) => {
            error!("Invalid configuration: {}", e);
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "art_machine=info,art_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let addr = match args.addr {
        Some(addr) => addr,
        None => server_addr_from_env()?,
    };
    let state = build_state(Config::from_env())?;

    if let Err(e) = server::serve(addr, state).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_start_unconfigured() {
        let state = build_state(Err(Error::MissingEnv("RUNPOD_API_KEY".to_string()))).unwrap();
        assert!(!state.is_configured());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = build_state(Config::from_lookup(|key: &str| match key {
            "RUNPOD_API_KEY" => Some("key".to_string()),
            "RUNPOD_ENDPOINT_ID" => Some("abc".to_string()),
            "ART_SERVER_ADDR" => Some("localhost:3000".to_string()),
            _ => None,
        }));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_credentials_configure_backend() {
        let state = build_state(Config::from_lookup(|key: &str| match key {
            "RUNPOD_API_KEY" => Some("key".to_string()),
            "RUNPOD_ENDPOINT_ID" => Some("abc".to_string()),
            _ => None,
        }))
        .unwrap();
        assert!(state.is_configured());
    }
}
