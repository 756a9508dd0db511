use anyhow::Result;
use art_machine::inference::RunPodClient;
use art_machine::models::Config;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "runpod-admin")]
#[command(about = "Maintenance commands for the RunPod endpoint")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Queue an empty job so idle workers start up.
    Wake,
    /// Set the endpoint's minimum and maximum worker counts.
    ScaleWorkers {
        #[arg(long, default_value_t = 1)]
        min: u32,
        #[arg(long, default_value_t = 3)]
        max: u32,
    },
}

async fn run(args: CliArgs) -> art_machine::Result<()> {
    let config = Config::from_env()?;
    let client = RunPodClient::from_config(&config);
    info!("Endpoint ID: {}", client.endpoint_id());

    match args.command {
        Command::Wake => {
            let job = client.wake().await?;
            info!("Job {} is {}", job.id, job.status);
            if job.is_pending() {
                info!("Workers are waking up; the first start can take 30-60 seconds");
            }
        }
        Command::ScaleWorkers { min, max } => {
            let data = client.scale_workers(min, max).await?;
            info!("Endpoint updated: {}", serde_json::to_string_pretty(&data)?);
            info!("Workers should be starting; wait 30-60 seconds before generating");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "art_machine=info,runpod_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(CliArgs::parse()).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}
