use anyhow::Result;
use art_machine::app::App;
use art_machine::styles::STYLES;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "art-machine")]
#[command(about = "Create AI art in the style of Mexican masters")]
#[command(after_help = "Styles: frida (default), mural, folk\n\n\
    Examples:\n  art-machine \"a garden with butterflies\"\n  \
    art-machine \"Day of the Dead celebration\" folk")]
struct CliArgs {
    /// What you want to create.
    #[arg(value_name = "PROMPT")]
    prompt: String,

    /// Art style to apply.
    #[arg(value_name = "STYLE", default_value = "frida")]
    style: String,

    /// Directory the image is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "art_machine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!(
        "Starting art machine ({} styles available)",
        STYLES.len()
    );

    let app = match App::new(args.output_dir) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            error!("Set RUNPOD_API_KEY and RUNPOD_ENDPOINT_ID in your environment or .env file");
            std::process::exit(1);
        }
    };

    match app.run(&args.prompt, &args.style).await {
        Ok(path) => {
            info!("Success! Open {} to see your masterpiece", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Failed to generate art: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn test_style_defaults_to_frida() {
        let args = CliArgs::try_parse_from(["art-machine", "a garden"]).unwrap();
        assert_eq!(args.prompt, "a garden");
        assert_eq!(args.style, "frida");
    }

    #[test]
    fn test_style_positional() {
        let args = CliArgs::try_parse_from(["art-machine", "workers", "mural"]).unwrap();
        assert_eq!(args.style, "mural");
    }

    #[test]
    fn test_prompt_is_required() {
        assert!(CliArgs::try_parse_from(["art-machine"]).is_err());
    }
}
