use anyhow::Result;
use art_machine::api::GenerateClient;
use art_machine::controller::{Controller, View, ViewState};
use art_machine::models::ClientConfig;
use art_machine::styles::STYLES;
use art_machine::Error;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "art-studio")]
#[command(about = "Interactive art generation front-end")]
struct CliArgs {
    /// Generation endpoint. Overrides ART_GENERATE_URL.
    #[arg(long)]
    url: Option<String>,

    /// Default directory for `:save`.
    #[arg(long, default_value = ".")]
    save_dir: PathBuf,
}

#[derive(Debug, PartialEq)]
enum Command {
    Style(String),
    Styles,
    Save(Option<PathBuf>),
    Help,
    Quit,
    Prompt(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Prompt(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    Some(match (name, arg) {
        ("style", Some(id)) => Command::Style(id.to_string()),
        ("styles", _) | ("style", None) => Command::Styles,
        ("save", dir) => Command::Save(dir.map(PathBuf::from)),
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Help,
    })
}

fn render(state: &ViewState) -> String {
    match state.view() {
        View::Idle => format!("[{}] Describe your art and press enter.", state.style.name),
        View::Loading => format!(
            "[{}] Painting your masterpiece, please wait...",
            state.style.name
        ),
        View::Error(message) => format!("Error: {}", message),
        View::Result(image) => format!(
            "Your art is ready ({}, {} chars). Type :save to download it.",
            image.media_type().unwrap_or("unknown type"),
            image.as_str().len()
        ),
    }
}

/// Prints a snapshot only when its rendering differs from the last one.
#[derive(Debug, Default)]
struct ViewPrinter {
    last: Option<String>,
}

impl ViewPrinter {
    fn next(&mut self, state: &ViewState) -> Option<String> {
        let line = render(state);
        if self.last.as_deref() == Some(line.as_str()) {
            return None;
        }
        self.last = Some(line.clone());
        Some(line)
    }
}

fn help() -> String {
    let styles: Vec<&str> = STYLES.iter().map(|s| s.id).collect();
    format!(
        "Commands:\n  <text>          generate art from a description\n  \
         :style <id>     select a style ({})\n  :styles         list styles\n  \
         :save [dir]     save the current image\n  :quit           exit",
        styles.join(", ")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "art_machine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let url = args
        .url
        .unwrap_or_else(|| ClientConfig::from_env().generate_url);
    let controller = Arc::new(Controller::new(GenerateClient::new(url)));

    println!("{}", help());

    let mut printer = ViewPrinter::default();
    if let Some(line) = printer.next(&controller.state()) {
        println!("{}", line);
    }
    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if let Some(line) = printer.next(&state) {
                println!("{}", line);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            continue;
        };
        match command {
            Command::Prompt(text) => {
                controller.set_prompt(text);
                match controller.submit().await {
                    Ok(_) => {}
                    Err(Error::Validation(notice)) => println!("{}", notice),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Command::Style(id) => match controller.select_style(&id) {
                Ok(()) => println!("Style: {}", controller.state().style.name),
                Err(e) => println!("{}", e),
            },
            Command::Styles => {
                let selected = controller.state().style.id;
                for style in STYLES.iter() {
                    let marker = if style.id == selected { '*' } else { ' ' };
                    println!("{} {:<6} {} - {}", marker, style.id, style.name, style.description);
                }
            }
            Command::Save(dir) => {
                let dir = dir.unwrap_or_else(|| args.save_dir.clone());
                match controller.export(&dir) {
                    Ok(Some(path)) => println!("Saved to {}", path.display()),
                    Ok(None) => println!("Nothing to save yet."),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Command::Help => println!("{}", help()),
            Command::Quit => break,
        }
    }

    drop(controller);
    renderer.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_machine::controller::Outcome;
    use art_machine::normalize::InlineImage;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command(" a garden "),
            Some(Command::Prompt("a garden".to_string()))
        );
        assert_eq!(parse_command(":style folk"), Some(Command::Style("folk".to_string())));
        assert_eq!(parse_command(":style"), Some(Command::Styles));
        assert_eq!(parse_command(":save"), Some(Command::Save(None)));
        assert_eq!(
            parse_command(":save /tmp/art"),
            Some(Command::Save(Some(PathBuf::from("/tmp/art"))))
        );
        assert_eq!(parse_command(":q"), Some(Command::Quit));
        assert_eq!(parse_command(":dance"), Some(Command::Help));
    }

    #[test]
    fn test_printer_skips_unchanged_views() {
        let mut printer = ViewPrinter::default();
        let mut state = ViewState::default();
        assert!(printer.next(&state).is_some());

        state.prompt = "a garden".to_string();
        assert_eq!(printer.next(&state), None);

        state.is_generating = true;
        assert!(printer.next(&state).unwrap().contains("Painting"));
        assert_eq!(printer.next(&state), None);

        state.is_generating = false;
        state.outcome = Outcome::Error("boom".to_string());
        assert_eq!(printer.next(&state).as_deref(), Some("Error: boom"));
    }

    #[test]
    fn test_render_each_view() {
        let mut state = ViewState::default();
        assert!(render(&state).contains("Describe your art"));

        state.is_generating = true;
        assert!(render(&state).contains("Painting"));

        state.is_generating = false;
        state.outcome = Outcome::Error("boom".to_string());
        assert_eq!(render(&state), "Error: boom");

        state.outcome = Outcome::Image(InlineImage::from_text("AAAA"));
        assert!(render(&state).contains("image/png"));
    }
}
