use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedreader::app::App;
use feedreader::config::Config;
use feedreader::present::render_text;
use std::path::PathBuf;

/// Get the config directory path (~/.config/feedreader/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedreader"))
}

#[derive(Parser, Debug)]
#[command(name = "feedreader", about = "Load RSS/Atom feeds from a registry and print them")]
struct Args {
    /// Config file (default: ~/.config/feedreader/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum output line width in columns
    #[arg(long, default_value_t = 100)]
    width: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the feed registry
    Feeds,
    /// Load feeds by index, one after another, printing the display after each
    Load {
        #[arg(required = true, value_name = "INDEX")]
        indices: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let app = App::from_config(&config).context("Failed to start reader session")?;

    match args.command {
        Command::Feeds => {
            for (index, feed) in app.feeds().iter().enumerate() {
                println!("{index:>3}  {}  <{}>", feed.name, feed.url);
            }
        }
        Command::Load { indices } => {
            let mut failures = 0;
            for index in indices {
                let report = app.load(index).await;
                if let Err(e) = &report.result {
                    failures += 1;
                    eprintln!("Failed to load feed {index}: {e} (showing previous feed)");
                }
                print!(
                    "{}",
                    render_text(&app.snapshot(), app.menu().state(), args.width)
                );
                println!();
            }
            if failures > 0 {
                tracing::info!(failures, "Some feeds failed to load");
            }
        }
    }

    app.shutdown();
    Ok(())
}
