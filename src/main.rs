mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use picker_core::config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "beauty-picker",
    about = "Product picker and routine assistant for a cosmetics catalog",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/beauty-picker/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the model identifier sent to the assistant endpoint
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Override the assistant endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override the product data file (path or URL)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick products and chat in the terminal (default)
    Chat,

    /// Serve the picker in the browser
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "beauty_picker=info,picker_core=info,picker_server=info,warn".into()
        }))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if let Some(model) = &cli.model {
        config.assistant.model = model.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.assistant.endpoint = endpoint.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog.source = catalog.clone();
    }

    tracing::info!(
        "Catalog: {}, model: {}, endpoint: {}",
        config.catalog.source,
        config.assistant.model,
        config.assistant.endpoint,
    );

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            picker_server::serve(config).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        Some(Commands::Chat) | None => {
            repl::run(config).await?;
        }
    }

    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
