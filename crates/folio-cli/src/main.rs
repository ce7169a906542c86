use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use folio_web::WebConfig;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "folio-cli")]
#[command(about = "Folio portfolio site and data tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web site.
    Serve,
    /// Print the saved portfolio, or the defaults when nothing is saved.
    Show {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Drop saved data so the bundled defaults are used again.
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = WebConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => folio_web::serve(config).await?,
        Commands::Show { format } => {
            let store = config.open_store();
            if let Some(err) = store.error() {
                warn!(error = %err, "showing defaults in place of saved data");
            }
            let text = match format {
                Format::Json => serde_json::to_string_pretty(store.document())
                    .context("encoding portfolio as JSON")?,
                Format::Yaml => serde_yaml::to_string(store.document())
                    .context("encoding portfolio as YAML")?,
            };
            println!("{text}");
        }
        Commands::Reset => {
            let mut store = config.open_store();
            store.clear_error();
            store.reset_data();
            if let Some(err) = store.error() {
                anyhow::bail!("{err}");
            }
            info!(
                data_dir = %config.data_dir.display(),
                key = %config.storage_key,
                "portfolio data reset"
            );
            println!(
                "reset complete: key={} data_dir={}",
                config.storage_key,
                config.data_dir.display()
            );
        }
    }

    Ok(())
}
