mod commands;

use clap::{Parser, Subcommand};
use keywrap::WrapError;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "keywrap")]
#[command(about = "Wrap provider API keys with RSA-OAEP for delivery")]
struct Cli {
    /// Configuration file (defaults to config/default + config/local)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap a secret for a provider and print the delivery as JSON
    Seal {
        /// Provider id from the configuration
        #[arg(long)]
        provider: String,
        /// Where the caller should go next
        #[arg(long)]
        target: Option<Url>,
        /// Use this PEM public key instead of the configured one
        #[arg(long)]
        pem: Option<PathBuf>,
        /// Read the secret from this environment variable instead of prompting
        #[arg(long, conflicts_with = "secret_stdin")]
        secret_env: Option<String>,
        /// Read the secret from the first line of stdin instead of prompting
        #[arg(long)]
        secret_stdin: bool,
    },
    /// Show facts about a PEM public key
    Inspect {
        pem: PathBuf,
    },
    /// List configured providers
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keywrap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Seal {
            provider,
            target,
            pem,
            secret_env,
            secret_stdin,
        } => {
            let secret = match secret_env {
                Some(var) => commands::SecretSource::Env(var),
                None if secret_stdin => commands::SecretSource::Stdin,
                None => commands::SecretSource::Prompt,
            };
            let args = commands::SealArgs {
                provider,
                target,
                pem,
                secret,
            };
            match commands::seal(&config, args).await {
                Ok(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                Err(err) => {
                    if let Some(wrap_err) = err.downcast_ref::<WrapError>() {
                        println!("{}", serde_json::to_string_pretty(&wrap_err.report())?);
                    }
                    return Err(err);
                }
            }
        }
        Commands::Inspect { pem } => {
            let facts = commands::inspect(&config, &pem).await?;
            println!("{}", serde_json::to_string_pretty(&facts)?);
        }
        Commands::Providers => {
            for id in config.provider_ids() {
                println!("{id}");
            }
        }
    }

    Ok(())
}
