//! PromptQuest - narrative chat server with OCEAN archetype profiling
//!
//! Usage:
//!   promptquest                       Start the HTTP server (same as `serve`)
//!   promptquest classify 80 30 30 30 65
//!   promptquest check-key             Validate OPENAI_API_KEY upstream

use clap::{Parser, Subcommand};
use promptquest_lib::archetype::classify;
use promptquest_lib::config::Config;
use promptquest_lib::traits::TraitVector;
use std::error::Error;

#[derive(Parser)]
#[command(name = "promptquest", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Classify five trait scores (0-100) without calling any API
    Classify {
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the configured API key is accepted
    CheckKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            promptquest_lib::init_logging(&cli.config);
            promptquest_lib::run(cli.config).await?;
        }
        Commands::Classify {
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
            json,
        } => {
            let traits = TraitVector::new(openness, conscientiousness, extraversion, agreeableness, neuroticism)?;
            let result = classify(&traits);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{} {}", result.base_emoji, result.base.as_str());
                println!("{} {}", result.emoji, result.subtype);
                println!("\"{}\"", result.commentary);
            }
        }
        Commands::CheckKey => {
            if promptquest_lib::check_api_key(&cli.config).await? {
                println!("API key OK");
            }
        }
    }

    Ok(())
}
