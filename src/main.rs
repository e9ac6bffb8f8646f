use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use praticiens::cli::{commands, Cli, Commands};
use praticiens::config::Config;
use praticiens::filter::RecordFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("praticiens=info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            place,
            url,
            max_rows,
            output,
            headed,
        } => {
            if let Some(place) = place {
                config.run.place = place;
            }
            if let Some(url) = url {
                config.run.url = url;
            }
            if let Some(max_rows) = max_rows {
                config.run.max_rows = max_rows;
            }
            if let Some(output) = output {
                config.run.output = output;
            }
            if headed {
                config.scraper.headless = false;
            }
            commands::scrape(&config).await?;
        }
        Commands::Filter {
            input,
            specialty,
            insurance,
            consultation_type,
            address_include,
            address_exclude,
            min_price,
            max_price,
            output,
        } => {
            let filter = RecordFilter {
                specialty,
                insurance,
                consultation: consultation_type,
                address_include,
                address_exclude,
                min_price,
                max_price,
            };
            commands::filter(&input, &filter, output.as_deref())?;
        }
    }

    Ok(())
}
