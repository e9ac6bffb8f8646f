pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ConsultationType;

#[derive(Parser)]
#[command(name = "praticiens")]
#[command(about = "Collect practitioner listings into a CSV table", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/praticiens/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a location and write the first practitioners to CSV
    Scrape {
        /// Location typed into the search bar
        #[arg(short, long)]
        place: Option<String>,

        /// Home page of the listing site
        #[arg(long)]
        url: Option<String>,

        /// Maximum number of records to write
        #[arg(short = 'n', long)]
        max_rows: Option<usize>,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Filter a CSV written by `scrape`
    Filter {
        /// CSV file to read
        input: PathBuf,

        /// Keep specialties containing this text
        #[arg(long)]
        specialty: Option<String>,

        /// Keep insurance labels containing this text
        #[arg(long)]
        insurance: Option<String>,

        /// Keep only "Visio" or "Présentiel"
        #[arg(long)]
        consultation_type: Option<ConsultationType>,

        /// Keep addresses containing this text
        #[arg(long)]
        address_include: Option<String>,

        /// Drop addresses containing this text
        #[arg(long)]
        address_exclude: Option<String>,

        /// Lowest fee in euros
        #[arg(long)]
        min_price: Option<f64>,

        /// Highest fee in euros
        #[arg(long)]
        max_price: Option<f64>,

        /// Write the kept rows here instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
