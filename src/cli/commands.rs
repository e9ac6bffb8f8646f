use std::io;
use std::path::Path;

use tracing::info;

use crate::app::Result;
use crate::config::Config;
use crate::filter::RecordFilter;
use crate::pipeline::{Pipeline, RunReport};
use crate::scraper::ChromeDriver;
use crate::sink::{load_records, CsvSink, Sink};

pub async fn scrape(config: &Config) -> Result<usize> {
    let driver = ChromeDriver::launch(&config.scraper).await?;
    let mut pipeline = Pipeline::new(driver, config);

    let report = pipeline.run().await;
    persist(report, &config.run.output)
}

/// Write whatever the run assembled, then surface its error if it stopped early
fn persist(report: RunReport, output: &Path) -> Result<usize> {
    let mut sink = CsvSink::create(output)?;
    let written = sink.write_all(&report.records)?;

    println!("{} practitioners written to {}", written, output.display());
    info!(
        elapsed_secs = report.elapsed().num_seconds(),
        complete = report.is_complete(),
        "Scrape finished"
    );

    match report.error {
        Some(e) => Err(e),
        None => Ok(written),
    }
}

pub fn filter(input: &Path, filter: &RecordFilter, output: Option<&Path>) -> Result<usize> {
    let records = load_records(input)?;
    let total = records.len();
    let kept = filter.apply(records);

    match output {
        Some(path) => {
            CsvSink::create(path)?.write_all(&kept)?;
            println!("{} of {} rows kept, written to {}", kept.len(), total, path.display());
        }
        None => {
            CsvSink::from_writer(io::stdout().lock()).write_all(&kept)?;
            eprintln!("{} of {} rows kept", kept.len(), total);
        }
    }

    Ok(kept.len())
}
