use anyhow::Context;
use car_scout::config::{FetchMode, ScoutConfig};
use car_scout::logging::init_logger;
use car_scout::scrapers::{BrowserSource, Extractor, HttpSource, Orchestrator, PageSource, WalkOptions};
use car_scout::sink::CsvSink;
use chrono::Local;
use tracing::{info, warn};

/// Set to any value for debug logging
const VERBOSE_ENV: &str = "CAR_SCOUT_VERBOSE";

fn main() -> anyhow::Result<()> {
    init_logger(std::env::var_os(VERBOSE_ENV).is_some());

    info!("🚗 Car Scout - Standvirtual Scraper");
    info!("====================================");

    let config = ScoutConfig::load().context("Failed to load configuration")?;
    let table = config.selector_table()?;

    let source: Box<dyn PageSource> = match config.fetch_mode {
        FetchMode::Browser => Box::new(BrowserSource::launch(&config)?),
        FetchMode::Http => Box::new(HttpSource::new(&config)?),
    };
    let sink = CsvSink::create(&config.output_dir, Local::now().date_naive())
        .context("Failed to create output file")?;

    info!("Scraping {} brands", config.categories.len());

    let orchestrator = Orchestrator::new(
        source,
        sink,
        Extractor::new(config.layout),
        table,
        WalkOptions::from(&config),
    );
    let summary = orchestrator.run(&config.categories)?;

    for category in &summary.categories {
        println!("{}", category);
    }
    if summary.skipped() > 0 {
        warn!("{} listings could not be extracted", summary.skipped());
    }

    info!(
        "✅ Scraping completed. {} ads saved to '{}'.",
        summary.records_written,
        summary.output.display()
    );

    Ok(())
}
