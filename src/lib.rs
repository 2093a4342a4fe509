pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod scrapers;
pub mod sink;

pub use config::{Category, FetchMode, Layout, ScoutConfig};
pub use error::{ConfigError, ExtractionError, FetchError, RunError, SinkError};
pub use models::{EngineSpec, FuelType, Gearbox, ListingRecord, PriceClass};
pub use scrapers::{Extractor, Orchestrator, PageSource, PageWalker, RecordSink, RunSummary, WalkOptions};
pub use sink::CsvSink;
