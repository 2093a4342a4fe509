use crate::error::SinkError;
use crate::models::vocabulary::NOT_AVAILABLE;
use crate::models::ListingRecord;
use crate::scrapers::traits::RecordSink;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column order of the output file
pub const COLUMNS: [&str; 11] = [
    "brand",
    "title",
    "kilometer",
    "gas_type",
    "gear_box",
    "year",
    "price",
    "ad_link",
    "sv_avg_class",
    "hp",
    "cilinder",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output file name for a run started on `date`
pub fn file_name(date: NaiveDate) -> String {
    format!("standvirtual_scraper_{}.csv", date.format("%Y-%m-%d"))
}

/// One CSV row in [`COLUMNS`] order
pub fn row(record: &ListingRecord) -> [String; 11] {
    let (hp, cilinder) = match record.engine {
        Some(engine) => (engine.horsepower.to_string(), engine.displacement_cc.to_string()),
        None => (String::new(), String::new()),
    };
    [
        record.brand.clone(),
        record.title.clone(),
        record.mileage_km.to_string(),
        record.fuel_type.code().to_string(),
        record.gearbox.code().to_string(),
        record
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        record.price.to_string(),
        record.ad_link.clone().unwrap_or_default(),
        record.price_class.code().to_string(),
        hp,
        cilinder,
    ]
}

/// CSV file written row by row, flushed after every record.
pub struct CsvSink {
    writer: Option<csv::Writer<File>>,
    path: PathBuf,
}

impl CsvSink {
    /// Create (or truncate) the dated output file in `dir` and write the header.
    pub fn create(dir: &Path, date: NaiveDate) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name(date));
        let mut file = File::create(&path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(COLUMNS)?;
        writer.flush()?;
        debug!("Created {}", path.display());

        Ok(Self {
            writer: Some(writer),
            path,
        })
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "output already closed"))?;
        writer.write_record(row(record))?;
        writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
