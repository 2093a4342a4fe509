use crate::config::Category;
use crate::error::RunError;
use crate::scrapers::extractor::Extractor;
use crate::scrapers::selectors::SelectorTable;
use crate::scrapers::traits::{PageSource, RecordSink};
use crate::scrapers::walker::{PageWalker, WalkOptions};
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Outcome of walking one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub pages: u32,
    pub emitted: u64,
    /// Listings dropped because extraction failed
    pub skipped: u64,
    /// Of the skipped listings, those failing on an untranslatable label
    pub unknown_labels: u64,
    /// Page 1 had no listings
    pub empty: bool,
    /// The walk stopped because a page failed to load
    pub fetch_failed: bool,
}

impl CategorySummary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl fmt::Display for CategorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return write!(f, "{}: no listings", self.name);
        }
        write!(
            f,
            "{}: {} ads over {} pages ({} skipped)",
            self.name, self.emitted, self.pages, self.skipped
        )?;
        if self.fetch_failed {
            f.write_str(", stopped early: a page failed to load")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub records_written: u64,
    pub categories: Vec<CategorySummary>,
}

impl RunSummary {
    pub fn skipped(&self) -> u64 {
        self.categories.iter().map(|c| c.skipped).sum()
    }

    pub fn unknown_labels(&self) -> u64 {
        self.categories.iter().map(|c| c.unknown_labels).sum()
    }
}

/// Runs the walker over every category, writing records as they come.
///
/// Owns the page source and the sink for the duration of the run; the sink
/// is closed on every exit path and the source dropped with the orchestrator.
pub struct Orchestrator<S: PageSource, K: RecordSink> {
    source: S,
    sink: K,
    extractor: Extractor,
    table: SelectorTable,
    options: WalkOptions,
}

impl<S: PageSource, K: RecordSink> Orchestrator<S, K> {
    pub fn new(source: S, sink: K, extractor: Extractor, table: SelectorTable, options: WalkOptions) -> Self {
        Self {
            source,
            sink,
            extractor,
            table,
            options,
        }
    }

    pub fn run(mut self, categories: &[Category]) -> Result<RunSummary, RunError> {
        info!(
            "Using {} page source with the {:?} layout",
            self.source.source_name(),
            self.extractor.layout()
        );
        if let Err(e) = self.source.prepare() {
            if e.is_fatal() {
                error!("Site never became ready: {}", e);
                self.sink.close()?;
                return Err(e.into());
            }
            warn!("No cookie consent prompt found or error clicking it: {}", e);
        }

        let result = self.run_categories(categories);
        let closed = self.sink.close();
        let summary = result?;
        closed?;

        if summary.unknown_labels() > 0 {
            warn!(
                "{} listings had labels missing from the vocabulary tables",
                summary.unknown_labels()
            );
        }
        Ok(summary)
    }

    fn run_categories(&mut self, categories: &[Category]) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary {
            output: self.sink.location().to_path_buf(),
            records_written: 0,
            categories: Vec::with_capacity(categories.len()),
        };

        for category in categories {
            info!("Scraping listings for {}...", category.name);

            let mut walker = PageWalker::new(
                &mut self.source,
                &self.extractor,
                &self.table,
                &category.name,
                &category.slug,
                self.options,
            );
            for item in &mut walker {
                let record = item?;
                self.sink.write(&record)?;
                summary.records_written += 1;
            }

            let done = walker.into_summary();
            if done.empty {
                info!("Skipping {}: no listings", done.name);
            } else {
                info!(
                    "Finished {}: {} records from {} pages, {} listings skipped",
                    done.name, done.emitted, done.pages, done.skipped
                );
            }
            summary.categories.push(done);
        }

        Ok(summary)
    }
}
