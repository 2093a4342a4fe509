//! Page-by-page traversal of one category.
//!
//! [`PageWalker`] is an iterator over the category's records. It loads
//! page 1, extracts its listings once, yields them in document order and follows
//! the "next page" control until it is missing or disabled. A page without
//! listings ends the walk, so does a page that fails to load. Only a
//! readiness timeout is surfaced to the caller, as an `Err` item after
//! which the iterator is finished.

use crate::config::ScoutConfig;
use crate::error::{ExtractionError, FetchError};
use crate::models::ListingRecord;
use crate::scrapers::extractor::Extractor;
use crate::scrapers::orchestrator::CategorySummary;
use crate::scrapers::selectors::{NextPage, PageView, SelectorTable};
use crate::scrapers::traits::{PageRequest, PageSource};
use scraper::Html;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    pub first_page_settle: Duration,
    pub page_settle: Duration,
    /// Capture the first page of every category
    pub snapshots: bool,
}

impl From<&ScoutConfig> for WalkOptions {
    fn from(config: &ScoutConfig) -> Self {
        Self {
            first_page_settle: config.first_page_settle(),
            page_settle: config.page_settle(),
            snapshots: config.snapshots,
        }
    }
}

enum State {
    Loading { page: u32 },
    /// Outcomes of the page's listings not yet handed out, with their position
    Extracting {
        page: u32,
        pending: VecDeque<(usize, Result<ListingRecord, ExtractionError>)>,
        control: NextPage,
    },
    AdvancingPage { page: u32, control: NextPage },
    Done,
}

pub struct PageWalker<'a, S: PageSource + ?Sized> {
    source: &'a mut S,
    extractor: &'a Extractor,
    table: &'a SelectorTable,
    slug: String,
    options: WalkOptions,
    state: State,
    summary: CategorySummary,
}

impl<'a, S: PageSource + ?Sized> PageWalker<'a, S> {
    pub fn new(
        source: &'a mut S,
        extractor: &'a Extractor,
        table: &'a SelectorTable,
        category: &str,
        slug: &str,
        options: WalkOptions,
    ) -> Self {
        Self {
            source,
            extractor,
            table,
            slug: slug.to_string(),
            options,
            state: State::Loading { page: 1 },
            summary: CategorySummary::new(category),
        }
    }

    pub fn into_summary(self) -> CategorySummary {
        self.summary
    }

    fn load(&mut self, page: u32) -> Result<State, FetchError> {
        let settle = if page == 1 {
            self.options.first_page_settle
        } else {
            self.options.page_settle
        };
        let request = PageRequest {
            slug: self.slug.clone(),
            page,
            settle,
        };

        let html = self.source.fetch(&request)?;
        let document = Html::parse_document(&html);
        self.summary.pages += 1;

        if page == 1 && self.options.snapshots {
            match self.source.snapshot(&self.summary.name) {
                Ok(path) => debug!("Saved snapshot to {}", path.display()),
                Err(e) => warn!("Snapshot for {} failed: {}", self.summary.name, e),
            }
        }

        let (pending, control, total) = {
            let view = PageView::new(&document, self.table);
            let pending: VecDeque<_> = view
                .listings()
                .iter()
                .enumerate()
                .map(|(i, listing)| (i + 1, self.extractor.extract(&self.summary.name, listing)))
                .collect();
            (pending, view.next_page(), view.total_listings())
        };
        let listings = pending.len();
        info!(
            "Scraping {} page {} ({} listings on page)",
            self.summary.name, page, listings
        );
        if let Some(total) = total {
            info!("Total cars for {}: {}", self.summary.name, total);
        }

        if listings == 0 {
            if page == 1 {
                self.summary.empty = true;
                info!("No listings found for {}.", self.summary.name);
            } else {
                info!("Page {} of {} has no listings", page, self.summary.name);
            }
            return Ok(State::Done);
        }

        Ok(State::Extracting {
            page,
            pending,
            control,
        })
    }
}

impl<'a, S: PageSource + ?Sized> Iterator for PageWalker<'a, S> {
    type Item = Result<ListingRecord, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,

                State::Loading { page } => match self.load(page) {
                    Ok(state) => self.state = state,
                    Err(e) if e.is_fatal() => {
                        error!("Giving up on {}: {}", self.summary.name, e);
                        return Some(Err(e));
                    }
                    Err(e) => {
                        warn!("Stopping {} at page {}: {}", self.summary.name, page, e);
                        self.summary.fetch_failed = true;
                    }
                },

                State::Extracting {
                    page,
                    mut pending,
                    control,
                } => {
                    let Some((position, result)) = pending.pop_front() else {
                        self.state = State::AdvancingPage { page, control };
                        continue;
                    };
                    self.state = State::Extracting {
                        page,
                        pending,
                        control,
                    };
                    match result {
                        Ok(record) => {
                            debug!("Extracted {}", record);
                            self.summary.emitted += 1;
                            return Some(Ok(record));
                        }
                        Err(e) => {
                            warn!(
                                "Error scraping listing {} on page {} of {}: {}",
                                position, page, self.summary.name, e
                            );
                            self.summary.skipped += 1;
                            if e.is_unknown_label() {
                                self.summary.unknown_labels += 1;
                            }
                        }
                    }
                }

                State::AdvancingPage { page, control } => match control {
                    NextPage::Enabled => self.state = State::Loading { page: page + 1 },
                    NextPage::Disabled => info!("No more pages for {}.", self.summary.name),
                    NextPage::Missing => info!("No next button found for {}", self.summary.name),
                },
            }
        }
    }
}
