#![allow(dead_code)]

use car_scout::error::{FetchError, SinkError};
use car_scout::models::ListingRecord;
use car_scout::scrapers::{PageRequest, PageSource, RecordSink};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub enum FakePage {
    Html(String),
    LoadError,
    Timeout,
}

/// In-memory site: pages keyed by (slug, page number)
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<(String, u32), FakePage>,
    pub requests: Vec<(String, u32)>,
    pub snapshots: Vec<String>,
    pub fail_prepare: bool,
    /// Base page never becomes ready
    pub stall_prepare: bool,
    pub prepared: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, slug: &str, page: u32, content: FakePage) -> Self {
        self.pages.insert((slug.to_string(), page), content);
        self
    }

    pub fn pages_requested(&self, slug: &str) -> Vec<u32> {
        self.requests
            .iter()
            .filter(|(s, _)| s == slug)
            .map(|(_, p)| *p)
            .collect()
    }
}

impl PageSource for FakeSource {
    fn prepare(&mut self) -> Result<(), FetchError> {
        if self.stall_prepare {
            return Err(FetchError::WaitTimeout {
                url: "fake://".to_string(),
            });
        }
        if self.fail_prepare {
            return Err(FetchError::Precondition("no consent button".to_string()));
        }
        self.prepared = true;
        Ok(())
    }

    fn fetch(&mut self, request: &PageRequest) -> Result<String, FetchError> {
        self.requests.push((request.slug.clone(), request.page));
        let url = format!("fake://{}?page={}", request.slug, request.page);
        match self.pages.get(&(request.slug.clone(), request.page)) {
            Some(FakePage::Html(html)) => Ok(html.clone()),
            Some(FakePage::Timeout) => Err(FetchError::WaitTimeout { url }),
            Some(FakePage::LoadError) | None => Err(FetchError::Load {
                url,
                message: "not found".to_string(),
            }),
        }
    }

    fn snapshot(&mut self, label: &str) -> Result<PathBuf, FetchError> {
        self.snapshots.push(label.to_string());
        Ok(PathBuf::from(format!("debug_{}.png", label)))
    }

    fn source_name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<ListingRecord>,
    pub closed: u32,
    /// Fail every write after this many records
    pub capacity: Option<usize>,
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        if self.capacity.is_some_and(|cap| self.records.len() >= cap) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.closed += 1;
        Ok(())
    }

    fn location(&self) -> &Path {
        Path::new("memory")
    }
}

/// Rich layout listing; `id` shows up in title, mileage and price.
pub fn listing(id: u32) -> String {
    listing_with(id, &format!("{} 000 km", id), "Gasolina")
}

pub fn listing_with(id: u32, mileage: &str, fuel: &str) -> String {
    format!(
        r#"<section class="ooa-qat6iw">
             <div class="ooa-1qo9a0p">
               <h1><a href="/carros/anuncio/car-{id}">Car {id}</a></h1>
               <p>1 598 cm3 • 1{id}0 cv</p>
             </div>
             <div class="ooa-d3dp2q"><dl>
               <dd data-parameter="mileage">{mileage}</dd>
               <dd data-parameter="fuel_type">{fuel}</dd>
               <dd data-parameter="gearbox">Automática</dd>
               <dd data-parameter="first_registration_year">2 020</dd>
             </dl></div>
             <div class="ooa-2p9dfw">
               <a href="https://www.standvirtual.com/carros/anuncio/car-{id}">ver</a>
               <h3>{id} 500 EUR</h3>
             </div>
           </section>"#
    )
}

/// Listing whose mileage cannot be parsed
pub fn malformed_listing(id: u32) -> String {
    listing_with(id, "sem dados km", "Gasolina")
}

/// Results page; `next` is the disabled flag of the "Next Page" control, `None` leaves it out.
pub fn results_page(listings: &[String], next: Option<bool>) -> String {
    let control = match next {
        Some(disabled) => format!(
            r#"<ul><li title="Next Page" aria-disabled="{}">›</li></ul>"#,
            disabled
        ),
        None => String::new(),
    };
    format!(
        r#"<html><body><main>
             <p class="e17gkxda2"><b>{}</b> anúncios</p>
             {}
             {}
           </main></body></html>"#,
        listings.len(),
        listings.join("\n"),
        control
    )
}

pub fn html(listings: &[String], next: Option<bool>) -> FakePage {
    FakePage::Html(results_page(listings, next))
}

pub fn titles(records: &[ListingRecord]) -> Vec<String> {
    records.iter().map(|r| r.title.clone()).collect()
}
