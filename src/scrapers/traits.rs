use crate::error::{FetchError, SinkError};
use crate::models::ListingRecord;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One results page to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub slug: String,
    pub page: u32,
    /// Wait between the page becoming ready and reading its markup
    pub settle: Duration,
}

/// Something that can load the site's results pages.
///
/// Implemented by the headless browser and the plain HTTP client, and by
/// in-memory fakes in tests.
pub trait PageSource {
    /// Get past anything blocking the site (cookie banners) before the first fetch.
    fn prepare(&mut self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Load a results page and return its markup once it is ready.
    fn fetch(&mut self, request: &PageRequest) -> Result<String, FetchError>;

    /// Save a diagnostic capture of the current page.
    fn snapshot(&mut self, label: &str) -> Result<PathBuf, FetchError>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}

macro_rules! forward_page_source {
    ($($ty:ty),*) => {$(
        impl<T: PageSource + ?Sized> PageSource for $ty {
            fn prepare(&mut self) -> Result<(), FetchError> {
                (**self).prepare()
            }

            fn fetch(&mut self, request: &PageRequest) -> Result<String, FetchError> {
                (**self).fetch(request)
            }

            fn snapshot(&mut self, label: &str) -> Result<PathBuf, FetchError> {
                (**self).snapshot(label)
            }

            fn source_name(&self) -> &'static str {
                (**self).source_name()
            }
        }
    )*};
}

forward_page_source!(Box<T>, &mut T);

/// Append-only destination for scraped records
pub trait RecordSink {
    fn write(&mut self, record: &ListingRecord) -> Result<(), SinkError>;

    /// Flush and release the output. Later calls are no-ops.
    fn close(&mut self) -> Result<(), SinkError>;

    /// Where the records end up
    fn location(&self) -> &Path;
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn write(&mut self, record: &ListingRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }

    fn location(&self) -> &Path {
        (**self).location()
    }
}
