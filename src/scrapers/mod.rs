pub mod browser;
pub mod extractor;
pub mod http;
pub mod orchestrator;
pub mod selectors;
pub mod traits;
pub mod walker;

pub use browser::BrowserSource;
pub use extractor::Extractor;
pub use http::HttpSource;
pub use orchestrator::{CategorySummary, Orchestrator, RunSummary};
pub use traits::{PageRequest, PageSource, RecordSink};
pub use walker::{PageWalker, WalkOptions};

use std::path::{Path, PathBuf};

/// `debug_<label>.<ext>` inside `dir`, with the label made file-name safe.
pub(crate) fn snapshot_path(dir: &Path, label: &str, ext: &str) -> PathBuf {
    let safe: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    dir.join(format!("debug_{}.{}", safe, ext))
}
