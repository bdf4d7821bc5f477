//! Page context detection.
//!
//! A page context needs both a page URL (origin, path, fragment) and a
//! document body to render into. [`detect`] picks the implementation once at
//! startup; the rest of the crate only talks to [`PageContext`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use reqwest::Url;

use crate::error::DatapassError;

/// Capabilities of the environment a run executes in.
pub trait PageContext: Send + Sync {
    /// Whether page rendering and URL inspection are available.
    fn is_page(&self) -> bool;

    /// Origin of the current page, e.g. `http://localhost:8080`.
    fn origin(&self) -> Option<String>;

    /// Path of the current page; `/` when there is no page.
    fn pathname(&self) -> String;

    /// URL fragment without the leading `#`; empty when absent.
    fn hash(&self) -> String;

    /// Appends an HTML fragment to the end of the document body.
    fn append_html(&self, fragment: &str) -> Result<(), DatapassError>;
}

/// Environment without a page. Rendering is a no-op.
#[derive(Debug, Default)]
pub struct Headless;

impl PageContext for Headless {
    fn is_page(&self) -> bool {
        false
    }

    fn origin(&self) -> Option<String> {
        None
    }

    fn pathname(&self) -> String {
        "/".to_string()
    }

    fn hash(&self) -> String {
        String::new()
    }

    fn append_html(&self, _fragment: &str) -> Result<(), DatapassError> {
        Ok(())
    }
}

/// Where appended body fragments end up.
#[derive(Debug, Clone)]
pub enum Document {
    /// Kept in memory only.
    InMemory,
    /// Also appended to this file.
    File(PathBuf),
}

/// Environment backed by a page URL and a document body.
#[derive(Debug)]
pub struct PageBacked {
    url: Url,
    document: Document,
    body: Mutex<Vec<String>>,
}

impl PageBacked {
    pub fn new(url: Url, document: Document) -> Self {
        Self {
            url,
            document,
            body: Mutex::new(Vec::new()),
        }
    }

    /// Fragments appended to the body so far, oldest first.
    pub fn body(&self) -> Vec<String> {
        self.body.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PageContext for PageBacked {
    fn is_page(&self) -> bool {
        true
    }

    fn origin(&self) -> Option<String> {
        let origin = self.url.origin();
        origin.is_tuple().then(|| origin.ascii_serialization())
    }

    fn pathname(&self) -> String {
        self.url.path().to_string()
    }

    fn hash(&self) -> String {
        self.url.fragment().unwrap_or_default().to_string()
    }

    fn append_html(&self, fragment: &str) -> Result<(), DatapassError> {
        if let Document::File(path) = &self.document {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DatapassError::Render(format!("{}: {e}", path.display())))?;
            writeln!(file, "{fragment}")?;
        }
        self.body
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(fragment.to_string());
        Ok(())
    }
}

/// Returns `true` only for a context with page rendering available.
pub fn is_page_environment(ctx: &dyn PageContext) -> bool {
    ctx.is_page()
}

/// Picks the page-backed context when both a page URL and a document are
/// present, the headless one otherwise.
pub fn detect(page_url: Option<Url>, document: Option<Document>) -> Arc<dyn PageContext> {
    match (page_url, document) {
        (Some(url), Some(document)) => {
            tracing::debug!(%url, "page context detected");
            Arc::new(PageBacked::new(url, document))
        }
        _ => {
            tracing::debug!("no page context, running headless");
            Arc::new(Headless)
        }
    }
}
