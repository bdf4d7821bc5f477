use std::time::Duration;

use reqwest::{Client, Url};

use crate::env::PageContext;
use crate::error::LoadError;
use crate::numeric::{ToNumber, or_zero};
use crate::ui::Console;

/// Path read relative to the page origin when none is configured.
pub const DATA_FILE_PATH: &str = "data.txt";

/// Dataset used whenever the read fails.
pub const DEFAULT_DATA: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

/// Reads the comma-separated dataset from the page origin.
pub struct DataLoader {
    client: Client,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(10), Duration::from_secs(30))
    }

    /// Builds a loader with explicit connect and request timeouts. Falls back
    /// to a default client if the builder rejects the configuration.
    pub fn with_timeouts(connect: Duration, request: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
                Client::new()
            });
        Self { client }
    }

    /// Issues a single GET of `<origin>/<path>` and returns the body text.
    pub async fn read_file_data(
        &self,
        ctx: &dyn PageContext,
        path: &str,
    ) -> Result<String, LoadError> {
        let origin = ctx.origin().ok_or_else(|| LoadError::NoOrigin {
            path: path.to_string(),
        })?;
        let raw = format!("{origin}/{path}");
        let url = Url::parse(&raw).map_err(|e| LoadError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(%url, "reading dataset");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Reads and parses the dataset, substituting [`DEFAULT_DATA`] on any read
    /// failure. The failure reason is logged; nothing propagates.
    pub async fn load_dataset(
        &self,
        ctx: &dyn PageContext,
        path: &str,
        console: &Console,
    ) -> Vec<f64> {
        match self.read_file_data(ctx, path).await {
            Ok(text) => parse_dataset(&text),
            Err(e) => {
                tracing::debug!(error = %e, path, "dataset read failed, using defaults");
                console.error(format!("Error reading data: {e}"));
                console.log("Using default data.");
                DEFAULT_DATA.to_vec()
            }
        }
    }
}

/// Splits on commas and coerces each trimmed token. Invalid tokens become 0,
/// so parsing never fails: empty text yields `[0]`.
pub fn parse_dataset(text: &str) -> Vec<f64> {
    text.split(',')
        .map(|token| or_zero(token.trim().to_number()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Document, Headless, PageBacked};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_for(server: &MockServer) -> PageBacked {
        let url = Url::parse(&format!("{}/index.html#x", server.uri())).unwrap();
        PageBacked::new(url, Document::InMemory)
    }

    #[test]
    fn parse_plain_list() {
        assert_eq!(parse_dataset("3,1,2"), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn parse_trims_and_zeroes_invalid_tokens() {
        assert_eq!(parse_dataset(" 3, a ,2\n"), vec![3.0, 0.0, 2.0]);
        assert_eq!(parse_dataset("1.5,,-4"), vec![1.5, 0.0, -4.0]);
    }

    #[test]
    fn parse_empty_text_is_single_zero() {
        assert_eq!(parse_dataset(""), vec![0.0]);
    }

    #[tokio::test]
    async fn read_returns_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("5,4,3"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = DataLoader::new();
        let text = loader
            .read_file_data(&page_for(&server), DATA_FILE_PATH)
            .await
            .unwrap();
        assert_eq!(text, "5,4,3");
    }

    #[tokio::test]
    async fn read_non_success_status_is_descriptive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = DataLoader::new()
            .read_file_data(&page_for(&server), "data.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "Failed to fetch data from data.txt");
    }

    #[tokio::test]
    async fn read_headless_has_no_origin() {
        let err = DataLoader::new()
            .read_file_data(&Headless, "data.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::NoOrigin { .. }));
    }

    #[tokio::test]
    async fn load_parses_fetched_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/numbers.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("10, x, 2"))
            .mount(&server)
            .await;

        let console = Console::capturing();
        let data = DataLoader::new()
            .load_dataset(&page_for(&server), "numbers.csv", &console)
            .await;
        assert_eq!(data, vec![10.0, 0.0, 2.0]);
        assert!(console.lines().is_empty());
    }

    #[tokio::test]
    async fn load_falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let console = Console::capturing();
        let data = DataLoader::new()
            .load_dataset(&page_for(&server), "data.txt", &console)
            .await;
        assert_eq!(data, DEFAULT_DATA.to_vec());
        assert_eq!(
            console.lines(),
            vec![
                "Error reading data: Failed to fetch data from data.txt",
                "Using default data.",
            ]
        );
    }

    #[tokio::test]
    async fn load_falls_back_when_headless() {
        let console = Console::capturing();
        let data = DataLoader::new()
            .load_dataset(&Headless, DATA_FILE_PATH, &console)
            .await;
        assert_eq!(data, DEFAULT_DATA.to_vec());
        assert_eq!(console.lines().last().map(String::as_str), Some("Using default data."));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/index.html")).unwrap();
        let page = PageBacked::new(url, Document::InMemory);
        let loader = DataLoader::new();

        let err = loader.read_file_data(&page, "data.txt").await.unwrap_err();
        assert!(matches!(err, LoadError::Network(_)));

        let console = Console::capturing();
        let data = loader.load_dataset(&page, "data.txt", &console).await;
        assert_eq!(data, DEFAULT_DATA.to_vec());
        let lines = console.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Error reading data: network error:"));
        assert_eq!(lines[1], "Using default data.");
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn fallback_emits_no_warn_level_trace() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let console = Console::capturing();
        let data = DataLoader::new()
            .load_dataset(&Headless, DATA_FILE_PATH, &console)
            .await;

        assert_eq!(data, DEFAULT_DATA.to_vec());
        assert_eq!(console.lines().len(), 2);
        assert!(buf.0.lock().unwrap().is_empty());
    }
}
