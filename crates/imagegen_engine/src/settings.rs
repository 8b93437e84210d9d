use std::time::Duration;

/// Connection settings shared by every client that talks to the backend.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub api_key: String,
    pub connect_timeout: Duration,
    /// Transport-level bound for a single request. Expiry maps to a transport error.
    pub request_timeout: Duration,
    /// Largest image accepted by the downloader.
    pub max_download_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_download_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServiceSettings {
    pub(crate) fn endpoint(&self, path: &str) -> Result<url::Url, url::ParseError> {
        let base = self.base_url.trim_end_matches('/');
        url::Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
    }
}
