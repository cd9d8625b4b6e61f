use ureq::Agent;

use crate::config::HttpConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },
}

impl FetchError {
    fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            source => FetchError::Transport {
                url: url.to_string(),
                source,
            },
        }
    }
}

/// Blocking GET access to the outside world. Every network consumer goes
/// through this so tests can serve canned pages.
pub trait Transport {
    /// Fetch a text body. Non-2xx statuses are errors.
    fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
    /// Fetch a binary body under the download timeout.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`Transport`] over two `ureq` agents: one for pages and APIs, one with a
/// longer budget for PDFs.
pub struct HttpClient {
    api: Agent,
    download: Agent,
    user_agent: String,
    max_page_bytes: u64,
    max_download_bytes: u64,
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> Self {
        let api = Agent::config_builder()
            .timeout_connect(Some(cfg.connect_timeout()))
            .timeout_global(Some(cfg.timeout()))
            .build();
        let download = Agent::config_builder()
            .timeout_connect(Some(cfg.connect_timeout()))
            .timeout_global(Some(cfg.download_timeout()))
            .build();
        HttpClient {
            api: Agent::new_with_config(api),
            download: Agent::new_with_config(download),
            user_agent: cfg.user_agent.clone(),
            max_page_bytes: cfg.max_page_bytes,
            max_download_bytes: cfg.max_download_bytes,
        }
    }
}

impl Transport for HttpClient {
    fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let mut req = self.api.get(url).header("User-Agent", self.user_agent.as_str());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        tracing::debug!(url, "GET");
        // ureq defaults to a 10 MiB cap.
        let mut res = req.call().map_err(|e| FetchError::from_ureq(url, e))?;
        res.body_mut()
            .with_config()
            .limit(self.max_page_bytes)
            .read_to_string()
            .map_err(|e| FetchError::from_ureq(url, e))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url, "GET (download)");
        let mut res = self
            .download
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| FetchError::from_ureq(url, e))?;
        res.body_mut()
            .with_config()
            .limit(self.max_download_bytes)
            .read_to_vec()
            .map_err(|e| FetchError::from_ureq(url, e))
    }
}

#[cfg(test)]
pub mod fake {
    //! Canned-response transport for tests.

    use std::{cell::RefCell, collections::HashMap};

    use super::{FetchError, Transport};

    #[derive(Default)]
    pub struct FakeTransport {
        pages: HashMap<String, Result<Vec<u8>, u16>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.pages.insert(url.to_string(), Ok(body.into()));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn lookup(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            // Exact match first, then the registered URL that prefixes the request.
            let hit = self.pages.get(url).or_else(|| {
                self.pages
                    .iter()
                    .filter(|(k, _)| url.starts_with(k.as_str()))
                    .max_by_key(|(k, _)| k.len())
                    .map(|(_, v)| v)
            });
            match hit {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    impl Transport for FakeTransport {
        fn get_text(&self, url: &str, _headers: &[(&str, &str)]) -> Result<String, FetchError> {
            self.lookup(url)
                .map(|b| String::from_utf8_lossy(&b).into_owned())
        }

        fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.lookup(url)
        }
    }
}
