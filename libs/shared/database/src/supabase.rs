use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Rows requested per page by `fetch_all`. Matches the default `max-rows`
/// of hosted PostgREST.
pub const PAGE_SIZE: usize = 1000;

/// Thin PostgREST client. Every request is made with the service key, so row
/// access is decided by the calling service rather than by database policies.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Reads every row behind `path` page by page. A single GET is silently
    /// truncated at the server's `max-rows`, so unbounded listings go
    /// through here. `path` must carry a total `order`.
    pub async fn fetch_all<T>(&self, path: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        self.fetch_all_paged(path, PAGE_SIZE).await
    }

    pub async fn fetch_all_paged<T>(&self, path: &str, page_size: usize) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let page_size = page_size.max(1);
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut rows = Vec::new();

        loop {
            let page_path = format!("{}{}limit={}&offset={}", path, separator, page_size, rows.len());
            let page: Vec<T> = self.request(Method::GET, &page_path, None).await?;
            let fetched = page.len();
            rows.extend(page);

            if fetched < page_size {
                break;
            }
        }

        debug!("Fetched {} rows from {}", rows.len(), path);
        Ok(rows)
    }

    /// Headers asking PostgREST to echo the affected rows back.
    pub fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }
}
