use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DatabaseError;

/// Thin PostgREST client. Paths are passed through verbatim, so callers
/// must url-encode any user-provided filter values.
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

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    /// `Prefer: return=representation`, so writes echo the stored rows.
    pub fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response, DatabaseError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(DatabaseError::from_response(status.as_u16(), &error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Runs a write with `return=representation` and yields the affected rows.
    pub async fn write_returning<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, Some(Self::representation_headers()))
            .await
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T>(&self, path: &str, body: Value) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.write_returning(Method::POST, path, Some(body)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::UnexpectedResponse(format!("insert into {} returned no rows", path)))
    }

    /// Fetches at most one row.
    pub async fn fetch_one<T>(&self, path: &str) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn exists(&self, path: &str) -> Result<bool, DatabaseError> {
        let rows: Vec<Value> = self.request(Method::GET, path, None).await?;
        Ok(!rows.is_empty())
    }

    /// Fetches one page of rows together with the exact total count.
    pub async fn fetch_page<T>(&self, path: &str) -> Result<(Vec<T>, u64), DatabaseError>
    where
        T: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.send(Method::GET, path, None, Some(headers)).await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total);

        let rows: Vec<T> = response.json().await?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok((rows, total))
    }

    /// Counts rows matching `path` without transferring them.
    pub async fn count(&self, path: &str) -> Result<u64, DatabaseError> {
        let separator = if path.contains('?') { "&" } else { "?" };
        let counted_path = format!("{}{}limit=0", path, separator);
        let (_, total) = self.fetch_page::<Value>(&counted_path).await?;
        Ok(total)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parses the total from a `Content-Range` value such as `0-9/42` or `*/0`.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
