//! Stateless HTTP request builder and response parser for the Notion API.
//!
//! # Design
//! `NotionClient` holds the API base URL and the integration token and
//! carries no mutable state between calls. Each remote operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreatePage, Page, QueryDatabase, QueryResponse, UpdatePage};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// API version pinned in the `notion-version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest `page_size` Notion accepts on a database query.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Synchronous, stateless client for the Notion pages and databases API.
#[derive(Clone)]
pub struct NotionClient {
    base_url: String,
    token: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl NotionClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn build_query_database(
        &self,
        database_id: &str,
        query: &QueryDatabase,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            format!("{}/v1/databases/{database_id}/query", self.base_url),
            query,
        )
    }

    pub fn build_create_page(&self, input: &CreatePage) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, format!("{}/v1/pages", self.base_url), input)
    }

    pub fn build_update_page(
        &self,
        page_id: &str,
        input: &UpdatePage,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Patch,
            format!("{}/v1/pages/{page_id}", self.base_url),
            input,
        )
    }

    pub fn parse_query_database(&self, response: HttpResponse) -> Result<QueryResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_page(&self, response: HttpResponse) -> Result<Page, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_page(&self, response: HttpResponse) -> Result<Page, ApiError> {
        parse_json(response)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", self.token)),
                ("notion-version".to_string(), NOTION_VERSION.to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }
}

/// Notion answers every call we make with 200 on success.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if response.status != 200 {
        return Err(ApiError::from_status(response.status, &response.body));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
