//! Query builder for the PostgREST endpoint (`{project}/rest/v1`).
//!
//! ```ignore
//! let rows: Vec<Notification> = rest
//!     .from("notifications")
//!     .select("*, actor:actor_id (id, full_name)")
//!     .eq("user_id", user_id)
//!     .order("created_at", false)
//!     .limit(20)
//!     .execute()
//!     .await?;
//! ```

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::TokenSource;
use crate::error::ApiError;
use crate::Project;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Shared connection to the REST endpoint.
#[derive(Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    rest_url: String,
    api_key: String,
    token_source: Arc<dyn TokenSource>,
}

impl PostgrestClient {
    pub fn new(project: &Project, token_source: Arc<dyn TokenSource>) -> Self {
        Self::with_http(reqwest::Client::new(), project, token_source)
    }

    pub fn with_http(http: reqwest::Client, project: &Project, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            rest_url: format!("{}/rest/v1", project.url),
            api_key: project.anon_key.clone(),
            token_source,
        }
    }

    /// Start a query against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    async fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token_source.token().await?;
        Ok(builder.bearer_auth(token.as_deref().unwrap_or(&self.api_key)))
    }
}

/// One request under construction. Filters and modifiers accumulate as
/// query parameters; a terminal method picks the HTTP verb and sends.
pub struct QueryBuilder<'a> {
    client: &'a PostgrestClient,
    table: String,
    params: Vec<(String, String)>,
}

impl<'a> QueryBuilder<'a> {
    /// Columns to return. Whitespace is stripped, so multi-line embed
    /// strings can be written readably.
    pub fn select(mut self, columns: &str) -> Self {
        let compact: String = columns.split_whitespace().collect();
        self.params.push(("select".into(), compact));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{}.{}", column, dir)));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    /// Inclusive row range, `from..=to`.
    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.params.push(("offset".into(), from.to_string()));
        self.params
            .push(("limit".into(), (to.saturating_sub(from) + 1).to_string()));
        self
    }

    /// Unauthenticated request with URL, parameters and `apikey` set.
    pub fn request(&self, method: Method) -> RequestBuilder {
        let url = format!("{}/{}", self.client.rest_url, self.table);
        self.client
            .http
            .request(method, url)
            .query(&self.params)
            .header("apikey", &self.client.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let builder = self.client.authed(builder).await?;
        debug!(table = %self.table, "postgrest request");
        Ok(builder.send().await?)
    }

    /// All matching rows.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        let resp = self.send(self.request(Method::GET)).await?;
        parse(resp).await
    }

    /// Exactly one row; zero rows is `Ok(None)`.
    pub async fn single<T: DeserializeOwned>(self) -> Result<Option<T>, ApiError> {
        let req = self.request(Method::GET).header(ACCEPT, SINGLE_OBJECT);
        let resp = self.send(req).await?;
        match parse(resp).await {
            Ok(row) => Ok(Some(row)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Exact number of matching rows, without transferring them.
    pub async fn count(self) -> Result<u64, ApiError> {
        let req = self
            .request(Method::HEAD)
            .header("Prefer", "count=exact");
        let resp = self.send(req).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                code: None,
                message: "count request failed".into(),
            });
        }
        let header = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Decode("missing Content-Range".into()))?;
        parse_content_range(header)
    }

    /// Insert one row and return it as stored.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(self, row: &B) -> Result<T, ApiError> {
        let req = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(row);
        parse(self.send(req).await?).await
    }

    /// Insert without reading the row back.
    pub async fn insert_silent<B: Serialize>(self, row: &B) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(row);
        check(self.send(req).await?).await
    }

    /// Patch the one matching row and return it.
    pub async fn update<B: Serialize, T: DeserializeOwned>(self, patch: &B) -> Result<T, ApiError> {
        let req = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(patch);
        parse(self.send(req).await?).await
    }

    /// Patch every matching row without reading them back.
    pub async fn update_silent<B: Serialize>(self, patch: &B) -> Result<(), ApiError> {
        let req = self
            .request(Method::PATCH)
            .header("Prefer", "return=minimal")
            .json(patch);
        check(self.send(req).await?).await
    }

    pub async fn delete(self) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE);
        check(self.send(req).await?).await
    }
}

/// Total from `Content-Range: 0-24/3573` or `*/0`.
pub fn parse_content_range(header: &str) -> Result<u64, ApiError> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
        .ok_or_else(|| ApiError::Decode(format!("bad Content-Range: {}", header)))
}

async fn check(resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status.as_u16(), &body));
    }
    Ok(())
}

async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status.as_u16(), &body));
    }
    resp.json::<R>()
        .await
        .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
}
