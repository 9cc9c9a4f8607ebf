use serde_json::Value;
use thiserror::Error;

use super::{extract_error_message, SupabaseClient};

/// Timestamp literal resolved by the store at write time.
pub const SERVER_NOW: &str = "now()";

/// Accept header that makes PostgREST return a bare object for
/// exactly-one-row reads (and 406 otherwise).
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Table store failures. `NotFound` is a single-row read that matched no
/// row; `Rejected` is the store refusing an operation (constraint, RLS,
/// unknown table); `Transport` is the store being unreachable. Read
/// handlers substitute defaults for all three, but the distinction keeps
/// "no row yet" separable from "outage" in logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("table store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Builder for one PostgREST request: `client.table("insurances")
/// .eq("user_id", id).limit(3).select()`.
pub struct TableRequest<'a> {
    client: &'a SupabaseClient,
    table: String,
    filters: Vec<(String, String)>,
    limit: Option<u32>,
}

impl<'a> TableRequest<'a> {
    pub(super) fn new(client: &'a SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Equality filter (`column=eq.value` on the wire).
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// GET all matching rows. Zero matches is an empty vec, not an error.
    pub async fn select(self) -> Result<Vec<Value>, StoreError> {
        let res = self
            .client
            .http()
            .get(self.url())
            .query(&self.read_query())
            .header("apikey", self.client.anon_key())
            .bearer_auth(self.client.table_bearer())
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    /// GET expecting exactly one row; zero rows surface as `NotFound`.
    pub async fn select_single(self) -> Result<Value, StoreError> {
        let res = self
            .client
            .http()
            .get(self.url())
            .query(&self.read_query())
            .header("apikey", self.client.anon_key())
            .header("Accept", SINGLE_OBJECT)
            .bearer_auth(self.client.table_bearer())
            .send()
            .await?;

        if res.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Err(StoreError::NotFound);
        }
        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    /// POST a new row, returning the inserted representation.
    pub async fn insert(self, row: Value) -> Result<Vec<Value>, StoreError> {
        let res = self
            .client
            .http()
            .post(self.url())
            .header("apikey", self.client.anon_key())
            .header("Prefer", "return=representation")
            .bearer_auth(self.client.table_bearer())
            .json(&row)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    /// Insert-or-update keyed on `on_conflict`, returning the stored rows.
    pub async fn upsert(self, row: Value, on_conflict: &str) -> Result<Vec<Value>, StoreError> {
        let res = self
            .client
            .http()
            .post(self.url())
            .query(&[("on_conflict", on_conflict)])
            .header("apikey", self.client.anon_key())
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .bearer_auth(self.client.table_bearer())
            .json(&row)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    fn url(&self) -> String {
        self.client.endpoint(&format!("rest/v1/{}", self.table))
    }

    fn read_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(self.filters.iter().cloned());
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

async fn rejection(res: reqwest::Response) -> StoreError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    StoreError::Rejected {
        status: status.as_u16(),
        message: extract_error_message(&body, status),
    }
}
