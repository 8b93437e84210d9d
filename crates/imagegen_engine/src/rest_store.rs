use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_warn};
use imagegen_core::{HistoryEntry, NewHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::{AuthSession, HistoryStore, ServiceSettings, StoreError};

const TABLE_PATH: &str = "rest/v1/image_history";
const COLUMNS: &str = "id,user_id,prompt,image_url,created_at";

#[derive(Debug, Deserialize)]
struct HistoryRow {
    id: String,
    user_id: Option<String>,
    prompt: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            id: row.id,
            owner_id: row.user_id,
            prompt: row.prompt,
            image_ref: row.image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    prompt: &'a str,
    image_url: &'a str,
    user_id: Option<&'a str>,
}

/// `image_history` table behind a PostgREST endpoint. Row-level security on
/// the server scopes every call to the bearer token's user.
#[derive(Debug, Clone)]
pub struct RestHistoryStore {
    settings: ServiceSettings,
    auth: AuthSession,
    client: reqwest::Client,
}

impl RestHistoryStore {
    pub fn new(settings: ServiceSettings, auth: AuthSession) -> Result<Self, StoreError> {
        let client = settings
            .build_client()
            .map_err(|err| StoreError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            auth,
            client,
        })
    }

    fn table_url(&self) -> Result<url::Url, StoreError> {
        self.settings
            .endpoint(TABLE_PATH)
            .map_err(|err| StoreError::Network(err.to_string()))
    }

    fn request(&self, method: reqwest::Method, url: url::Url) -> reqwest::RequestBuilder {
        let token = self
            .auth
            .access_token()
            .unwrap_or_else(|| self.settings.api_key.clone());
        self.client
            .request(method, url)
            .header("apikey", &self.settings.api_key)
            .bearer_auth(token)
    }
}

#[async_trait::async_trait]
impl HistoryStore for RestHistoryStore {
    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        let url = self.table_url()?;
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&InsertRow {
                prompt: &entry.prompt,
                image_url: &entry.image_ref,
                user_id: entry.owner_id.as_deref(),
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let rows: Vec<HistoryRow> = read_json(response).await?;
        rows.into_iter()
            .next()
            .map(HistoryEntry::from)
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn select_recent(
        &self,
        owner: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut url = self.table_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", COLUMNS);
            match owner {
                Some(owner) => query.append_pair("user_id", &format!("eq.{owner}")),
                None => query.append_pair("user_id", "is.null"),
            };
            query.append_pair("order", "created_at.desc");
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let rows: Vec<HistoryRow> = read_json(response).await?;
        engine_debug!("Fetched {} history rows", rows.len());
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));

        let response = self
            .request(reqwest::Method::DELETE, url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(rejected(status.as_u16(), message))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        return Err(rejected(status.as_u16(), body));
    }
    serde_json::from_str(&body).map_err(|err| StoreError::Decode(err.to_string()))
}

fn rejected(status: u16, message: String) -> StoreError {
    engine_warn!("History store returned {}: {}", status, message);
    StoreError::Rejected { status, message }
}

fn map_reqwest_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::Timeout;
    }
    StoreError::Network(err.to_string())
}
