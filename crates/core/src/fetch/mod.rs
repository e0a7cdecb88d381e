use futures::future;
use serde::Deserialize;

use crate::{config::ApiConfig, DreamCanvasError, DreamRecord, Result};

/// How many index entries one session requests.
pub const INDEX_PAGE_LIMIT: usize = 50;
/// How many of those entries are fetched in full detail.
pub const DETAIL_FETCH_LIMIT: usize = 20;

/// One page of the dream index.
#[derive(Debug, Clone, Deserialize)]
pub struct DreamIndexPage {
    pub dreams: Vec<DreamIndexEntry>,
    pub total: u64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

/// Index entries only carry the storage key of the full record.
#[derive(Debug, Clone, Deserialize)]
pub struct DreamIndexEntry {
    pub key: String,
}

/// Read-only client for the remote dream API.
#[derive(Debug, Clone)]
pub struct DreamFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl DreamFetcher {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a bounded sample of the user's dreams: one index page, then
    /// full detail for up to [`DETAIL_FETCH_LIMIT`] entries in parallel.
    ///
    /// An index failure fails the whole operation; a single detail failure
    /// only drops that record (logged as a warning). The successes come
    /// back in index order.
    pub async fn fetch_recent(&self, token: &str, phone: &str) -> Result<Vec<DreamRecord>> {
        let user_key = user_key_from_phone(phone);
        let page = self.fetch_index(token, &user_key, INDEX_PAGE_LIMIT, 0).await?;
        tracing::debug!(
            total = page.total,
            has_more = page.has_more,
            "fetched dream index page"
        );

        let ids = detail_ids(&page);
        let fetches = ids.iter().map(|id| self.fetch_detail(token, &user_key, id));
        let results = future::join_all(fetches).await;

        Ok(collect_successes(&ids, results))
    }

    /// Requests one page of the dream index.
    pub async fn fetch_index(
        &self,
        token: &str,
        user_key: &str,
        limit: usize,
        offset: usize,
    ) -> Result<DreamIndexPage> {
        let url = format!("{}/api/dreams/{user_key}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DreamCanvasError::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn fetch_detail(&self, token: &str, user_key: &str, id: &str) -> Result<DreamRecord> {
        let url = format!("{}/api/dreams/{user_key}/{id}", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DreamCanvasError::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// The API keys users by phone number without the leading `+`.
pub fn user_key_from_phone(phone: &str) -> String {
    phone.trim_start_matches('+').to_string()
}

/// Detail ids for the first [`DETAIL_FETCH_LIMIT`] index entries.
fn detail_ids(page: &DreamIndexPage) -> Vec<String> {
    page.dreams
        .iter()
        .take(DETAIL_FETCH_LIMIT)
        .filter_map(|entry| {
            let id = detail_id(&entry.key);
            (!id.is_empty()).then_some(id)
        })
        .collect()
}

/// An index key like `15551234567/dream-3.json` resolves to the detail
/// id `dream-3`.
fn detail_id(key: &str) -> String {
    let segment = key.rsplit('/').next().unwrap_or(key);
    segment.strip_suffix(".json").unwrap_or(segment).to_string()
}

fn collect_successes(ids: &[String], results: Vec<Result<DreamRecord>>) -> Vec<DreamRecord> {
    let mut dreams = Vec::with_capacity(results.len());
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(dream) => dreams.push(dream),
            Err(error) => {
                tracing::warn!(dream_id = %id, %error, "dropping dream that failed to load");
            }
        }
    }
    dreams
}
