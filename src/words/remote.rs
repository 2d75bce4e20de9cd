//! Packs served over HTTP by a pack server (`/api/packs`, `/api/packs/<id>`).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::words::pack::{Pack, PackSummary};
use crate::words::{Curriculum, SourceError, Word, WordSource};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PackList {
    #[serde(default)]
    packs: Vec<PackSummary>,
}

pub struct RemoteSource {
    base_url: String,
    client: Client,
}

impl RemoteSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_text(&self, path: &str) -> Result<Option<String>, SourceError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url}");
        let response = self.client.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.text()?))
    }

    pub fn list_packs(&self) -> Result<Vec<PackSummary>, SourceError> {
        let body = self
            .get_text("/api/packs")?
            .ok_or_else(|| SourceError::NotFound(self.base_url.clone()))?;
        Ok(parse_pack_list(&body)?)
    }

    pub fn fetch_pack(&self, pack_id: &str) -> Result<Pack, SourceError> {
        let body = self
            .get_text(&format!("/api/packs/{pack_id}"))?
            .ok_or_else(|| SourceError::NotFound(pack_id.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn parse_pack_list(body: &str) -> Result<Vec<PackSummary>, serde_json::Error> {
    Ok(serde_json::from_str::<PackList>(body)?.packs)
}

impl WordSource for RemoteSource {
    fn curriculums(&self) -> Result<Vec<Curriculum>, SourceError> {
        Ok(self
            .list_packs()?
            .into_iter()
            .map(Curriculum::from)
            .collect())
    }

    fn words(&self, curriculum: &str) -> Result<Vec<Word>, SourceError> {
        Ok(self.fetch_pack(curriculum)?.words())
    }
}
