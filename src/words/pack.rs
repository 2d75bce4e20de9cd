//! Typing packs: self-contained word lists stored as `<pack_id>.json`.
//!
//! A pack request names its level, topic and sub-topic and carries raw items.
//! Building a pack drops items without Korean text or an English meaning,
//! precomputes each item's typing targets and hint, and fills in a default
//! title and id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hangul::decompose;
use crate::words::{Curriculum, SourceError, Word, WordSource, default_icon, natural_cmp};

const VOCABULARY: &str = "vocabulary";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("type, level, topic, sub_topic are required")]
    MissingFields,
    #[error("items array is required and must not be empty")]
    NoItems,
    #[error("items must contain at least one valid entry")]
    NoValidItems,
    #[error("pack_id {0:?} must be a plain file name")]
    InvalidPackId(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub korean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Any other fields are kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PackItem {
    pub fn to_word(&self) -> Option<Word> {
        Some(Word::new(
            self.korean.as_deref()?,
            self.english.as_deref().unwrap_or_default(),
            self.pos.as_deref().unwrap_or_default(),
        ))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PackRequest {
    #[serde(default, rename = "type")]
    pub pack_type: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sub_topic: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pack_id: Option<String>,
    #[serde(default)]
    pub items: Vec<PackItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    pub pack_id: String,
    #[serde(rename = "type")]
    pub pack_type: String,
    pub level: String,
    pub topic: String,
    pub sub_topic: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PackItem>,
}

impl Pack {
    pub fn words(&self) -> Vec<Word> {
        self.items.iter().filter_map(PackItem::to_word).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackSummary {
    pub pack_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub pack_type: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sub_topic: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub item_count: usize,
}

impl From<&Pack> for PackSummary {
    fn from(pack: &Pack) -> Self {
        Self {
            pack_id: pack.pack_id.clone(),
            title: Some(pack.title.clone()),
            pack_type: Some(pack.pack_type.clone()),
            level: Some(pack.level.clone()),
            topic: Some(pack.topic.clone()),
            sub_topic: Some(pack.sub_topic.clone()),
            created_at: Some(pack.created_at),
            item_count: pack.items.len(),
        }
    }
}

impl From<PackSummary> for Curriculum {
    fn from(summary: PackSummary) -> Self {
        let description = match (&summary.level, &summary.topic) {
            (Some(level), Some(topic)) => format!("{level} · {topic}"),
            _ => String::new(),
        };
        Curriculum {
            name: summary.title.unwrap_or_else(|| summary.pack_id.clone()),
            id: summary.pack_id,
            icon: default_icon(),
            description,
        }
    }
}

/// Lowercased slug: drops punctuation, keeps letters (Hangul included),
/// digits, `_` and `-`, and turns whitespace runs into a single `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            if pending_space {
                slug.push('_');
                pending_space = false;
            }
            slug.extend(c.to_lowercase());
        }
    }
    slug.trim_matches('_').to_string()
}

/// A pack id names one file in the pack directory: no separators, no
/// leading dot.
pub fn is_valid_pack_id(id: &str) -> bool {
    !id.is_empty() && !id.starts_with('.') && !id.contains(['/', '\\', '\0'])
}

pub fn build_pack_id(level: &str, topic: &str, sub_topic: &str) -> String {
    format!("{}_{}_{}", slugify(level), slugify(topic), slugify(sub_topic))
}

fn required(field: &Option<String>) -> Result<&str, PackError> {
    field
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(PackError::MissingFields)
}

pub fn build_pack(request: &PackRequest) -> Result<Pack, PackError> {
    let pack_type = required(&request.pack_type)?;
    let level = required(&request.level)?;
    let topic = required(&request.topic)?;
    let sub_topic = required(&request.sub_topic)?;

    if request.items.is_empty() {
        return Err(PackError::NoItems);
    }

    let items: Vec<PackItem> = request
        .items
        .iter()
        .filter_map(|item| process_item(item, pack_type))
        .collect();
    if items.is_empty() {
        return Err(PackError::NoValidItems);
    }

    let pack_id = request
        .pack_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| build_pack_id(level, topic, sub_topic));
    if !is_valid_pack_id(&pack_id) {
        return Err(PackError::InvalidPackId(pack_id));
    }
    let title = request
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{level} · {topic} · {sub_topic}"));

    Ok(Pack {
        pack_id,
        pack_type: pack_type.to_string(),
        level: level.to_string(),
        topic: topic.to_string(),
        sub_topic: sub_topic.to_string(),
        title,
        created_at: Utc::now(),
        items,
    })
}

fn process_item(item: &PackItem, pack_type: &str) -> Option<PackItem> {
    let korean = item.korean.as_deref().filter(|s| !s.is_empty())?;
    item.english.as_deref().filter(|s| !s.is_empty())?;

    let mut processed = item.clone();
    if pack_type != VOCABULARY {
        processed.pos = None;
    }
    let targets = processed.typing_targets.get_or_insert_with(|| {
        decompose(korean).into_iter().map(String::from).collect()
    });
    if processed.hint.is_none() {
        processed.hint = Some(targets.concat());
    }
    Some(processed)
}

/// Packs stored as JSON files in one directory; each pack is a curriculum.
pub struct PackDirSource {
    dir: PathBuf,
}

impl PackDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pack_path(&self, pack_id: &str) -> Result<PathBuf, SourceError> {
        if !is_valid_pack_id(pack_id) {
            return Err(PackError::InvalidPackId(pack_id.to_string()).into());
        }
        Ok(self.dir.join(format!("{pack_id}.json")))
    }

    pub fn has_packs(&self) -> bool {
        self.pack_files().next().is_some()
    }

    fn pack_files(&self) -> impl Iterator<Item = PathBuf> {
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
    }

    pub fn load_pack(&self, pack_id: &str) -> Result<Pack, SourceError> {
        let path = self.pack_path(pack_id)?;
        if !path.exists() {
            return Err(SourceError::NotFound(pack_id.to_string()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save_pack(&self, pack: &Pack) -> Result<PathBuf, SourceError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.pack_path(&pack.pack_id)?;
        fs::write(&path, serde_json::to_string_pretty(pack)?)?;
        Ok(path)
    }

    /// Validate and build a pack from `request`, then write it to the directory.
    pub fn create_pack(&self, request: &PackRequest) -> Result<Pack, SourceError> {
        let pack = build_pack(request)?;
        let path = self.save_pack(&pack)?;
        log::info!(
            "saved pack {} ({} items) to {}",
            pack.pack_id,
            pack.items.len(),
            path.display()
        );
        Ok(pack)
    }

    pub fn delete_pack(&self, pack_id: &str) -> Result<(), SourceError> {
        let path = self.pack_path(pack_id)?;
        if !path.exists() {
            return Err(SourceError::NotFound(pack_id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Summaries of every readable pack, ordered by id. Unreadable files are skipped.
    pub fn list_packs(&self) -> Vec<PackSummary> {
        let mut packs: Vec<PackSummary> = self
            .pack_files()
            .filter_map(|path| {
                let content = fs::read_to_string(&path).ok()?;
                match serde_json::from_str::<Pack>(&content) {
                    Ok(pack) => Some(PackSummary::from(&pack)),
                    Err(e) => {
                        log::warn!("skipping unreadable pack {}: {e}", path.display());
                        None
                    }
                }
            })
            .collect();
        packs.sort_by(|a, b| natural_cmp(&a.pack_id, &b.pack_id));
        packs
    }
}

impl WordSource for PackDirSource {
    fn curriculums(&self) -> Result<Vec<Curriculum>, SourceError> {
        Ok(self.list_packs().into_iter().map(Curriculum::from).collect())
    }

    fn words(&self, curriculum: &str) -> Result<Vec<Word>, SourceError> {
        Ok(self.load_pack(curriculum)?.words())
    }
}
