//! Spreadsheet-style word tables: one row per word, each tagged with the
//! curriculum it belongs to.

use std::fs;
use std::path::Path;

use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::words::{Curriculum, SourceError, Word, WordSource, default_icon, natural_cmp};

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

const BUILTIN_TABLE: &str = "words.json";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WordRecord {
    #[serde(default)]
    pub korean: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub curriculum: Option<String>,
    #[serde(default)]
    pub curriculum_name: Option<String>,
    #[serde(default)]
    pub curriculum_icon: Option<String>,
    #[serde(default)]
    pub curriculum_description: Option<String>,
}

impl WordRecord {
    fn to_word(&self) -> Option<Word> {
        let text = self.korean.as_deref()?;
        Some(Word::new(
            text,
            self.english.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
        ))
    }
}

pub struct TableSource {
    records: Vec<WordRecord>,
}

impl TableSource {
    pub fn new(records: Vec<WordRecord>) -> Self {
        Self { records }
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// The sample table compiled into the binary.
    pub fn builtin() -> Result<Self, SourceError> {
        let file = Assets::get(BUILTIN_TABLE)
            .ok_or_else(|| SourceError::NotFound(BUILTIN_TABLE.to_string()))?;
        let json = String::from_utf8_lossy(&file.data);
        Self::from_json(&json)
    }

    /// Words at one level (e.g. `beginner1`), across all curriculums.
    pub fn words_for_level(&self, level: &str) -> Vec<Word> {
        self.records
            .iter()
            .filter(|r| r.level.as_deref() == Some(level))
            .filter_map(WordRecord::to_word)
            .collect()
    }
}

impl WordSource for TableSource {
    /// First row of each curriculum id supplies its name, icon and description.
    fn curriculums(&self) -> Result<Vec<Curriculum>, SourceError> {
        let mut curriculums: Vec<Curriculum> = Vec::new();
        for record in &self.records {
            let Some(id) = record.curriculum.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            if curriculums.iter().any(|c| c.id == id) {
                continue;
            }
            curriculums.push(Curriculum {
                id: id.to_string(),
                name: record.curriculum_name.clone().unwrap_or_else(|| id.to_string()),
                icon: record.curriculum_icon.clone().unwrap_or_else(default_icon),
                description: record.curriculum_description.clone().unwrap_or_default(),
            });
        }
        curriculums.sort_by(|a, b| natural_cmp(&a.id, &b.id));
        Ok(curriculums)
    }

    fn words(&self, curriculum: &str) -> Result<Vec<Word>, SourceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.curriculum.as_deref() == Some(curriculum))
            .filter_map(WordRecord::to_word)
            .collect())
    }
}
