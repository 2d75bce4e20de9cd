use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::result::DrillResult;
use crate::store::schema::{HistoryData, ProgressData};

/// Oldest drills are dropped once history grows past this.
pub const HISTORY_LIMIT: usize = 500;

/// Get/set of saved progress keyed by curriculum id, plus the drill log.
pub trait ProgressStore {
    /// Saved progress, or `None` when nothing usable is stored. Unreadable or
    /// stale data is treated as absent.
    fn load_progress(&self, curriculum: &str) -> Option<ProgressData>;
    fn save_progress(&self, curriculum: &str, data: &ProgressData) -> Result<()>;
    fn clear_progress(&self, curriculum: &str) -> Result<()>;
    fn append_history(&self, result: &DrillResult) -> Result<()>;
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hankey");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("ignoring unparsable {}: {e}", path.display());
                    T::default()
                }),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_history(&self) -> HistoryData {
        self.load("history.json")
    }
}

/// File name for a curriculum's progress. `[A-Za-z0-9_-]` and Hangul
/// syllables are kept; every other character is percent-encoded byte by byte,
/// so distinct ids never share a file and none can leave the data directory.
fn progress_file_name(curriculum: &str) -> String {
    let mut safe = String::with_capacity(curriculum.len());
    for c in curriculum.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || ('가'..='힣').contains(&c) {
            safe.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                safe.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    format!("progress-{safe}.json")
}

impl ProgressStore for JsonStore {
    fn load_progress(&self, curriculum: &str) -> Option<ProgressData> {
        let path = self.file_path(&progress_file_name(curriculum));
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<ProgressData>(&content) {
            Ok(data) if !data.needs_reset() => Some(data),
            Ok(_) => {
                log::warn!("discarding stale progress schema in {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("discarding unparsable progress {}: {e}", path.display());
                None
            }
        }
    }

    fn save_progress(&self, curriculum: &str, data: &ProgressData) -> Result<()> {
        self.save(&progress_file_name(curriculum), data)
    }

    fn clear_progress(&self, curriculum: &str) -> Result<()> {
        let path = self.file_path(&progress_file_name(curriculum));
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn append_history(&self, result: &DrillResult) -> Result<()> {
        let mut history = self.load_history();
        history.drills.push(result.clone());
        if history.drills.len() > HISTORY_LIMIT {
            let excess = history.drills.len() - HISTORY_LIMIT;
            history.drills.drain(..excess);
        }
        self.save("history.json", &history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::drill::{DrillProgress, DrillState, DrillStats};
    use crate::words::Word;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn sample_progress() -> ProgressData {
        let mut progress = DrillProgress {
            stats: DrillStats {
                total_attempts: 12,
                correct_attempts: 10,
            },
            word_index: 2,
            ..Default::default()
        };
        progress.completed_words.insert("공항".to_string());
        progress.mistake_words.insert("호텔".to_string());
        ProgressData::new(progress, false)
    }

    #[test]
    fn test_missing_progress_is_none() {
        let (_dir, store) = make_test_store();
        assert!(store.load_progress("travel").is_none());
    }

    #[test]
    fn test_save_then_load_progress() {
        let (_dir, store) = make_test_store();
        let data = sample_progress();
        store.save_progress("travel", &data).unwrap();

        let loaded = store.load_progress("travel").unwrap();
        assert_eq!(loaded, data);
        // Keys do not bleed into each other.
        assert!(store.load_progress("study").is_none());
    }

    #[test]
    fn test_unparsable_progress_falls_back() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path("progress-travel.json"), "{not json").unwrap();
        assert!(store.load_progress("travel").is_none());
    }

    #[test]
    fn test_stale_schema_falls_back() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path("progress-travel.json"),
            r#"{"schema_version": 99, "word_index": 4}"#,
        )
        .unwrap();
        assert!(store.load_progress("travel").is_none());
    }

    #[test]
    fn test_clear_progress() {
        let (_dir, store) = make_test_store();
        store.save_progress("travel", &sample_progress()).unwrap();
        store.clear_progress("travel").unwrap();
        assert!(store.load_progress("travel").is_none());
        // Clearing twice is fine.
        store.clear_progress("travel").unwrap();
    }

    #[test]
    fn test_no_tmp_files_left_after_save() {
        let (dir, store) = make_test_store();
        store.save_progress("W1-1", &sample_progress()).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_progress_file_name_is_sanitized() {
        assert_eq!(progress_file_name("W1-1"), "progress-W1-1.json");
        assert_eq!(progress_file_name("../etc"), "progress-%2E%2E%2Fetc.json");
        assert_eq!(progress_file_name("여행 1"), "progress-여행%201.json");
        assert_eq!(progress_file_name("50%"), "progress-50%25.json");
    }

    #[test]
    fn test_similar_ids_keep_separate_progress() {
        let (_dir, store) = make_test_store();
        let mut done = sample_progress();
        done.completed = true;
        store.save_progress("W1.2", &done).unwrap();

        assert!(store.load_progress("W1 2").is_none());
        assert!(store.load_progress("W1_2").is_none());
        assert!(store.load_progress("W1.2").unwrap().completed);
    }

    #[test]
    fn test_history_appends() {
        let (_dir, store) = make_test_store();
        assert!(store.load_history().drills.is_empty());

        let drill = DrillState::start(vec![Word::new("짐", "luggage", "noun")]);
        let result = DrillResult::from_drill(&drill, &[], Some("travel"));
        store.append_history(&result).unwrap();
        store.append_history(&result).unwrap();
        assert_eq!(store.load_history().drills.len(), 2);
    }

    #[test]
    fn test_history_drops_oldest_past_limit() {
        let (_dir, store) = make_test_store();
        let drill = DrillState::start(vec![Word::new("짐", "luggage", "noun")]);
        let mut history = HistoryData::default();
        for i in 0..HISTORY_LIMIT {
            history
                .drills
                .push(DrillResult::from_drill(&drill, &[], Some(&format!("old-{i}"))));
        }
        store.save("history.json", &history).unwrap();

        let newest = DrillResult::from_drill(&drill, &[], Some("newest"));
        store.append_history(&newest).unwrap();

        let drills = store.load_history().drills;
        assert_eq!(drills.len(), HISTORY_LIMIT);
        assert_eq!(drills[0].curriculum.as_deref(), Some("old-1"));
        assert_eq!(drills.last().unwrap().curriculum.as_deref(), Some("newest"));
    }
}
