use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::session::drill::{DrillPhase, DrillState};
use crate::session::input::{KeyOutcome, KeystrokeEvent};
use crate::session::result::DrillResult;
use crate::store::json_store::{JsonStore, ProgressStore};
use crate::store::schema::ProgressData;
use crate::words::pack::PackDirSource;
use crate::words::table::TableSource;
use crate::words::{Curriculum, Word, WordSource, default_icon};

/// Pick where words come from: a pack server, then an explicit word table,
/// then a pack directory with at least one pack, then the bundled sample.
pub fn open_source(config: &Config) -> Result<Box<dyn WordSource>> {
    if let Some(source) = remote_source(config)? {
        return Ok(source);
    }

    if let Some(ref path) = config.word_table {
        log::info!("using word table {path}");
        return Ok(Box::new(TableSource::from_path(Path::new(path))?));
    }

    let packs = PackDirSource::new(config.pack_dir.as_str());
    if packs.has_packs() {
        log::info!("using packs in {}", config.pack_dir);
        return Ok(Box::new(packs));
    }

    Ok(Box::new(TableSource::builtin()?))
}

#[cfg(feature = "network")]
fn remote_source(config: &Config) -> Result<Option<Box<dyn WordSource>>> {
    let Some(ref url) = config.remote_url else {
        return Ok(None);
    };
    log::info!("using pack server at {url}");
    Ok(Some(Box::new(crate::words::remote::RemoteSource::new(url)?)))
}

#[cfg(not(feature = "network"))]
fn remote_source(config: &Config) -> Result<Option<Box<dyn WordSource>>> {
    if config.remote_url.is_some() {
        log::warn!("remote_url is set but this build has no network support");
    }
    Ok(None)
}

pub struct App {
    pub config: Config,
    pub curriculum: Option<Curriculum>,
    pub drill: DrillState,
    pub drill_events: Vec<KeystrokeEvent>,
    pub last_result: Option<DrillResult>,
    source: Box<dyn WordSource>,
    store: Option<Box<dyn ProgressStore>>,
    curriculums: Vec<Curriculum>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let source = open_source(&config)?;
        let store: Option<Box<dyn ProgressStore>> = match JsonStore::new() {
            Ok(store) => Some(Box::new(store)),
            Err(e) => {
                log::warn!("progress will not be saved: {e}");
                None
            }
        };
        Ok(Self::with_source(config, source, store))
    }

    pub fn with_source(
        config: Config,
        source: Box<dyn WordSource>,
        store: Option<Box<dyn ProgressStore>>,
    ) -> Self {
        let mut app = Self {
            config,
            curriculum: None,
            drill: DrillState::start(Vec::new()),
            drill_events: Vec::new(),
            last_result: None,
            source,
            store,
            curriculums: Vec::new(),
        };
        app.load_curriculums();
        app
    }

    pub fn curriculums(&self) -> &[Curriculum] {
        &self.curriculums
    }

    /// Re-read the catalog. A failing source leaves it empty.
    pub fn load_curriculums(&mut self) -> &[Curriculum] {
        self.curriculums = match self.source.curriculums() {
            Ok(list) => list,
            Err(e) => {
                log::warn!("failed to list curriculums: {e}");
                Vec::new()
            }
        };
        &self.curriculums
    }

    /// Whether the last saved pass of a curriculum ended without mistakes.
    pub fn is_completed(&self, id: &str) -> bool {
        self.store
            .as_ref()
            .and_then(|s| s.load_progress(id))
            .is_some_and(|data| data.completed)
    }

    /// Load a curriculum's words and start (or resume) its drill. Returns
    /// false when there is nothing to practice.
    pub fn select_curriculum(&mut self, id: &str) -> bool {
        let curriculum = self
            .curriculums
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap_or_else(|| Curriculum {
                id: id.to_string(),
                name: id.to_string(),
                icon: default_icon(),
                description: String::new(),
            });
        let words = self.fetch_words(id);

        // A finished curriculum comes back as a fresh review pass.
        let saved = self.store.as_ref().and_then(|s| s.load_progress(id));
        self.drill = match saved {
            Some(data) if !data.completed => DrillState::resume(words, &data.progress),
            _ => DrillState::start(words),
        };
        self.curriculum = Some(curriculum);
        self.drill_events.clear();
        self.last_result = None;

        log::info!("selected curriculum {id}: {} words", self.drill.words.len());
        self.phase() != DrillPhase::NotReady
    }

    fn fetch_words(&self, id: &str) -> Vec<Word> {
        match self.source.words(id) {
            Ok(words) => words,
            Err(e) => {
                log::warn!("failed to load words for {id}: {e}");
                Vec::new()
            }
        }
    }

    pub fn phase(&self) -> DrillPhase {
        self.drill.phase()
    }

    pub fn handle_key(&mut self, key: &str) -> Option<KeystrokeEvent> {
        let event = self.drill.handle_keystroke(key)?;
        self.drill_events.push(event.clone());
        match event.outcome {
            KeyOutcome::WordComplete { .. } => self.save_progress(false),
            KeyOutcome::DrillComplete { .. } => self.finish_drill(),
            KeyOutcome::Correct | KeyOutcome::Incorrect => {}
        }
        Some(event)
    }

    fn finish_drill(&mut self) {
        let curriculum = self.curriculum.as_ref().map(|c| c.id.as_str());
        let result = DrillResult::from_drill(&self.drill, &self.drill_events, curriculum);
        self.save_progress(self.drill.mistake_words.is_empty());
        if let Some(ref store) = self.store
            && let Err(e) = store.append_history(&result)
        {
            log::warn!("failed to record drill history: {e}");
        }
        self.last_result = Some(result);
    }

    /// The completed flag only ever goes from false to true.
    fn save_progress(&self, mark_completed: bool) {
        let (Some(store), Some(curriculum)) = (&self.store, &self.curriculum) else {
            return;
        };
        let was_completed = store
            .load_progress(&curriculum.id)
            .is_some_and(|data| data.completed);
        let mut progress = self.drill.snapshot();
        if self.drill.is_retry {
            // Retry positions index the narrowed list, not the curriculum.
            progress.word_index = 0;
        }
        let data = ProgressData::new(progress, mark_completed || was_completed);
        if let Err(e) = store.save_progress(&curriculum.id, &data) {
            log::warn!("failed to save progress for {}: {e}", curriculum.id);
        }
    }

    /// Start the current curriculum over from freshly fetched words, dropping
    /// any stored progress.
    pub fn restart(&mut self) {
        let Some(id) = self.curriculum.as_ref().map(|c| c.id.clone()) else {
            return;
        };
        if let Some(ref store) = self.store
            && let Err(e) = store.clear_progress(&id)
        {
            log::warn!("failed to clear progress for {id}: {e}");
        }
        self.drill = DrillState::start(self.fetch_words(&id));
        self.drill_events.clear();
        self.last_result = None;
    }

    pub fn retry_mistakes(&mut self) -> bool {
        if !self.drill.retry_mistakes() {
            return false;
        }
        self.drill_events.clear();
        self.last_result = None;
        true
    }

    /// Leave the current curriculum, discarding the drill in memory.
    pub fn change_curriculum(&mut self) {
        self.curriculum = None;
        self.drill = DrillState::start(Vec::new());
        self.drill_events.clear();
        self.last_result = None;
    }

    /// The curriculum after the current one, offered only after a pass with
    /// no mistake words.
    pub fn next_curriculum(&self) -> Option<&Curriculum> {
        if self.phase() != DrillPhase::Complete || !self.drill.mistake_words.is_empty() {
            return None;
        }
        let current = self.curriculum.as_ref()?;
        let index = self.curriculums.iter().position(|c| c.id == current.id)?;
        self.curriculums.get(index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::layout::key_binding;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use tempfile::TempDir;

    const TABLE: &str = r#"[
        {"korean": "호수", "english": "lake", "curriculum": "c1", "curriculum_name": "One"},
        {"korean": "바다", "english": "sea", "curriculum": "c1"},
        {"korean": "사랑", "english": "love", "curriculum": "c2", "curriculum_name": "Two"},
        {"korean": "", "english": "blank", "curriculum": "c3"}
    ]"#;

    fn make_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let source = TableSource::from_json(TABLE).unwrap();
        let app = App::with_source(Config::default(), Box::new(source), Some(Box::new(store)));
        (dir, app)
    }

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()
    }

    fn type_word(app: &mut App, wrong_first: bool) {
        if wrong_first {
            app.handle_key("x");
        }
        let keys: Vec<&str> = app
            .drill
            .current_jamos
            .iter()
            .map(|&j| key_binding(j).unwrap())
            .collect();
        for key in keys {
            app.handle_key(key);
        }
    }

    #[test]
    fn test_curriculums_listed() {
        let (_dir, app) = make_app();
        let ids: Vec<&str> = app.curriculums().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_select_curriculum() {
        let (_dir, mut app) = make_app();
        assert!(app.select_curriculum("c1"));
        assert_eq!(app.phase(), DrillPhase::InProgress);
        assert_eq!(app.curriculum.as_ref().unwrap().name, "One");
        assert_eq!(app.drill.words.len(), 2);
    }

    #[test]
    fn test_select_empty_curriculum_not_ready() {
        let (_dir, mut app) = make_app();
        assert!(!app.select_curriculum("c3"));
        assert_eq!(app.phase(), DrillPhase::NotReady);
        assert!(!app.select_curriculum("missing"));
        assert!(app.handle_key("g").is_none());
    }

    #[test]
    fn test_word_completion_saves_progress() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, true);

        let saved = store_in(&dir).load_progress("c1").unwrap();
        assert_eq!(saved.progress.word_index, 1);
        assert!(saved.progress.mistake_words.contains("호수"));
        assert!(!saved.completed);
    }

    #[test]
    fn test_resume_from_saved_progress() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, false);

        let source = TableSource::from_json(TABLE).unwrap();
        let store: Box<dyn ProgressStore> = Box::new(store_in(&dir));
        let mut again = App::with_source(Config::default(), Box::new(source), Some(store));
        again.select_curriculum("c1");
        assert_eq!(again.drill.word_index, 1);
        assert_eq!(again.drill.current_word().unwrap().text, "바다");
        assert!(again.drill.completed_words.contains("호수"));
    }

    #[test]
    fn test_clean_completion_marks_completed_and_records_history() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, false);
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);

        let store = store_in(&dir);
        assert!(store.load_progress("c1").unwrap().completed);
        assert!(app.is_completed("c1"));
        assert_eq!(store.load_history().drills.len(), 1);
        let result = app.last_result.as_ref().unwrap();
        assert_eq!(result.curriculum.as_deref(), Some("c1"));
        assert_eq!(result.accuracy, 1.0);
    }

    #[test]
    fn test_completed_curriculum_starts_fresh_pass() {
        let (_dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, false);
        type_word(&mut app, false);

        app.select_curriculum("c1");
        assert_eq!(app.phase(), DrillPhase::InProgress);
        assert_eq!(app.drill.word_index, 0);
        assert!(app.drill.completed_words.is_empty());
        assert_eq!(app.drill.stats.total_attempts, 0);
    }

    #[test]
    fn test_completed_flag_survives_later_saves() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, false);
        type_word(&mut app, false);

        app.select_curriculum("c1");
        type_word(&mut app, true);
        assert!(store_in(&dir).load_progress("c1").unwrap().completed);
    }

    #[test]
    fn test_completion_with_mistakes_not_completed() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, true);
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);
        assert!(!store_in(&dir).load_progress("c1").unwrap().completed);
        assert!(app.next_curriculum().is_none());
    }

    #[test]
    fn test_retry_then_next_curriculum() {
        let (_dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, true);
        type_word(&mut app, false);

        assert!(app.retry_mistakes());
        assert!(app.drill_events.is_empty());
        assert_eq!(app.drill.words.len(), 1);
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);
        assert_eq!(app.next_curriculum().map(|c| c.id.as_str()), Some("c2"));
        assert!(!app.retry_mistakes());
    }

    #[test]
    fn test_restart_clears_stored_progress() {
        let (dir, mut app) = make_app();
        app.select_curriculum("c1");
        type_word(&mut app, true);
        assert!(store_in(&dir).load_progress("c1").is_some());

        app.restart();
        assert!(store_in(&dir).load_progress("c1").is_none());
        assert_eq!(app.drill.word_index, 0);
        assert!(app.drill.mistake_words.is_empty());
        assert_eq!(app.drill.words.len(), 2);
    }

    #[test]
    fn test_change_curriculum_discards_drill() {
        let (_dir, mut app) = make_app();
        app.select_curriculum("c1");
        app.handle_key("g");
        app.change_curriculum();
        assert!(app.curriculum.is_none());
        assert_eq!(app.phase(), DrillPhase::NotReady);
        assert!(app.drill_events.is_empty());
    }

    #[test]
    fn test_last_curriculum_has_no_next() {
        let (_dir, mut app) = make_app();
        app.select_curriculum("c2");
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);
        assert!(app.next_curriculum().is_none());
    }

    #[derive(Default)]
    struct MemoryStore {
        progress: RefCell<HashMap<String, ProgressData>>,
        history: Rc<RefCell<Vec<DrillResult>>>,
    }

    impl ProgressStore for MemoryStore {
        fn load_progress(&self, curriculum: &str) -> Option<ProgressData> {
            self.progress.borrow().get(curriculum).cloned()
        }

        fn save_progress(&self, curriculum: &str, data: &ProgressData) -> Result<()> {
            self.progress
                .borrow_mut()
                .insert(curriculum.to_string(), data.clone());
            Ok(())
        }

        fn clear_progress(&self, curriculum: &str) -> Result<()> {
            self.progress.borrow_mut().remove(curriculum);
            Ok(())
        }

        fn append_history(&self, result: &DrillResult) -> Result<()> {
            self.history.borrow_mut().push(result.clone());
            Ok(())
        }
    }

    #[test]
    fn test_any_progress_store_backs_the_app() {
        let store = MemoryStore::default();
        let history = Rc::clone(&store.history);
        let source = TableSource::from_json(TABLE).unwrap();
        let mut app = App::with_source(Config::default(), Box::new(source), Some(Box::new(store)));

        app.select_curriculum("c2");
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);
        assert!(app.is_completed("c2"));
        assert!(!app.is_completed("c1"));
        assert_eq!(history.borrow().len(), 1);

        app.restart();
        assert!(!app.is_completed("c2"));
    }

    #[test]
    fn test_without_store_still_drills() {
        let source = TableSource::from_json(TABLE).unwrap();
        let mut app = App::with_source(Config::default(), Box::new(source), None);
        app.select_curriculum("c2");
        type_word(&mut app, false);
        assert_eq!(app.phase(), DrillPhase::Complete);
        assert!(app.last_result.is_some());
        assert!(!app.is_completed("c2"));
    }

    #[test]
    fn test_open_source_prefers_word_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(&path, TABLE).unwrap();
        let config = Config {
            word_table: Some(path.to_string_lossy().to_string()),
            pack_dir: dir.path().join("packs").to_string_lossy().to_string(),
            ..Config::default()
        };
        let source = open_source(&config).unwrap();
        assert_eq!(source.curriculums().unwrap().len(), 3);
    }

    #[test]
    fn test_open_source_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            pack_dir: dir.path().join("packs").to_string_lossy().to_string(),
            ..Config::default()
        };
        let source = open_source(&config).unwrap();
        assert!(!source.curriculums().unwrap().is_empty());
    }
}
