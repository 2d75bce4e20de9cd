use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::hangul::decompose;
use crate::keyboard::layout::key_binding;
use crate::session::input::{self, KeystrokeEvent};
use crate::words::Word;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillStats {
    pub total_attempts: u32,
    pub correct_attempts: u32,
}

impl DrillStats {
    /// Fraction of counted keystrokes that matched, 0.0 before the first one.
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.correct_attempts as f64 / self.total_attempts as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillPhase {
    /// No words to practice.
    NotReady,
    InProgress,
    Complete,
}

/// The resumable part of a drill, as handed to a progress store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillProgress {
    #[serde(default)]
    pub completed_words: BTreeSet<String>,
    #[serde(default)]
    pub mistake_words: BTreeSet<String>,
    #[serde(default)]
    pub stats: DrillStats,
    #[serde(default)]
    pub word_index: usize,
}

/// One pass over an ordered word list.
///
/// Invariants: `jamo_index < current_jamos.len()` while in progress,
/// `word_index < words.len()` unless the list is empty, and
/// `stats.correct_attempts <= stats.total_attempts`. Only
/// [`input::process_key`] moves the cursor or touches the counters.
pub struct DrillState {
    pub words: Vec<Word>,
    pub word_index: usize,
    pub jamo_index: usize,
    pub current_jamos: Vec<char>,
    pub wrong_attempts_this_word: u32,
    pub completed_words: BTreeSet<String>,
    pub mistake_words: BTreeSet<String>,
    pub stats: DrillStats,
    pub is_completed: bool,
    /// True while replaying only the words missed in an earlier pass.
    pub is_retry: bool,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    /// Full list the drill was started with; `retry_mistakes` narrows `words`
    /// but `restart` goes back to this.
    source_words: Vec<Word>,
}

impl DrillState {
    pub fn start(words: Vec<Word>) -> Self {
        let words: Vec<Word> = words
            .into_iter()
            .filter(|w| !w.text.is_empty())
            .collect();
        let mut drill = Self {
            words: words.clone(),
            word_index: 0,
            jamo_index: 0,
            current_jamos: Vec::new(),
            wrong_attempts_this_word: 0,
            completed_words: BTreeSet::new(),
            mistake_words: BTreeSet::new(),
            stats: DrillStats::default(),
            is_completed: false,
            is_retry: false,
            started_at: None,
            finished_at: None,
            source_words: words,
        };
        drill.enter_word(0);
        drill
    }

    /// Start a drill and carry over previously saved progress. A saved word
    /// index past the end of the list falls back to the first word.
    pub fn resume(words: Vec<Word>, progress: &DrillProgress) -> Self {
        let mut drill = Self::start(words);
        drill.completed_words = progress.completed_words.clone();
        drill.mistake_words = progress.mistake_words.clone();
        drill.stats = progress.stats;
        if drill.stats.correct_attempts > drill.stats.total_attempts {
            drill.stats.correct_attempts = drill.stats.total_attempts;
        }
        if progress.word_index < drill.words.len() {
            drill.enter_word(progress.word_index);
        }
        drill
    }

    pub fn snapshot(&self) -> DrillProgress {
        DrillProgress {
            completed_words: self.completed_words.clone(),
            mistake_words: self.mistake_words.clone(),
            stats: self.stats,
            word_index: self.word_index,
        }
    }

    /// Back to the first word of the original list with every counter cleared.
    pub fn restart(&mut self) {
        let words = std::mem::take(&mut self.source_words);
        *self = Self::start(words);
    }

    /// Narrow the drill to the words currently flagged as mistakes.
    ///
    /// Keeps `completed_words` and `mistake_words`; a retried word leaves the
    /// mistake set once it is typed through without an error. Returns false
    /// and changes nothing when there is nothing to retry.
    pub fn retry_mistakes(&mut self) -> bool {
        let retry: Vec<Word> = self
            .words
            .iter()
            .filter(|w| self.mistake_words.contains(&w.text))
            .cloned()
            .collect();
        if retry.is_empty() {
            return false;
        }

        self.words = retry;
        self.stats = DrillStats::default();
        self.is_completed = false;
        self.is_retry = true;
        self.started_at = None;
        self.finished_at = None;
        self.enter_word(0);
        true
    }

    pub fn handle_keystroke(&mut self, key: &str) -> Option<KeystrokeEvent> {
        input::process_key(self, key)
    }

    pub(crate) fn enter_word(&mut self, index: usize) {
        self.word_index = index;
        self.jamo_index = 0;
        self.wrong_attempts_this_word = 0;
        self.current_jamos = self
            .words
            .get(index)
            .map(|w| decompose(&w.text))
            .unwrap_or_default();
    }

    pub fn phase(&self) -> DrillPhase {
        if self.words.is_empty() {
            DrillPhase::NotReady
        } else if self.is_completed {
            DrillPhase::Complete
        } else {
            DrillPhase::InProgress
        }
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.word_index)
    }

    pub fn expected_jamo(&self) -> Option<char> {
        self.current_jamos.get(self.jamo_index).copied()
    }

    pub fn expected_key(&self) -> Option<&'static str> {
        self.expected_jamo().and_then(key_binding)
    }

    pub fn accuracy(&self) -> f64 {
        self.stats.accuracy()
    }

    /// Fraction of the whole drill done, counting the partially typed word.
    pub fn progress(&self) -> f64 {
        match self.phase() {
            DrillPhase::NotReady => 0.0,
            DrillPhase::Complete => 1.0,
            DrillPhase::InProgress => {
                let partial = if self.current_jamos.is_empty() {
                    0.0
                } else {
                    self.jamo_index as f64 / self.current_jamos.len() as f64
                };
                (self.word_index as f64 + partial) / self.words.len() as f64
            }
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64(),
            (Some(start), None) => start.elapsed().as_secs_f64(),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts.iter().map(|t| Word::new(t, "", "noun")).collect()
    }

    /// Feed the exact key sequence for the current word.
    fn type_current_word(drill: &mut DrillState) {
        let keys: Vec<&str> = drill
            .current_jamos
            .iter()
            .map(|&j| key_binding(j).unwrap())
            .collect();
        for key in keys {
            drill.handle_keystroke(key);
        }
    }

    #[test]
    fn test_new_drill() {
        let drill = DrillState::start(words(&["먹다", "학교"]));
        assert_eq!(drill.phase(), DrillPhase::InProgress);
        assert_eq!(drill.word_index, 0);
        assert_eq!(drill.jamo_index, 0);
        assert_eq!(drill.current_jamos, vec!['ㅁ', 'ㅓ', 'ㄱ', 'ㄷ', 'ㅏ']);
        assert_eq!(drill.expected_key(), Some("a"));
        assert_eq!(drill.progress(), 0.0);
        assert_eq!(drill.accuracy(), 0.0);
    }

    #[test]
    fn test_empty_list_not_ready() {
        let mut drill = DrillState::start(Vec::new());
        assert_eq!(drill.phase(), DrillPhase::NotReady);
        assert!(drill.current_word().is_none());
        assert!(drill.handle_keystroke("a").is_none());
        assert_eq!(drill.stats.total_attempts, 0);
        assert_eq!(drill.progress(), 0.0);
    }

    #[test]
    fn test_blank_words_dropped() {
        let drill = DrillState::start(words(&["", "  ", "짐"]));
        assert_eq!(drill.words.len(), 1);
        assert_eq!(drill.current_word().unwrap().text, "짐");

        let drill = DrillState::start(words(&[""]));
        assert_eq!(drill.phase(), DrillPhase::NotReady);
    }

    #[test]
    fn test_progress_counts_partial_word() {
        let mut drill = DrillState::start(words(&["호수", "바다"]));
        drill.handle_keystroke("g");
        drill.handle_keystroke("h");
        // 2 of 4 jamo in the first of two words.
        assert!((drill.progress() - 0.25).abs() < 1e-9);
        type_current_word_from(&mut drill, 2);
        assert!((drill.progress() - 0.5).abs() < 1e-9);
    }

    fn type_current_word_from(drill: &mut DrillState, from: usize) {
        let keys: Vec<&str> = drill.current_jamos[from..]
            .iter()
            .map(|&j| key_binding(j).unwrap())
            .collect();
        for key in keys {
            drill.handle_keystroke(key);
        }
    }

    #[test]
    fn test_complete_drill() {
        let mut drill = DrillState::start(words(&["호수", "바다"]));
        type_current_word(&mut drill);
        type_current_word(&mut drill);
        assert_eq!(drill.phase(), DrillPhase::Complete);
        assert!(drill.is_completed);
        assert_eq!(drill.progress(), 1.0);
        assert_eq!(drill.accuracy(), 1.0);
        assert!(drill.finished_at.is_some());
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut drill = DrillState::start(words(&["호수", "바다"]));
        drill.handle_keystroke("x");
        type_current_word(&mut drill);
        assert!(!drill.mistake_words.is_empty());

        drill.restart();
        assert_eq!(drill.word_index, 0);
        assert_eq!(drill.jamo_index, 0);
        assert!(drill.completed_words.is_empty());
        assert!(drill.mistake_words.is_empty());
        assert_eq!(drill.stats, DrillStats::default());
        assert_eq!(drill.words.len(), 2);
    }

    #[test]
    fn test_retry_mistakes_narrows_and_clears_on_clean_pass() {
        let mut drill = DrillState::start(words(&["호수", "사랑", "먹다"]));
        type_current_word(&mut drill);
        drill.handle_keystroke("x");
        type_current_word(&mut drill);
        type_current_word(&mut drill);
        assert_eq!(drill.phase(), DrillPhase::Complete);
        assert_eq!(drill.mistake_words.len(), 1);
        assert!(drill.mistake_words.contains("사랑"));

        assert!(drill.retry_mistakes());
        assert!(drill.is_retry);
        assert_eq!(drill.phase(), DrillPhase::InProgress);
        assert_eq!(drill.words.len(), 1);
        assert_eq!(drill.current_word().unwrap().text, "사랑");
        assert_eq!(drill.stats, DrillStats::default());
        // Still flagged until the retry succeeds.
        assert!(drill.mistake_words.contains("사랑"));

        type_current_word(&mut drill);
        assert_eq!(drill.phase(), DrillPhase::Complete);
        assert!(drill.mistake_words.is_empty());
        assert_eq!(drill.completed_words.len(), 3);
    }

    #[test]
    fn test_retry_without_mistakes_is_noop() {
        let mut drill = DrillState::start(words(&["호수"]));
        type_current_word(&mut drill);
        assert!(!drill.retry_mistakes());
        assert_eq!(drill.phase(), DrillPhase::Complete);
        assert!(!drill.is_retry);
    }

    #[test]
    fn test_restart_after_retry_restores_full_list() {
        let mut drill = DrillState::start(words(&["호수", "사랑"]));
        drill.handle_keystroke("x");
        type_current_word(&mut drill);
        type_current_word(&mut drill);
        assert!(drill.retry_mistakes());
        assert_eq!(drill.words.len(), 1);

        drill.restart();
        assert_eq!(drill.words.len(), 2);
        assert!(!drill.is_retry);
    }

    #[test]
    fn test_snapshot_and_resume() {
        let list = words(&["호수", "사랑", "먹다"]);
        let mut drill = DrillState::start(list.clone());
        drill.handle_keystroke("x");
        type_current_word(&mut drill);
        let saved = drill.snapshot();
        assert_eq!(saved.word_index, 1);

        let resumed = DrillState::resume(list, &saved);
        assert_eq!(resumed.word_index, 1);
        assert_eq!(resumed.jamo_index, 0);
        assert_eq!(resumed.current_word().unwrap().text, "사랑");
        assert_eq!(resumed.stats, drill.stats);
        assert!(resumed.mistake_words.contains("호수"));
        assert!(resumed.completed_words.contains("호수"));
    }

    #[test]
    fn test_resume_out_of_range_index_starts_over() {
        let progress = DrillProgress {
            word_index: 9,
            ..Default::default()
        };
        let drill = DrillState::resume(words(&["호수"]), &progress);
        assert_eq!(drill.word_index, 0);
        assert_eq!(drill.phase(), DrillPhase::InProgress);
    }
}
