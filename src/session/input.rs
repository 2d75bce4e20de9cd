use std::time::Instant;

use crate::keyboard::display::is_ignored_key;
use crate::keyboard::layout::{jamo_for_key, key_binding};
use crate::session::drill::{DrillPhase, DrillState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Correct,
    Incorrect,
    /// Correct key that finished a word; the drill already points at the next one.
    WordComplete { word: String, clean: bool },
    /// Correct key that finished the last word.
    DrillComplete { word: String, clean: bool },
}

impl KeyOutcome {
    pub fn is_correct(&self) -> bool {
        !matches!(self, KeyOutcome::Incorrect)
    }
}

#[derive(Clone, Debug)]
pub struct KeystrokeEvent {
    pub expected: Option<char>,
    pub expected_key: Option<&'static str>,
    pub actual: String,
    /// What the pressed key would have produced on the two-set layout.
    pub typed_jamo: Option<char>,
    pub timestamp: Instant,
    pub outcome: KeyOutcome,
}

/// Single-key bindings need an exact, case-sensitive match so the shifted key
/// is enforced for tense consonants. Multi-key bindings accept their first key.
pub fn matches_binding(binding: &str, key: &str) -> bool {
    let mut binding_keys = binding.chars();
    let Some(first) = binding_keys.next() else {
        return false;
    };
    if binding_keys.next().is_none() {
        return key == binding;
    }
    let mut key_chars = key.chars();
    key_chars.next() == Some(first) && key_chars.next().is_none()
}

/// Apply one raw key to the drill.
///
/// Returns `None`, leaving the drill untouched, for ignored modifier keys and
/// when the drill is not in progress.
pub fn process_key(drill: &mut DrillState, key: &str) -> Option<KeystrokeEvent> {
    if drill.phase() != DrillPhase::InProgress || is_ignored_key(key) {
        return None;
    }

    if drill.started_at.is_none() {
        drill.started_at = Some(Instant::now());
    }
    drill.stats.total_attempts += 1;

    let expected = drill.expected_jamo();
    let expected_key = expected.and_then(key_binding);
    let correct = expected_key.is_some_and(|binding| matches_binding(binding, key));

    let outcome = if correct {
        drill.stats.correct_attempts += 1;
        drill.jamo_index += 1;
        if drill.jamo_index >= drill.current_jamos.len() {
            finish_word(drill)
        } else {
            KeyOutcome::Correct
        }
    } else {
        drill.wrong_attempts_this_word += 1;
        KeyOutcome::Incorrect
    };

    log::debug!(
        "key {key:?} expected {expected:?} ({expected_key:?}) -> {outcome:?}"
    );

    let mut key_chars = key.chars();
    let typed_jamo = match (key_chars.next(), key_chars.next()) {
        (Some(c), None) => jamo_for_key(c),
        _ => None,
    };

    Some(KeystrokeEvent {
        expected,
        expected_key,
        actual: key.to_string(),
        typed_jamo,
        timestamp: Instant::now(),
        outcome,
    })
}

fn finish_word(drill: &mut DrillState) -> KeyOutcome {
    let word = drill
        .current_word()
        .map(|w| w.text.clone())
        .unwrap_or_default();
    let clean = drill.wrong_attempts_this_word == 0;

    drill.completed_words.insert(word.clone());
    if clean {
        drill.mistake_words.remove(&word);
    } else {
        drill.mistake_words.insert(word.clone());
    }

    if drill.word_index + 1 >= drill.words.len() {
        drill.is_completed = true;
        drill.finished_at = Some(Instant::now());
        log::info!(
            "drill complete: {} words, {}/{} keystrokes correct",
            drill.words.len(),
            drill.stats.correct_attempts,
            drill.stats.total_attempts
        );
        KeyOutcome::DrillComplete { word, clean }
    } else {
        log::info!("word complete: {word} (clean: {clean})");
        drill.enter_word(drill.word_index + 1);
        KeyOutcome::WordComplete { word, clean }
    }
}
