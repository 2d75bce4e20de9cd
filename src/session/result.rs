use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::drill::DrillState;
use crate::session::input::KeystrokeEvent;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrillResult {
    #[serde(default)]
    pub curriculum: Option<String>,
    pub words: usize,
    pub accuracy: f64,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    pub mistake_words: Vec<String>,
    pub elapsed_secs: f64,
    /// Correct keystrokes per minute.
    #[serde(default)]
    pub kpm: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub retry: bool,
    #[serde(default)]
    pub missed_keys: Vec<MissedKey>,
}

/// How often an expected key was missed during the drill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedKey {
    pub jamo: char,
    pub key: String,
    pub count: u32,
}

impl DrillResult {
    pub fn from_drill(
        drill: &DrillState,
        events: &[KeystrokeEvent],
        curriculum: Option<&str>,
    ) -> Self {
        let elapsed_secs = drill.elapsed_secs();
        let kpm = keys_per_minute(events, elapsed_secs);

        Self {
            curriculum: curriculum.map(str::to_string),
            words: drill.words.len(),
            accuracy: drill.accuracy(),
            total_attempts: drill.stats.total_attempts,
            correct_attempts: drill.stats.correct_attempts,
            mistake_words: drill.mistake_words.iter().cloned().collect(),
            elapsed_secs,
            kpm,
            timestamp: Utc::now(),
            retry: drill.is_retry,
            missed_keys: missed_keys(events),
        }
    }
}

/// Correct keys per minute over this session's events only. A resumed drill
/// carries earlier attempts in its stats but its clock starts on the first
/// new key.
fn keys_per_minute(events: &[KeystrokeEvent], elapsed_secs: f64) -> f64 {
    if elapsed_secs < 0.1 {
        return 0.0;
    }
    let correct = events.iter().filter(|e| e.outcome.is_correct()).count();
    correct as f64 / (elapsed_secs / 60.0)
}

/// Missed expected jamo, most-missed first.
fn missed_keys(events: &[KeystrokeEvent]) -> Vec<MissedKey> {
    let mut missed: Vec<MissedKey> = Vec::new();
    for event in events.iter().filter(|e| !e.outcome.is_correct()) {
        let Some(jamo) = event.expected else {
            continue;
        };
        match missed.iter_mut().find(|m| m.jamo == jamo) {
            Some(entry) => entry.count += 1,
            None => missed.push(MissedKey {
                jamo,
                key: event.expected_key.unwrap_or_default().to_string(),
                count: 1,
            }),
        }
    }
    missed.sort_by(|a, b| b.count.cmp(&a.count).then(a.jamo.cmp(&b.jamo)));
    missed
}
