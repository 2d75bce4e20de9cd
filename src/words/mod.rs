pub mod pack;
#[cfg(feature = "network")]
pub mod remote;
pub mod table;

use std::cmp::Ordering;

use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::words::pack::PackError;

/// One drill item. Text is what gets typed; translation and category are
/// carried for display only and never validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    #[serde(alias = "korean")]
    pub text: String,
    #[serde(default, alias = "english")]
    pub translation: String,
    #[serde(default, alias = "pos")]
    pub category: String,
}

impl Word {
    pub fn new(text: &str, translation: &str, category: &str) -> Self {
        Self {
            text: normalize_text(text),
            translation: translation.to_string(),
            category: category.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

pub(crate) fn default_icon() -> String {
    "📚".to_string()
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("curriculum not found: {0}")]
    NotFound(String),
    #[error("invalid pack: {0}")]
    Pack(#[from] PackError),
    #[error("failed to read word data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse word data: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "network")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can hand the drill an ordered word list for a curriculum.
pub trait WordSource {
    /// Known curriculums in catalog order.
    fn curriculums(&self) -> Result<Vec<Curriculum>, SourceError>;

    /// Words for one curriculum, in drill order. May be empty.
    fn words(&self, curriculum: &str) -> Result<Vec<Word>, SourceError>;
}

/// NFC-normalize so text stored as conjoining jamo (U+1100 block) turns into
/// precomposed syllables the decomposer understands.
pub fn normalize_text(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text.trim())
        .into_owned()
}

/// Case-insensitive ordering that compares digit runs numerically, so
/// `W1-2` sorts before `W1-10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut a);
                let nb = take_number(&mut b);
                match na.cmp(&nb) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => {
                let (lx, ly) = (x.to_lowercase().next(), y.to_lowercase().next());
                match lx.cmp(&ly) {
                    Ordering::Equal => {
                        a.next();
                        b.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(d as u64);
        chars.next();
    }
    n
}
