//! Expands Korean text into the jamo a two-set keyboard user actually types.
//!
//! Each precomposed syllable becomes its leading consonant, its vowel and its
//! optional trailing consonant. Compound vowels and compound finals that need
//! more than one key press are split into their single-key parts, so every
//! emitted unit maps to exactly one physical key. Anything that is not a
//! precomposed syllable (spaces, digits, Latin letters, standalone jamo) is
//! passed through untouched.

use crate::hangul::syllable::{compose_syllable, syllable_indices};

/// Leading consonants in syllable-block order.
pub const LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ',
    'ㅍ', 'ㅎ',
];

/// Vowels in syllable-block order.
pub const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ', 'ㅟ',
    'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Trailing consonants in syllable-block order. Index 0 is "none".
#[rustfmt::skip]
pub const TRAILS: [Option<char>; 28] = [
    None,
    Some('ㄱ'), Some('ㄲ'), Some('ㄳ'), Some('ㄴ'), Some('ㄵ'), Some('ㄶ'), Some('ㄷ'),
    Some('ㄹ'), Some('ㄺ'), Some('ㄻ'), Some('ㄼ'), Some('ㄽ'), Some('ㄾ'), Some('ㄿ'),
    Some('ㅀ'), Some('ㅁ'), Some('ㅂ'), Some('ㅄ'), Some('ㅅ'), Some('ㅆ'), Some('ㅇ'),
    Some('ㅈ'), Some('ㅊ'), Some('ㅋ'), Some('ㅌ'), Some('ㅍ'), Some('ㅎ'),
];

/// Single-key parts of a compound vowel, or `None` if the vowel has its own key.
///
/// ㅐ ㅔ ㅒ ㅖ are single keys on the two-set layout and are deliberately absent.
pub fn split_vowel(vowel: char) -> Option<&'static [char]> {
    match vowel {
        'ㅘ' => Some(&['ㅗ', 'ㅏ']),
        'ㅙ' => Some(&['ㅗ', 'ㅏ', 'ㅣ']),
        'ㅚ' => Some(&['ㅗ', 'ㅣ']),
        'ㅝ' => Some(&['ㅜ', 'ㅓ']),
        'ㅞ' => Some(&['ㅜ', 'ㅓ', 'ㅣ']),
        'ㅟ' => Some(&['ㅜ', 'ㅣ']),
        'ㅢ' => Some(&['ㅡ', 'ㅣ']),
        _ => None,
    }
}

/// Base consonants of a compound final, or `None` for single finals.
///
/// ㄲ and ㅆ are shifted single keys, not compounds.
pub fn split_final(trail: char) -> Option<[char; 2]> {
    match trail {
        'ㄳ' => Some(['ㄱ', 'ㅅ']),
        'ㄵ' => Some(['ㄴ', 'ㅈ']),
        'ㄶ' => Some(['ㄴ', 'ㅎ']),
        'ㄺ' => Some(['ㄹ', 'ㄱ']),
        'ㄻ' => Some(['ㄹ', 'ㅁ']),
        'ㄼ' => Some(['ㄹ', 'ㅂ']),
        'ㄽ' => Some(['ㄹ', 'ㅅ']),
        'ㄾ' => Some(['ㄹ', 'ㅌ']),
        'ㄿ' => Some(['ㄹ', 'ㅍ']),
        'ㅀ' => Some(['ㄹ', 'ㅎ']),
        'ㅄ' => Some(['ㅂ', 'ㅅ']),
        _ => None,
    }
}

/// The unsplit jamo of a precomposed syllable.
pub fn syllable_jamo(c: char) -> Option<(char, char, Option<char>)> {
    let (lead, vowel, trail) = syllable_indices(c)?;
    Some((LEADS[lead], VOWELS[vowel], TRAILS[trail]))
}

/// Build a syllable back from unsplit jamo. Inverse of [`syllable_jamo`].
pub fn compose_jamo(lead: char, vowel: char, trail: Option<char>) -> Option<char> {
    let lead = LEADS.iter().position(|&l| l == lead)?;
    let vowel = VOWELS.iter().position(|&v| v == vowel)?;
    let trail = TRAILS.iter().position(|&t| t == trail)?;
    compose_syllable(lead, vowel, trail)
}

pub fn decompose(text: &str) -> Vec<char> {
    let mut units = Vec::with_capacity(text.len());
    for c in text.chars() {
        let Some((lead, vowel, trail)) = syllable_jamo(c) else {
            units.push(c);
            continue;
        };

        units.push(lead);

        match split_vowel(vowel) {
            Some(parts) => units.extend_from_slice(parts),
            None => units.push(vowel),
        }

        if let Some(trail) = trail {
            match split_final(trail) {
                Some(parts) => units.extend_from_slice(&parts),
                None => units.push(trail),
            }
        }
    }
    units
}

/// The decomposed units joined back into one string, shown as a typing hint.
pub fn typing_hint(text: &str) -> String {
    decompose(text).into_iter().collect()
}
