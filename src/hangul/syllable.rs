//! Precomposed Hangul syllable arithmetic (U+AC00..=U+D7A3).

pub const SYLLABLE_BASE: u32 = 0xAC00;
pub const SYLLABLE_LAST: u32 = 0xD7A3;

pub const LEAD_COUNT: u32 = 19;
pub const VOWEL_COUNT: u32 = 21;
/// Includes index 0, "no trailing consonant".
pub const TRAIL_COUNT: u32 = 28;

/// Syllables per leading consonant (21 * 28).
const BLOCK_SIZE: u32 = VOWEL_COUNT * TRAIL_COUNT;

pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Split a precomposed syllable into `(lead, vowel, trail)` table indices.
/// Returns `None` for anything outside the syllable block.
pub fn syllable_indices(c: char) -> Option<(usize, usize, usize)> {
    if !is_syllable(c) {
        return None;
    }
    let offset = c as u32 - SYLLABLE_BASE;
    let lead = offset / BLOCK_SIZE;
    let vowel = (offset % BLOCK_SIZE) / TRAIL_COUNT;
    let trail = offset % TRAIL_COUNT;
    Some((lead as usize, vowel as usize, trail as usize))
}

/// Inverse of [`syllable_indices`].
pub fn compose_syllable(lead: usize, vowel: usize, trail: usize) -> Option<char> {
    let (lead, vowel, trail) = (lead as u32, vowel as u32, trail as u32);
    if lead >= LEAD_COUNT || vowel >= VOWEL_COUNT || trail >= TRAIL_COUNT {
        return None;
    }
    char::from_u32(SYLLABLE_BASE + lead * BLOCK_SIZE + vowel * TRAIL_COUNT + trail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_bounds() {
        assert!(is_syllable('가'));
        assert!(is_syllable('힣'));
        assert!(!is_syllable('ㄱ'));
        assert!(!is_syllable('a'));
        assert!(!is_syllable('\u{D7A4}'));
    }

    #[test]
    fn test_syllable_indices() {
        assert_eq!(syllable_indices('가'), Some((0, 0, 0)));
        assert_eq!(syllable_indices('각'), Some((0, 0, 1)));
        assert_eq!(syllable_indices('한'), Some((18, 0, 4)));
        // 닭: ㄷ(3) ㅏ(0) ㄺ(9)
        assert_eq!(syllable_indices('닭'), Some((3, 0, 9)));
        assert_eq!(syllable_indices('힣'), Some((18, 20, 27)));
        assert_eq!(syllable_indices('1'), None);
    }

    #[test]
    fn test_compose_rejects_out_of_range() {
        assert_eq!(compose_syllable(19, 0, 0), None);
        assert_eq!(compose_syllable(0, 21, 0), None);
        assert_eq!(compose_syllable(0, 0, 28), None);
    }

    #[test]
    fn test_round_trip_every_syllable() {
        for code in SYLLABLE_BASE..=SYLLABLE_LAST {
            let c = char::from_u32(code).unwrap();
            let (lead, vowel, trail) = syllable_indices(c).unwrap();
            assert_eq!(compose_syllable(lead, vowel, trail), Some(c), "U+{code:04X}");
        }
    }
}
