use serde::{Deserialize, Serialize};

/// Physical key sequence that produces `jamo` on the two-set (dubeolsik) layout.
///
/// Uppercase letters mean the shifted key (tense consonants, ㅒ, ㅖ). Compound
/// vowels have multi-key bindings. Digits, ASCII punctuation and space are
/// typed the same in Korean mode, so they bind to themselves.
pub fn key_binding(jamo: char) -> Option<&'static str> {
    let key = match jamo {
        'ㄱ' => "r",
        'ㄲ' => "R",
        'ㄴ' => "s",
        'ㄷ' => "e",
        'ㄸ' => "E",
        'ㄹ' => "f",
        'ㅁ' => "a",
        'ㅂ' => "q",
        'ㅃ' => "Q",
        'ㅅ' => "t",
        'ㅆ' => "T",
        'ㅇ' => "d",
        'ㅈ' => "w",
        'ㅉ' => "W",
        'ㅊ' => "c",
        'ㅋ' => "z",
        'ㅌ' => "x",
        'ㅍ' => "v",
        'ㅎ' => "g",
        'ㅏ' => "k",
        'ㅐ' => "o",
        'ㅑ' => "i",
        'ㅒ' => "O",
        'ㅓ' => "j",
        'ㅔ' => "p",
        'ㅕ' => "u",
        'ㅖ' => "P",
        'ㅗ' => "h",
        'ㅛ' => "y",
        'ㅜ' => "n",
        'ㅠ' => "b",
        'ㅡ' => "m",
        'ㅣ' => "l",
        'ㅘ' => "hk",
        'ㅙ' => "ho",
        'ㅚ' => "hl",
        'ㅝ' => "nj",
        'ㅞ' => "np",
        'ㅟ' => "nl",
        'ㅢ' => "ml",
        c if c == ' ' || c.is_ascii_digit() || c.is_ascii_punctuation() => {
            return ascii_self_binding(c);
        }
        _ => return None,
    };
    Some(key)
}

/// `&'static str` view of a printable ASCII char, for self-bound keys.
fn ascii_self_binding(c: char) -> Option<&'static str> {
    const PRINTABLE: &str =
        " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";
    let offset = (c as usize).checked_sub(0x20)?;
    PRINTABLE.get(offset..offset + 1)
}

/// Jamo a single key press produces on the two-set layout.
pub fn jamo_for_key(key: char) -> Option<char> {
    let jamo = match key {
        'r' => 'ㄱ',
        'R' => 'ㄲ',
        's' | 'S' => 'ㄴ',
        'e' => 'ㄷ',
        'E' => 'ㄸ',
        'f' | 'F' => 'ㄹ',
        'a' | 'A' => 'ㅁ',
        'q' => 'ㅂ',
        'Q' => 'ㅃ',
        't' => 'ㅅ',
        'T' => 'ㅆ',
        'd' | 'D' => 'ㅇ',
        'w' => 'ㅈ',
        'W' => 'ㅉ',
        'c' | 'C' => 'ㅊ',
        'z' | 'Z' => 'ㅋ',
        'x' | 'X' => 'ㅌ',
        'v' | 'V' => 'ㅍ',
        'g' | 'G' => 'ㅎ',
        'k' | 'K' => 'ㅏ',
        'o' => 'ㅐ',
        'O' => 'ㅒ',
        'i' | 'I' => 'ㅑ',
        'j' | 'J' => 'ㅓ',
        'p' => 'ㅔ',
        'P' => 'ㅖ',
        'u' | 'U' => 'ㅕ',
        'h' | 'H' => 'ㅗ',
        'y' | 'Y' => 'ㅛ',
        'n' | 'N' => 'ㅜ',
        'b' | 'B' => 'ㅠ',
        'm' | 'M' => 'ㅡ',
        'l' | 'L' => 'ㅣ',
        _ => return None,
    };
    Some(jamo)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledKey {
    pub key: char,
    pub jamo: char,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub name: String,
    pub rows: Vec<Vec<LabeledKey>>,
}

impl KeyboardLayout {
    pub fn dubeolsik() -> Self {
        let row = |keys: &str| -> Vec<LabeledKey> {
            keys.chars()
                .filter_map(|key| jamo_for_key(key).map(|jamo| LabeledKey { key, jamo }))
                .collect()
        };
        Self {
            name: "Dubeolsik".to_string(),
            rows: vec![row("qwertyuiop"), row("asdfghjkl"), row("zxcvbnm")],
        }
    }

    /// Row and column of the key that starts `binding`, if it is on the layout.
    pub fn position_of(&self, binding: &str) -> Option<(usize, usize)> {
        let first = binding.chars().next()?.to_ascii_lowercase();
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|k| k.key == first)
                .map(|c| (r, c))
        })
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::dubeolsik()
    }
}
