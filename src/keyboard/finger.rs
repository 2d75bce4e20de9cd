#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
    Thumb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerAssignment {
    pub hand: Hand,
    pub finger: Finger,
}

impl FingerAssignment {
    pub fn new(hand: Hand, finger: Finger) -> Self {
        Self { hand, finger }
    }

    pub fn label(&self) -> &'static str {
        use Finger::*;
        use Hand::*;

        match (self.hand, self.finger) {
            (Left, Pinky) => "left pinky",
            (Left, Ring) => "left ring",
            (Left, Middle) => "left middle",
            (Left, Index) => "left index",
            (Right, Pinky) => "right pinky",
            (Right, Ring) => "right ring",
            (Right, Middle) => "right middle",
            (Right, Index) => "right index",
            (_, Thumb) => "thumb",
        }
    }
}

/// Touch-typing finger for a physical key. Consonants sit under the left hand
/// and vowels under the right on the two-set layout.
pub fn finger_for_key(key: char) -> FingerAssignment {
    use Finger::*;
    use Hand::*;

    match key.to_ascii_lowercase() {
        'q' | 'a' | 'z' | '1' => FingerAssignment::new(Left, Pinky),
        'w' | 's' | 'x' | '2' => FingerAssignment::new(Left, Ring),
        'e' | 'd' | 'c' | '3' => FingerAssignment::new(Left, Middle),
        'r' | 'f' | 'v' | 't' | 'g' | 'b' | '4' | '5' => FingerAssignment::new(Left, Index),
        'y' | 'h' | 'n' | 'u' | 'j' | 'm' | '6' | '7' => FingerAssignment::new(Right, Index),
        'i' | 'k' | ',' | '8' => FingerAssignment::new(Right, Middle),
        'o' | 'l' | '.' | '9' => FingerAssignment::new(Right, Ring),
        'p' | ';' | '/' | '0' | '-' | '=' | '[' | ']' | '\'' | '\\' => {
            FingerAssignment::new(Right, Pinky)
        }
        ' ' => FingerAssignment::new(Right, Thumb),
        _ => FingerAssignment::new(Right, Index),
    }
}

/// Whether the first key of `binding` is a shifted letter.
pub fn needs_shift(binding: &str) -> bool {
    binding
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
}
