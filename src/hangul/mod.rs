pub mod decompose;
pub mod syllable;

pub use decompose::{decompose, typing_hint};
