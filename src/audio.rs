/// Narration and background music mixer.
pub mod mix;
