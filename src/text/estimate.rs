use crate::foundation::error::{ShortsError, ShortsResult};

/// Characters that add a spoken pause (Japanese comma, full stop, exclamation, question marks).
pub const PAUSE_CHARS: [char; 4] = ['、', '。', '！', '？'];

const SECS_PER_CHAR: f64 = 0.4;
const SECS_PER_PAUSE: f64 = 0.3;
const MIN_SECS: f64 = 1.0;
const MAX_SECS: f64 = 10.0;
const EMPTY_TEXT_SECS: f64 = 0.5;

/// Narration length estimate used when real speech is unavailable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationEstimator {
    speed_scale: f64,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self { speed_scale: 1.0 }
    }
}

impl DurationEstimator {
    /// `speed_scale` > 1 means faster narration, hence shorter estimates.
    pub fn new(speed_scale: f64) -> ShortsResult<Self> {
        if !(speed_scale.is_finite() && speed_scale > 0.0) {
            return Err(ShortsError::validation(
                "estimator speed_scale must be finite and > 0",
            ));
        }
        Ok(Self { speed_scale })
    }

    pub fn speed_scale(&self) -> f64 {
        self.speed_scale
    }

    /// Estimated seconds of narration for `text`.
    ///
    /// Empty or whitespace-only text is a flat 0.5s and bypasses both the clamp and the speed
    /// scale.
    pub fn estimate(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return EMPTY_TEXT_SECS;
        }

        let chars = text.chars().filter(|&c| c != ' ' && c != '\n').count();
        let pauses = text.chars().filter(|c| PAUSE_CHARS.contains(c)).count();
        let raw = chars as f64 * SECS_PER_CHAR + pauses as f64 * SECS_PER_PAUSE;

        raw.clamp(MIN_SECS, MAX_SECS) / self.speed_scale
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/estimate.rs"]
mod tests;
