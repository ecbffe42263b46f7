use crate::{
    composition::model::PageClip,
    foundation::{
        core::{Canvas, Fps},
        error::{ShortsError, ShortsResult},
    },
};

/// A page clip at its absolute offset on the master timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub start: f64,
    pub clip: PageClip,
}

impl TimelineEntry {
    pub fn end(&self) -> f64 {
        self.start + self.clip.duration
    }
}

/// Page clips laid end to end: each starts where the previous one ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    canvas: Canvas,
    entries: Vec<TimelineEntry>,
    total: f64,
}

impl Timeline {
    /// Place `clips` back to back in the given order.
    ///
    /// Fails when there is nothing to place or the clips disagree on canvas size.
    pub fn assemble(clips: Vec<PageClip>) -> ShortsResult<Self> {
        let canvas = clips
            .first()
            .map(|c| c.canvas)
            .ok_or_else(|| ShortsError::validation("no usable page clips to assemble"))?;

        let mut cursor = 0.0f64;
        let mut entries = Vec::with_capacity(clips.len());
        for clip in clips {
            if clip.canvas != canvas {
                return Err(ShortsError::validation(format!(
                    "page {} canvas {}x{} differs from timeline canvas {}x{}",
                    clip.page_number,
                    clip.canvas.width,
                    clip.canvas.height,
                    canvas.width,
                    canvas.height
                )));
            }
            let start = cursor;
            cursor += clip.duration;
            entries.push(TimelineEntry { start, clip });
        }

        tracing::info!(pages = entries.len(), total_secs = cursor, "timeline assembled");
        Ok(Self {
            canvas,
            entries,
            total: cursor,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn total_duration(&self) -> f64 {
        self.total
    }

    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_ceil(self.total)
    }

    /// Entry covering absolute time `t` and the page-local time within it.
    ///
    /// Entries are half-open `[start, end)`; the last entry also absorbs anything at or past the
    /// end so that float residue in the frame loop never samples an empty timeline.
    pub fn entry_at(&self, t: f64) -> Option<(usize, &TimelineEntry, f64)> {
        if self.entries.is_empty() || !t.is_finite() {
            return None;
        }
        let t = t.max(0.0);
        let idx = self
            .entries
            .partition_point(|e| e.end() <= t)
            .min(self.entries.len() - 1);
        let entry = &self.entries[idx];
        let local = (t - entry.start).min(entry.clip.duration);
        Some((idx, entry, local))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/timeline.rs"]
mod tests;
