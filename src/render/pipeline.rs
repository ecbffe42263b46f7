use crate::{
    composition::timeline::Timeline,
    encode::sink::{AudioInputConfig, FrameSink, SinkConfig},
    foundation::{
        core::{Fps, FrameIndex},
        error::{ShortsError, ShortsResult},
    },
    render::backend::{FrameRGBA, RenderBackend},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Page clips visited.
    pub pages_rendered: u64,
}

/// Render a single frame at absolute timeline time `t`.
pub fn render_frame_at(
    timeline: &Timeline,
    t: f64,
    backend: &mut dyn RenderBackend,
) -> ShortsResult<FrameRGBA> {
    let (_, entry, local) = timeline
        .entry_at(t)
        .ok_or_else(|| ShortsError::render(format!("no page covers t={t}")))?;
    backend.render_page(&entry.clip, local)
}

/// Render every frame of `timeline` into `sink`.
///
/// `ceil(total * fps)` frames are produced; frame `f` samples `t = f / fps`. Cached per-page
/// resources are released as soon as the cursor leaves a page.
#[tracing::instrument(skip_all, fields(pages = timeline.entries().len()))]
pub fn render_timeline(
    timeline: &Timeline,
    fps: Fps,
    backend: &mut dyn RenderBackend,
    sink: &mut dyn FrameSink,
    audio: Option<AudioInputConfig>,
) -> ShortsResult<RenderStats> {
    let frames = timeline.frame_count(fps);
    if frames == 0 {
        return Err(ShortsError::validation("timeline has zero frames"));
    }
    let canvas = timeline.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
        audio,
    })?;

    let mut stats = RenderStats::default();
    let mut current = None;
    for f in 0..frames {
        let t = fps.frames_to_secs(f);
        let (idx, entry, local) = timeline
            .entry_at(t)
            .ok_or_else(|| ShortsError::render(format!("no page covers frame {f}")))?;
        if current != Some(idx) {
            backend.release_page();
            current = Some(idx);
            stats.pages_rendered += 1;
            tracing::info!(
                page = entry.clip.page_number,
                start = entry.start,
                duration = entry.clip.duration,
                "rendering page"
            );
        }
        let frame = backend.render_page(&entry.clip, local)?;
        sink.push_frame(FrameIndex(f), &frame)?;
        stats.frames_total += 1;
    }
    backend.release_page();

    sink.end()?;
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
