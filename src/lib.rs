//! shortsai turns a plain-text script into a vertical short-form video.
//!
//! A script is split into pages. Each page gets an illustration, a narration clip and a styled
//! caption; the pages are laid out on a 9:16 canvas, concatenated into one timeline, mixed with
//! optional background music and streamed to `ffmpeg` as an H.264/AAC MP4.
//!
//! The engine is usable without any network service:
//!
//! - Estimate page durations with [`DurationEstimator`]
//! - Lay pages out with [`PageCompositor`] and concatenate them into a [`Timeline`]
//! - Mix narration and music with [`AudioMixer`]
//! - Render frames with [`CpuRenderer`] into any [`FrameSink`]
//!
//! [`ShortsPipeline`] wires those pieces to the image, speech, translation and upload services.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

/// Narration and background music mixing.
pub mod audio;
/// Page layout, composition and timeline assembly.
pub mod composition;
/// JSON configuration.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Script-to-video orchestration.
pub mod production;
/// Rendering backend(s).
pub mod render;
/// External collaborators.
pub mod services;
/// Caption markup and narration estimates.
pub mod text;

pub use crate::assets::fonts::CaptionFont;
pub use crate::assets::media::{AudioPcm, Capabilities, MIX_SAMPLE_RATE};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use crate::foundation::error::{ShortsError, ShortsResult};

pub use crate::audio::mix::{AudioMixer, AudioTrack, BgmConfig};
pub use crate::composition::compositor::PageCompositor;
pub use crate::composition::model::{PageClip, PageRecord};
pub use crate::composition::timeline::{Timeline, TimelineEntry};
pub use crate::config::Config;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::production::pipeline::{ProductionReport, ShortsPipeline};
pub use crate::production::script::Script;
pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::pipeline::{RenderStats, render_frame_at, render_timeline};
pub use crate::text::estimate::DurationEstimator;
pub use crate::text::markup::{StyledRun, parse_markup, plain_text};
