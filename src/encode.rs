//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order; see [`crate::render::pipeline::render_timeline`].

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
