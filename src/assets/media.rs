use std::{
    path::Path,
    process::{Command, Stdio},
    sync::OnceLock,
};

use crate::foundation::error::{ShortsError, ShortsResult};

/// Internal audio mixing sample rate used across decode/mix/encode pipeline.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// External tools available to this process, resolved once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// `ffmpeg` runs from `PATH` (audio decode, MP4 encode).
    pub ffmpeg: bool,
    /// `ffprobe` runs from `PATH`.
    pub ffprobe: bool,
}

impl Capabilities {
    /// Probe `PATH` on first call; later calls return the cached flags.
    pub fn get() -> Capabilities {
        static CAPS: OnceLock<Capabilities> = OnceLock::new();
        *CAPS.get_or_init(|| {
            let caps = Capabilities {
                ffmpeg: tool_on_path("ffmpeg"),
                ffprobe: tool_on_path("ffprobe"),
            };
            tracing::debug!(ffmpeg = caps.ffmpeg, ffprobe = caps.ffprobe, "media capabilities");
            caps
        })
    }

    pub(crate) fn require_ffmpeg(self, what: &str) -> ShortsResult<()> {
        if self.ffmpeg {
            Ok(())
        } else {
            Err(ShortsError::media(format!(
                "ffmpeg is required for {what}, but was not found on PATH"
            )))
        }
    }
}

fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Silent stereo buffer of `frames` sample frames.
    pub fn silence(sample_rate: u32, frames: usize) -> Self {
        Self {
            sample_rate,
            channels: 2,
            interleaved_f32: vec![0.0; frames * 2],
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode audio from media source to stereo interleaved `f32` PCM.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ShortsResult<AudioPcm> {
    Capabilities::get().require_ffmpeg("audio decode")?;
    if !path.is_file() {
        return Err(ShortsError::media(format!(
            "audio source '{}' does not exist",
            path.display()
        )));
    }

    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ShortsError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ShortsError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ShortsError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

/// Duration of an in-memory WAV file, from its header.
pub fn wav_duration_secs(bytes: &[u8]) -> ShortsResult<f64> {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))
        .map_err(|e| ShortsError::media(format!("failed to read wav header: {e}")))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ShortsError::media("wav sample rate is 0"));
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
