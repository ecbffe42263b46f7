use std::path::{Path, PathBuf};

use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::config::AudioConfig;
use crate::foundation::error::{ShortsError, ShortsResult};

/// Output channel count of the master mix.
pub const MIX_CHANNELS: u16 = 2;

/// An audio buffer placed on the master timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    pub pcm: AudioPcm,
    /// Absolute start offset in seconds.
    pub start_sec: f64,
    /// Per-track gain, multiplied by the mixer's narration gain.
    pub gain: f32,
}

impl AudioTrack {
    pub fn new(pcm: AudioPcm, start_sec: f64) -> Self {
        Self {
            pcm,
            start_sec,
            gain: 1.0,
        }
    }

    /// Decode a narration file at the mix sample rate.
    pub fn load(path: &Path, start_sec: f64, sample_rate: u32) -> ShortsResult<Self> {
        Ok(Self::new(decode_audio_f32_stereo(path, sample_rate)?, start_sec))
    }

    pub fn duration_secs(&self) -> f64 {
        self.pcm.duration_secs()
    }
}

/// Background music settings.
#[derive(Clone, Debug, PartialEq)]
pub struct BgmConfig {
    pub path: Option<PathBuf>,
    pub volume: f32,
    pub boost: f32,
    /// Seconds skipped at the start of the source.
    pub lead_in_sec: f64,
}

impl BgmConfig {
    pub fn gain(&self) -> f32 {
        self.volume * self.boost
    }
}

/// Sums narration tracks and a looped/trimmed background track into one master buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioMixer {
    pub sample_rate: u32,
    pub narration_gain: f32,
    pub bgm: BgmConfig,
}

impl AudioMixer {
    pub fn from_config(cfg: &AudioConfig) -> Self {
        Self {
            sample_rate: MIX_SAMPLE_RATE,
            narration_gain: cfg.narration_gain,
            bgm: BgmConfig {
                path: cfg.bgm_path.clone(),
                volume: cfg.bgm_volume,
                boost: cfg.bgm_boost,
                lead_in_sec: cfg.bgm_lead_in_sec,
            },
        }
    }

    /// Mix to exactly `total_secs`. A configured but unreadable bgm degrades to narration only.
    #[tracing::instrument(skip(self, narration), fields(tracks = narration.len()))]
    pub fn mix(&self, narration: &[AudioTrack], total_secs: f64) -> AudioPcm {
        let bgm = self.bgm.path.as_deref().and_then(|path| {
            match decode_audio_f32_stereo(path, self.sample_rate) {
                Ok(pcm) => Some(pcm),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "bgm unavailable, mixing narration only: {e}");
                    None
                }
            }
        });
        self.mix_loaded(narration, bgm.as_ref(), total_secs)
    }

    /// Mix already decoded sources.
    pub fn mix_loaded(
        &self,
        narration: &[AudioTrack],
        bgm: Option<&AudioPcm>,
        total_secs: f64,
    ) -> AudioPcm {
        let frames = total_frames(total_secs, self.sample_rate);
        let ch = usize::from(MIX_CHANNELS);
        let mut out = vec![0.0f32; frames * ch];

        for track in narration {
            mix_track(
                &mut out,
                self.sample_rate,
                track,
                track.gain * self.narration_gain,
            );
        }

        if let Some(src) = bgm {
            let gain = self.bgm.gain();
            let lead_in = self.bgm.lead_in_sec;
            match fit_bgm(src, lead_in, self.sample_rate, frames) {
                Some(bed) => {
                    for (o, b) in out.iter_mut().zip(&bed) {
                        *o += b * gain;
                    }
                }
                None => tracing::warn!("bgm source is empty, mixing narration only"),
            }
        }

        for s in &mut out {
            *s = s.clamp(-1.0, 1.0);
        }
        AudioPcm {
            sample_rate: self.sample_rate,
            channels: MIX_CHANNELS,
            interleaved_f32: out,
        }
    }
}

/// Sample frames covering `total_secs` at `sample_rate`, rounded to nearest.
pub fn total_frames(total_secs: f64, sample_rate: u32) -> usize {
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return 0;
    }
    (total_secs * f64::from(sample_rate)).round() as usize
}

/// Background bed of exactly `frames` stereo frames: `src` minus its lead-in, repeated end to end
/// and cut at `frames`. Returns `None` when the source has no audio at all.
///
/// A source shorter than its lead-in is used from the start.
pub fn fit_bgm(
    src: &AudioPcm,
    lead_in_sec: f64,
    sample_rate: u32,
    frames: usize,
) -> Option<Vec<f32>> {
    let stereo = to_stereo_at_rate(src, sample_rate);
    let src_frames = stereo.len() / 2;
    if src_frames == 0 {
        return None;
    }

    let skip = total_frames(lead_in_sec, sample_rate);
    let body = if skip < src_frames {
        &stereo[skip * 2..]
    } else {
        tracing::warn!(
            lead_in_sec,
            source_secs = src_frames as f64 / f64::from(sample_rate),
            "bgm shorter than its lead-in, using it from the start"
        );
        &stereo[..]
    };

    let out: Vec<f32> = body.iter().copied().cycle().take(frames * 2).collect();
    Some(out)
}

/// Add `track` into `out` (interleaved stereo at `sample_rate`), resampling linearly when the
/// track was decoded at another rate.
fn mix_track(out: &mut [f32], sample_rate: u32, track: &AudioTrack, gain: f32) {
    let src = &track.pcm;
    let src_ch = usize::from(src.channels.max(1));
    let src_frames = src.frames();
    if src_frames == 0 || src.sample_rate == 0 || !track.start_sec.is_finite() {
        return;
    }
    let out_frames = out.len() / 2;
    let start = total_frames(track.start_sec.max(0.0), sample_rate);
    let step = f64::from(src.sample_rate) / f64::from(sample_rate);
    let data = &src.interleaved_f32;

    for dst_frame in start..out_frames {
        let src_pos = (dst_frame - start) as f64 * step;
        let f0 = src_pos.floor() as usize;
        if f0 >= src_frames {
            break;
        }
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (src_pos - f0 as f64) as f32;

        let sample = |frame: usize, c: usize| data[frame * src_ch + c.min(src_ch - 1)];
        let l = sample(f0, 0) + (sample(f1, 0) - sample(f0, 0)) * frac;
        let r = sample(f0, 1) + (sample(f1, 1) - sample(f0, 1)) * frac;

        out[dst_frame * 2] += l * gain;
        out[dst_frame * 2 + 1] += r * gain;
    }
}

fn to_stereo_at_rate(src: &AudioPcm, sample_rate: u32) -> Vec<f32> {
    if src.sample_rate == sample_rate && src.channels == 2 {
        return src.interleaved_f32.clone();
    }
    if src.sample_rate == 0 {
        return Vec::new();
    }
    let track = AudioTrack::new(src.clone(), 0.0);
    let mut out = vec![0.0f32; total_frames(src.duration_secs(), sample_rate) * 2];
    mix_track(&mut out, sample_rate, &track, 1.0);
    out
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ShortsResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ShortsError::media(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ShortsError::media(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
