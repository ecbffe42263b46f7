//! JSON configuration.
//!
//! Every field has a default, so `{}` is a complete configuration. API keys left empty in the
//! file fall back to the conventional environment variables at [`Config::from_path`] time.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::{Canvas, Fps, Rgba8},
    error::{ShortsError, ShortsResult},
};

/// Top-level configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canvas, frame rate and codec.
    pub video: VideoConfig,
    /// Caption font and colors.
    pub text: TextConfig,
    /// Narration and background-music mixing.
    pub audio: AudioConfig,
    /// External HTTP collaborators.
    pub apis: ApisConfig,
    /// Optional upload target.
    pub youtube: YoutubeConfig,
    /// Output and temp directories.
    pub output: OutputConfig,
    /// Page duration policy.
    pub simple_mode: SimpleModeConfig,
}

/// Output video settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Integer frames per second.
    pub fps: u32,
    /// ffmpeg video encoder name.
    pub codec: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            codec: "libx264".to_string(),
        }
    }
}

/// Caption settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Explicit font file; when absent a system face is discovered.
    pub font_path: Option<PathBuf>,
    /// Caption font size in pixels.
    pub default_size: f32,
    /// Caption colors.
    pub colors: TextColors,
    /// Caption fade-in length in frames, capped at a third of the page.
    pub fade_in_frames: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            default_size: 64.0,
            colors: TextColors::default(),
            fade_in_frames: 20,
        }
    }
}

/// Caption colors per layout variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TextColors {
    /// Normal run color.
    pub default: Rgba8,
    /// Highlighted run color on pages 2 and later.
    pub highlight: Rgba8,
    /// Highlighted run color on the cover page.
    pub cover_highlight: Rgba8,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            default: Rgba8::BLACK,
            highlight: Rgba8::opaque(255, 0, 0),
            cover_highlight: Rgba8::opaque(255, 0, 0),
        }
    }
}

/// Mixer settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Uniform gain applied to every narration track.
    pub narration_gain: f32,
    /// Background music file, if any.
    pub bgm_path: Option<PathBuf>,
    /// Background music volume.
    pub bgm_volume: f32,
    /// Extra multiplier on top of `bgm_volume`.
    pub bgm_boost: f32,
    /// Seconds skipped at the start of the bgm source.
    pub bgm_lead_in_sec: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            narration_gain: 1.3,
            bgm_path: None,
            bgm_volume: 0.3,
            bgm_boost: 1.0,
            bgm_lead_in_sec: 3.0,
        }
    }
}

/// External API collaborators.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApisConfig {
    /// Speech synthesis.
    pub voicevox: VoicevoxConfig,
    /// Image generation.
    pub flux: FluxConfig,
    /// Prompt translation.
    pub deepl: DeeplConfig,
}

/// VOICEVOX engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicevoxConfig {
    pub host: String,
    pub port: u16,
    pub speaker_id: u32,
    /// Narration speed; also divides the fallback duration estimate.
    pub speed_scale: f64,
    pub pitch_scale: f64,
    pub volume_scale: f64,
    pub intonation_scale: f64,
}

impl Default for VoicevoxConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50021,
            speaker_id: 3,
            speed_scale: 1.0,
            pitch_scale: 1.0,
            volume_scale: 1.0,
            intonation_scale: 1.0,
        }
    }
}

/// Flux image generation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// `fal.ai` or `replicate`.
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub steps: u32,
    pub guidance_scale: f64,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            provider: "fal.ai".to_string(),
            api_key: String::new(),
            model: "flux-dev".to_string(),
            steps: 35,
            guidance_scale: 3.5,
        }
    }
}

/// DeepL translation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeeplConfig {
    pub api_key: String,
    pub target_lang: String,
}

impl Default for DeeplConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            target_lang: "EN".to_string(),
        }
    }
}

/// YouTube upload settings. The bearer token is obtained outside this tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    pub access_token: String,
    pub default_privacy: String,
    pub default_category: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            default_privacy: "private".to_string(),
            default_category: "22".to_string(),
        }
    }
}

/// Output locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub temp_directory: PathBuf,
    pub keep_temp_files: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            temp_directory: PathBuf::from("temp"),
            keep_temp_files: false,
        }
    }
}

/// How a page's on-screen duration is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    /// Narration length plus padding on both sides.
    Voice,
    /// Narration length exactly, with no padding.
    Narration,
}

/// Page duration policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleModeConfig {
    pub duration_mode: DurationMode,
    pub padding_seconds: f64,
}

impl Default for SimpleModeConfig {
    fn default() -> Self {
        Self {
            duration_mode: DurationMode::Voice,
            padding_seconds: 0.5,
        }
    }
}

impl SimpleModeConfig {
    /// On-screen duration for a page whose narration lasts `narration_sec`.
    ///
    /// Never shorter than the narration, so a page's audio cannot run into the next page.
    pub fn page_duration(&self, narration_sec: f64) -> f64 {
        match self.duration_mode {
            DurationMode::Voice => narration_sec + self.padding_seconds * 2.0,
            DurationMode::Narration => narration_sec,
        }
    }
}

impl Config {
    /// Load, apply environment fallbacks, and validate.
    pub fn from_path(path: impl AsRef<Path>) -> ShortsResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ShortsError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        cfg.apply_env_fallbacks();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_reader(r: impl Read) -> ShortsResult<Self> {
        serde_json::from_reader(r).map_err(|e| ShortsError::serde(format!("parse config: {e}")))
    }

    pub fn from_json_str(s: &str) -> ShortsResult<Self> {
        serde_json::from_str(s).map_err(|e| ShortsError::serde(format!("parse config: {e}")))
    }

    /// Fill empty API keys from `FAL_KEY`/`REPLICATE_API_TOKEN`, `DEEPL_API_KEY` and
    /// `YOUTUBE_ACCESS_TOKEN`.
    pub fn apply_env_fallbacks(&mut self) {
        fn fill(slot: &mut String, var: &str) {
            if slot.is_empty()
                && let Ok(v) = std::env::var(var)
            {
                *slot = v;
            }
        }
        let flux_var = if self.apis.flux.provider == "replicate" {
            "REPLICATE_API_TOKEN"
        } else {
            "FAL_KEY"
        };
        fill(&mut self.apis.flux.api_key, flux_var);
        fill(&mut self.apis.deepl.api_key, "DEEPL_API_KEY");
        fill(&mut self.youtube.access_token, "YOUTUBE_ACCESS_TOKEN");
    }

    pub fn validate(&self) -> ShortsResult<()> {
        self.canvas()?;
        self.fps()?;
        if !(self.text.default_size.is_finite() && self.text.default_size > 0.0) {
            return Err(ShortsError::validation("text.default_size must be > 0"));
        }
        let speed = self.apis.voicevox.speed_scale;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ShortsError::validation(
                "apis.voicevox.speed_scale must be > 0",
            ));
        }
        for (name, gain) in [
            ("audio.narration_gain", self.audio.narration_gain),
            ("audio.bgm_volume", self.audio.bgm_volume),
            ("audio.bgm_boost", self.audio.bgm_boost),
        ] {
            if !(gain.is_finite() && gain >= 0.0) {
                return Err(ShortsError::validation(format!("{name} must be >= 0")));
            }
        }
        if !(self.audio.bgm_lead_in_sec.is_finite() && self.audio.bgm_lead_in_sec >= 0.0) {
            return Err(ShortsError::validation("audio.bgm_lead_in_sec must be >= 0"));
        }
        let sm = &self.simple_mode;
        if !(sm.padding_seconds.is_finite() && sm.padding_seconds >= 0.0) {
            return Err(ShortsError::validation(
                "simple_mode.padding_seconds must be >= 0",
            ));
        }
        Ok(())
    }

    pub fn canvas(&self) -> ShortsResult<Canvas> {
        Canvas::new(self.video.width, self.video.height)
    }

    pub fn fps(&self) -> ShortsResult<Fps> {
        Fps::new(self.video.fps, 1)
    }

    /// Caption fade-in length in seconds at the configured frame rate.
    pub fn caption_fade_in_secs(&self) -> f64 {
        f64::from(self.text.fade_in_frames) / f64::from(self.video.fps.max(1))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
