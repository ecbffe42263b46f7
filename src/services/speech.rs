use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::assets::media::wav_duration_secs;
use crate::config::VoicevoxConfig;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::services::{ensure_success, http_client};

/// A synthesized narration file.
#[derive(Clone, Debug, PartialEq)]
pub struct Narration {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Speaks `text` into a WAV file at `dest`.
pub trait SpeechSource {
    fn synthesize(&self, text: &str, dest: &Path) -> ShortsResult<Narration>;
}

/// Voice parameters applied on top of the engine's audio query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceScales {
    pub speed: f64,
    pub pitch: f64,
    pub volume: f64,
    pub intonation: f64,
}

impl VoiceScales {
    /// Override the query's scale fields, leaving defaults (1.0) untouched.
    pub(crate) fn apply(&self, query: &mut Value) {
        let Some(obj) = query.as_object_mut() else {
            return;
        };
        for (key, value) in [
            ("speedScale", self.speed),
            ("pitchScale", self.pitch),
            ("volumeScale", self.volume),
            ("intonationScale", self.intonation),
        ] {
            if value != 1.0 {
                obj.insert(key.to_string(), Value::from(value));
            }
        }
    }
}

/// Client for a local VOICEVOX engine.
pub struct VoicevoxSynthesizer {
    client: reqwest::blocking::Client,
    base_url: String,
    speaker_id: u32,
    scales: VoiceScales,
}

impl VoicevoxSynthesizer {
    pub fn new(cfg: &VoicevoxConfig) -> ShortsResult<Self> {
        Ok(Self {
            client: http_client(Duration::from_secs(30))?,
            base_url: format!("http://{}:{}", cfg.host, cfg.port),
            speaker_id: cfg.speaker_id,
            scales: VoiceScales {
                speed: cfg.speed_scale,
                pitch: cfg.pitch_scale,
                volume: cfg.volume_scale,
                intonation: cfg.intonation_scale,
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Engine version string; used as a reachability probe.
    pub fn version(&self) -> ShortsResult<String> {
        let resp = self
            .client
            .get(format!("{}/version", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()?;
        Ok(ensure_success(resp, "VOICEVOX version")?.text()?)
    }

    fn audio_query(&self, text: &str) -> ShortsResult<Value> {
        let speaker = self.speaker_id.to_string();
        let resp = self
            .client
            .post(format!("{}/audio_query", self.base_url))
            .query(&[("text", text), ("speaker", speaker.as_str())])
            .timeout(Duration::from_secs(10))
            .send()?;
        let mut query: Value = ensure_success(resp, "VOICEVOX audio_query")?.json()?;
        self.scales.apply(&mut query);
        Ok(query)
    }

    fn synthesis(&self, query: &Value) -> ShortsResult<Vec<u8>> {
        let resp = self
            .client
            .post(format!("{}/synthesis", self.base_url))
            .query(&[("speaker", self.speaker_id)])
            .json(query)
            .send()?;
        Ok(ensure_success(resp, "VOICEVOX synthesis")?.bytes()?.to_vec())
    }
}

impl SpeechSource for VoicevoxSynthesizer {
    #[tracing::instrument(skip_all, fields(speaker = self.speaker_id, dest = %dest.display()))]
    fn synthesize(&self, text: &str, dest: &Path) -> ShortsResult<Narration> {
        if text.trim().is_empty() {
            return Err(ShortsError::validation("cannot synthesize empty text"));
        }
        let query = self.audio_query(text)?;
        let wav = self.synthesis(&query)?;
        let duration_secs = wav_duration_secs(&wav)?;

        ensure_parent_dir(dest)?;
        std::fs::write(dest, &wav).map_err(|e| {
            ShortsError::service(format!("write narration '{}': {e}", dest.display()))
        })?;
        tracing::info!(duration_secs, "narration synthesized");
        Ok(Narration {
            path: dest.to_path_buf(),
            duration_secs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/speech.rs"]
mod tests;
