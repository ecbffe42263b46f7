use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::FluxConfig;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::services::{ensure_success, http_client};

pub const FAL_FLUX_DEV_ENDPOINT: &str = "https://fal.run/fal-ai/flux/dev";
pub const REPLICATE_PREDICTIONS_ENDPOINT: &str = "https://api.replicate.com/v1/predictions";
const REPLICATE_MODEL: &str = "black-forest-labs/flux-schnell";

/// Appended to every prompt so providers favour portrait framing.
pub const PROMPT_SUFFIX: &str = ", vertical orientation, 9:16 aspect ratio, high quality, professional";

/// Writes an image for `prompt` to `dest`.
pub trait ImageSource {
    fn generate(&self, prompt: &str, dest: &Path) -> ShortsResult<()>;
}

pub fn enhance_prompt(prompt: &str) -> String {
    format!("{prompt}{PROMPT_SUFFIX}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FluxProvider {
    Fal,
    Replicate,
}

impl FluxProvider {
    pub fn from_name(name: &str) -> ShortsResult<Self> {
        match name {
            "fal.ai" | "fal" => Ok(Self::Fal),
            "replicate" => Ok(Self::Replicate),
            other => Err(ShortsError::validation(format!(
                "unsupported image provider '{other}'"
            ))),
        }
    }
}

/// Flux.1 text-to-image through fal.ai or Replicate.
pub struct FluxImageGenerator {
    client: reqwest::blocking::Client,
    provider: FluxProvider,
    model: String,
    api_key: String,
    steps: u32,
    guidance_scale: f64,
    poll_interval: Duration,
    max_polls: u32,
}

impl FluxImageGenerator {
    pub fn new(cfg: &FluxConfig) -> ShortsResult<Self> {
        if cfg.api_key.is_empty() {
            return Err(ShortsError::validation("Flux API key is empty"));
        }
        let provider = FluxProvider::from_name(&cfg.provider)?;
        tracing::info!(?provider, model = %cfg.model, "image generator configured");
        Ok(Self {
            client: http_client(Duration::from_secs(120))?,
            provider,
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            steps: cfg.steps,
            guidance_scale: cfg.guidance_scale,
            poll_interval: Duration::from_secs(2),
            max_polls: 150,
        })
    }

    pub fn provider(&self) -> FluxProvider {
        self.provider
    }

    /// Model name as configured; informational only, the endpoints pin their own model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_fal(&self, prompt: &str) -> ShortsResult<String> {
        let body = json!({
            "prompt": prompt,
            "image_size": "portrait_9_16",
            "num_inference_steps": self.steps,
            "guidance_scale": self.guidance_scale,
            "enable_safety_checker": true,
        });
        let resp = self
            .client
            .post(FAL_FLUX_DEV_ENDPOINT)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()?;
        let result: FalResult = ensure_success(resp, "fal.ai generation")?.json()?;
        result
            .images
            .into_iter()
            .next()
            .map(|i| i.url)
            .ok_or_else(|| ShortsError::service("fal.ai response has no image URL"))
    }

    fn generate_replicate(&self, prompt: &str) -> ShortsResult<String> {
        let body = json!({
            "version": REPLICATE_MODEL,
            "input": {
                "prompt": prompt,
                "width": 1080,
                "height": 1920,
                "num_inference_steps": self.steps,
                "guidance_scale": self.guidance_scale,
            }
        });
        let auth = format!("Token {}", self.api_key);
        let resp = self
            .client
            .post(REPLICATE_PREDICTIONS_ENDPOINT)
            .header("Authorization", &auth)
            .timeout(Duration::from_secs(10))
            .json(&body)
            .send()?;
        let created: ReplicatePrediction = ensure_success(resp, "Replicate prediction")?.json()?;
        let poll_url = created
            .urls
            .and_then(|u| u.get)
            .ok_or_else(|| ShortsError::service("Replicate prediction has no poll URL"))?;

        for attempt in 1..=self.max_polls {
            std::thread::sleep(self.poll_interval);
            let resp = self
                .client
                .get(&poll_url)
                .header("Authorization", &auth)
                .send()?;
            let prediction: ReplicatePrediction =
                ensure_success(resp, "Replicate poll")?.json()?;
            match prediction.outcome()? {
                Some(url) => return Ok(url),
                None => tracing::debug!(attempt, status = %prediction.status, "prediction pending"),
            }
        }
        Err(ShortsError::service(format!(
            "Replicate prediction did not finish after {} polls",
            self.max_polls
        )))
    }

    fn download(&self, url: &str, dest: &Path) -> ShortsResult<()> {
        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()?;
        let bytes = ensure_success(resp, "image download")?.bytes()?;
        ensure_parent_dir(dest)?;
        std::fs::write(dest, &bytes).map_err(|e| {
            ShortsError::service(format!("write image '{}': {e}", dest.display()))
        })?;
        Ok(())
    }
}

impl ImageSource for FluxImageGenerator {
    #[tracing::instrument(skip_all, fields(provider = ?self.provider, model = %self.model, dest = %dest.display()))]
    fn generate(&self, prompt: &str, dest: &Path) -> ShortsResult<()> {
        let prompt = enhance_prompt(prompt);
        let url = match self.provider {
            FluxProvider::Fal => self.generate_fal(&prompt)?,
            FluxProvider::Replicate => self.generate_replicate(&prompt)?,
        };
        self.download(&url, dest)?;
        tracing::info!("image downloaded");
        Ok(())
    }
}

#[derive(Deserialize)]
struct FalResult {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Deserialize)]
struct FalImage {
    url: String,
}

#[derive(Deserialize)]
pub(crate) struct ReplicatePrediction {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) output: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) error: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) urls: Option<ReplicateUrls>,
}

#[derive(Deserialize)]
pub(crate) struct ReplicateUrls {
    pub(crate) get: Option<String>,
}

impl ReplicatePrediction {
    /// `Some(url)` once succeeded, `None` while pending, an error on failure.
    pub(crate) fn outcome(&self) -> ShortsResult<Option<String>> {
        match self.status.as_str() {
            "succeeded" => self
                .output
                .as_ref()
                .and_then(|o| o.first().cloned())
                .map(Some)
                .ok_or_else(|| ShortsError::service("Replicate returned no image URL")),
            "starting" | "processing" => Ok(None),
            "failed" | "canceled" => Err(ShortsError::service(format!(
                "Replicate prediction {}: {}",
                self.status,
                self.error
                    .as_ref()
                    .map_or_else(|| "unknown error".to_string(), |e| e.to_string())
            ))),
            other => Err(ShortsError::service(format!(
                "unexpected Replicate status '{other}'"
            ))),
        }
    }
}

/// Plain black frame at the canvas size.
#[derive(Clone, Copy, Debug)]
pub struct PlaceholderImage {
    pub width: u32,
    pub height: u32,
}

impl Default for PlaceholderImage {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl ImageSource for PlaceholderImage {
    fn generate(&self, _prompt: &str, dest: &Path) -> ShortsResult<()> {
        use anyhow::Context as _;
        ensure_parent_dir(dest)?;
        ::image::RgbImage::from_pixel(self.width, self.height, ::image::Rgb([0, 0, 0]))
            .save(dest)
            .with_context(|| format!("write placeholder image '{}'", dest.display()))?;
        tracing::info!(dest = %dest.display(), "placeholder image written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/image.rs"]
mod tests;
