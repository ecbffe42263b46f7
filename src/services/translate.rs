use std::time::Duration;

use serde::Deserialize;

use crate::config::DeeplConfig;
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::services::{ensure_success, http_client};

pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

/// Turns page text into an image prompt language.
pub trait Translator {
    fn translate(&self, text: &str) -> ShortsResult<String>;
}

/// Returns the text unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl Translator for Passthrough {
    fn translate(&self, text: &str) -> ShortsResult<String> {
        Ok(text.to_string())
    }
}

/// DeepL REST client.
pub struct DeeplTranslator {
    client: reqwest::blocking::Client,
    api_key: String,
    target_lang: String,
    endpoint: String,
}

impl DeeplTranslator {
    pub fn new(api_key: impl Into<String>, target_lang: impl Into<String>) -> ShortsResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ShortsError::validation("DeepL API key is empty"));
        }
        Ok(Self {
            client: http_client(Duration::from_secs(20))?,
            api_key,
            target_lang: target_lang.into(),
            endpoint: DEEPL_FREE_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Translator for DeeplTranslator {
    #[tracing::instrument(skip_all, fields(chars = text.chars().count()))]
    fn translate(&self, text: &str) -> ShortsResult<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&[("text", text), ("target_lang", self.target_lang.as_str())])
            .send()?;
        let body = ensure_success(resp, "DeepL translate")?.text()?;
        parse_translation(&body)
    }
}

#[derive(Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// First translation in a DeepL response body.
pub(crate) fn parse_translation(body: &str) -> ShortsResult<String> {
    let resp: DeeplResponse = serde_json::from_str(body)
        .map_err(|e| ShortsError::service(format!("unexpected DeepL response: {e}")))?;
    resp.translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| ShortsError::service("DeepL response has no translations"))
}

/// DeepL when a key is configured, otherwise [`Passthrough`].
pub fn translator_from_config(cfg: &DeeplConfig) -> ShortsResult<Box<dyn Translator>> {
    if cfg.api_key.is_empty() {
        tracing::warn!("DeepL API key not configured, prompts are sent untranslated");
        return Ok(Box::new(Passthrough));
    }
    Ok(Box::new(DeeplTranslator::new(
        cfg.api_key.clone(),
        cfg.target_lang.clone(),
    )?))
}

/// Translate, falling back to the original text on any failure.
pub fn translate_or_original(translator: &dyn Translator, text: &str) -> String {
    match translator.translate(text) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!("translation failed, using original text: {e}");
            text.to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/translate.rs"]
mod tests;
