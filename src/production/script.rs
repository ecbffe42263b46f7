use std::path::Path;

use crate::foundation::error::{ShortsError, ShortsResult};

/// A parsed script: one entry per page, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    /// File stem, used for the upload title.
    pub stem: String,
    pub pages: Vec<String>,
}

impl Script {
    pub fn from_path(path: &Path) -> ShortsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShortsError::validation(format!("read script '{}': {e}", path.display()))
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string());
        Self::from_text(stem, &text)
    }

    pub fn from_text(stem: impl Into<String>, text: &str) -> ShortsResult<Self> {
        let pages = parse_pages(text)?;
        tracing::info!(pages = pages.len(), "script parsed");
        Ok(Self {
            stem: stem.into(),
            pages,
        })
    }
}

/// Split on blank lines; each block is trimmed and empty blocks are dropped.
pub fn parse_pages(text: &str) -> ShortsResult<Vec<String>> {
    let normalized = text.replace("\r\n", "\n");
    let pages: Vec<String> = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if pages.is_empty() {
        return Err(ShortsError::validation("script has no pages"));
    }
    Ok(pages)
}

#[cfg(test)]
#[path = "../../tests/unit/production/script.rs"]
mod tests;
