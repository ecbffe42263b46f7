use std::{path::Path, sync::Arc};

use usvg::fontdb;

use crate::foundation::error::{ShortsError, ShortsResult};

/// Families tried, in order, when no font file is configured. CJK faces first so Japanese
/// captions shape without tofu.
const PREFERRED_FAMILIES: &[&str] = &[
    "Noto Sans CJK JP",
    "Noto Sans JP",
    "Hiragino Sans",
    "Yu Gothic",
    "IPAexGothic",
    "Source Han Sans JP",
    "DejaVu Sans",
];

/// Raw font file bytes plus the face index inside a collection.
#[derive(Clone, Debug)]
pub struct CaptionFont {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    /// Family of the face at `index`, when known; otherwise the first family in the file.
    pub family: Option<String>,
}

impl CaptionFont {
    pub fn from_file(path: &Path) -> ShortsResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ShortsError::media(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
            family: None,
        })
    }

    /// Query the system font database for a caption face.
    pub fn discover() -> ShortsResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut families: Vec<fontdb::Family<'_>> = PREFERRED_FAMILIES
            .iter()
            .map(|&name| fontdb::Family::Name(name))
            .collect();
        families.push(fontdb::Family::SansSerif);

        let id = db
            .query(&fontdb::Query {
                families: &families,
                ..fontdb::Query::default()
            })
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| ShortsError::media("no system font available for captions"))?;

        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| ShortsError::media("failed to load system font data"))?;
        let family = db
            .face(id)
            .and_then(|f| f.families.first())
            .map(|(name, _)| name.clone());
        tracing::debug!(?family, index, "discovered caption font");
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
            family,
        })
    }

    /// Configured file when given, otherwise system discovery.
    pub fn resolve(font_path: Option<&Path>) -> ShortsResult<Self> {
        match font_path {
            Some(p) => Self::from_file(p),
            None => Self::discover(),
        }
    }
}
