use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Colours handed out to new treatments, in order.
pub const HIGH_CONTRAST_COLORS: [&str; 7] = [
    "#FF4500", "#00FFFF", "#FFD700", "#4169E1", "#32CD32", "#FF00FF", "#FFFFFF",
];

/// A treatment planted as one row per block. `color` is an opaque tag for the
/// renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Species {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, LayoutError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(LayoutError::InvalidConfiguration(
                "species name must not be empty".into(),
            ));
        }
        Ok(Self {
            id: id.into(),
            name,
            color: color.into(),
        })
    }
}

/// First palette colour nobody uses yet, otherwise cycle by list length.
pub fn next_color(existing: &[Species]) -> &'static str {
    HIGH_CONTRAST_COLORS
        .iter()
        .copied()
        .find(|candidate| !existing.iter().any(|s| s.color == *candidate))
        .unwrap_or(HIGH_CONTRAST_COLORS[existing.len() % HIGH_CONTRAST_COLORS.len()])
}
