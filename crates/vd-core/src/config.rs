//! Editor-wide tunables.

use crate::error::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration shared by the store, the geometry engine and the view.
///
/// Defaults match the behavior of the design surface out of the box;
/// hosts may override any field from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Side length of the square canvas, in canvas units. Default: **10000**.
    pub canvas_size: f32,

    /// Inset removed on every side when a node is dropped INSIDE a frame,
    /// so shared edges never round to a zero-width box. Default: **1**.
    pub reparent_inset: f32,

    /// Screen-pixel tolerance for treating a node edge as lying on the
    /// selection's bounding edge during resize. Default: **0.5**.
    pub edge_tolerance: f32,

    /// Lower zoom bound. Default: **0.1**.
    pub min_zoom: f32,

    /// Upper zoom bound. Default: **8.0**.
    pub max_zoom: f32,

    /// Multiplicative step used by zoom-in/zoom-out commands. Default: **1.1**.
    pub zoom_step: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 10_000.0,
            reparent_inset: 1.0,
            edge_tolerance: 0.5,
            min_zoom: 0.1,
            max_zoom: 8.0,
            zoom_step: 1.1,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    /// [`SceneError::Config`] if the text is not a valid config object.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        serde_json::from_str(text).map_err(|e| SceneError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "max_zoom": 4.0 }"#).unwrap();
        assert_eq!(config.max_zoom, 4.0);
        assert_eq!(config.canvas_size, 10_000.0);
        assert_eq!(config.reparent_inset, 1.0);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = EditorConfig::from_json("{ max_zoom: }");
        assert!(matches!(result, Err(SceneError::Config(_))));
    }
}
