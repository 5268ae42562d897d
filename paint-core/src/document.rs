//! The portable project document.
//!
//! ```json
//! { "stamps": [{ "svg": "...", "x": 0, "y": 0, "scale": 1 }],
//!   "drawings": ["data:image/png;base64,...", "...", "..."] }
//! ```
//!
//! `drawings` holds exactly one encoded raster per layer, back to front.
//! Both keys are required; parsing and validation finish before any canvas
//! state is touched.

use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::{CanvasError, CanvasResult, Stamp};

/// Prefix every encoded layer must start with.
pub const IMAGE_DATA_URL_PREFIX: &str = "data:image/";

/// Project file contents: stamp records plus one encoded raster per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Stamps in insertion order.
    pub stamps: Vec<Stamp>,
    /// Data-URL encoded layer rasters in stack order.
    pub drawings: Vec<String>,
}

impl ProjectDocument {
    /// Parse a project document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedJson`] if the text is not JSON, and
    /// [`CanvasError::InvalidProject`] if a required key is missing or has
    /// the wrong shape.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => CanvasError::InvalidProject(e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => CanvasError::MalformedJson(e),
        })
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Serialization)
    }

    /// Check the document against a stack of `layer_count` layers.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidProject`] describing the first problem.
    pub fn validate(&self, layer_count: usize) -> CanvasResult<()> {
        if self.drawings.len() != layer_count {
            return Err(CanvasError::InvalidProject(format!(
                "expected {layer_count} drawings, found {}",
                self.drawings.len()
            )));
        }
        if let Some(index) = self.drawings.iter().position(|d| !is_image_data_url(d)) {
            return Err(CanvasError::InvalidProject(format!(
                "drawing {index} is not an image data URL"
            )));
        }
        if let Some(index) = self.stamps.iter().position(|s| !s.is_well_formed()) {
            return Err(CanvasError::InvalidProject(format!(
                "stamp {index} has an empty image or invalid position/scale"
            )));
        }
        Ok(())
    }
}

/// Whether `value` looks like a base64 image data URL.
#[must_use]
pub fn is_image_data_url(value: &str) -> bool {
    value.starts_with(IMAGE_DATA_URL_PREFIX)
        && value
            .split_once(',')
            .is_some_and(|(meta, _)| meta.ends_with(";base64"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,AAAA";

    fn doc() -> ProjectDocument {
        ProjectDocument {
            stamps: vec![Stamp {
                svg: "<svg/>".to_string(),
                x: 10.0,
                y: 20.0,
                scale: 1.5,
            }],
            drawings: vec![PIXEL.to_string(); 3],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let original = doc();
        let json = original.to_json().expect("serialize");
        assert!(json.contains("\"stamps\""));
        assert!(json.contains("\"drawings\""));
        let parsed = ProjectDocument::from_json(&json).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_missing_drawings_rejected() {
        let result = ProjectDocument::from_json(r#"{"stamps": []}"#);
        assert!(matches!(result, Err(CanvasError::InvalidProject(_))));
    }

    #[test]
    fn test_missing_stamps_rejected() {
        let result = ProjectDocument::from_json(r#"{"drawings": []}"#);
        assert!(matches!(result, Err(CanvasError::InvalidProject(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = ProjectDocument::from_json("{\"stamps\": [");
        assert!(matches!(result, Err(CanvasError::MalformedJson(_))));
        let result = ProjectDocument::from_json("not json");
        assert!(matches!(result, Err(CanvasError::MalformedJson(_))));
    }

    #[test]
    fn test_validate_layer_count() {
        let document = doc();
        document.validate(3).expect("three layers");
        assert!(matches!(
            document.validate(2),
            Err(CanvasError::InvalidProject(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_data_url() {
        let mut document = doc();
        document.drawings[1] = "https://example.com/a.png".to_string();
        assert!(document.validate(3).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_stamp() {
        let mut document = doc();
        document.stamps[0].scale = -1.0;
        assert!(document.validate(3).is_err());
    }

    #[test]
    fn test_data_url_detection() {
        assert!(is_image_data_url(PIXEL));
        assert!(!is_image_data_url("data:text/plain;base64,AAAA"));
        assert!(!is_image_data_url("data:image/png,raw"));
    }
}
