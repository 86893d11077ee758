use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, WaveSpeedError};

/// Highest LoRA scale the provider accepts.
pub const LORA_SCALE_MAX: f64 = 4.0;
/// Scale applied when an entry does not specify one.
pub const LORA_SCALE_DEFAULT: f64 = 1.0;
/// Most endpoints cap the LoRA list at three entries.
pub const MAX_LORAS: usize = 3;

/// Typed, validated parameter set for one remote generation endpoint.
///
/// Implementations are pure data shaping: they know their endpoint path,
/// which fields are required, a presentation-only field ordering, and how to
/// turn their parameters into a request-ready payload with empty values
/// pruned.
pub trait GenerationRequest {
    /// Endpoint path, e.g. `/api/v3/wavespeed-ai/flux-dev-lora`.
    fn api_path(&self) -> &'static str;

    /// Build the payload map. Validation failures surface as
    /// [`WaveSpeedError::Validation`] before any I/O happens.
    fn build_payload(&self) -> Result<Map<String, Value>>;

    /// Field names the endpoint requires.
    fn required_fields(&self) -> &'static [&'static str];

    /// Presentation ordering for UI layers. No behavioral effect.
    fn field_order(&self) -> &'static [&'static str];
}

/// A LoRA reference with an optional per-entry scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoraWeight {
    /// Full URL or `namespace/model-name` reference.
    pub path: String,
    /// Blending scale; defaulted during normalization when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl LoraWeight {
    pub fn new(path: impl Into<String>, scale: f64) -> Self {
        Self {
            path: path.into(),
            scale: Some(scale),
        }
    }

    /// Entry without an explicit scale; normalization fills in the default.
    pub fn with_default_scale(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            scale: None,
        }
    }
}

/// Validate a LoRA reference: either a full http(s) URL or a
/// `namespace/model-name` pair.
pub fn check_lora_path(path: &str) -> Result<&str> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path);
    }
    if path.contains('/') && !path.starts_with('/') {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() == 2 && parts.iter().all(|p| !p.trim().is_empty()) {
            return Ok(path);
        }
    }
    Err(WaveSpeedError::Validation(format!(
        "Invalid LoRA path format '{path}'. It should be either a full URL or in the format 'username/model-name'."
    )))
}

/// Validate and normalize a list of LoRA entries.
///
/// Blank paths are skipped, missing scales are filled with `scale_default`,
/// and a scale outside `[0, scale_max]` fails the whole list. Returns the
/// JSON shape the payload carries.
pub fn normalize_loras(
    loras: &[LoraWeight],
    scale_max: f64,
    scale_default: f64,
) -> Result<Vec<Value>> {
    let mut normalized = Vec::new();
    for lora in loras {
        let path = lora.path.trim();
        if path.is_empty() {
            continue;
        }
        let scale = lora.scale.unwrap_or(scale_default);
        if !(0.0..=scale_max).contains(&scale) {
            return Err(WaveSpeedError::Validation(format!(
                "Invalid {path} LoRA scale. It should be between 0 and {scale_max}."
            )));
        }
        normalized.push(json!({
            "path": check_lora_path(path)?,
            "scale": scale,
        }));
    }
    Ok(normalized)
}

/// Drop fields the API treats as absent: nulls, empty strings, and empty
/// objects. Empty arrays are transmitted as-is.
pub(crate) fn prune_empty(payload: Map<String, Value>) -> Map<String, Value> {
    payload
        .into_iter()
        .filter(|(_, v)| {
            !v.is_null()
                && v.as_str() != Some("")
                && v.as_object().map(|o| !o.is_empty()).unwrap_or(true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lora_path_url() {
        assert!(check_lora_path("https://example.com/lora.safetensors").is_ok());
        assert!(check_lora_path("http://example.com/l").is_ok());
    }

    #[test]
    fn test_check_lora_path_namespace() {
        assert!(check_lora_path("flymy-ai/qwen-image-realism-lora").is_ok());
    }

    #[test]
    fn test_check_lora_path_rejects_malformed() {
        for bad in ["plainname", "/leading/slash", "a/b/c", "ns/", "/model", " /x"] {
            assert!(
                matches!(check_lora_path(bad), Err(WaveSpeedError::Validation(_))),
                "path {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_loras_defaults_missing_scale() {
        let loras = vec![
            LoraWeight::with_default_scale("ns/model-a"),
            LoraWeight::new("ns/model-b", 0.5),
        ];
        let normalized = normalize_loras(&loras, LORA_SCALE_MAX, LORA_SCALE_DEFAULT).unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0]["scale"], json!(1.0));
        assert_eq!(normalized[1]["scale"], json!(0.5));
        assert_eq!(normalized[0]["path"], json!("ns/model-a"));
    }

    #[test]
    fn test_normalize_loras_scale_bounds() {
        let too_high = vec![LoraWeight::new("ns/model", 4.5)];
        assert!(matches!(
            normalize_loras(&too_high, LORA_SCALE_MAX, LORA_SCALE_DEFAULT),
            Err(WaveSpeedError::Validation(_))
        ));

        let negative = vec![LoraWeight::new("ns/model", -0.1)];
        assert!(matches!(
            normalize_loras(&negative, LORA_SCALE_MAX, LORA_SCALE_DEFAULT),
            Err(WaveSpeedError::Validation(_))
        ));

        // Boundary values pass.
        let bounds = vec![LoraWeight::new("ns/a", 0.0), LoraWeight::new("ns/b", 4.0)];
        assert!(normalize_loras(&bounds, LORA_SCALE_MAX, LORA_SCALE_DEFAULT).is_ok());
    }

    #[test]
    fn test_normalize_loras_skips_blank_paths() {
        let loras = vec![
            LoraWeight::new("  ", 1.0),
            LoraWeight::new("", 1.0),
            LoraWeight::new("ns/model", 1.0),
        ];
        let normalized = normalize_loras(&loras, LORA_SCALE_MAX, LORA_SCALE_DEFAULT).unwrap();
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_normalize_loras_empty_input() {
        let normalized = normalize_loras(&[], LORA_SCALE_MAX, LORA_SCALE_DEFAULT).unwrap();
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_prune_empty_drops_null_empty_string_and_empty_object() {
        let mut map = Map::new();
        map.insert("keep".into(), json!("value"));
        map.insert("null".into(), Value::Null);
        map.insert("empty_string".into(), json!(""));
        map.insert("empty_object".into(), json!({}));
        map.insert("empty_array".into(), json!([]));
        map.insert("zero".into(), json!(0));
        map.insert("false".into(), json!(false));

        let pruned = prune_empty(map);
        assert!(pruned.contains_key("keep"));
        assert!(!pruned.contains_key("null"));
        assert!(!pruned.contains_key("empty_string"));
        assert!(!pruned.contains_key("empty_object"));
        // Empty arrays and falsy scalars survive.
        assert!(pruned.contains_key("empty_array"));
        assert!(pruned.contains_key("zero"));
        assert!(pruned.contains_key("false"));
    }
}
