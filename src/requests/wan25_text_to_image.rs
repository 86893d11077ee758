use serde_json::{json, Map, Value};

use crate::error::{Result, WaveSpeedError};
use crate::request::{prune_empty, GenerationRequest};

/// WAN 2.5 text-to-image.
#[derive(Debug, Clone)]
pub struct Wan25TextToImage {
    pub prompt: String,
    /// `width*height`; each dimension must be within 768–1440.
    pub size: String,
    pub negative_prompt: String,
    pub enable_prompt_expansion: bool,
    pub seed: i64,
}

impl Wan25TextToImage {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: "1024*1024".to_string(),
            negative_prompt: String::new(),
            enable_prompt_expansion: false,
            seed: -1,
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = format!("{width}*{height}");
        self
    }

    pub fn negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = prompt.into();
        self
    }

    pub fn enable_prompt_expansion(mut self, enabled: bool) -> Self {
        self.enable_prompt_expansion = enabled;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }
}

/// Parse a `width*height` string and check the per-dimension range.
fn parse_size(size: &str) -> Result<(u32, u32)> {
    let parsed = size
        .split_once('*')
        .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)));
    let (width, height) = parsed.ok_or_else(|| {
        WaveSpeedError::Validation(format!(
            "invalid size '{size}', expected 'width*height' (e.g. '1024*1024')"
        ))
    })?;
    for (name, value) in [("width", width), ("height", height)] {
        if !(768..=1440).contains(&value) {
            return Err(WaveSpeedError::Validation(format!(
                "{name} must be between 768 and 1440, got {value}"
            )));
        }
    }
    Ok((width, height))
}

impl GenerationRequest for Wan25TextToImage {
    fn api_path(&self) -> &'static str {
        "/api/v3/alibaba/wan-2.5/text-to-image"
    }

    fn build_payload(&self) -> Result<Map<String, Value>> {
        if self.prompt.trim().is_empty() {
            return Err(WaveSpeedError::Validation("prompt must not be empty".into()));
        }
        parse_size(&self.size)?;
        if !(-1..=i64::from(i32::MAX)).contains(&self.seed) {
            return Err(WaveSpeedError::Validation(format!(
                "seed must be between -1 and {}, got {}",
                i32::MAX,
                self.seed
            )));
        }

        let mut payload = Map::new();
        payload.insert("prompt".into(), json!(self.prompt));
        payload.insert("size".into(), json!(self.size));
        payload.insert(
            "negative_prompt".into(),
            json!(self.negative_prompt.trim()),
        );
        payload.insert(
            "enable_prompt_expansion".into(),
            json!(self.enable_prompt_expansion),
        );
        payload.insert("seed".into(), json!(self.seed));
        Ok(prune_empty(payload))
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["prompt"]
    }

    fn field_order(&self) -> &'static [&'static str] {
        &[
            "prompt",
            "size",
            "negative_prompt",
            "enable_prompt_expansion",
            "seed",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults() {
        let payload = Wan25TextToImage::new("a harbor at dawn")
            .build_payload()
            .unwrap();
        assert_eq!(payload["prompt"], json!("a harbor at dawn"));
        assert_eq!(payload["size"], json!("1024*1024"));
        assert_eq!(payload["seed"], json!(-1));
        // Empty negative prompt is pruned, not sent as "".
        assert!(!payload.contains_key("negative_prompt"));
    }

    #[test]
    fn test_negative_prompt_trimmed() {
        let payload = Wan25TextToImage::new("x")
            .negative_prompt("  blurry, lowres  ")
            .build_payload()
            .unwrap();
        assert_eq!(payload["negative_prompt"], json!("blurry, lowres"));
    }

    #[test]
    fn test_size_validation() {
        assert!(Wan25TextToImage::new("x").size(512, 1024).build_payload().is_err());
        assert!(Wan25TextToImage::new("x").size(1024, 1536).build_payload().is_err());
        assert!(Wan25TextToImage::new("x").size(1440, 768).build_payload().is_ok());

        let mut req = Wan25TextToImage::new("x");
        req.size = "1024x1024".into();
        assert!(req.build_payload().is_err());
    }

    #[test]
    fn test_seed_range() {
        assert!(Wan25TextToImage::new("x").seed(-2).build_payload().is_err());
        assert!(Wan25TextToImage::new("x")
            .seed(i64::from(i32::MAX) + 1)
            .build_payload()
            .is_err());
        assert!(Wan25TextToImage::new("x").seed(0).build_payload().is_ok());
    }

    #[test]
    fn test_api_path() {
        assert_eq!(
            Wan25TextToImage::new("x").api_path(),
            "/api/v3/alibaba/wan-2.5/text-to-image"
        );
    }
}
