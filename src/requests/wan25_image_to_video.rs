use serde_json::{json, Map, Value};

use crate::error::{Result, WaveSpeedError};
use crate::request::{prune_empty, GenerationRequest};

const RESOLUTIONS: &[&str] = &["720p", "1080p"];
const DURATIONS: &[u32] = &[5, 10];

/// WAN 2.5 image-to-video with optional audio-driven generation.
#[derive(Debug, Clone)]
pub struct Wan25ImageToVideo {
    pub image: String,
    pub prompt: String,
    pub resolution: String,
    /// Clip length in seconds; the endpoint accepts 5 or 10.
    pub duration: u32,
    pub audio: Option<String>,
    pub enable_prompt_expansion: bool,
    pub seed: i64,
}

impl Wan25ImageToVideo {
    pub fn new(image: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            prompt: prompt.into(),
            resolution: "720p".to_string(),
            duration: 5,
            audio: None,
            enable_prompt_expansion: false,
            seed: -1,
        }
    }

    pub fn resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    pub fn duration(mut self, seconds: u32) -> Self {
        self.duration = seconds;
        self
    }

    /// Audio URL to drive the generated motion.
    pub fn audio(mut self, url: impl Into<String>) -> Self {
        self.audio = Some(url.into());
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

impl GenerationRequest for Wan25ImageToVideo {
    fn api_path(&self) -> &'static str {
        "/api/v3/wavespeed-ai/wan-2.5/i2v"
    }

    fn build_payload(&self) -> Result<Map<String, Value>> {
        if self.image.trim().is_empty() {
            return Err(WaveSpeedError::Validation("image must not be empty".into()));
        }
        if self.prompt.trim().is_empty() {
            return Err(WaveSpeedError::Validation("prompt must not be empty".into()));
        }
        if !RESOLUTIONS.contains(&self.resolution.as_str()) {
            return Err(WaveSpeedError::Validation(format!(
                "resolution must be one of {RESOLUTIONS:?}, got '{}'",
                self.resolution
            )));
        }
        if !DURATIONS.contains(&self.duration) {
            return Err(WaveSpeedError::Validation(format!(
                "duration must be one of {DURATIONS:?} seconds, got {}",
                self.duration
            )));
        }
        if !(-1..=i64::from(i32::MAX)).contains(&self.seed) {
            return Err(WaveSpeedError::Validation(format!(
                "seed must be between -1 and {}, got {}",
                i32::MAX,
                self.seed
            )));
        }

        let mut payload = Map::new();
        payload.insert("image".into(), json!(self.image));
        payload.insert("prompt".into(), json!(self.prompt));
        payload.insert("resolution".into(), json!(self.resolution));
        payload.insert("duration".into(), json!(self.duration));
        payload.insert("audio".into(), json!(self.audio));
        payload.insert(
            "enable_prompt_expansion".into(),
            json!(self.enable_prompt_expansion),
        );
        payload.insert("seed".into(), json!(self.seed));
        Ok(prune_empty(payload))
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["image", "prompt"]
    }

    fn field_order(&self) -> &'static [&'static str] {
        &[
            "image",
            "prompt",
            "resolution",
            "duration",
            "audio",
            "enable_prompt_expansion",
            "seed",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> Wan25ImageToVideo {
        Wan25ImageToVideo::new("https://cdn/frame.png", "the camera pans right")
    }

    #[test]
    fn test_payload_defaults() {
        let payload = make_request().build_payload().unwrap();
        assert_eq!(payload["image"], json!("https://cdn/frame.png"));
        assert_eq!(payload["resolution"], json!("720p"));
        assert_eq!(payload["duration"], json!(5));
        assert!(!payload.contains_key("audio"));
    }

    #[test]
    fn test_audio_url_included() {
        let payload = make_request()
            .audio("https://cdn/voice.mp3")
            .build_payload()
            .unwrap();
        assert_eq!(payload["audio"], json!("https://cdn/voice.mp3"));
    }

    #[test]
    fn test_enum_validation() {
        assert!(make_request().resolution("480p").build_payload().is_err());
        assert!(make_request().resolution("1080p").build_payload().is_ok());
        assert!(make_request().duration(7).build_payload().is_err());
        assert!(make_request().duration(10).build_payload().is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert!(Wan25ImageToVideo::new("", "prompt").build_payload().is_err());
        assert!(Wan25ImageToVideo::new("https://cdn/x.png", " ")
            .build_payload()
            .is_err());
        assert_eq!(make_request().required_fields(), &["image", "prompt"]);
    }
}
