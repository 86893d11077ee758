use serde_json::{json, Map, Value};

use crate::error::{Result, WaveSpeedError};
use crate::request::{
    normalize_loras, prune_empty, GenerationRequest, LoraWeight, LORA_SCALE_DEFAULT,
    LORA_SCALE_MAX, MAX_LORAS,
};

const SIZES: &[&str] = &["832*480", "480*832"];

/// WAN 2.1 14B text-to-video (480p, ultra-fast) with LoRA support.
#[derive(Debug, Clone)]
pub struct Wan21TextToVideoLora {
    pub prompt: String,
    pub negative_prompt: String,
    pub loras: Vec<LoraWeight>,
    pub size: String,
    pub num_inference_steps: u32,
    /// Clip length in seconds (5–10).
    pub duration: u32,
    pub guidance_scale: f64,
    /// Timestep-schedule shift for flow matching.
    pub flow_shift: f64,
    pub seed: i64,
    pub enable_safety_checker: bool,
}

impl Wan21TextToVideoLora {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            loras: Vec::new(),
            size: "832*480".to_string(),
            num_inference_steps: 30,
            duration: 5,
            guidance_scale: 5.0,
            flow_shift: 3.0,
            seed: -1,
            enable_safety_checker: true,
        }
    }

    pub fn negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = prompt.into();
        self
    }

    pub fn lora(mut self, lora: LoraWeight) -> Self {
        self.loras.push(lora);
        self
    }

    /// Portrait or landscape 480p frame (`832*480` or `480*832`).
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    pub fn duration(mut self, seconds: u32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn flow_shift(mut self, shift: f64) -> Self {
        self.flow_shift = shift;
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn enable_safety_checker(mut self, enabled: bool) -> Self {
        self.enable_safety_checker = enabled;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(WaveSpeedError::Validation("prompt must not be empty".into()));
        }
        if !SIZES.contains(&self.size.as_str()) {
            return Err(WaveSpeedError::Validation(format!(
                "size must be one of {SIZES:?}, got '{}'",
                self.size
            )));
        }
        if !(1..=40).contains(&self.num_inference_steps) {
            return Err(WaveSpeedError::Validation(format!(
                "num_inference_steps must be between 1 and 40, got {}",
                self.num_inference_steps
            )));
        }
        if !(5..=10).contains(&self.duration) {
            return Err(WaveSpeedError::Validation(format!(
                "duration must be between 5 and 10 seconds, got {}",
                self.duration
            )));
        }
        if !(1.01..=10.0).contains(&self.guidance_scale) {
            return Err(WaveSpeedError::Validation(format!(
                "guidance_scale must be between 1.01 and 10, got {}",
                self.guidance_scale
            )));
        }
        if !(1.0..=10.0).contains(&self.flow_shift) {
            return Err(WaveSpeedError::Validation(format!(
                "flow_shift must be between 1 and 10, got {}",
                self.flow_shift
            )));
        }
        if self.loras.len() > MAX_LORAS {
            return Err(WaveSpeedError::Validation(format!(
                "at most {MAX_LORAS} LoRAs are supported, got {}",
                self.loras.len()
            )));
        }
        Ok(())
    }
}

impl GenerationRequest for Wan21TextToVideoLora {
    fn api_path(&self) -> &'static str {
        "/api/v3/wavespeed-ai/wan-2.1/t2v-480p-lora-ultra-fast"
    }

    fn build_payload(&self) -> Result<Map<String, Value>> {
        self.validate()?;
        let loras = normalize_loras(&self.loras, LORA_SCALE_MAX, LORA_SCALE_DEFAULT)?;

        let mut payload = Map::new();
        payload.insert("prompt".into(), json!(self.prompt));
        payload.insert("negative_prompt".into(), json!(self.negative_prompt));
        payload.insert("loras".into(), Value::Array(loras));
        payload.insert("size".into(), json!(self.size));
        payload.insert(
            "num_inference_steps".into(),
            json!(self.num_inference_steps),
        );
        payload.insert("duration".into(), json!(self.duration));
        payload.insert("guidance_scale".into(), json!(self.guidance_scale));
        payload.insert("flow_shift".into(), json!(self.flow_shift));
        payload.insert("seed".into(), json!(self.seed));
        payload.insert(
            "enable_safety_checker".into(),
            json!(self.enable_safety_checker),
        );
        Ok(prune_empty(payload))
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["prompt"]
    }

    fn field_order(&self) -> &'static [&'static str] {
        &[
            "prompt",
            "negative_prompt",
            "loras",
            "size",
            "num_inference_steps",
            "duration",
            "guidance_scale",
            "flow_shift",
            "seed",
            "enable_safety_checker",
        ]
    }
}
