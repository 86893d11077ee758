//! # wavespeed-rs
//!
//! Async Rust client for the [WaveSpeed AI](https://wavespeed.ai) hosted
//! media-generation API (text-to-image, image-to-image, text-to-video, and
//! related endpoints).
//!
//! Provides a typed client for the raw HTTP exchange (with automatic
//! response-envelope unwrapping), task submission and status polling with a
//! wall-clock deadline, binary media upload with connection-error retry, and
//! request descriptors for a set of generation endpoints.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wavespeed_rs::{FluxDevLora, SendOutcome, WaveSpeedClient};
//! use std::time::Duration;
//!
//! # async fn example() -> wavespeed_rs::Result<()> {
//! let client = WaveSpeedClient::new("ws-api-key");
//!
//! // Describe the generation
//! let request = FluxDevLora::new("a sunset over mountains")
//!     .size(1024, 768)
//!     .steps(30);
//!
//! // Submit and wait for the task to finish
//! let outcome = client
//!     .send_request(&request, true, Duration::from_secs(5), None)
//!     .await?;
//!
//! if let SendOutcome::Finished(status) = outcome {
//!     for url in &status.outputs {
//!         println!("generated: {url}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod requests;
pub mod types;

pub use client::WaveSpeedClient;
pub use error::{Result, WaveSpeedError};
pub use request::{
    check_lora_path, normalize_loras, GenerationRequest, LoraWeight, LORA_SCALE_DEFAULT,
    LORA_SCALE_MAX, MAX_LORAS,
};
pub use requests::{FluxDevLora, Wan21TextToVideoLora, Wan25ImageToVideo, Wan25TextToImage};
pub use types::{ApiResponse, Credential, FileKind, SendOutcome, TaskState, TaskStatus};
