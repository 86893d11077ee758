//! Request descriptors, one per remote generation endpoint.
//!
//! Each descriptor is a typed parameter set built with `new(required
//! fields)` plus chained setters, and a
//! [`GenerationRequest`](crate::GenerationRequest) impl that validates the
//! parameters and builds the wire payload.

mod flux_dev_lora;
mod wan21_t2v_lora;
mod wan25_image_to_video;
mod wan25_text_to_image;

pub use flux_dev_lora::FluxDevLora;
pub use wan21_t2v_lora::Wan21TextToVideoLora;
pub use wan25_image_to_video::Wan25ImageToVideo;
pub use wan25_text_to_image::Wan25TextToImage;
