//! Submit a FLUX LoRA text-to-image request and wait for the outputs.
//!
//! ```sh
//! WAVESPEED_API_KEY=ws-... cargo run --example generate_image
//! ```

use std::time::Duration;
use wavespeed_rs::{FluxDevLora, GenerationRequest, LoraWeight, SendOutcome, WaveSpeedClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = WaveSpeedClient::from_env()?;

    let request = FluxDevLora::new("a lighthouse on a stormy coast, dramatic light")
        .size(1024, 768)
        .steps(30)
        .guidance_scale(3.5)
        .lora(LoraWeight::new("flymy-ai/realism-lora", 0.8));

    println!("Submitting to {} ...", request.api_path());
    let outcome = client
        .send_request(&request, true, Duration::from_secs(5), None)
        .await?;

    match outcome {
        SendOutcome::Finished(status) => {
            for url in &status.outputs {
                println!("generated: {url}");
            }
        }
        SendOutcome::Submitted { request_id } => {
            println!("still processing remotely as task {request_id}");
        }
    }
    Ok(())
}
