//! Upload a local image, then animate it with WAN 2.5 image-to-video.
//!
//! ```sh
//! WAVESPEED_API_KEY=ws-... cargo run --example image_to_video -- path/to/frame.png
//! ```

use std::time::Duration;
use wavespeed_rs::{Wan25ImageToVideo, WaveSpeedClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: image_to_video <image-path>")?;

    let client = WaveSpeedClient::from_env()?;

    let image_url = client.upload_file_with_type(&path, "image/png", 3).await?;
    println!("uploaded: {image_url}");

    let request = Wan25ImageToVideo::new(image_url, "slow cinematic zoom in, gentle wind")
        .resolution("720p")
        .duration(5);

    let outcome = client
        .send_request(&request, true, Duration::from_secs(5), Some(Duration::from_secs(600)))
        .await?;

    for url in outcome.outputs() {
        println!("video: {url}");
    }
    Ok(())
}
