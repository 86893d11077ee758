use serde_json::json;
use wavespeed_rs::*;

// --- Envelope handling ---

#[test]
fn test_enveloped_success_yields_data() {
    let body = json!({
        "code": 200,
        "message": "success",
        "data": {
            "id": "task-1",
            "status": "completed",
            "outputs": ["http://x/1.png"]
        }
    });
    let data = ApiResponse::classify(body).into_data(true).unwrap();
    let status: TaskStatus = serde_json::from_value(data).unwrap();
    assert_eq!(status.state(), TaskState::Completed);
    assert_eq!(status.outputs, vec!["http://x/1.png"]);
}

#[test]
fn test_raw_body_passes_through() {
    let body = json!({"id": "task-1", "status": "created"});
    let data = ApiResponse::classify(body.clone()).into_data(true).unwrap();
    assert_eq!(data, body);
}

#[test]
fn test_envelope_auth_and_api_errors() {
    let auth = ApiResponse::classify(json!({"code": 401, "message": "bad key"}));
    assert!(matches!(
        auth.into_data(true),
        Err(WaveSpeedError::Unauthorized)
    ));

    let api = ApiResponse::classify(json!({"code": 400, "message": "prompt too long"}));
    match api.into_data(true) {
        Err(WaveSpeedError::Api(msg)) => assert_eq!(msg, "prompt too long"),
        other => panic!("unexpected: {other:?}"),
    }
}

// Synchronous-mode responses are trusted only when they actually carry
// outputs; a task-shaped body still goes through polling.
#[test]
fn test_sync_response_detection() {
    let finished: TaskStatus = serde_json::from_value(json!({
        "id": "t1",
        "status": "completed",
        "outputs": ["http://x/1.png"]
    }))
    .unwrap();
    assert!(!finished.outputs.is_empty());

    let pending: TaskStatus = serde_json::from_value(json!({
        "id": "t1",
        "status": "created"
    }))
    .unwrap();
    assert!(pending.outputs.is_empty());
    assert_eq!(pending.state(), TaskState::Pending);
    assert_eq!(pending.id, "t1");
}

// --- Descriptor contract ---

#[test]
fn test_descriptors_never_emit_empty_fields() {
    let descriptors: Vec<Box<dyn GenerationRequest>> = vec![
        Box::new(FluxDevLora::new("a cat")),
        Box::new(Wan25TextToImage::new("a cat")),
        Box::new(Wan25ImageToVideo::new("https://cdn/x.png", "pan left")),
        Box::new(Wan21TextToVideoLora::new("a cat")),
    ];

    for descriptor in &descriptors {
        let payload = descriptor.build_payload().unwrap();
        for (key, value) in &payload {
            assert!(!value.is_null(), "{}: {key} is null", descriptor.api_path());
            assert_ne!(
                value.as_str(),
                Some(""),
                "{}: {key} is an empty string",
                descriptor.api_path()
            );
            if let Some(obj) = value.as_object() {
                assert!(
                    !obj.is_empty(),
                    "{}: {key} is an empty object",
                    descriptor.api_path()
                );
            }
        }
    }
}

#[test]
fn test_descriptor_required_fields_are_present_in_payload() {
    let descriptors: Vec<Box<dyn GenerationRequest>> = vec![
        Box::new(FluxDevLora::new("a cat")),
        Box::new(Wan25TextToImage::new("a cat")),
        Box::new(Wan25ImageToVideo::new("https://cdn/x.png", "pan left")),
        Box::new(Wan21TextToVideoLora::new("a cat")),
    ];

    for descriptor in &descriptors {
        let payload = descriptor.build_payload().unwrap();
        for field in descriptor.required_fields() {
            assert!(
                payload.contains_key(*field),
                "{} missing required field {field}",
                descriptor.api_path()
            );
        }
        // Field order covers at least every required field.
        for field in descriptor.required_fields() {
            assert!(descriptor.field_order().contains(field));
        }
    }
}

#[test]
fn test_lora_descriptor_round_trip_shape() {
    let request = FluxDevLora::new("portrait photo")
        .lora(LoraWeight::new("https://cdn/style.safetensors", 0.7))
        .lora(LoraWeight::with_default_scale("flymy-ai/realism-lora"));
    let payload = request.build_payload().unwrap();

    let loras = payload["loras"].as_array().unwrap();
    assert_eq!(loras[0]["path"], json!("https://cdn/style.safetensors"));
    assert_eq!(loras[0]["scale"], json!(0.7));
    assert_eq!(loras[1]["scale"], json!(LORA_SCALE_DEFAULT));

    // Whole payload serializes to a JSON object.
    let serialized = serde_json::to_string(&payload).unwrap();
    let _: serde_json::Value = serde_json::from_str(&serialized).unwrap();
}

#[test]
fn test_lora_validation_blocks_transmission() {
    let request = FluxDevLora::new("x").lora(LoraWeight::new("not-a-valid-ref", 1.0));
    assert!(matches!(
        request.build_payload(),
        Err(WaveSpeedError::Validation(_))
    ));

    let request = FluxDevLora::new("x").lora(LoraWeight::new("ns/model", 4.1));
    assert!(matches!(
        request.build_payload(),
        Err(WaveSpeedError::Validation(_))
    ));
}

// --- Client construction ---

#[test]
fn test_client_base_url_override() {
    let client = WaveSpeedClient::new(Credential::new("key"))
        .with_base_url("http://127.0.0.1:4010/");
    assert_eq!(client.base_url(), "http://127.0.0.1:4010");
}

#[test]
fn test_file_kind_gate_is_pre_io() {
    // Unrecognized MIME types fail before any file or network access.
    assert!(matches!(
        FileKind::from_mime("application/octet-stream"),
        Err(WaveSpeedError::UnsupportedFileType(_))
    ));
    assert_eq!(FileKind::from_mime("video/webm").unwrap().upload_name(), "video.mp4");
}

#[tokio::test]
async fn test_upload_with_unknown_type_never_reads_file() {
    let client = WaveSpeedClient::new("key");
    // The path does not exist; the MIME gate must fire first.
    let err = client
        .upload_file_with_type("/nonexistent/blob.bin", "application/zip", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, WaveSpeedError::UnsupportedFileType(_)));
}

#[tokio::test]
async fn test_empty_task_id_short_circuits() {
    let client = WaveSpeedClient::new("key");
    assert!(matches!(
        client.check_task_status("").await.unwrap_err(),
        WaveSpeedError::InvalidTask
    ));
    assert!(matches!(
        client
            .wait_for_task("", std::time::Duration::from_secs(1), None)
            .await
            .unwrap_err(),
        WaveSpeedError::InvalidTask
    ));
}
