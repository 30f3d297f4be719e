use doorbell_remote::router::{route, AiResponse, Inbound, LEGACY_WAITING_TEXT};
use doorbell_remote::Toggle;

#[test]
fn test_routes_camera_status() {
    assert_eq!(
        route("ring/local_dev_control/camera", b"on"),
        Some(Inbound::CameraStatus(Toggle::On))
    );
    assert_eq!(
        route("ring/local_dev_control/camera", b"off\n"),
        Some(Inbound::CameraStatus(Toggle::Off))
    );
}

#[test]
fn test_routes_audio_untouched() {
    let payload = vec![0u8, 159, 146, 150];
    assert_eq!(
        route("ring/audioresponse", &payload),
        Some(Inbound::AudioResponse(payload.clone()))
    );
}

#[test]
fn test_unknown_and_outbound_topics_are_dropped() {
    assert_eq!(route("ring/doorbell/pressed", b"1"), None);
    // Our own command topics are never handled inbound
    assert_eq!(route("ring/remote_app_control/camera", b"on"), None);
    // Exact match only
    assert_eq!(route("ring/gptresponse/", b"hi"), None);
    assert_eq!(route("RING/GPTRESPONSE", b"hi"), None);
}

#[test]
fn test_malformed_payloads_are_dropped() {
    assert_eq!(route("ring/local_dev_control/camera", b"ON?"), None);
    assert_eq!(route("ring/gptresponse", &[0xc3, 0x28]), None);
}

#[test]
fn test_legacy_ai_text() {
    assert_eq!(AiResponse::parse(LEGACY_WAITING_TEXT), AiResponse::Waiting);
    assert_eq!(
        AiResponse::parse("❌ GPT error: HTTPError 500"),
        AiResponse::Error("❌ GPT error: HTTPError 500".to_string())
    );
    assert_eq!(
        AiResponse::parse("A courier holding a parcel."),
        AiResponse::Answer("A courier holding a parcel.".to_string())
    );
    // Near-misses of the marker are answers, not waits
    assert_eq!(
        AiResponse::parse("waiting for the AI to Answer"),
        AiResponse::Answer("waiting for the AI to Answer".to_string())
    );
}

#[test]
fn test_tagged_ai_json() {
    assert_eq!(AiResponse::parse(r#"{"status":"waiting"}"#), AiResponse::Waiting);
    assert_eq!(
        AiResponse::parse(r#"{"status":"answer","text":"Nobody is there."}"#),
        AiResponse::Answer("Nobody is there.".to_string())
    );
    assert_eq!(
        AiResponse::parse(r#"{"status":"error","text":"quota"}"#),
        AiResponse::Error("quota".to_string())
    );
    // Unknown status falls back to plain text
    let raw = r#"{"status":"thinking"}"#;
    assert_eq!(AiResponse::parse(raw), AiResponse::Answer(raw.to_string()));
}

#[test]
fn test_waiting_display_text() {
    assert_eq!(AiResponse::Waiting.display_text(), LEGACY_WAITING_TEXT);
    assert_eq!(AiResponse::Answer("hi".to_string()).display_text(), "hi");
}
