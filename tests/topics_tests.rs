use doorbell_remote::topics::{subject_to_topic, topic_to_subject, Direction, PayloadKind, Topic};

#[test]
fn test_topic_names_are_bit_exact() {
    let expected = [
        (Topic::CameraControl, "ring/remote_app_control/camera"),
        (Topic::CameraStatus, "ring/local_dev_control/camera"),
        (Topic::MicrophoneControl, "ring/remote_app_control/microphone"),
        (Topic::TalkAudio, "ring/remote_app_audio_data"),
        (Topic::AiRequest, "ring/gptrequest"),
        (Topic::AiResponse, "ring/gptresponse"),
        (Topic::ListenAudio, "ring/audioresponse"),
        (Topic::VolumeControl, "ring/remote_app_control/volume"),
    ];

    for (topic, name) in expected {
        assert_eq!(topic.name(), name);
        assert_eq!(Topic::from_name(name), Some(topic));
    }
    assert_eq!(Topic::from_name("ring/unknown"), None);
}

#[test]
fn test_inbound_set_matches_directions() {
    let inbound: Vec<Topic> = Topic::ALL
        .into_iter()
        .filter(|t| t.direction() == Direction::Inbound)
        .collect();

    assert_eq!(inbound.len(), 3);
    for topic in Topic::INBOUND {
        assert!(inbound.contains(&topic));
    }
}

#[test]
fn test_payload_kinds() {
    assert_eq!(Topic::TalkAudio.payload_kind(), PayloadKind::BinaryAudio);
    assert_eq!(Topic::ListenAudio.payload_kind(), PayloadKind::BinaryAudio);
    assert_eq!(Topic::AiResponse.payload_kind(), PayloadKind::TextStatus);
    assert_eq!(Topic::CameraStatus.payload_kind(), PayloadKind::TextStatus);
    assert_eq!(Topic::VolumeControl.payload_kind(), PayloadKind::TextCommand);
    assert_eq!(Topic::AiRequest.payload_kind(), PayloadKind::TextCommand);
}

#[test]
fn test_subject_mapping() {
    assert_eq!(Topic::CameraControl.subject(), "ring.remote_app_control.camera");
    assert_eq!(topic_to_subject("ring/gptrequest"), "ring.gptrequest");
    assert_eq!(
        subject_to_topic("ring.local_dev_control.camera"),
        "ring/local_dev_control/camera"
    );
}
