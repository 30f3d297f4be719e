//! Topic registry
//!
//! Fixed catalog of every topic the client publishes to or subscribes on.
//! The topic → payload-kind mapping is static and never renegotiated.

use serde::Serialize;

/// Whether the client publishes to or subscribes on a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Shape of the payload carried on a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// UTF-8 command string ("on"/"off", "up"/"down", AI query text)
    TextCommand,
    /// UTF-8 status or response text from the device
    TextStatus,
    /// Raw encoded audio bytes
    BinaryAudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    CameraControl,
    CameraStatus,
    MicrophoneControl,
    TalkAudio,
    AiRequest,
    AiResponse,
    ListenAudio,
    VolumeControl,
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::CameraControl,
        Topic::CameraStatus,
        Topic::MicrophoneControl,
        Topic::TalkAudio,
        Topic::AiRequest,
        Topic::AiResponse,
        Topic::ListenAudio,
        Topic::VolumeControl,
    ];

    /// Topics subscribed on every successful connect
    pub const INBOUND: [Topic; 3] = [Topic::AiResponse, Topic::CameraStatus, Topic::ListenAudio];

    /// Bit-exact topic name on the wire
    pub fn name(self) -> &'static str {
        match self {
            Topic::CameraControl => "ring/remote_app_control/camera",
            Topic::CameraStatus => "ring/local_dev_control/camera",
            Topic::MicrophoneControl => "ring/remote_app_control/microphone",
            Topic::TalkAudio => "ring/remote_app_audio_data",
            Topic::AiRequest => "ring/gptrequest",
            Topic::AiResponse => "ring/gptresponse",
            Topic::ListenAudio => "ring/audioresponse",
            Topic::VolumeControl => "ring/remote_app_control/volume",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Topic::CameraStatus | Topic::AiResponse | Topic::ListenAudio => Direction::Inbound,
            _ => Direction::Outbound,
        }
    }

    pub fn payload_kind(self) -> PayloadKind {
        match self {
            Topic::TalkAudio | Topic::ListenAudio => PayloadKind::BinaryAudio,
            Topic::CameraStatus | Topic::AiResponse => PayloadKind::TextStatus,
            _ => PayloadKind::TextCommand,
        }
    }

    /// Exact-match lookup; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Broker subject for this topic.
    ///
    /// The NATS server's MQTT bridge exposes MQTT topic `a/b` as subject `a.b`.
    pub fn subject(self) -> String {
        topic_to_subject(self.name())
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn topic_to_subject(topic: &str) -> String {
    topic.replace('/', ".")
}

pub fn subject_to_topic(subject: &str) -> String {
    subject.replace('.', "/")
}
