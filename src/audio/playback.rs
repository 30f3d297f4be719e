use crate::error::ClientError;
use base64::Engine;
use serde::Serialize;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A playable audio resource built from an inbound audio message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackClip {
    pub mime: String,
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl PlaybackClip {
    /// Probe the payload and wrap it as a clip.
    ///
    /// Payloads no demuxer recognizes are rejected as malformed.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ClientError> {
        if payload.is_empty() {
            return Err(malformed("empty audio payload"));
        }

        let (mime, extension) = sniff_container(payload);

        let cursor = std::io::Cursor::new(payload.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| malformed(&format!("audio probe failed: {}", e)))?;

        if probed.format.default_track().is_none() {
            return Err(malformed("no audio track"));
        }

        Ok(Self {
            mime: mime.to_string(),
            size_bytes: payload.len(),
            bytes: payload.to_vec(),
        })
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

fn sniff_container(payload: &[u8]) -> (&'static str, Option<&'static str>) {
    if payload.len() >= 12 && &payload[0..4] == b"RIFF" && &payload[8..12] == b"WAVE" {
        ("audio/wav", Some("wav"))
    } else if payload.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        ("audio/webm", Some("webm"))
    } else if payload.starts_with(b"OggS") {
        ("audio/ogg", Some("ogg"))
    } else if payload.starts_with(b"fLaC") {
        ("audio/flac", Some("flac"))
    } else if payload.starts_with(b"ID3") || payload.starts_with(&[0xFF, 0xFB]) {
        ("audio/mpeg", Some("mp3"))
    } else {
        ("application/octet-stream", None)
    }
}

fn malformed(reason: &str) -> ClientError {
    ClientError::MalformedPayload {
        topic: crate::topics::Topic::ListenAudio.name().to_string(),
        reason: reason.to_string(),
    }
}
