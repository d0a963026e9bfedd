// Tag-length-payload framing for the room binary channel
//
// Every frame on the wire is laid out as:
//
//   [tag_len: u8][tag: tag_len bytes, ASCII][payload: remaining bytes, UTF-8 JSON]
//
// The tag says which logical channel the payload belongs to, so control,
// subtitle, state and tool-call traffic can share one binary transport.

use thiserror::Error;

/// Outbound agent command
pub const TAG_CONTROL: &str = "ctrl";
/// Inbound subtitle fragments
pub const TAG_SUBTITLE: &str = "subv";
/// Inbound agent state brief
pub const TAG_BRIEF: &str = "conv";
/// Tool-call request (inbound) and response (outbound)
pub const TAG_FUNCTION_CALL: &str = "func";

/// Largest tag the single length byte can describe
pub const MAX_TAG_LEN: usize = u8::MAX as usize;

/// Practical ceiling for one room binary message (64 KiB)
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024;

/// Errors produced while framing or unframing a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlvError {
    #[error("frame tag is empty")]
    EmptyTag,

    #[error("frame tag is {0} bytes, at most {MAX_TAG_LEN} allowed")]
    TagTooLong(usize),

    #[error("frame tag is not ASCII")]
    NonAsciiTag,

    #[error("payload is {0} bytes, at most {MAX_PAYLOAD_LEN} allowed")]
    PayloadTooLarge(usize),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("frame is empty")]
    Empty,

    #[error("frame truncated: tag declares {declared} bytes but only {available} follow")]
    Truncated { declared: usize, available: usize },
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvFrame {
    pub tag: String,
    pub payload: String,
}

fn check_tag(tag: &str) -> Result<(), TlvError> {
    if tag.is_empty() {
        return Err(TlvError::EmptyTag);
    }
    if !tag.is_ascii() {
        return Err(TlvError::NonAsciiTag);
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(TlvError::TagTooLong(tag.len()));
    }
    Ok(())
}

/// Frame a UTF-8 payload under `tag`
pub fn encode(tag: &str, payload: &str) -> Result<Vec<u8>, TlvError> {
    check_tag(tag)?;

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(TlvError::PayloadTooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(1 + tag.len() + payload.len());
    frame.push(tag.len() as u8);
    frame.extend_from_slice(tag.as_bytes());
    frame.extend_from_slice(payload.as_bytes());

    Ok(frame)
}

/// Frame raw payload bytes, rejecting anything that is not UTF-8
pub fn encode_bytes(tag: &str, payload: &[u8]) -> Result<Vec<u8>, TlvError> {
    let text = std::str::from_utf8(payload).map_err(|_| TlvError::InvalidUtf8)?;
    encode(tag, text)
}

/// Split a frame back into tag and payload
///
/// Pure: the same bytes always produce the same result.
pub fn decode(bytes: &[u8]) -> Result<TlvFrame, TlvError> {
    let (&tag_len, rest) = bytes.split_first().ok_or(TlvError::Empty)?;
    let tag_len = tag_len as usize;

    if tag_len == 0 {
        return Err(TlvError::EmptyTag);
    }
    if rest.len() < tag_len {
        return Err(TlvError::Truncated {
            declared: tag_len,
            available: rest.len(),
        });
    }

    let (tag, payload) = rest.split_at(tag_len);

    if !tag.is_ascii() {
        return Err(TlvError::NonAsciiTag);
    }
    let payload = std::str::from_utf8(payload).map_err(|_| TlvError::InvalidUtf8)?;

    Ok(TlvFrame {
        // ASCII was checked above, so this cannot lose data
        tag: String::from_utf8_lossy(tag).into_owned(),
        payload: payload.to_string(),
    })
}
