/*!
 * Syscall Context Wire Format
 * Fixed-width bincode frames exchanged over a process's context channel
 */

use crate::core::types::{OperationKind, ResumePoint};
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Binary frame as carried by the channel
pub type Frame = Vec<u8>;

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Context a process hands to the kernel before signalling a syscall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallContext {
    /// Program counter of the instruction that made the syscall
    pub resume_point: ResumePoint,
    pub operation: OperationKind,
}

impl SyscallContext {
    pub const fn new(resume_point: ResumePoint, operation: OperationKind) -> Self {
        Self {
            resume_point,
            operation,
        }
    }
}

// Fixed-width integers, no trailing bytes: a frame decodes only if it is
// exactly one value.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

#[inline]
pub fn encode<T: Serialize>(value: &T) -> Result<Frame, CodecError> {
    options()
        .serialize(value)
        .map_err(|e| CodecError::Serialization(e.to_string()))
}

#[inline]
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    options()
        .deserialize(bytes)
        .map_err(|e| CodecError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_frame_is_fixed_width() {
        let frame = encode(&SyscallContext::new(5, OperationKind::Read)).unwrap();
        // u32 resume point + u32 variant tag
        assert_eq!(frame.len(), 8);
        assert_eq!(&frame[..4], &5u32.to_le_bytes());
    }

    #[test]
    fn test_truncated_and_padded_frames_rejected() {
        let frame = encode(&SyscallContext::new(10, OperationKind::Write)).unwrap();
        assert!(decode::<SyscallContext>(&frame[..3]).is_err());

        let mut padded = frame.clone();
        padded.push(0);
        assert!(decode::<SyscallContext>(&padded).is_err());

        assert_eq!(
            decode::<SyscallContext>(&frame).unwrap(),
            SyscallContext::new(10, OperationKind::Write)
        );
    }

    #[test]
    fn test_unknown_operation_tag_rejected() {
        let mut frame = 7u32.to_le_bytes().to_vec();
        frame.extend_from_slice(&9u32.to_le_bytes());
        assert!(decode::<SyscallContext>(&frame).is_err());
    }
}
