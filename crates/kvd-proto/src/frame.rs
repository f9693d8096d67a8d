//! Length-prefixed frame codec.
//!
//! Header layout (8 bytes, little-endian):
//!
//! ```text
//! [0..4)  code     -- request opcode, or response status
//! [4..8)  length   -- L, payload length in bytes (L >= 0)
//! [8..8+L) payload
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::ProtocolError;

/// Size of the frame header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Encodes `v` as 4 little-endian bytes, two's complement.
pub fn encode_i32(v: i32) -> [u8; 4] {
    v.to_le_bytes()
}

/// Decodes 4 little-endian bytes, two's complement, into an `i32`.
///
/// `b` must contain at least 4 bytes; only the first 4 are read.
pub fn decode_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// A complete request or reply: a `code` (opcode or status) and a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub code: i32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Builds a header-only frame (zero-length payload).
    pub fn header_only(code: i32) -> Self {
        Frame {
            code,
            payload: Vec::new(),
        }
    }

    pub fn with_payload(code: i32, payload: Vec<u8>) -> Self {
        Frame { code, payload }
    }

    /// Reads one frame from `reader`.
    ///
    /// A negative length in the header is a protocol error, not an I/O
    /// error: the caller is expected to turn it into a `DATA_ERROR` reply
    /// and keep the connection open, per the command handling contract.
    pub async fn read<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self, ProtocolError> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).await?;
        let code = decode_i32(&header[0..4]);
        let len = decode_i32(&header[4..8]);
        if len < 0 {
            return Err(ProtocolError::DataError("negative payload length in header"));
        }
        let mut payload = vec![0u8; len as usize];
        if len > 0 {
            reader.read_exact(&mut payload).await?;
        }
        Ok(Frame { code, payload })
    }

    /// Writes this frame to `writer`, header followed by payload.
    pub async fn write<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<(), ProtocolError> {
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&encode_i32(self.code));
        header[4..8].copy_from_slice(&encode_i32(self.payload.len() as i32));
        writer.write_all(&header).await?;
        if !self.payload.is_empty() {
            writer.write_all(&self.payload).await?;
        }
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrips_i32_including_negatives() {
        for v in [0, 1, -1, i32::MIN, i32::MAX, 400, -400] {
            assert_eq!(decode_i32(&encode_i32(v)), v);
        }
    }

    #[tokio::test]
    async fn frame_roundtrips_through_a_buffer() {
        let frame = Frame::with_payload(6, b"k".to_vec());
        let mut buf = Vec::new();
        frame.write(&mut buf).await.unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 1);

        let mut cursor = Cursor::new(buf);
        let read_back = Frame::read(&mut cursor).await.unwrap();
        assert_eq!(read_back, frame);
    }

    #[tokio::test]
    async fn header_only_frame_has_zero_length_payload() {
        let frame = Frame::header_only(0);
        let mut buf = Vec::new();
        frame.write(&mut buf).await.unwrap();
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn negative_length_header_is_a_data_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&encode_i32(6));
        buf.extend_from_slice(&encode_i32(-1));
        let mut cursor = Cursor::new(buf);
        let err = Frame::read(&mut cursor).await.unwrap_err();
        assert!(matches!(err, ProtocolError::DataError(_)));
    }

    #[tokio::test]
    async fn truncated_payload_is_an_io_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&encode_i32(4));
        buf.extend_from_slice(&encode_i32(10));
        buf.extend_from_slice(b"short");
        let mut cursor = Cursor::new(buf);
        let err = Frame::read(&mut cursor).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
