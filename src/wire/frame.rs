// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Frame encoding and decoding.
//!
//! A frame is a fixed-size header followed by a variable-size payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use crc32fast::Hasher;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{WireError, WireResult};
use crate::storage::MAX_VALUE_SIZE;

/// Protocol magic bytes: "SST1" in big-endian.
pub const MAGIC: u32 = 0x5353_5431;

/// Current protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Frame header size in bytes (magic + version + length + checksum).
pub const FRAME_HEADER_SIZE: usize = 14;

/// Maximum payload size: the largest storable value plus 1 MiB for the
/// key and message envelope.
pub const MAX_PAYLOAD_SIZE: u32 = (MAX_VALUE_SIZE + 1024 * 1024) as u32;

/// Frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u16,
    /// Payload length in bytes.
    pub length: u32,
    /// CRC32 of the payload.
    pub checksum: u32,
}

impl FrameHeader {
    /// Creates a header describing `payload`.
    pub fn new(payload: &[u8]) -> Self {
        Self {
            magic: MAGIC,
            version: PROTOCOL_VERSION,
            length: payload.len() as u32,
            checksum: compute_checksum(payload),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.magic);
        buf.put_u16(self.version);
        buf.put_u32(self.length);
        buf.put_u32(self.checksum);
    }

    /// Decodes a header, or `None` if fewer than [`FRAME_HEADER_SIZE`] bytes remain.
    pub fn decode(buf: &mut impl Buf) -> Option<Self> {
        if buf.remaining() < FRAME_HEADER_SIZE {
            return None;
        }

        Some(Self {
            magic: buf.get_u32(),
            version: buf.get_u16(),
            length: buf.get_u32(),
            checksum: buf.get_u32(),
        })
    }

    pub fn validate(&self) -> WireResult<()> {
        if self.magic != MAGIC {
            return Err(WireError::InvalidMagic(self.magic));
        }
        if self.version != PROTOCOL_VERSION {
            return Err(WireError::UnsupportedVersion(self.version));
        }
        if self.length > MAX_PAYLOAD_SIZE {
            return Err(WireError::PayloadTooLarge {
                size: self.length,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }
}

/// A complete frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(payload: Bytes) -> Self {
        let header = FrameHeader::new(&payload);
        Self { header, payload }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        self.header.encode(buf);
        buf.put_slice(&self.payload);
    }

    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Attempts to decode a frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Consumed bytes are
    /// removed from `buf` only when a whole frame was decoded.
    pub fn decode(buf: &mut BytesMut) -> WireResult<Option<Self>> {
        let header = {
            let mut peek = buf.as_ref();
            match FrameHeader::decode(&mut peek) {
                Some(header) => header,
                None => return Ok(None),
            }
        };
        header.validate()?;

        let total_size = FRAME_HEADER_SIZE + header.length as usize;
        if buf.len() < total_size {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(header.length as usize).freeze();

        let actual = compute_checksum(&payload);
        if actual != header.checksum {
            return Err(WireError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok(Some(Self { header, payload }))
    }
}

/// Reads one frame, buffering partial reads in `buf`.
///
/// Returns `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R>(reader: &mut R, buf: &mut BytesMut) -> WireResult<Option<Frame>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    loop {
        if let Some(frame) = Frame::decode(buf)? {
            return Ok(Some(frame));
        }

        let n = reader.read_buf(buf).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(WireError::TruncatedFrame {
                buffered: buf.len(),
            });
        }
    }
}

/// Writes one frame and flushes.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> WireResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&frame.encode_to_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
