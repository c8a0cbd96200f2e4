//! Frame codec: `[4 bytes big-endian length][bincode payload]`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, ProtocolResult};

/// Largest accepted payload. Media segments are the biggest values carried.
pub const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

const HEADER_LEN: usize = 4;

/// Encode a message with its length prefix.
pub fn encode<T: Serialize>(msg: &T) -> ProtocolResult<Vec<u8>> {
    let len = bincode::serialized_size(msg)
        .map_err(|e| ProtocolError::Serialization(e.to_string()))? as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: len, max: MAX_FRAME_SIZE });
    }
    let mut buf = Vec::with_capacity(HEADER_LEN + len);
    buf.extend_from_slice(&(len as u32).to_be_bytes());
    bincode::serialize_into(&mut buf, msg)
        .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode one framed message. Returns (message, bytes_consumed).
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<(T, usize)> {
    if data.len() < HEADER_LEN {
        return Err(ProtocolError::Framing("too short".into()));
    }
    let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: len, max: MAX_FRAME_SIZE });
    }
    let total = HEADER_LEN + len;
    if data.len() < total {
        return Err(ProtocolError::Framing(format!(
            "incomplete: have {}, need {}",
            data.len(),
            total
        )));
    }
    let msg = bincode::deserialize(&data[HEADER_LEN..total])
        .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    Ok((msg, total))
}

/// Write one framed message and flush.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let buf = encode(msg)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between frames.
/// A close inside a header is a framing error.
pub async fn read_frame<R, T>(reader: &mut R) -> ProtocolResult<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut header[filled..]).await? {
            0 if filled == 0 => return Ok(None),
            0 => {
                return Err(ProtocolError::Framing(format!(
                    "stream closed after {filled} of {HEADER_LEN} header bytes"
                )))
            }
            n => filled += n,
        }
    }
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: len, max: MAX_FRAME_SIZE });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    let msg = bincode::deserialize(&payload)
        .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    Ok(Some(msg))
}
