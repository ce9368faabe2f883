//! Chunked transfer-encoding decoder.

use crate::base::neterror::NetError;
use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|idx| from + idx)
}

/// Decode a complete chunked body.
///
/// Each chunk is a hex length (extensions after `;` are ignored) terminated by
/// CRLF, that many content bytes, and a trailing CRLF. Decoding stops at the
/// zero-length chunk; trailers are ignored.
pub fn decode_chunked(input: &[u8]) -> Result<Bytes, NetError> {
    let mut out = BytesMut::with_capacity(input.len());
    let mut pos = 0;

    loop {
        let line_end = find_crlf(input, pos).ok_or(NetError::IncompleteChunkedEncoding)?;
        let size_line = std::str::from_utf8(&input[pos..line_end])
            .map_err(|_| NetError::InvalidChunkedEncoding)?;
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size =
            usize::from_str_radix(size_hex, 16).map_err(|_| NetError::InvalidChunkedEncoding)?;
        pos = line_end + CRLF.len();

        if size == 0 {
            break;
        }

        let end = pos
            .checked_add(size)
            .ok_or(NetError::InvalidChunkedEncoding)?;
        let chunk = input
            .get(pos..end)
            .ok_or(NetError::IncompleteChunkedEncoding)?;
        out.put_slice(chunk);
        pos = end;

        match input.get(pos..pos + CRLF.len()) {
            Some(terminator) if terminator == CRLF => pos += CRLF.len(),
            Some(_) => return Err(NetError::InvalidChunkedEncoding),
            None => return Err(NetError::IncompleteChunkedEncoding),
        }
    }

    Ok(out.freeze())
}
