use crate::{Error, Result};

const INITIAL_KEY: u8 = 171;
const PREFIX_LEN: usize = 4;

/// Frames `payload` with a big-endian length prefix and runs it through the
/// autokey cipher. The running key is the previous ciphertext byte.
pub fn encrypt(payload: &[u8]) -> Result<Vec<u8>> {
    let length = frame_length(payload.len())?;

    let mut result = Vec::with_capacity(PREFIX_LEN + payload.len());
    result.extend_from_slice(&length.to_be_bytes());

    let mut key = INITIAL_KEY;
    result.extend(payload.iter().map(|&byte| {
        key ^= byte;
        key
    }));

    Ok(result)
}

/// Reverses [`encrypt`]. Accepts the frame both with and without its length
/// prefix: the first four bytes are dropped only when they match the length
/// of the rest of the frame.
pub fn decrypt(response: &[u8]) -> Result<Vec<u8>> {
    if response.is_empty() {
        return Err(Error::Framing("empty frame"));
    }

    let mut key = INITIAL_KEY;
    let result = strip_prefix(response)
        .iter()
        .map(|&byte| {
            let plain = key ^ byte;
            key = byte;
            plain
        })
        .collect();

    Ok(result)
}

fn frame_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidArgument("payload does not fit the length prefix"))
}

fn strip_prefix(response: &[u8]) -> &[u8] {
    if response.len() < PREFIX_LEN {
        return response;
    }

    let (prefix, body) = response.split_at(PREFIX_LEN);

    let mut length = [0u8; PREFIX_LEN];
    length.copy_from_slice(prefix);

    if u32::from_be_bytes(length) as usize == body.len() {
        body
    } else {
        response
    }
}
