mod encryption;
pub use encryption::{decrypt, encrypt};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Command, DecodeError, Response, Result};

pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(command)?;
    encrypt(&payload)
}

pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    decode(bytes)
}

pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(response)?;
    encrypt(&payload)
}

pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let value: Value = decode(bytes)?;

    if !value.is_object() {
        return Err(DecodeError::NotAnObject.into());
    }

    Ok(Response::new(value))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let plain = decrypt(bytes)?;
    let text = std::str::from_utf8(&plain).map_err(DecodeError::Utf8)?;
    let value = serde_json::from_str(text).map_err(DecodeError::Json)?;
    Ok(value)
}
