//! String-routed framing for programs predating interface-id headers.
//!
//! The legacy layout prefixes the body with the codec-encoded service
//! name followed by the codec-encoded function name (length-prefixed
//! strings, no fixed header). Replies echo the same prefix before the
//! result body.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CallError;

/// `encode(service) ++ encode(func) ++ encode(args)`.
pub fn encode_call<T: Serialize>(
    service: &str,
    func: &str,
    args: &T,
) -> Result<Vec<u8>, CallError> {
    let mut payload = bcs::to_bytes(service)?;
    payload.extend(bcs::to_bytes(func)?);
    payload.extend(bcs::to_bytes(args)?);
    Ok(payload)
}

/// Verify the echoed `service`/`func` prefix, then decode the body.
pub fn decode_reply<T: DeserializeOwned>(
    service: &str,
    func: &str,
    payload: &[u8],
) -> Result<T, CallError> {
    let mut prefix = bcs::to_bytes(service)?;
    prefix.extend(bcs::to_bytes(func)?);
    if payload.len() < prefix.len() || payload[..prefix.len()] != prefix[..] {
        return Err(CallError::ReplyPrefixMismatch {
            expected: format!("{service}/{func}"),
        });
    }
    Ok(bcs::from_bytes(&payload[prefix.len()..])?)
}
