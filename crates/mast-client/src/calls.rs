//! Typed call surface for generated clients.
//!
//! A generated client carries one [`CallSpec`] per function; the
//! framing helpers here produce and consume the uniform wire layout
//! `[header(hlen bytes)][codec-encoded body]`.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use mast_types::{ActorId, InterfaceId, MessageHeader};

use crate::error::CallError;
use crate::remoting::Remoting;

/// Compile-time description of one callable function.
pub trait CallSpec {
    /// Declaration-order ordinal within the interface.
    const ENTRY_ID: u16;
    /// The owning service's interface id.
    const INTERFACE_ID: InterfaceId;
    type Args: Serialize + Send + Sync;
    type Reply: DeserializeOwned;
}

/// `header ++ body`. No arguments encode to a header-only payload.
pub fn encode_call<C: CallSpec>(args: &C::Args, route_idx: u8) -> Result<Vec<u8>, CallError> {
    let header = MessageHeader::v1(C::INTERFACE_ID, C::ENTRY_ID, route_idx);
    let mut payload = header.to_bytes();
    payload.extend(bcs::to_bytes(args)?);
    trace!(%header, len = payload.len(), "encoded call");
    Ok(payload)
}

/// Strip and validate the reply header, then decode the body.
///
/// The reply must echo the call's interface id, entry id and route.
pub fn decode_reply<C: CallSpec>(route_idx: u8, payload: &[u8]) -> Result<C::Reply, CallError> {
    let (header, body_start) = MessageHeader::read_at(payload, 0)?;
    if header.interface_id != C::INTERFACE_ID {
        return Err(CallError::InterfaceMismatch {
            expected: C::INTERFACE_ID,
            got: header.interface_id,
        });
    }
    if header.entry_id != C::ENTRY_ID {
        return Err(CallError::EntryMismatch {
            expected: C::ENTRY_ID,
            got: header.entry_id,
        });
    }
    if header.route_idx != route_idx {
        return Err(CallError::RouteMismatch {
            expected: route_idx,
            got: header.route_idx,
        });
    }
    Ok(bcs::from_bytes(&payload[body_start..])?)
}

/// State-mutating call: submit, then await the reply by queue id.
pub async fn call<C, R>(
    remoting: &R,
    destination: ActorId,
    args: &C::Args,
    route_idx: u8,
) -> anyhow::Result<C::Reply>
where
    C: CallSpec,
    R: Remoting,
{
    let payload = encode_call::<C>(args, route_idx)?;
    let id = remoting
        .submit(destination, payload)
        .await
        .context("submitting call")?;
    let reply = remoting.reply(id).await.context("awaiting reply")?;
    Ok(decode_reply::<C>(route_idx, &reply)?)
}

/// Read-only query: identical framing, single round trip.
pub async fn query<C, R>(
    remoting: &R,
    destination: ActorId,
    args: &C::Args,
    route_idx: u8,
) -> anyhow::Result<C::Reply>
where
    C: CallSpec,
    R: Remoting,
{
    let payload = encode_call::<C>(args, route_idx)?;
    let reply = remoting
        .query(destination, payload)
        .await
        .context("querying")?;
    Ok(decode_reply::<C>(route_idx, &reply)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Add;

    impl CallSpec for Add {
        const ENTRY_ID: u16 = 0;
        const INTERFACE_ID: InterfaceId =
            InterfaceId::from_bytes([0x57, 0x9d, 0x6d, 0xab, 0xa4, 0x1b, 0x7d, 0x82]);
        type Args = (u32,);
        type Reply = u32;
    }

    #[test]
    fn test_encode_add_reference_vector() {
        let payload = encode_call::<Add>(&(5,), 1).unwrap();
        assert_eq!(
            payload,
            vec![
                0x47, 0x4d, 1, 16, 0x57, 0x9d, 0x6d, 0xab, 0xa4, 0x1b, 0x7d, 0x82, 0, 0, 1, 0, //
                5, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_no_args_is_header_only() {
        struct Clear;
        impl CallSpec for Clear {
            const ENTRY_ID: u16 = 2;
            const INTERFACE_ID: InterfaceId = Add::INTERFACE_ID;
            type Args = ();
            type Reply = ();
        }
        let payload = encode_call::<Clear>(&(), 0).unwrap();
        assert_eq!(payload.len(), 16);
    }

    #[test]
    fn test_reply_roundtrip() {
        let mut reply = MessageHeader::v1(Add::INTERFACE_ID, 0, 1).to_bytes();
        reply.extend_from_slice(&42u32.to_le_bytes());
        assert_eq!(decode_reply::<Add>(1, &reply).unwrap(), 42);
    }

    #[test]
    fn test_reply_mismatches_rejected() {
        let body = 42u32.to_le_bytes();

        let mut wrong_interface = MessageHeader::v1(InterfaceId::from(9), 0, 1).to_bytes();
        wrong_interface.extend_from_slice(&body);
        assert!(matches!(
            decode_reply::<Add>(1, &wrong_interface),
            Err(CallError::InterfaceMismatch { .. })
        ));

        let mut wrong_entry = MessageHeader::v1(Add::INTERFACE_ID, 3, 1).to_bytes();
        wrong_entry.extend_from_slice(&body);
        assert!(matches!(
            decode_reply::<Add>(1, &wrong_entry),
            Err(CallError::EntryMismatch { expected: 0, got: 3 })
        ));

        let mut wrong_route = MessageHeader::v1(Add::INTERFACE_ID, 0, 2).to_bytes();
        wrong_route.extend_from_slice(&body);
        assert!(matches!(
            decode_reply::<Add>(1, &wrong_route),
            Err(CallError::RouteMismatch { expected: 1, got: 2 })
        ));

        assert!(matches!(
            decode_reply::<Add>(1, &[0u8; 4]),
            Err(CallError::Header(_))
        ));
    }
}
