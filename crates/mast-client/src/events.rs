//! Event recognition and decoding.
//!
//! Programs emit events as messages addressed to the broadcast (zero)
//! actor id; the payload is `header ++ body` where the header's entry
//! id names the event variant and the body omits the variant index.
//! Messages that do not match are skipped silently, never errors.

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::trace;

use mast_types::{ActorId, InterfaceId, MessageHeader};

use crate::dispatch::ServiceDispatch;
use crate::error::CallError;
use crate::remoting::Remoting;

/// Recognizes one program's events for one exposed service instance.
#[derive(Debug, Clone, Copy)]
pub struct EventListener {
    program_id: ActorId,
    interface_id: InterfaceId,
    route_idx: u8,
    /// Number of declared events, when known: entry ids at or past it
    /// are skipped rather than surfaced.
    event_count: Option<u16>,
}

impl EventListener {
    pub fn new(program_id: ActorId, interface_id: InterfaceId, route_idx: u8) -> Self {
        Self {
            program_id,
            interface_id,
            route_idx,
            event_count: None,
        }
    }

    pub fn for_dispatch(program_id: ActorId, dispatch: &ServiceDispatch) -> Self {
        Self {
            program_id,
            interface_id: dispatch.interface_id,
            route_idx: dispatch.route_idx,
            event_count: Some(dispatch.events.len() as u16),
        }
    }

    /// Match one inbound message: the destination must be broadcast,
    /// the source must be the program, and the header must carry this
    /// listener's interface at its route. Returns the event's entry id
    /// and body, or `None` to skip.
    pub fn match_event<'a>(
        &self,
        source: ActorId,
        destination: ActorId,
        payload: &'a [u8],
    ) -> Option<(u16, &'a [u8])> {
        if !destination.is_zero() || source != self.program_id {
            return None;
        }
        let (header, body_start) = MessageHeader::read_at(payload, 0).ok()?;
        if header.interface_id != self.interface_id || header.route_idx != self.route_idx {
            return None;
        }
        if matches!(self.event_count, Some(count) if header.entry_id >= count) {
            return None;
        }
        trace!(%header, "matched event");
        Some((header.entry_id, &payload[body_start..]))
    }

    /// Decode a matched event body as a variant of `E`.
    ///
    /// The body omits the variant index (the header's entry id carries
    /// it), so the standard enum encoding is rebuilt by prepending the
    /// entry id as ULEB128.
    pub fn decode_event<E: DeserializeOwned>(
        &self,
        entry_id: u16,
        body: &[u8],
    ) -> Result<E, CallError> {
        Ok(bcs::from_bytes(&enum_encoding(entry_id, body))?)
    }

    /// Filter the transport's message stream down to this listener's
    /// events, as `(entry id, body)` pairs.
    ///
    /// Dropping the returned stream cancels delivery; subscribing again
    /// starts a fresh, independent stream.
    pub async fn subscribe<R: Remoting>(
        &self,
        remoting: &R,
    ) -> anyhow::Result<BoxStream<'static, (u16, Vec<u8>)>> {
        let listener = *self;
        let stream = remoting.events().await?;
        Ok(stream
            .filter_map(move |record| {
                let matched = listener
                    .match_event(record.source, record.destination, &record.payload)
                    .map(|(entry_id, body)| (entry_id, body.to_vec()));
                futures::future::ready(matched)
            })
            .boxed())
    }
}

/// The standard enum encoding of a variant body: ULEB128 variant index,
/// then the body bytes unchanged.
fn enum_encoding(entry_id: u16, body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + 3);
    write_uleb128(u32::from(entry_id), &mut bytes);
    bytes.extend_from_slice(body);
    bytes
}

fn write_uleb128(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    enum CounterEvent {
        Added(u32),
        Cleared,
    }

    fn program_id() -> ActorId {
        ActorId::from_bytes([7u8; 32])
    }

    fn listener() -> EventListener {
        EventListener::new(program_id(), InterfaceId::from(0xaa), 0)
    }

    fn event_payload(entry_id: u16, body: &[u8]) -> Vec<u8> {
        let mut payload = MessageHeader::v1(InterfaceId::from(0xaa), entry_id, 0).to_bytes();
        payload.extend_from_slice(body);
        payload
    }

    #[test]
    fn test_match_and_decode() {
        let listener = listener();
        let payload = event_payload(0, &5u32.to_le_bytes());
        let (entry_id, body) = listener
            .match_event(program_id(), ActorId::zero(), &payload)
            .unwrap();
        assert_eq!(entry_id, 0);
        assert_eq!(
            listener.decode_event::<CounterEvent>(entry_id, body).unwrap(),
            CounterEvent::Added(5)
        );

        let payload = event_payload(1, &[]);
        let (entry_id, body) = listener
            .match_event(program_id(), ActorId::zero(), &payload)
            .unwrap();
        assert_eq!(
            listener.decode_event::<CounterEvent>(entry_id, body).unwrap(),
            CounterEvent::Cleared
        );
    }

    #[test]
    fn test_non_matches_are_silently_skipped() {
        let listener = listener();
        let payload = event_payload(0, &5u32.to_le_bytes());

        // Addressed to a specific actor, not broadcast.
        assert!(listener
            .match_event(program_id(), ActorId::from_bytes([1u8; 32]), &payload)
            .is_none());
        // Wrong source program.
        assert!(listener
            .match_event(ActorId::from_bytes([9u8; 32]), ActorId::zero(), &payload)
            .is_none());
        // Wrong interface id.
        let mut other = MessageHeader::v1(InterfaceId::from(0xbb), 0, 0).to_bytes();
        other.extend_from_slice(&5u32.to_le_bytes());
        assert!(listener
            .match_event(program_id(), ActorId::zero(), &other)
            .is_none());
        // Wrong route.
        let mut other_route = MessageHeader::v1(InterfaceId::from(0xaa), 0, 3).to_bytes();
        other_route.extend_from_slice(&5u32.to_le_bytes());
        assert!(listener
            .match_event(program_id(), ActorId::zero(), &other_route)
            .is_none());
        // Garbage payload.
        assert!(listener
            .match_event(program_id(), ActorId::zero(), &[1, 2, 3])
            .is_none());
    }

    #[test]
    fn test_dispatch_bound_listener_skips_undeclared_entries() {
        let doc = mast_idl::parse(
            r#"
            #[interface_id = 0x00000000000000aa]
            service Counter {
                Add : (value: u32) -> u32;
                events {
                    Added: u32,
                    Cleared,
                };
            };
            "#,
        )
        .unwrap();
        let dispatch = ServiceDispatch::build(&doc, "Counter", 0).unwrap();
        let listener = EventListener::for_dispatch(program_id(), &dispatch);

        let declared = event_payload(1, &[]);
        assert!(listener
            .match_event(program_id(), ActorId::zero(), &declared)
            .is_some());

        let undeclared = event_payload(2, &[]);
        assert!(listener
            .match_event(program_id(), ActorId::zero(), &undeclared)
            .is_none());
    }

    #[tokio::test]
    async fn test_subscribe_filters_stream() {
        use crate::remoting::{EventRecord, QueueId};
        use async_trait::async_trait;

        struct Canned(Vec<EventRecord>);

        #[async_trait]
        impl Remoting for Canned {
            async fn submit(&self, _: ActorId, _: Vec<u8>) -> anyhow::Result<QueueId> {
                unimplemented!()
            }
            async fn reply(&self, _: QueueId) -> anyhow::Result<Vec<u8>> {
                unimplemented!()
            }
            async fn query(&self, _: ActorId, _: Vec<u8>) -> anyhow::Result<Vec<u8>> {
                unimplemented!()
            }
            async fn events(&self) -> anyhow::Result<BoxStream<'static, EventRecord>> {
                Ok(futures::stream::iter(self.0.clone()).boxed())
            }
        }

        let matching = EventRecord {
            source: program_id(),
            destination: ActorId::zero(),
            payload: event_payload(1, &[]),
        };
        let foreign = EventRecord {
            source: ActorId::from_bytes([9u8; 32]),
            destination: ActorId::zero(),
            payload: event_payload(0, &5u32.to_le_bytes()),
        };
        let remoting = Canned(vec![foreign, matching]);

        let stream = listener().subscribe(&remoting).await.unwrap();
        let received: Vec<_> = stream.collect().await;
        assert_eq!(received, vec![(1, Vec::new())]);
    }

    #[test]
    fn test_uleb128_multi_byte() {
        let mut out = Vec::new();
        write_uleb128(200, &mut out);
        assert_eq!(out, vec![0xc8, 0x01]);

        let mut out = Vec::new();
        write_uleb128(5, &mut out);
        assert_eq!(out, vec![5]);
    }

    #[test]
    fn test_decode_rebuilds_multi_byte_variant_index() {
        // Variant indices at or past 128 take two ULEB128 bytes; the
        // decoder must hand the codec exactly that prefix plus the body.
        assert_eq!(
            enum_encoding(200, &7u32.to_le_bytes()),
            vec![0xc8, 0x01, 7, 0, 0, 0]
        );
        assert_eq!(enum_encoding(1, &[]), vec![1]);

        // And a decode through the same path yields the variant.
        let listener = listener();
        assert_eq!(
            listener.decode_event::<CounterEvent>(0, &5u32.to_le_bytes()).unwrap(),
            CounterEvent::Added(5)
        );
    }
}
