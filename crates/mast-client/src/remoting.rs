//! The transport boundary.
//!
//! Everything in this crate is synchronous and pure; the only
//! suspension points live behind [`Remoting`], which an actual
//! network/runtime client implements elsewhere. This crate only frames
//! payloads for it and decodes what comes back.

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use mast_types::ActorId;

/// Opaque key correlating a submitted call with its single reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(pub u64);

/// One inbound message as the transport observed it.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub source: ActorId,
    pub destination: ActorId,
    pub payload: Vec<u8>,
}

/// Transport/runtime client submitting payloads and exposing events.
///
/// `submit`/`reply` form the two-phase protocol of a state-mutating
/// call: exactly one reply arrives per queue id. `query` is a single
/// round trip against read-only state; the payload framing is identical
/// for both. The event stream is lazy and order-preserving; dropping it
/// cancels delivery, and a fresh subscription is independent of any
/// previously cancelled one (it does not resume).
#[async_trait]
pub trait Remoting: Send + Sync {
    /// Submit a state-mutating payload; the reply is awaited separately.
    async fn submit(&self, destination: ActorId, payload: Vec<u8>) -> Result<QueueId>;

    /// Await the single reply for a previously submitted call.
    async fn reply(&self, id: QueueId) -> Result<Vec<u8>>;

    /// Single round trip against read-only state.
    async fn query(&self, destination: ActorId, payload: Vec<u8>) -> Result<Vec<u8>>;

    /// Subscribe to the inbound message stream.
    async fn events(&self) -> Result<BoxStream<'static, EventRecord>>;
}
