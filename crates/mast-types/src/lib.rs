//! Wire-level types for the mast workspace.
//!
//! This crate is the leaf of the workspace: it has no knowledge of IDL
//! documents or type resolution and provides only the byte-exact pieces
//! every other crate builds on:
//! - [`interface_id`]: the opaque 8-byte interface identifier
//! - [`actor_id`]: 32-byte program/actor addresses (all-zero = broadcast)
//! - [`header`]: the versioned fixed-layout message header, its codec,
//!   and the interface/route disambiguation algorithm

pub mod actor_id;
pub mod header;
pub mod interface_id;

pub use actor_id::ActorId;
pub use header::{
    HeaderError, MatchedInterface, MessageHeader, RouteMatchError, HIGHEST_SUPPORTED_VERSION,
    MAGIC_BYTES, MINIMAL_HLEN,
};
pub use interface_id::InterfaceId;
