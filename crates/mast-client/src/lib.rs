//! Client-side call construction and reply decoding.
//!
//! - `calls`: typed [`CallSpec`] framing for generated clients
//! - `dispatch`: name-driven dispatch built from a parsed document
//! - `events`: broadcast event recognition and decoding
//! - `legacy`: string-routed framing for pre-header programs
//! - `remoting`: the async transport boundary
//!
//! Everything outside [`Remoting`] is synchronous byte assembly; the
//! transport is the only seam a runtime client has to implement.

pub mod calls;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod legacy;
pub mod remoting;

pub use calls::{call, decode_reply, encode_call, query, CallSpec};
pub use dispatch::{
    route_inbound, CtorDispatch, EventDispatch, FuncDispatch, ProgramDispatch, ServiceDispatch,
};
pub use error::CallError;
pub use events::EventListener;
pub use remoting::{EventRecord, QueueId, Remoting};
