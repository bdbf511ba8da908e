//! Errors raised while constructing dispatches and framing payloads.

use std::fmt;

use mast_resolver::ResolveError;
use mast_types::{HeaderError, InterfaceId, RouteMatchError};

/// Failure of one dispatch construction, encode or decode attempt.
///
/// Never leaves partial state behind; resolver registries and routing
/// tables are untouched by a failed attempt.
#[derive(Debug)]
pub enum CallError {
    /// Malformed header on an inbound payload.
    Header(HeaderError),
    /// The inbound header could not be resolved against the routing table.
    Route(RouteMatchError),
    /// Body encode/decode failure.
    Codec(bcs::Error),
    /// Type resolution failed while building a dispatch.
    Resolve(ResolveError),
    /// The document has no service by this name.
    UnknownService { name: String },
    /// The service declares no function/event by this name.
    UnknownFunction { service: String, name: String },
    /// Dispatch needs an interface id, but none was supplied for the
    /// service (annotation or artifact).
    MissingInterfaceId { service: String },
    /// Reply header names a different interface than the call.
    InterfaceMismatch {
        expected: InterfaceId,
        got: InterfaceId,
    },
    /// Reply header names a different entry than the call.
    EntryMismatch { expected: u16, got: u16 },
    /// Reply header names a different route than the call.
    RouteMismatch { expected: u8, got: u8 },
    /// Legacy-framed reply does not start with the expected service and
    /// function names.
    ReplyPrefixMismatch { expected: String },
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(e) => write!(f, "bad payload header: {}", e),
            Self::Route(e) => write!(f, "routing failed: {}", e),
            Self::Codec(e) => write!(f, "payload codec error: {}", e),
            Self::Resolve(e) => write!(f, "type resolution failed: {}", e),
            Self::UnknownService { name } => write!(f, "unknown service `{}`", name),
            Self::UnknownFunction { service, name } => {
                write!(f, "service `{}` has no function `{}`", service, name)
            }
            Self::MissingInterfaceId { service } => {
                write!(f, "service `{}` has no interface id", service)
            }
            Self::InterfaceMismatch { expected, got } => {
                write!(f, "reply interface mismatch: expected {}, got {}", expected, got)
            }
            Self::EntryMismatch { expected, got } => {
                write!(f, "reply entry mismatch: expected {}, got {}", expected, got)
            }
            Self::RouteMismatch { expected, got } => {
                write!(f, "reply route mismatch: expected {}, got {}", expected, got)
            }
            Self::ReplyPrefixMismatch { expected } => {
                write!(f, "reply does not start with `{}`", expected)
            }
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(e) => Some(e),
            Self::Route(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Resolve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HeaderError> for CallError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

impl From<RouteMatchError> for CallError {
    fn from(e: RouteMatchError) -> Self {
        Self::Route(e)
    }
}

impl From<bcs::Error> for CallError {
    fn from(e: bcs::Error) -> Self {
        Self::Codec(e)
    }
}

impl From<ResolveError> for CallError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}
