//! Fixed-layout message header codec and interface/route matching.
//!
//! Every payload on the wire is prefixed by a header of at least 16
//! bytes. Layout for version 1 (`hlen` = 16):
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 2    | magic bytes                    |
//! | 2      | 1    | version                        |
//! | 3      | 1    | header length (`hlen`, >= 16)  |
//! | 4      | 8    | interface id                   |
//! | 12     | 2    | entry id (little-endian u16)   |
//! | 14     | 1    | route index                    |
//! | 15     | 1    | reserved (must be 0 under v1)  |
//!
//! `hlen` allows forward growth: a decoder skips exactly `hlen` bytes
//! regardless of how many fields it understands. Headers are stateless
//! value objects, created fresh per call and per decode.

use std::fmt;

use crate::interface_id::InterfaceId;

/// Leading two bytes of every header.
pub const MAGIC_BYTES: [u8; 2] = [0x47, 0x4d];

/// Highest header version this implementation understands.
pub const HIGHEST_SUPPORTED_VERSION: u8 = 1;

/// Smallest valid header length.
pub const MINIMAL_HLEN: u8 = 16;

/// Decoded (or to-be-encoded) message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Protocol version, `1..=HIGHEST_SUPPORTED_VERSION`.
    pub version: u8,
    /// Total header length in bytes, `>= MINIMAL_HLEN`.
    pub hlen: u8,
    /// Interface the entry belongs to; all-zero for constructors.
    pub interface_id: InterfaceId,
    /// Declaration-order ordinal of the function/event within its interface.
    pub entry_id: u16,
    /// Disambiguates multiple exposed instances of one interface; 0 = default.
    pub route_idx: u8,
}

impl MessageHeader {
    /// Version-1 header with the minimal length.
    pub fn v1(interface_id: InterfaceId, entry_id: u16, route_idx: u8) -> Self {
        Self {
            version: 1,
            hlen: MINIMAL_HLEN,
            interface_id,
            entry_id,
            route_idx,
        }
    }

    /// Encode exactly `hlen` bytes in the fixed layout.
    ///
    /// Bytes past the known fields (including the v1 reserved byte) are
    /// written as zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.hlen as usize];
        out[0..2].copy_from_slice(&MAGIC_BYTES);
        out[2] = self.version;
        out[3] = self.hlen;
        out[4..12].copy_from_slice(self.interface_id.as_bytes());
        out[12..14].copy_from_slice(&self.entry_id.to_le_bytes());
        out[14] = self.route_idx;
        out
    }

    /// Decode a header from the start of `bytes`.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        Self::read_at(bytes, 0).map(|(header, _)| header)
    }

    /// Decode a header at `offset`, returning it together with the
    /// offset immediately past the header (the start of the body).
    ///
    /// Validation order: buffer length, magic, version, `hlen`, then
    /// the remaining fields. Nothing is returned partially constructed.
    pub fn read_at(bytes: &[u8], offset: usize) -> Result<(Self, usize), HeaderError> {
        let avail = bytes.len().saturating_sub(offset);
        if avail < MINIMAL_HLEN as usize {
            return Err(HeaderError::Truncated {
                needed: MINIMAL_HLEN as usize,
                got: avail,
            });
        }
        let buf = &bytes[offset..];

        if buf[0..2] != MAGIC_BYTES {
            return Err(HeaderError::InvalidMagic {
                got: [buf[0], buf[1]],
            });
        }

        let version = buf[2];
        if version == 0 || version > HIGHEST_SUPPORTED_VERSION {
            return Err(HeaderError::UnsupportedVersion { version });
        }

        let hlen = buf[3];
        if hlen < MINIMAL_HLEN {
            return Err(HeaderError::HeaderLengthTooShort { hlen });
        }
        if avail < hlen as usize {
            return Err(HeaderError::Truncated {
                needed: hlen as usize,
                got: avail,
            });
        }

        let mut id = [0u8; 8];
        id.copy_from_slice(&buf[4..12]);
        let interface_id = InterfaceId::from_bytes(id);

        let entry_id = u16::from_le_bytes([buf[12], buf[13]]);
        let route_idx = buf[14];

        if version == 1 && buf[15] != 0 {
            return Err(HeaderError::NonZeroReserved { value: buf[15] });
        }

        let header = Self {
            version,
            hlen,
            interface_id,
            entry_id,
            route_idx,
        };
        Ok((header, offset + hlen as usize))
    }

    /// Resolve this header against the caller's table of exposed
    /// `(interface id, route index)` pairs.
    ///
    /// The checks run in a fixed order, so a header that informally
    /// satisfies more than one failure description always raises the
    /// first applicable error:
    /// 1. no table entry shares the interface id -> [`RouteMatchError::NoMatchingInterface`]
    /// 2. route 0 while several instances share the id -> [`RouteMatchError::AmbiguousRoute`]
    /// 3. a nonzero route none of those instances expose -> [`RouteMatchError::NoMatchingRoute`]
    pub fn try_match_interfaces(
        &self,
        table: &[(InterfaceId, u8)],
    ) -> Result<MatchedInterface, RouteMatchError> {
        let same_interface_ids = table
            .iter()
            .filter(|(id, _)| *id == self.interface_id)
            .count();
        let has_route = table
            .iter()
            .any(|(id, route)| *id == self.interface_id && *route == self.route_idx);

        if same_interface_ids == 0 {
            return Err(RouteMatchError::NoMatchingInterface {
                interface_id: self.interface_id,
            });
        }
        if self.route_idx == 0 && same_interface_ids > 1 {
            return Err(RouteMatchError::AmbiguousRoute {
                interface_id: self.interface_id,
                candidates: same_interface_ids,
            });
        }
        if !has_route && self.route_idx != 0 {
            return Err(RouteMatchError::NoMatchingRoute {
                interface_id: self.interface_id,
                route_idx: self.route_idx,
            });
        }

        Ok(MatchedInterface {
            interface_id: self.interface_id,
            route_idx: self.route_idx,
            entry_id: self.entry_id,
        })
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} hlen={} interface={} entry={} route={}",
            self.version, self.hlen, self.interface_id, self.entry_id, self.route_idx
        )
    }
}

/// Routing resolved after disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedInterface {
    pub interface_id: InterfaceId,
    pub route_idx: u8,
    pub entry_id: u16,
}

/// Malformed header bytes. Raised before any field is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer bytes available than the header claims or requires.
    Truncated { needed: usize, got: usize },
    /// First two bytes are not the magic.
    InvalidMagic { got: [u8; 2] },
    /// Version 0, or newer than this implementation understands.
    UnsupportedVersion { version: u8 },
    /// Header length below the minimum.
    HeaderLengthTooShort { hlen: u8 },
    /// Reserved byte set under version 1.
    NonZeroReserved { value: u8 },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, got } => {
                write!(f, "header truncated: need {} bytes, got {}", needed, got)
            }
            Self::InvalidMagic { got } => {
                write!(f, "invalid magic bytes [{:#04x}, {:#04x}]", got[0], got[1])
            }
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported header version {}", version)
            }
            Self::HeaderLengthTooShort { hlen } => {
                write!(f, "header length {} below minimum {}", hlen, MINIMAL_HLEN)
            }
            Self::NonZeroReserved { value } => {
                write!(f, "reserved byte must be 0 under version 1, got {}", value)
            }
        }
    }
}

impl std::error::Error for HeaderError {}

/// A decoded header could not be resolved against the routing table.
///
/// Fatal to that dispatch attempt only; the caller's table and any
/// resolver state are untouched and the attempt may be retried with a
/// corrected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatchError {
    /// No exposed instance carries the header's interface id.
    NoMatchingInterface { interface_id: InterfaceId },
    /// Route 0 cannot pick between several instances of the interface.
    AmbiguousRoute {
        interface_id: InterfaceId,
        candidates: usize,
    },
    /// The interface is exposed, but not at the requested route.
    NoMatchingRoute {
        interface_id: InterfaceId,
        route_idx: u8,
    },
}

impl fmt::Display for RouteMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingInterface { interface_id } => {
                write!(f, "no matching interface {}", interface_id)
            }
            Self::AmbiguousRoute {
                interface_id,
                candidates,
            } => write!(
                f,
                "route 0 is ambiguous: {} instances of interface {}",
                candidates, interface_id
            ),
            Self::NoMatchingRoute {
                interface_id,
                route_idx,
            } => write!(
                f,
                "interface {} has no instance at route {}",
                interface_id, route_idx
            ),
        }
    }
}

impl std::error::Error for RouteMatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(value: u64) -> InterfaceId {
        InterfaceId::from(value)
    }

    #[test]
    fn test_encode_reference_vector() {
        let header = MessageHeader::v1(iface(0x0102030405060708), 1234, 42);
        assert_eq!(
            header.to_bytes(),
            vec![0x47, 0x4d, 1, 16, 1, 2, 3, 4, 5, 6, 7, 8, 210, 4, 42, 0]
        );
    }

    #[test]
    fn test_encode_all_zero() {
        let header = MessageHeader::v1(InterfaceId::zero(), 0, 0);
        assert_eq!(
            header.to_bytes(),
            vec![0x47, 0x4d, 1, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_roundtrip() {
        for (entry_id, route_idx) in [(0u16, 0u8), (1, 1), (1234, 42), (u16::MAX, u8::MAX)] {
            let header = MessageHeader::v1(iface(0x579d6daba41b7d82), entry_id, route_idx);
            let (decoded, next) = MessageHeader::read_at(&header.to_bytes(), 0).unwrap();
            assert_eq!(decoded, header);
            assert_eq!(next, 16);
        }
    }

    #[test]
    fn test_read_at_offset_skips_hlen() {
        let mut bytes = vec![0xee, 0xee, 0xee];
        let mut header = MessageHeader::v1(iface(7), 3, 0);
        header.hlen = 20;
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&[9, 9]); // body

        let (decoded, next) = MessageHeader::read_at(&bytes, 3).unwrap();
        assert_eq!(decoded.hlen, 20);
        assert_eq!(decoded.interface_id, iface(7));
        assert_eq!(next, 23);
        assert_eq!(&bytes[next..], &[9, 9]);
    }

    #[test]
    fn test_decode_validation_order() {
        let good = MessageHeader::v1(iface(1), 0, 0).to_bytes();

        assert_eq!(
            MessageHeader::try_from_bytes(&good[..15]),
            Err(HeaderError::Truncated { needed: 16, got: 15 })
        );

        let mut bad_magic = good.clone();
        bad_magic[0] = 0x00;
        assert_eq!(
            MessageHeader::try_from_bytes(&bad_magic),
            Err(HeaderError::InvalidMagic { got: [0x00, 0x4d] })
        );

        for version in [0u8, 2] {
            let mut bad_version = good.clone();
            bad_version[2] = version;
            assert_eq!(
                MessageHeader::try_from_bytes(&bad_version),
                Err(HeaderError::UnsupportedVersion { version })
            );
        }

        let mut short_hlen = good.clone();
        short_hlen[3] = 15;
        assert_eq!(
            MessageHeader::try_from_bytes(&short_hlen),
            Err(HeaderError::HeaderLengthTooShort { hlen: 15 })
        );

        let mut reserved = good;
        reserved[15] = 1;
        assert_eq!(
            MessageHeader::try_from_bytes(&reserved),
            Err(HeaderError::NonZeroReserved { value: 1 })
        );
    }

    #[test]
    fn test_decode_hlen_longer_than_buffer() {
        let mut bytes = MessageHeader::v1(iface(1), 0, 0).to_bytes();
        bytes[3] = 32; // claims 32 bytes but only 16 present
        assert_eq!(
            MessageHeader::try_from_bytes(&bytes),
            Err(HeaderError::Truncated { needed: 32, got: 16 })
        );
    }

    #[test]
    fn test_match_single_instance() {
        let header = MessageHeader::v1(iface(0xaa), 5, 0);
        let matched = header
            .try_match_interfaces(&[(iface(0xaa), 0), (iface(0xbb), 0)])
            .unwrap();
        assert_eq!(
            matched,
            MatchedInterface {
                interface_id: iface(0xaa),
                route_idx: 0,
                entry_id: 5,
            }
        );
    }

    #[test]
    fn test_match_precedence() {
        // Interface X exposed at routes {1, 2}.
        let table = vec![(iface(0xaa), 1), (iface(0xaa), 2)];

        // Unknown interface wins over any route consideration.
        let header = MessageHeader::v1(iface(0xcc), 0, 0);
        assert!(matches!(
            header.try_match_interfaces(&table),
            Err(RouteMatchError::NoMatchingInterface { .. })
        ));

        // Route 0 with several instances: ambiguous, never "no route".
        let header = MessageHeader::v1(iface(0xaa), 0, 0);
        assert!(matches!(
            header.try_match_interfaces(&table),
            Err(RouteMatchError::AmbiguousRoute { candidates: 2, .. })
        ));

        // Nonzero route nobody exposes.
        let header = MessageHeader::v1(iface(0xaa), 0, 3);
        assert!(matches!(
            header.try_match_interfaces(&table),
            Err(RouteMatchError::NoMatchingRoute { route_idx: 3, .. })
        ));

        // Exact nonzero route.
        let header = MessageHeader::v1(iface(0xaa), 7, 2);
        let matched = header.try_match_interfaces(&table).unwrap();
        assert_eq!(matched.route_idx, 2);
        assert_eq!(matched.entry_id, 7);
    }

    #[test]
    fn test_match_route_zero_unique_instance_at_other_route() {
        // One instance exposed at a nonzero route still answers route 0.
        let header = MessageHeader::v1(iface(0xaa), 1, 0);
        let matched = header.try_match_interfaces(&[(iface(0xaa), 5)]).unwrap();
        assert_eq!(matched.route_idx, 0);
    }
}
