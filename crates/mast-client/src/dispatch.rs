//! Dispatch construction from a parsed document.
//!
//! At construction time, every function, event and constructor gets an
//! immutable header (entry id = declaration-order ordinal) and the
//! canonical descriptors of its argument, return and payload types,
//! resolved through the owning scope's [`TypeResolver`]. Encoding and
//! decoding then only assemble bytes; nothing is resolved per call.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use mast_idl::{FuncKind, IdlDocument};
use mast_resolver::{TypeResolver, WireDef};
use mast_types::{InterfaceId, MessageHeader, RouteMatchError};

use crate::error::CallError;

/// One callable function, fully resolved.
#[derive(Debug, Clone)]
pub struct FuncDispatch {
    pub name: String,
    pub kind: FuncKind,
    pub header: MessageHeader,
    /// Parameter name -> canonical descriptor name, declaration order.
    pub params: Vec<(String, String)>,
    pub output: String,
    pub throws: Option<String>,
}

/// One declared event, fully resolved.
#[derive(Debug, Clone)]
pub struct EventDispatch {
    pub name: String,
    pub header: MessageHeader,
    /// The variant payload under the struct lowering rule.
    pub payload: WireDef,
}

/// One constructor. Constructors dispatch under the all-zero interface
/// id at route 0.
#[derive(Debug, Clone)]
pub struct CtorDispatch {
    pub name: String,
    pub header: MessageHeader,
    pub params: Vec<(String, String)>,
}

/// All dispatches of one exposed service instance.
#[derive(Debug)]
pub struct ServiceDispatch {
    pub service: String,
    pub interface_id: InterfaceId,
    pub route_idx: u8,
    pub funcs: Vec<FuncDispatch>,
    pub events: Vec<EventDispatch>,
    resolver: TypeResolver,
}

impl ServiceDispatch {
    /// Resolve every function and event of `service_name` at
    /// `route_idx`. Program-level types are visible to the service,
    /// service-local types shadow them.
    pub fn build(
        doc: &IdlDocument,
        service_name: &str,
        route_idx: u8,
    ) -> Result<Self, CallError> {
        let service = doc
            .service(service_name)
            .ok_or_else(|| CallError::UnknownService {
                name: service_name.to_string(),
            })?;
        let interface_id = service
            .interface_id
            .ok_or_else(|| CallError::MissingInterfaceId {
                service: service_name.to_string(),
            })?;
        let resolver = TypeResolver::new(doc.types_in_scope(service))?;

        let funcs = service
            .funcs
            .iter()
            .enumerate()
            .map(|(entry_id, func)| {
                let params = func
                    .params
                    .iter()
                    .map(|p| Ok((p.name.clone(), resolver.resolve(&p.ty)?)))
                    .collect::<Result<Vec<_>, CallError>>()?;
                Ok(FuncDispatch {
                    name: func.name.clone(),
                    kind: func.kind,
                    header: MessageHeader::v1(interface_id, entry_id as u16, route_idx),
                    params,
                    output: resolver.resolve(&func.output)?,
                    throws: func
                        .throws
                        .as_ref()
                        .map(|t| resolver.resolve(t))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, CallError>>()?;

        let events = service
            .events
            .iter()
            .enumerate()
            .map(|(entry_id, event)| {
                Ok(EventDispatch {
                    name: event.name.clone(),
                    header: MessageHeader::v1(interface_id, entry_id as u16, route_idx),
                    payload: resolver.lower_fields(&event.fields)?,
                })
            })
            .collect::<Result<Vec<_>, CallError>>()?;

        debug!(
            service = service_name,
            %interface_id,
            route_idx,
            funcs = funcs.len(),
            events = events.len(),
            "built service dispatch"
        );
        Ok(Self {
            service: service_name.to_string(),
            interface_id,
            route_idx,
            funcs,
            events,
            resolver,
        })
    }

    pub fn func(&self, name: &str) -> Result<&FuncDispatch, CallError> {
        self.funcs
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| CallError::UnknownFunction {
                service: self.service.clone(),
                name: name.to_string(),
            })
    }

    /// The resolved registry of this service's scope.
    pub fn registry(&self) -> Vec<(String, WireDef)> {
        self.resolver.registry()
    }

    /// `header ++ body` for an outbound call. No arguments encode to a
    /// header-only payload.
    pub fn encode_call<T: Serialize>(&self, func: &str, args: &T) -> Result<Vec<u8>, CallError> {
        let dispatch = self.func(func)?;
        let mut payload = dispatch.header.to_bytes();
        payload.extend(bcs::to_bytes(args)?);
        Ok(payload)
    }

    /// Strip the reply header, validate it against the call's, decode
    /// the body.
    pub fn decode_reply<T: DeserializeOwned>(
        &self,
        func: &str,
        payload: &[u8],
    ) -> Result<T, CallError> {
        let dispatch = self.func(func)?;
        let (header, body_start) = MessageHeader::read_at(payload, 0)?;
        if header.interface_id != dispatch.header.interface_id {
            return Err(CallError::InterfaceMismatch {
                expected: dispatch.header.interface_id,
                got: header.interface_id,
            });
        }
        if header.entry_id != dispatch.header.entry_id {
            return Err(CallError::EntryMismatch {
                expected: dispatch.header.entry_id,
                got: header.entry_id,
            });
        }
        if header.route_idx != dispatch.header.route_idx {
            return Err(CallError::RouteMismatch {
                expected: dispatch.header.route_idx,
                got: header.route_idx,
            });
        }
        Ok(bcs::from_bytes(&payload[body_start..])?)
    }

    /// This instance's routing table row.
    pub fn route_entry(&self) -> (InterfaceId, u8) {
        (self.interface_id, self.route_idx)
    }
}

/// Program-level dispatches: the constructors.
#[derive(Debug)]
pub struct ProgramDispatch {
    pub ctors: Vec<CtorDispatch>,
}

impl ProgramDispatch {
    pub fn build(doc: &IdlDocument) -> Result<Self, CallError> {
        let resolver = TypeResolver::new(doc.program.types.iter())?;
        let ctors = doc
            .program
            .ctors
            .iter()
            .enumerate()
            .map(|(entry_id, ctor)| {
                let params = ctor
                    .params
                    .iter()
                    .map(|p| Ok((p.name.clone(), resolver.resolve(&p.ty)?)))
                    .collect::<Result<Vec<_>, CallError>>()?;
                Ok(CtorDispatch {
                    name: ctor.name.clone(),
                    header: MessageHeader::v1(InterfaceId::zero(), entry_id as u16, 0),
                    params,
                })
            })
            .collect::<Result<Vec<_>, CallError>>()?;
        Ok(Self { ctors })
    }

    pub fn ctor(&self, name: &str) -> Result<&CtorDispatch, CallError> {
        self.ctors
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CallError::UnknownFunction {
                service: String::new(),
                name: name.to_string(),
            })
    }

    /// Activation payload for one constructor.
    pub fn encode_ctor<T: Serialize>(&self, name: &str, args: &T) -> Result<Vec<u8>, CallError> {
        let dispatch = self.ctor(name)?;
        let mut payload = dispatch.header.to_bytes();
        payload.extend(bcs::to_bytes(args)?);
        Ok(payload)
    }
}

/// Resolve an inbound payload against a set of exposed service
/// instances: read the header, disambiguate interface and route, and
/// return the owning dispatch with the entry id and body offset.
pub fn route_inbound<'a>(
    dispatches: &'a [ServiceDispatch],
    payload: &[u8],
) -> Result<(&'a ServiceDispatch, u16, usize), CallError> {
    let (header, body_start) = MessageHeader::read_at(payload, 0)?;
    let routes: Vec<_> = dispatches.iter().map(|d| d.route_entry()).collect();
    let matched = header.try_match_interfaces(&routes)?;
    // A matched route 0 means the interface has exactly one instance,
    // whatever route it sits at.
    let dispatch = dispatches
        .iter()
        .find(|d| {
            d.interface_id == matched.interface_id
                && (matched.route_idx == 0 || d.route_idx == matched.route_idx)
        })
        .ok_or(CallError::Route(RouteMatchError::NoMatchingInterface {
            interface_id: matched.interface_id,
        }))?;
    Ok((dispatch, matched.entry_id, body_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mast_idl::parse;

    const IDL: &str = r#"
        program Counter;
        type CounterError = enum { Overflow, Underflow };
        constructor {
            New : (initial: u32);
            Default : ();
        };
        #[interface_id = 0x579d6daba41b7d82]
        service Counter {
            Add : (value: u32) -> u32;
            Sub : (value: u32) -> result (u32, CounterError);
            query Value : () -> u32;
            events {
                Added: u32,
                Cleared,
            };
        };
    "#;

    fn dispatch(route_idx: u8) -> ServiceDispatch {
        let doc = parse(IDL).unwrap();
        ServiceDispatch::build(&doc, "Counter", route_idx).unwrap()
    }

    #[test]
    fn test_entry_ids_follow_declaration_order() {
        let d = dispatch(0);
        assert_eq!(d.funcs[0].name, "Add");
        assert_eq!(d.funcs[0].header.entry_id, 0);
        assert_eq!(d.funcs[1].header.entry_id, 1);
        assert_eq!(d.funcs[2].name, "Value");
        assert_eq!(d.funcs[2].header.entry_id, 2);
        assert_eq!(d.funcs[2].kind, FuncKind::Query);
        assert_eq!(d.events[0].header.entry_id, 0);
        assert_eq!(d.events[1].header.entry_id, 1);
    }

    #[test]
    fn test_resolved_descriptors() {
        let d = dispatch(0);
        let sub = d.func("Sub").unwrap();
        assert_eq!(sub.params, vec![("value".to_string(), "u32".to_string())]);
        assert_eq!(sub.output, "Result<u32, CounterError>");
        let added = &d.events[0];
        assert_eq!(added.payload, WireDef::name("u32"));
        assert_eq!(d.events[1].payload, WireDef::Null);
    }

    #[test]
    fn test_encode_add_reference_vector() {
        let d = dispatch(1);
        let payload = d.encode_call("Add", &(5u32,)).unwrap();
        assert_eq!(
            payload,
            vec![
                0x47, 0x4d, 1, 16, 0x57, 0x9d, 0x6d, 0xab, 0xa4, 0x1b, 0x7d, 0x82, 0, 0, 1, 0, //
                5, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_reply_roundtrip_and_mismatch() {
        let d = dispatch(0);
        let add = d.func("Add").unwrap();

        let mut reply = add.header.to_bytes();
        reply.extend_from_slice(&15u32.to_le_bytes());
        assert_eq!(d.decode_reply::<u32>("Add", &reply).unwrap(), 15);

        // A reply for Sub does not decode as Add.
        let mut wrong = d.func("Sub").unwrap().header.to_bytes();
        wrong.extend_from_slice(&15u32.to_le_bytes());
        assert!(matches!(
            d.decode_reply::<u32>("Add", &wrong),
            Err(CallError::EntryMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_function() {
        let d = dispatch(0);
        assert!(matches!(
            d.encode_call("Nope", &()),
            Err(CallError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_missing_interface_id() {
        let doc = parse("service Bare { Go : (); };").unwrap();
        assert!(matches!(
            ServiceDispatch::build(&doc, "Bare", 0),
            Err(CallError::MissingInterfaceId { .. })
        ));
    }

    #[test]
    fn test_ctor_headers_use_zero_interface() {
        let doc = parse(IDL).unwrap();
        let program = ProgramDispatch::build(&doc).unwrap();
        assert_eq!(program.ctors[0].name, "New");
        assert_eq!(program.ctors[0].header.interface_id, InterfaceId::zero());
        assert_eq!(program.ctors[0].header.route_idx, 0);
        assert_eq!(program.ctors[1].header.entry_id, 1);

        let payload = program.encode_ctor("New", &(7u32,)).unwrap();
        assert_eq!(&payload[..4], &[0x47, 0x4d, 1, 16]);
        assert_eq!(&payload[4..12], &[0u8; 8]);
        assert_eq!(&payload[16..], &[7, 0, 0, 0]);
    }

    #[test]
    fn test_route_inbound_disambiguates_instances() {
        let doc = parse(IDL).unwrap();
        let instances = vec![
            ServiceDispatch::build(&doc, "Counter", 1).unwrap(),
            ServiceDispatch::build(&doc, "Counter", 2).unwrap(),
        ];

        let payload = instances[1].encode_call("Add", &(5u32,)).unwrap();
        let (dispatch, entry_id, body_start) = route_inbound(&instances, &payload).unwrap();
        assert_eq!(dispatch.route_idx, 2);
        assert_eq!(entry_id, 0);
        assert_eq!(&payload[body_start..], &5u32.to_le_bytes());

        // Route 0 is ambiguous when the interface is exposed twice.
        let ambiguous = MessageHeader::v1(instances[0].interface_id, 0, 0).to_bytes();
        assert!(matches!(
            route_inbound(&instances, &ambiguous),
            Err(CallError::Route(RouteMatchError::AmbiguousRoute { .. }))
        ));

        let foreign = MessageHeader::v1(InterfaceId::from(1), 0, 0).to_bytes();
        assert!(matches!(
            route_inbound(&instances, &foreign),
            Err(CallError::Route(RouteMatchError::NoMatchingInterface { .. }))
        ));

        // Route 0 against a single instance resolves to that instance.
        let single = vec![ServiceDispatch::build(&doc, "Counter", 5).unwrap()];
        let implicit = MessageHeader::v1(single[0].interface_id, 1, 0).to_bytes();
        let (dispatch, entry_id, _) = route_inbound(&single, &implicit).unwrap();
        assert_eq!(dispatch.route_idx, 5);
        assert_eq!(entry_id, 1);
    }

    #[test]
    fn test_service_local_types_shadow_program_types() {
        let doc = parse(
            r#"
            type Tag = struct { program_level: u8 };
            #[interface_id = 0x0000000000000001]
            service S {
                Get : () -> Tag;
                type Tag = struct { service_level: u16 };
            };
            "#,
        )
        .unwrap();
        let d = ServiceDispatch::build(&doc, "S", 0).unwrap();
        assert_eq!(
            d.registry().iter().find(|(n, _)| n == "Tag").map(|(_, w)| w.clone()),
            Some(WireDef::Struct(vec![(
                "service_level".into(),
                "u16".into()
            )]))
        );
    }
}
