//! Visitor protocol for the precompiled-artifact front end.
//!
//! The artifact drives a [`DocumentSink`] with "visit" notifications.
//! Nodes are identified by fabricated integer [`Handle`]s so nested
//! visits (fields, variants, params, generic arguments) attach to the
//! right parent without sharing memory with the artifact. The
//! [`DocumentBuilder`] mirrors every notification into an arena and
//! assembles the same [`IdlDocument`] shape the text front end produces.
//!
//! Type references arrive through *slots*: `visit_param`, `visit_field`,
//! `visit_output`, `visit_alias_shape` and friends fabricate an empty
//! slot; exactly one subsequent type visit fills it. Composite type
//! visits fabricate one child slot per element (`visit_generic_arg`,
//! `visit_tuple_elem`, the slice/array item). A slot still empty when
//! [`DocumentBuilder::finish`] runs is an [`ParseError::IncompleteDocument`].

use mast_types::InterfaceId;

use crate::document::{
    Annotation, CtorFunc, EnumVariant, FuncKind, FuncParam, IdlDocument, PrimitiveType,
    ProgramUnit, ServiceExpo, ServiceIdent, ServiceUnit, StructField, TypeDecl, TypeDef, TypeShape,
};
use crate::error::ParseError;

/// Fabricated identifier correlating visit notifications.
pub type Handle = u32;

/// Receiver side of the artifact's visit protocol.
///
/// Methods return the fabricated handle of the node (or slot) they
/// create; the artifact passes those handles back as parents of nested
/// visits. Implementations must tolerate any handle value without
/// panicking; a bad handle surfaces as an error at `finish` time.
pub trait DocumentSink {
    fn visit_program(&mut self, name: &str) -> Handle;
    fn visit_ctor(&mut self, program: Handle, name: &str) -> Handle;
    fn visit_service_expo(
        &mut self,
        program: Handle,
        name: &str,
        interface_id: Option<[u8; 8]>,
        route: &str,
        route_idx: u8,
    );

    fn visit_service(&mut self, name: &str, interface_id: Option<[u8; 8]>) -> Handle;
    fn visit_extends(&mut self, service: Handle, name: &str, interface_id: Option<[u8; 8]>);
    fn visit_func(&mut self, service: Handle, name: &str, query: bool) -> Handle;
    /// Fabricates the parameter's type slot as well; fill it with a
    /// type visit targeting the returned handle.
    fn visit_param(&mut self, owner: Handle, name: &str) -> Handle;
    fn visit_output(&mut self, func: Handle) -> Handle;
    fn visit_throws(&mut self, func: Handle) -> Handle;
    fn visit_event(&mut self, service: Handle, name: &str) -> Handle;

    /// `owner` is the program or a service handle.
    fn visit_type(&mut self, owner: Handle, name: &str) -> Handle;
    fn visit_type_param(&mut self, ty: Handle, name: &str);
    fn visit_struct_shape(&mut self, ty: Handle);
    fn visit_enum_shape(&mut self, ty: Handle);
    fn visit_alias_shape(&mut self, ty: Handle) -> Handle;
    /// `owner` is a struct-shaped type or a variant.
    fn visit_field(&mut self, owner: Handle, name: Option<&str>) -> Handle;
    fn visit_variant(&mut self, ty: Handle, name: &str) -> Handle;

    fn visit_primitive(&mut self, target: Handle, primitive: PrimitiveType);
    fn visit_named(&mut self, target: Handle, name: &str) -> Handle;
    fn visit_generic_arg(&mut self, named: Handle) -> Handle;
    fn visit_tuple(&mut self, target: Handle) -> Handle;
    fn visit_tuple_elem(&mut self, tuple: Handle) -> Handle;
    fn visit_slice(&mut self, target: Handle) -> Handle;
    fn visit_array(&mut self, target: Handle, len: u32) -> Handle;

    /// One doc line for any doc-bearing node.
    fn visit_doc(&mut self, owner: Handle, line: &str);
    fn visit_annotation(&mut self, owner: Handle, name: &str, value: Option<&str>);
}

#[derive(Debug)]
enum TyNode {
    Unfilled,
    Primitive(PrimitiveType),
    Named { name: String, args: Vec<Handle> },
    Tuple(Vec<Handle>),
    Slice(Handle),
    Array { item: Handle, len: u32 },
}

#[derive(Debug)]
enum ShapeDraft {
    Struct { fields: Vec<Handle> },
    Enum { variants: Vec<Handle> },
    Alias { ty: Handle },
}

#[derive(Debug)]
enum Node {
    Program {
        name: String,
        docs: Vec<String>,
        ctors: Vec<Handle>,
        expos: Vec<ServiceExpo>,
        types: Vec<Handle>,
    },
    Service {
        name: String,
        interface_id: Option<InterfaceId>,
        extends: Vec<ServiceIdent>,
        funcs: Vec<Handle>,
        events: Vec<Handle>,
        types: Vec<Handle>,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    },
    Ctor {
        name: String,
        params: Vec<Handle>,
        docs: Vec<String>,
    },
    Func {
        name: String,
        query: bool,
        params: Vec<Handle>,
        output: Option<Handle>,
        throws: Option<Handle>,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    },
    Param {
        name: String,
        ty: Handle,
    },
    TypeDef {
        name: String,
        type_params: Vec<String>,
        shape: Option<ShapeDraft>,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    },
    Variant {
        name: String,
        fields: Vec<Handle>,
        docs: Vec<String>,
    },
    Field {
        name: Option<String>,
        ty: Handle,
        docs: Vec<String>,
    },
    Ty(TyNode),
}

/// Arena-backed [`DocumentSink`] producing an [`IdlDocument`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    program: Option<Handle>,
    services: Vec<Handle>,
    /// First protocol violation observed; reported by `finish`.
    defect: Option<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the document, failing if any slot was left unfilled or
    /// the artifact violated the protocol.
    pub fn finish(self) -> Result<IdlDocument, ParseError> {
        if let Some(detail) = self.defect {
            return Err(ParseError::IncompleteDocument { detail });
        }
        let program = match self.program {
            Some(handle) => self.build_program(handle)?,
            None => ProgramUnit::default(),
        };
        let services = self
            .services
            .iter()
            .map(|&handle| self.build_service(handle))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IdlDocument { program, services })
    }

    // ---- assembly ----

    fn node(&self, handle: Handle) -> Result<&Node, ParseError> {
        self.nodes
            .get(handle as usize)
            .ok_or_else(|| ParseError::IncompleteDocument {
                detail: format!("dangling handle {}", handle),
            })
    }

    fn build_program(&self, handle: Handle) -> Result<ProgramUnit, ParseError> {
        match self.node(handle)? {
            Node::Program {
                name,
                docs,
                ctors,
                expos,
                types,
            } => Ok(ProgramUnit {
                name: name.clone(),
                ctors: ctors
                    .iter()
                    .map(|&c| self.build_ctor(c))
                    .collect::<Result<_, _>>()?,
                services: expos.clone(),
                types: types
                    .iter()
                    .map(|&t| self.build_type(t))
                    .collect::<Result<_, _>>()?,
                docs: docs.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "program")),
        }
    }

    fn build_service(&self, handle: Handle) -> Result<ServiceUnit, ParseError> {
        match self.node(handle)? {
            Node::Service {
                name,
                interface_id,
                extends,
                funcs,
                events,
                types,
                docs,
                annotations,
            } => Ok(ServiceUnit {
                name: name.clone(),
                interface_id: *interface_id,
                extends: extends.clone(),
                funcs: funcs
                    .iter()
                    .map(|&f| self.build_func(f))
                    .collect::<Result<_, _>>()?,
                events: events
                    .iter()
                    .map(|&v| self.build_variant(v))
                    .collect::<Result<_, _>>()?,
                types: types
                    .iter()
                    .map(|&t| self.build_type(t))
                    .collect::<Result<_, _>>()?,
                docs: docs.clone(),
                annotations: annotations.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "service")),
        }
    }

    fn build_ctor(&self, handle: Handle) -> Result<CtorFunc, ParseError> {
        match self.node(handle)? {
            Node::Ctor { name, params, docs } => Ok(CtorFunc {
                name: name.clone(),
                params: params
                    .iter()
                    .map(|&p| self.build_param(p))
                    .collect::<Result<_, _>>()?,
                docs: docs.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "constructor")),
        }
    }

    fn build_func(&self, handle: Handle) -> Result<crate::document::ServiceFunc, ParseError> {
        match self.node(handle)? {
            Node::Func {
                name,
                query,
                params,
                output,
                throws,
                docs,
                annotations,
            } => Ok(crate::document::ServiceFunc {
                name: name.clone(),
                params: params
                    .iter()
                    .map(|&p| self.build_param(p))
                    .collect::<Result<_, _>>()?,
                output: match output {
                    Some(slot) => self.build_ty(*slot)?,
                    None => TypeDecl::Primitive(PrimitiveType::Null),
                },
                throws: throws.map(|slot| self.build_ty(slot)).transpose()?,
                kind: if *query {
                    FuncKind::Query
                } else {
                    FuncKind::Command
                },
                docs: docs.clone(),
                annotations: annotations.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "function")),
        }
    }

    fn build_param(&self, handle: Handle) -> Result<FuncParam, ParseError> {
        match self.node(handle)? {
            Node::Param { name, ty } => Ok(FuncParam {
                name: name.clone(),
                ty: self.build_ty(*ty)?,
            }),
            _ => Err(self.wrong_kind(handle, "parameter")),
        }
    }

    fn build_type(&self, handle: Handle) -> Result<TypeDef, ParseError> {
        match self.node(handle)? {
            Node::TypeDef {
                name,
                type_params,
                shape,
                docs,
                annotations,
            } => {
                let shape = match shape {
                    Some(ShapeDraft::Struct { fields }) => TypeShape::Struct {
                        fields: fields
                            .iter()
                            .map(|&f| self.build_field(f))
                            .collect::<Result<_, _>>()?,
                    },
                    Some(ShapeDraft::Enum { variants }) => TypeShape::Enum {
                        variants: variants
                            .iter()
                            .map(|&v| self.build_variant(v))
                            .collect::<Result<_, _>>()?,
                    },
                    Some(ShapeDraft::Alias { ty }) => TypeShape::Alias(self.build_ty(*ty)?),
                    None => {
                        return Err(ParseError::IncompleteDocument {
                            detail: format!("type `{}` has no shape", name),
                        })
                    }
                };
                Ok(TypeDef {
                    name: name.clone(),
                    type_params: type_params.clone(),
                    shape,
                    docs: docs.clone(),
                    annotations: annotations.clone(),
                })
            }
            _ => Err(self.wrong_kind(handle, "type")),
        }
    }

    fn build_variant(&self, handle: Handle) -> Result<EnumVariant, ParseError> {
        match self.node(handle)? {
            Node::Variant { name, fields, docs } => Ok(EnumVariant {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|&f| self.build_field(f))
                    .collect::<Result<_, _>>()?,
                docs: docs.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "variant")),
        }
    }

    fn build_field(&self, handle: Handle) -> Result<StructField, ParseError> {
        match self.node(handle)? {
            Node::Field { name, ty, docs } => Ok(StructField {
                name: name.clone(),
                ty: self.build_ty(*ty)?,
                docs: docs.clone(),
            }),
            _ => Err(self.wrong_kind(handle, "field")),
        }
    }

    fn build_ty(&self, handle: Handle) -> Result<TypeDecl, ParseError> {
        match self.node(handle)? {
            Node::Ty(ty) => match ty {
                TyNode::Unfilled => Err(ParseError::IncompleteDocument {
                    detail: format!("type slot {} left unfilled", handle),
                }),
                TyNode::Primitive(prim) => Ok(TypeDecl::Primitive(*prim)),
                TyNode::Named { name, args } => Ok(TypeDecl::Named {
                    name: name.clone(),
                    args: args
                        .iter()
                        .map(|&a| self.build_ty(a))
                        .collect::<Result<_, _>>()?,
                }),
                TyNode::Tuple(elems) => Ok(TypeDecl::Tuple(
                    elems
                        .iter()
                        .map(|&e| self.build_ty(e))
                        .collect::<Result<_, _>>()?,
                )),
                TyNode::Slice(item) => Ok(TypeDecl::Slice(Box::new(self.build_ty(*item)?))),
                TyNode::Array { item, len } => Ok(TypeDecl::Array {
                    item: Box::new(self.build_ty(*item)?),
                    len: *len,
                }),
            },
            _ => Err(self.wrong_kind(handle, "type reference")),
        }
    }

    fn wrong_kind(&self, handle: Handle, expected: &str) -> ParseError {
        ParseError::IncompleteDocument {
            detail: format!("handle {} is not a {}", handle, expected),
        }
    }

    // ---- mutation plumbing ----

    fn alloc(&mut self, node: Node) -> Handle {
        self.nodes.push(node);
        (self.nodes.len() - 1) as Handle
    }

    fn alloc_slot(&mut self) -> Handle {
        self.alloc(Node::Ty(TyNode::Unfilled))
    }

    fn note_defect(&mut self, detail: String) {
        if self.defect.is_none() {
            self.defect = Some(detail);
        }
    }

    fn with_node(&mut self, handle: Handle, expected: &str, f: impl FnOnce(&mut Node)) {
        match self.nodes.get_mut(handle as usize) {
            Some(node) => f(node),
            None => self.note_defect(format!("visit names unknown {} handle {}", expected, handle)),
        }
    }

    /// Resolve a fill target to its type slot: params and fields carry
    /// their slot internally, everything else must be a slot itself.
    fn slot_of(&mut self, target: Handle) -> Option<Handle> {
        match self.nodes.get(target as usize) {
            Some(Node::Ty(_)) => Some(target),
            Some(Node::Param { ty, .. }) | Some(Node::Field { ty, .. }) => Some(*ty),
            _ => {
                self.note_defect(format!("handle {} cannot hold a type", target));
                None
            }
        }
    }

    fn fill(&mut self, target: Handle, ty: TyNode) -> Handle {
        let Some(slot) = self.slot_of(target) else {
            return target;
        };
        match self.nodes.get_mut(slot as usize) {
            Some(Node::Ty(existing @ TyNode::Unfilled)) => *existing = ty,
            Some(Node::Ty(_)) => self.note_defect(format!("type slot {} filled twice", slot)),
            _ => self.note_defect(format!("handle {} is not a type slot", slot)),
        }
        slot
    }
}

impl DocumentSink for DocumentBuilder {
    fn visit_program(&mut self, name: &str) -> Handle {
        if self.program.is_some() {
            self.note_defect("program visited twice".to_string());
        }
        let handle = self.alloc(Node::Program {
            name: name.to_string(),
            docs: Vec::new(),
            ctors: Vec::new(),
            expos: Vec::new(),
            types: Vec::new(),
        });
        self.program = Some(handle);
        handle
    }

    fn visit_ctor(&mut self, program: Handle, name: &str) -> Handle {
        let handle = self.alloc(Node::Ctor {
            name: name.to_string(),
            params: Vec::new(),
            docs: Vec::new(),
        });
        self.with_node(program, "program", |node| {
            if let Node::Program { ctors, .. } = node {
                ctors.push(handle);
            }
        });
        handle
    }

    fn visit_service_expo(
        &mut self,
        program: Handle,
        name: &str,
        interface_id: Option<[u8; 8]>,
        route: &str,
        route_idx: u8,
    ) {
        let expo = ServiceExpo {
            name: name.to_string(),
            interface_id: interface_id.map(InterfaceId::from_bytes),
            route: route.to_string(),
            route_idx,
        };
        self.with_node(program, "program", |node| {
            if let Node::Program { expos, .. } = node {
                expos.push(expo);
            }
        });
    }

    fn visit_service(&mut self, name: &str, interface_id: Option<[u8; 8]>) -> Handle {
        let handle = self.alloc(Node::Service {
            name: name.to_string(),
            interface_id: interface_id.map(InterfaceId::from_bytes),
            extends: Vec::new(),
            funcs: Vec::new(),
            events: Vec::new(),
            types: Vec::new(),
            docs: Vec::new(),
            annotations: Vec::new(),
        });
        self.services.push(handle);
        handle
    }

    fn visit_extends(&mut self, service: Handle, name: &str, interface_id: Option<[u8; 8]>) {
        let ident = ServiceIdent {
            name: name.to_string(),
            interface_id: interface_id.map(InterfaceId::from_bytes),
        };
        self.with_node(service, "service", |node| {
            if let Node::Service { extends, .. } = node {
                extends.push(ident);
            }
        });
    }

    fn visit_func(&mut self, service: Handle, name: &str, query: bool) -> Handle {
        let handle = self.alloc(Node::Func {
            name: name.to_string(),
            query,
            params: Vec::new(),
            output: None,
            throws: None,
            docs: Vec::new(),
            annotations: Vec::new(),
        });
        self.with_node(service, "service", |node| {
            if let Node::Service { funcs, .. } = node {
                funcs.push(handle);
            }
        });
        handle
    }

    fn visit_param(&mut self, owner: Handle, name: &str) -> Handle {
        let slot = self.alloc_slot();
        let handle = self.alloc(Node::Param {
            name: name.to_string(),
            ty: slot,
        });
        self.with_node(owner, "function or constructor", |node| match node {
            Node::Func { params, .. } | Node::Ctor { params, .. } => params.push(handle),
            _ => {}
        });
        handle
    }

    fn visit_output(&mut self, func: Handle) -> Handle {
        let slot = self.alloc_slot();
        self.with_node(func, "function", |node| {
            if let Node::Func { output, .. } = node {
                *output = Some(slot);
            }
        });
        slot
    }

    fn visit_throws(&mut self, func: Handle) -> Handle {
        let slot = self.alloc_slot();
        self.with_node(func, "function", |node| {
            if let Node::Func { throws, .. } = node {
                *throws = Some(slot);
            }
        });
        slot
    }

    fn visit_event(&mut self, service: Handle, name: &str) -> Handle {
        let handle = self.alloc(Node::Variant {
            name: name.to_string(),
            fields: Vec::new(),
            docs: Vec::new(),
        });
        self.with_node(service, "service", |node| {
            if let Node::Service { events, .. } = node {
                events.push(handle);
            }
        });
        handle
    }

    fn visit_type(&mut self, owner: Handle, name: &str) -> Handle {
        let handle = self.alloc(Node::TypeDef {
            name: name.to_string(),
            type_params: Vec::new(),
            shape: None,
            docs: Vec::new(),
            annotations: Vec::new(),
        });
        self.with_node(owner, "program or service", |node| match node {
            Node::Program { types, .. } | Node::Service { types, .. } => types.push(handle),
            _ => {}
        });
        handle
    }

    fn visit_type_param(&mut self, ty: Handle, name: &str) {
        let name = name.to_string();
        self.with_node(ty, "type", |node| {
            if let Node::TypeDef { type_params, .. } = node {
                type_params.push(name);
            }
        });
    }

    fn visit_struct_shape(&mut self, ty: Handle) {
        self.with_node(ty, "type", |node| {
            if let Node::TypeDef { shape, .. } = node {
                *shape = Some(ShapeDraft::Struct { fields: Vec::new() });
            }
        });
    }

    fn visit_enum_shape(&mut self, ty: Handle) {
        self.with_node(ty, "type", |node| {
            if let Node::TypeDef { shape, .. } = node {
                *shape = Some(ShapeDraft::Enum {
                    variants: Vec::new(),
                });
            }
        });
    }

    fn visit_alias_shape(&mut self, ty: Handle) -> Handle {
        let slot = self.alloc_slot();
        self.with_node(ty, "type", |node| {
            if let Node::TypeDef { shape, .. } = node {
                *shape = Some(ShapeDraft::Alias { ty: slot });
            }
        });
        slot
    }

    fn visit_field(&mut self, owner: Handle, name: Option<&str>) -> Handle {
        let slot = self.alloc_slot();
        let handle = self.alloc(Node::Field {
            name: name.map(str::to_string),
            ty: slot,
            docs: Vec::new(),
        });
        self.with_node(owner, "struct type or variant", |node| match node {
            Node::TypeDef {
                shape: Some(ShapeDraft::Struct { fields }),
                ..
            } => fields.push(handle),
            Node::Variant { fields, .. } => fields.push(handle),
            _ => {}
        });
        handle
    }

    fn visit_variant(&mut self, ty: Handle, name: &str) -> Handle {
        let handle = self.alloc(Node::Variant {
            name: name.to_string(),
            fields: Vec::new(),
            docs: Vec::new(),
        });
        self.with_node(ty, "enum type", |node| {
            if let Node::TypeDef {
                shape: Some(ShapeDraft::Enum { variants }),
                ..
            } = node
            {
                variants.push(handle);
            }
        });
        handle
    }

    fn visit_primitive(&mut self, target: Handle, primitive: PrimitiveType) {
        self.fill(target, TyNode::Primitive(primitive));
    }

    fn visit_named(&mut self, target: Handle, name: &str) -> Handle {
        self.fill(
            target,
            TyNode::Named {
                name: name.to_string(),
                args: Vec::new(),
            },
        )
    }

    fn visit_generic_arg(&mut self, named: Handle) -> Handle {
        let slot = self.alloc_slot();
        match self.nodes.get_mut(named as usize) {
            Some(Node::Ty(TyNode::Named { args, .. })) => args.push(slot),
            _ => self.note_defect(format!("handle {} is not a named type", named)),
        }
        slot
    }

    fn visit_tuple(&mut self, target: Handle) -> Handle {
        self.fill(target, TyNode::Tuple(Vec::new()))
    }

    fn visit_tuple_elem(&mut self, tuple: Handle) -> Handle {
        let slot = self.alloc_slot();
        match self.nodes.get_mut(tuple as usize) {
            Some(Node::Ty(TyNode::Tuple(elems))) => elems.push(slot),
            _ => self.note_defect(format!("handle {} is not a tuple", tuple)),
        }
        slot
    }

    fn visit_slice(&mut self, target: Handle) -> Handle {
        let item = self.alloc_slot();
        self.fill(target, TyNode::Slice(item));
        item
    }

    fn visit_array(&mut self, target: Handle, len: u32) -> Handle {
        let item = self.alloc_slot();
        self.fill(target, TyNode::Array { item, len });
        item
    }

    fn visit_doc(&mut self, owner: Handle, line: &str) {
        let line = line.to_string();
        self.with_node(owner, "doc-bearing node", |node| match node {
            Node::Program { docs, .. }
            | Node::Service { docs, .. }
            | Node::Ctor { docs, .. }
            | Node::Func { docs, .. }
            | Node::TypeDef { docs, .. }
            | Node::Variant { docs, .. }
            | Node::Field { docs, .. } => docs.push(line),
            _ => {}
        });
    }

    fn visit_annotation(&mut self, owner: Handle, name: &str, value: Option<&str>) {
        let annotation = Annotation {
            name: name.to_string(),
            value: value.map(str::to_string),
        };
        self.with_node(owner, "annotated node", |node| match node {
            Node::Service { annotations, .. }
            | Node::Func { annotations, .. }
            | Node::TypeDef { annotations, .. } => annotations.push(annotation),
            _ => {}
        });
    }
}

/// Replay a document into a sink, node by node, in declaration order.
///
/// This is the "accept" half of the visitor protocol; a scripted
/// artifact can parse by other means and then drive any sink with it.
pub fn accept_document(doc: &IdlDocument, sink: &mut dyn DocumentSink) {
    let program = sink.visit_program(&doc.program.name);
    for line in &doc.program.docs {
        sink.visit_doc(program, line);
    }
    for ctor in &doc.program.ctors {
        let handle = sink.visit_ctor(program, &ctor.name);
        for line in &ctor.docs {
            sink.visit_doc(handle, line);
        }
        for param in &ctor.params {
            let slot = sink.visit_param(handle, &param.name);
            accept_ty(&param.ty, slot, sink);
        }
    }
    for expo in &doc.program.services {
        sink.visit_service_expo(
            program,
            &expo.name,
            expo.interface_id.map(|id| *id.as_bytes()),
            &expo.route,
            expo.route_idx,
        );
    }
    for def in &doc.program.types {
        accept_type_def(def, program, sink);
    }

    for service in &doc.services {
        let handle = sink.visit_service(
            &service.name,
            service.interface_id.map(|id| *id.as_bytes()),
        );
        for line in &service.docs {
            sink.visit_doc(handle, line);
        }
        for annotation in &service.annotations {
            sink.visit_annotation(handle, &annotation.name, annotation.value.as_deref());
        }
        for ident in &service.extends {
            sink.visit_extends(
                handle,
                &ident.name,
                ident.interface_id.map(|id| *id.as_bytes()),
            );
        }
        for func in &service.funcs {
            let f = sink.visit_func(handle, &func.name, func.kind == FuncKind::Query);
            for line in &func.docs {
                sink.visit_doc(f, line);
            }
            for annotation in &func.annotations {
                sink.visit_annotation(f, &annotation.name, annotation.value.as_deref());
            }
            for param in &func.params {
                let slot = sink.visit_param(f, &param.name);
                accept_ty(&param.ty, slot, sink);
            }
            let output = sink.visit_output(f);
            accept_ty(&func.output, output, sink);
            if let Some(throws) = &func.throws {
                let slot = sink.visit_throws(f);
                accept_ty(throws, slot, sink);
            }
        }
        for event in &service.events {
            let v = sink.visit_event(handle, &event.name);
            accept_variant_body(event, v, sink);
        }
        for def in &service.types {
            accept_type_def(def, handle, sink);
        }
    }
}

fn accept_type_def(def: &TypeDef, owner: Handle, sink: &mut dyn DocumentSink) {
    let handle = sink.visit_type(owner, &def.name);
    for line in &def.docs {
        sink.visit_doc(handle, line);
    }
    for annotation in &def.annotations {
        sink.visit_annotation(handle, &annotation.name, annotation.value.as_deref());
    }
    for param in &def.type_params {
        sink.visit_type_param(handle, param);
    }
    match &def.shape {
        TypeShape::Struct { fields } => {
            sink.visit_struct_shape(handle);
            for field in fields {
                accept_field(field, handle, sink);
            }
        }
        TypeShape::Enum { variants } => {
            sink.visit_enum_shape(handle);
            for variant in variants {
                let v = sink.visit_variant(handle, &variant.name);
                accept_variant_body(variant, v, sink);
            }
        }
        TypeShape::Alias(decl) => {
            let slot = sink.visit_alias_shape(handle);
            accept_ty(decl, slot, sink);
        }
    }
}

fn accept_variant_body(variant: &EnumVariant, handle: Handle, sink: &mut dyn DocumentSink) {
    for line in &variant.docs {
        sink.visit_doc(handle, line);
    }
    for field in &variant.fields {
        accept_field(field, handle, sink);
    }
}

fn accept_field(field: &StructField, owner: Handle, sink: &mut dyn DocumentSink) {
    let handle = sink.visit_field(owner, field.name.as_deref());
    for line in &field.docs {
        sink.visit_doc(handle, line);
    }
    accept_ty(&field.ty, handle, sink);
}

fn accept_ty(decl: &TypeDecl, target: Handle, sink: &mut dyn DocumentSink) {
    match decl {
        TypeDecl::Primitive(prim) => sink.visit_primitive(target, *prim),
        TypeDecl::Named { name, args } => {
            let named = sink.visit_named(target, name);
            for arg in args {
                let slot = sink.visit_generic_arg(named);
                accept_ty(arg, slot, sink);
            }
        }
        TypeDecl::Tuple(elems) => {
            let tuple = sink.visit_tuple(target);
            for elem in elems {
                let slot = sink.visit_tuple_elem(tuple);
                accept_ty(elem, slot, sink);
            }
        }
        TypeDecl::Slice(item) => {
            let slot = sink.visit_slice(target);
            accept_ty(item, slot, sink);
        }
        TypeDecl::Array { item, len } => {
            let slot = sink.visit_array(target, *len);
            accept_ty(item, slot, sink);
        }
    }
}
