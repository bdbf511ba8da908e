//! The Program Document: immutable parsed representation of an IDL source.
//!
//! Both front ends (text and precompiled artifact) produce exactly this
//! shape. Declaration order is preserved everywhere; nothing here is
//! sorted or deduplicated after parsing.

use serde::Serialize;

use mast_types::InterfaceId;

/// Fixed wire primitives the IDL can name directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveType {
    Null,
    Bool,
    Char,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    ActorId,
    CodeId,
    MessageId,
    H160,
    H256,
    NonZeroU8,
    NonZeroU16,
    NonZeroU32,
    NonZeroU64,
    NonZeroU128,
    NonZeroU256,
}

impl PrimitiveType {
    /// Look up a primitive by its IDL spelling. `str` and `string` are
    /// synonyms.
    pub fn from_idl_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "bool" => Self::Bool,
            "char" => Self::Char,
            "str" | "string" => Self::Str,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "u256" => Self::U256,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "actor_id" => Self::ActorId,
            "code_id" => Self::CodeId,
            "message_id" => Self::MessageId,
            "h160" => Self::H160,
            "h256" => Self::H256,
            "nonzero_u8" => Self::NonZeroU8,
            "nonzero_u16" => Self::NonZeroU16,
            "nonzero_u32" => Self::NonZeroU32,
            "nonzero_u64" => Self::NonZeroU64,
            "nonzero_u128" => Self::NonZeroU128,
            "nonzero_u256" => Self::NonZeroU256,
            _ => return None,
        })
    }
}

/// A type reference as written in fields, params and returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeDecl {
    Primitive(PrimitiveType),
    /// User type, builtin (`Option`, `Result`, `Map`) or generic
    /// parameter reference; which one is decided by the resolver.
    Named { name: String, args: Vec<TypeDecl> },
    Tuple(Vec<TypeDecl>),
    Slice(Box<TypeDecl>),
    Array { item: Box<TypeDecl>, len: u32 },
}

impl TypeDecl {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// `#[name]` or `#[name = value]` attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructField {
    /// `None` for tuple-struct fields.
    pub name: Option<String>,
    pub ty: TypeDecl,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVariant {
    pub name: String,
    pub fields: Vec<StructField>,
    pub docs: Vec<String>,
}

/// Body of a `type` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeShape {
    Struct { fields: Vec<StructField> },
    Enum { variants: Vec<EnumVariant> },
    /// `type Name = <expr>` where the expression is not a struct or
    /// enum literal.
    Alias(TypeDecl),
}

/// A named `type` declaration, possibly generic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub shape: TypeShape,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncParam {
    pub name: String,
    pub ty: TypeDecl,
}

/// Whether a service function mutates program state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuncKind {
    /// State-mutating; two-phase submit/await on the transport.
    Command,
    /// Read-only single round trip.
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceFunc {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub output: TypeDecl,
    pub throws: Option<TypeDecl>,
    pub kind: FuncKind,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtorFunc {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub docs: Vec<String>,
}

/// Reference to another service, by name and (optionally) interface id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceIdent {
    pub name: String,
    pub interface_id: Option<InterfaceId>,
}

/// A service instance the program exposes under a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceExpo {
    pub name: String,
    pub interface_id: Option<InterfaceId>,
    pub route: String,
    /// 0 = default/only instance.
    pub route_idx: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceUnit {
    pub name: String,
    /// Opaque 8-byte key, supplied externally (annotation or artifact);
    /// never derived here.
    pub interface_id: Option<InterfaceId>,
    /// Plain composition: names of services whose functions this one
    /// also carries. No implementation inheritance.
    pub extends: Vec<ServiceIdent>,
    pub funcs: Vec<ServiceFunc>,
    pub events: Vec<EnumVariant>,
    pub types: Vec<TypeDef>,
    pub docs: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ProgramUnit {
    pub name: String,
    pub ctors: Vec<CtorFunc>,
    pub services: Vec<ServiceExpo>,
    pub types: Vec<TypeDef>,
    pub docs: Vec<String>,
}

/// Root of a parsed IDL source. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct IdlDocument {
    pub program: ProgramUnit,
    pub services: Vec<ServiceUnit>,
}

impl IdlDocument {
    pub fn service(&self, name: &str) -> Option<&ServiceUnit> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Program-level and service-local types visible in `service`'s
    /// scope, service-local last (shadowing).
    pub fn types_in_scope<'a>(
        &'a self,
        service: &'a ServiceUnit,
    ) -> impl Iterator<Item = &'a TypeDef> {
        self.program.types.iter().chain(service.types.iter())
    }
}
