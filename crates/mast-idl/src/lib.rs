//! IDL parsing for the mast workspace.
//!
//! Two interchangeable front ends produce the same immutable
//! [`IdlDocument`]:
//! - [`parser`]: tokenizer + recursive-descent grammar parser over IDL
//!   text
//! - [`artifact`]: a precompiled binary artifact driving the
//!   [`builder::DocumentSink`] visit protocol, with owned memory
//!   bookkeeping in [`artifact::ArtifactParser`]
//!
//! The [`document`] module holds the document model itself; [`error`]
//! the single fatal [`ParseError`] type both front ends raise.

pub mod artifact;
pub mod builder;
pub mod document;
pub mod error;
pub mod lexer;
pub mod parser;

pub use artifact::{ArtifactParser, ArtifactStatus, ProgramArtifact};
pub use builder::{accept_document, DocumentBuilder, DocumentSink, Handle};
pub use document::{
    Annotation, CtorFunc, EnumVariant, FuncKind, FuncParam, IdlDocument, PrimitiveType,
    ProgramUnit, ServiceExpo, ServiceFunc, ServiceIdent, ServiceUnit, StructField, TypeDecl,
    TypeDef, TypeShape,
};
pub use error::ParseError;
pub use parser::parse;
