//! Recursive-descent parser for IDL text.
//!
//! Grammar (informally):
//!
//! ```text
//! document    := item*
//! item        := "program" Ident ";"
//!              | "type" Ident generics? "=" typeExpr ";"
//!              | "constructor" "{" ctorFunc* "}" ";"
//!              | "service" Ident? (":" Ident ("," Ident)*)? "{" svcItem* "}" ";"
//! typeExpr    := "struct" "{" fields "}" | "enum" "{" variants "}"
//!              | "opt" typeExpr | "vec" typeExpr
//!              | "result" "(" typeExpr "," typeExpr ")"
//!              | "map" "(" typeExpr "," typeExpr ")"
//!              | "(" typeExpr ("," typeExpr)* ")"
//!              | "[" typeExpr ("," Nat)? "]"
//!              | primitive | Ident ("<" typeExpr ("," typeExpr)* ">")?
//! svcItem     := "events" "{" variants "}" ";"
//!              | "query"? Ident ":" "(" params ")" ("->" typeExpr)?
//!                ("throws" typeExpr)? ";"
//! ```
//!
//! `///` doc lines and `#[...]` annotations attach to the following
//! declaration. Anything unrecognized is a hard [`ParseError`] with the
//! offending position; nothing is skipped silently.

use tracing::debug;

use mast_types::InterfaceId;

use crate::document::{
    Annotation, CtorFunc, EnumVariant, FuncKind, FuncParam, IdlDocument, PrimitiveType,
    ProgramUnit, ServiceExpo, ServiceIdent, ServiceUnit, StructField, TypeDecl, TypeDef, TypeShape,
};
use crate::error::ParseError;
use crate::lexer::{tokenize, Spanned, Tok};

/// Parse IDL text into a Program Document.
///
/// Deterministic; declaration order is preserved everywhere.
pub fn parse(text: &str) -> Result<IdlDocument, ParseError> {
    let toks = tokenize(text)?;
    let mut parser = Parser { toks, pos: 0 };
    let doc = parser.document()?;
    debug!(
        program = %doc.program.name,
        types = doc.program.types.len(),
        services = doc.services.len(),
        "parsed idl document"
    );
    Ok(doc)
}

/// A type expression: a plain declaration, or a struct/enum literal
/// (only legal at type-declaration top level and as a variant payload).
enum TyExpr {
    Decl(TypeDecl),
    Struct(Vec<StructField>),
    Enum(Vec<EnumVariant>),
}

struct Parser {
    toks: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn document(&mut self) -> Result<IdlDocument, ParseError> {
        let mut program = ProgramUnit::default();
        let mut services = Vec::new();

        while self.pos < self.toks.len() {
            let docs = self.take_docs();
            let annotations = self.take_annotations()?;
            if self.pos >= self.toks.len() {
                if !docs.is_empty() || !annotations.is_empty() {
                    return Err(self.err_here("dangling docs or annotations at end of input"));
                }
                break;
            }

            match self.peek_ident() {
                Some("program") => {
                    self.bump();
                    program.name = self.expect_ident()?;
                    self.expect(Tok::Semi)?;
                    program.docs.extend(docs);
                }
                Some("type") => {
                    self.bump();
                    program.types.push(self.type_def(docs, annotations)?);
                }
                Some("constructor") => {
                    self.bump();
                    self.ctor_block(&mut program, docs)?;
                }
                Some("service") => {
                    self.bump();
                    let service = self.service(docs, annotations)?;
                    program.services.push(ServiceExpo {
                        name: service.name.clone(),
                        interface_id: service.interface_id,
                        route: service.name.clone(),
                        route_idx: route_idx_annotation(&service.annotations)
                            .map_err(|message| self.err_at_prev(message))?,
                    });
                    services.push(service);
                }
                _ => return Err(self.err_here("expected `program`, `type`, `constructor` or `service`")),
            }
        }

        Ok(IdlDocument { program, services })
    }

    fn type_def(
        &mut self,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<TypeDef, ParseError> {
        let name = self.expect_ident()?;
        let type_params = self.generic_params()?;
        self.expect(Tok::Eq)?;
        let shape = match self.type_expr()? {
            TyExpr::Struct(fields) => TypeShape::Struct { fields },
            TyExpr::Enum(variants) => TypeShape::Enum { variants },
            TyExpr::Decl(decl) => TypeShape::Alias(decl),
        };
        self.expect(Tok::Semi)?;
        Ok(TypeDef {
            name,
            type_params,
            shape,
            docs,
            annotations,
        })
    }

    fn generic_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        if self.eat(&Tok::Lt) {
            loop {
                params.push(self.expect_ident()?);
                if !self.eat(&Tok::Comma) {
                    break;
                }
            }
            self.expect(Tok::Gt)?;
        }
        Ok(params)
    }

    fn ctor_block(&mut self, program: &mut ProgramUnit, docs: Vec<String>) -> Result<(), ParseError> {
        // Docs on the block itself describe the program's construction.
        program.docs.extend(docs);
        self.expect(Tok::LBrace)?;
        while !self.check(&Tok::RBrace) {
            let docs = self.take_docs();
            let name = self.expect_ident()?;
            self.expect(Tok::Colon)?;
            self.expect(Tok::LParen)?;
            let params = self.params()?;
            self.expect(Tok::RParen)?;
            self.expect(Tok::Semi)?;
            program.ctors.push(CtorFunc { name, params, docs });
        }
        self.expect(Tok::RBrace)?;
        self.expect(Tok::Semi)?;
        Ok(())
    }

    fn service(
        &mut self,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<ServiceUnit, ParseError> {
        let name = match self.peek() {
            Some(Tok::Ident(_)) => self.expect_ident()?,
            _ => String::new(),
        };

        let mut extends = Vec::new();
        if self.eat(&Tok::Colon) {
            loop {
                extends.push(ServiceIdent {
                    name: self.expect_ident()?,
                    interface_id: None,
                });
                if !self.eat(&Tok::Comma) {
                    break;
                }
            }
        }

        self.expect(Tok::LBrace)?;
        let mut funcs = Vec::new();
        let mut events = Vec::new();
        let mut types = Vec::new();
        while !self.check(&Tok::RBrace) {
            let item_docs = self.take_docs();
            let item_annotations = self.take_annotations()?;
            match self.peek_ident() {
                Some("events") => {
                    self.bump();
                    if !events.is_empty() {
                        return Err(self.err_here("duplicate events block"));
                    }
                    self.expect(Tok::LBrace)?;
                    events = self.variants()?;
                    self.expect(Tok::RBrace)?;
                    self.expect(Tok::Semi)?;
                }
                Some("type") => {
                    self.bump();
                    types.push(self.type_def(item_docs, item_annotations)?);
                }
                Some(_) => {
                    funcs.push(self.service_func(item_docs, item_annotations)?);
                }
                None => return Err(self.err_here("expected a function, `events` or `type`")),
            }
        }
        self.expect(Tok::RBrace)?;
        self.expect(Tok::Semi)?;

        let interface_id = interface_id_annotation(&annotations)
            .map_err(|message| self.err_at_prev(message))?;

        Ok(ServiceUnit {
            name,
            interface_id,
            extends,
            funcs,
            events,
            types,
            docs,
            annotations,
        })
    }

    fn service_func(
        &mut self,
        docs: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<crate::document::ServiceFunc, ParseError> {
        let mut kind = FuncKind::Command;
        let mut name = self.expect_ident()?;
        if name == "query" && matches!(self.peek(), Some(Tok::Ident(_))) {
            kind = FuncKind::Query;
            name = self.expect_ident()?;
        }
        self.expect(Tok::Colon)?;
        self.expect(Tok::LParen)?;
        let params = self.params()?;
        self.expect(Tok::RParen)?;

        let output = if self.eat(&Tok::Arrow) {
            self.type_decl()?
        } else {
            TypeDecl::Primitive(PrimitiveType::Null)
        };

        let throws = if self.peek_ident() == Some("throws") {
            self.bump();
            Some(self.type_decl()?)
        } else {
            None
        };

        self.expect(Tok::Semi)?;
        Ok(crate::document::ServiceFunc {
            name,
            params,
            output,
            throws,
            kind,
            docs,
            annotations,
        })
    }

    fn params(&mut self) -> Result<Vec<FuncParam>, ParseError> {
        let mut params = Vec::new();
        if self.check(&Tok::RParen) {
            return Ok(params);
        }
        loop {
            let name = self.expect_ident()?;
            self.expect(Tok::Colon)?;
            let ty = self.type_decl()?;
            params.push(FuncParam { name, ty });
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// A type expression that must not be a struct/enum literal.
    fn type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        match self.type_expr()? {
            TyExpr::Decl(decl) => Ok(decl),
            TyExpr::Struct(_) | TyExpr::Enum(_) => {
                Err(self.err_at_prev("struct/enum literal not allowed here"))
            }
        }
    }

    fn type_expr(&mut self) -> Result<TyExpr, ParseError> {
        match self.peek() {
            Some(Tok::LParen) => {
                self.bump();
                let mut elems = Vec::new();
                if !self.check(&Tok::RParen) {
                    loop {
                        elems.push(self.type_decl()?);
                        if !self.eat(&Tok::Comma) {
                            break;
                        }
                        // allow trailing comma
                        if self.check(&Tok::RParen) {
                            break;
                        }
                    }
                }
                self.expect(Tok::RParen)?;
                Ok(TyExpr::Decl(TypeDecl::Tuple(elems)))
            }
            Some(Tok::LBracket) => {
                self.bump();
                let item = Box::new(self.type_decl()?);
                let decl = if self.eat(&Tok::Comma) {
                    let len = self.expect_nat()?;
                    let len = u32::try_from(len)
                        .map_err(|_| self.err_at_prev("array length out of range"))?;
                    TypeDecl::Array { item, len }
                } else {
                    TypeDecl::Slice(item)
                };
                self.expect(Tok::RBracket)?;
                Ok(TyExpr::Decl(decl))
            }
            Some(Tok::Ident(_)) => {
                let name = self.expect_ident()?;
                match name.as_str() {
                    "struct" => {
                        self.expect(Tok::LBrace)?;
                        let fields = self.fields()?;
                        self.expect(Tok::RBrace)?;
                        Ok(TyExpr::Struct(fields))
                    }
                    "enum" => {
                        self.expect(Tok::LBrace)?;
                        let variants = self.variants()?;
                        self.expect(Tok::RBrace)?;
                        Ok(TyExpr::Enum(variants))
                    }
                    "opt" => {
                        let inner = self.type_decl()?;
                        Ok(TyExpr::Decl(TypeDecl::Named {
                            name: "Option".to_string(),
                            args: vec![inner],
                        }))
                    }
                    "vec" => {
                        let inner = self.type_decl()?;
                        Ok(TyExpr::Decl(TypeDecl::Slice(Box::new(inner))))
                    }
                    "result" => {
                        let (ok, err) = self.paren_pair()?;
                        Ok(TyExpr::Decl(TypeDecl::Named {
                            name: "Result".to_string(),
                            args: vec![ok, err],
                        }))
                    }
                    "map" => {
                        let (key, value) = self.paren_pair()?;
                        Ok(TyExpr::Decl(TypeDecl::Named {
                            name: "Map".to_string(),
                            args: vec![key, value],
                        }))
                    }
                    _ => {
                        if let Some(prim) = PrimitiveType::from_idl_name(&name) {
                            return Ok(TyExpr::Decl(TypeDecl::Primitive(prim)));
                        }
                        let mut args = Vec::new();
                        if self.eat(&Tok::Lt) {
                            loop {
                                args.push(self.type_decl()?);
                                if !self.eat(&Tok::Comma) {
                                    break;
                                }
                            }
                            self.expect(Tok::Gt)?;
                        }
                        Ok(TyExpr::Decl(TypeDecl::Named { name, args }))
                    }
                }
            }
            _ => Err(self.err_here("expected a type expression")),
        }
    }

    fn paren_pair(&mut self) -> Result<(TypeDecl, TypeDecl), ParseError> {
        self.expect(Tok::LParen)?;
        let first = self.type_decl()?;
        self.expect(Tok::Comma)?;
        let second = self.type_decl()?;
        self.expect(Tok::RParen)?;
        Ok((first, second))
    }

    fn fields(&mut self) -> Result<Vec<StructField>, ParseError> {
        let mut fields = Vec::new();
        while !self.check(&Tok::RBrace) {
            let docs = self.take_docs();
            // `Ident ":"` introduces a named field; anything else is a
            // positional (tuple) field.
            let name = if let (Some(Tok::Ident(_)), Some(Tok::Colon)) =
                (self.peek(), self.peek_at(1))
            {
                let name = self.expect_ident()?;
                self.expect(Tok::Colon)?;
                Some(name)
            } else {
                None
            };
            let ty = self.type_decl()?;
            fields.push(StructField { name, ty, docs });
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        let named = fields.iter().filter(|f| f.name.is_some()).count();
        if named != 0 && named != fields.len() {
            return Err(self.err_at_prev("mix of named and unnamed fields"));
        }
        Ok(fields)
    }

    fn variants(&mut self) -> Result<Vec<EnumVariant>, ParseError> {
        let mut variants = Vec::new();
        while !self.check(&Tok::RBrace) {
            let docs = self.take_docs();
            let name = self.expect_ident()?;
            let fields = if self.eat(&Tok::Colon) {
                match self.type_expr()? {
                    // A struct-literal payload contributes its fields.
                    TyExpr::Struct(fields) => fields,
                    // Any other payload is a single unnamed field.
                    TyExpr::Decl(decl) => vec![StructField {
                        name: None,
                        ty: decl,
                        docs: Vec::new(),
                    }],
                    TyExpr::Enum(_) => {
                        return Err(self.err_at_prev("enum literal not allowed as variant payload"))
                    }
                }
            } else {
                Vec::new()
            };
            variants.push(EnumVariant { name, fields, docs });
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(variants)
    }

    // ---- token plumbing ----

    fn take_docs(&mut self) -> Vec<String> {
        let mut docs = Vec::new();
        while let Some(Tok::Doc(text)) = self.peek() {
            docs.push(text.clone());
            self.bump();
        }
        docs
    }

    fn take_annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut out = Vec::new();
        while self.check(&Tok::Hash) {
            self.bump();
            self.expect(Tok::LBracket)?;
            let name = self.expect_ident()?;
            let value = if self.eat(&Tok::Eq) {
                Some(match self.peek().cloned() {
                    Some(Tok::Str(s)) => {
                        self.bump();
                        s
                    }
                    Some(Tok::Ident(s)) => {
                        self.bump();
                        s
                    }
                    Some(Tok::Nat(n)) => {
                        self.bump();
                        n.to_string()
                    }
                    Some(Tok::Hex(digits)) => {
                        self.bump();
                        format!("0x{}", digits)
                    }
                    _ => return Err(self.err_here("expected an annotation value")),
                })
            } else {
                None
            };
            self.expect(Tok::RBracket)?;
            out.push(Annotation { name, value });
            // docs may interleave with annotations
            while let Some(Tok::Doc(_)) = self.peek() {
                self.bump();
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|s| &s.tok)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Tok> {
        self.toks.get(self.pos + ahead).map(|s| &s.tok)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Tok::Ident(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn check(&self, tok: &Tok) -> bool {
        self.peek() == Some(tok)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.check(tok) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), ParseError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.err_here(format!("expected {:?}", tok)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().cloned() {
            Some(Tok::Ident(name)) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.err_here("expected an identifier")),
        }
    }

    fn expect_nat(&mut self) -> Result<u64, ParseError> {
        match self.peek().cloned() {
            Some(Tok::Nat(value)) => {
                self.bump();
                Ok(value)
            }
            _ => Err(self.err_here("expected a number")),
        }
    }

    fn err_here(&self, message: impl Into<String>) -> ParseError {
        match self.toks.get(self.pos) {
            Some(spanned) => ParseError::syntax(spanned.line, spanned.col, message),
            None => {
                let (line, col) = self
                    .toks
                    .last()
                    .map(|s| (s.line, s.col))
                    .unwrap_or((1, 1));
                ParseError::syntax(line, col, format!("{} (at end of input)", message.into()))
            }
        }
    }

    fn err_at_prev(&self, message: impl Into<String>) -> ParseError {
        let idx = self.pos.saturating_sub(1);
        let (line, col) = self
            .toks
            .get(idx)
            .map(|s| (s.line, s.col))
            .unwrap_or((1, 1));
        ParseError::syntax(line, col, message)
    }
}

fn interface_id_annotation(annotations: &[Annotation]) -> Result<Option<InterfaceId>, String> {
    for annotation in annotations {
        if annotation.name == "interface_id" {
            let value = annotation
                .value
                .as_deref()
                .ok_or_else(|| "interface_id annotation needs a value".to_string())?;
            return InterfaceId::from_hex(value)
                .map(Some)
                .map_err(|e| format!("bad interface_id annotation: {}", e));
        }
    }
    Ok(None)
}

fn route_idx_annotation(annotations: &[Annotation]) -> Result<u8, String> {
    for annotation in annotations {
        if annotation.name == "route_idx" {
            let value = annotation.value.as_deref().unwrap_or("");
            return value
                .parse::<u8>()
                .map_err(|_| format!("bad route_idx annotation: {:?}", value));
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_declaration() {
        let doc = parse("type Alias = opt string;").unwrap();
        assert!(doc.services.is_empty());
        assert_eq!(doc.program.types.len(), 1);
        let def = &doc.program.types[0];
        assert_eq!(def.name, "Alias");
        assert_eq!(
            def.shape,
            TypeShape::Alias(TypeDecl::Named {
                name: "Option".into(),
                args: vec![TypeDecl::Primitive(PrimitiveType::Str)],
            })
        );
    }

    #[test]
    fn test_service_functions_and_query() {
        let doc = parse(
            r#"
            service Counter {
                Add : (value: u32) -> u32;
                query Value : () -> u32;
            };
            "#,
        )
        .unwrap();
        let service = doc.service("Counter").unwrap();
        assert_eq!(service.funcs.len(), 2);
        assert_eq!(service.funcs[0].name, "Add");
        assert_eq!(service.funcs[0].kind, FuncKind::Command);
        assert_eq!(service.funcs[1].name, "Value");
        assert_eq!(service.funcs[1].kind, FuncKind::Query);
        assert!(service.funcs[1].params.is_empty());

        // The program exposes the service under its own name, route 0.
        assert_eq!(doc.program.services.len(), 1);
        assert_eq!(doc.program.services[0].route, "Counter");
        assert_eq!(doc.program.services[0].route_idx, 0);
    }

    #[test]
    fn test_interface_id_and_route_annotations() {
        let doc = parse(
            r#"
            #[interface_id = 0x579d6daba41b7d82]
            #[route_idx = 1]
            service Counter {
                Add : (value: u32) -> u32;
            };
            "#,
        )
        .unwrap();
        let service = doc.service("Counter").unwrap();
        assert_eq!(
            service.interface_id,
            Some(InterfaceId::from_hex("0x579d6daba41b7d82").unwrap())
        );
        assert_eq!(doc.program.services[0].route_idx, 1);
    }

    #[test]
    fn test_bad_route_idx_reports_position() {
        let err = parse(
            r#"
            #[route_idx = 999]
            service Counter {
                Add : (value: u32) -> u32;
            };
            "#,
        )
        .unwrap_err();
        match err {
            ParseError::Syntax { line, col, message } => {
                assert!(line > 0 && col > 0, "fabricated position {}:{}", line, col);
                assert!(message.contains("route_idx"), "message: {}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_generic_enum_and_struct() {
        let doc = parse(
            r#"
            type Maybe<T> = enum { None, Some: T };
            type Pair<T, U> = struct { first: T, second: U };
            "#,
        )
        .unwrap();
        let maybe = &doc.program.types[0];
        assert_eq!(maybe.type_params, vec!["T"]);
        match &maybe.shape {
            TypeShape::Enum { variants } => {
                assert_eq!(variants[0].name, "None");
                assert!(variants[0].fields.is_empty());
                assert_eq!(variants[1].fields.len(), 1);
                assert_eq!(variants[1].fields[0].name, None);
            }
            other => panic!("expected enum, got {:?}", other),
        }
        assert_eq!(doc.program.types[1].type_params, vec!["T", "U"]);
    }

    #[test]
    fn test_constructor_block_and_program_name() {
        let doc = parse(
            r#"
            program Counter;
            constructor {
                New : (initial: u32);
                Default : ();
            };
            "#,
        )
        .unwrap();
        assert_eq!(doc.program.name, "Counter");
        assert_eq!(doc.program.ctors.len(), 2);
        assert_eq!(doc.program.ctors[0].name, "New");
        assert_eq!(doc.program.ctors[0].params[0].name, "initial");
    }

    #[test]
    fn test_constructor_block_docs_attach_to_program() {
        let doc = parse(
            r#"
            /// A counting program.
            program Counter;
            /// Ways to create a counter.
            constructor {
                New : (initial: u32);
            };
            "#,
        )
        .unwrap();
        assert_eq!(
            doc.program.docs,
            vec!["A counting program.", "Ways to create a counter."]
        );
    }

    #[test]
    fn test_events_block() {
        let doc = parse(
            r#"
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
        let service = doc.service("Counter").unwrap();
        assert_eq!(service.events.len(), 2);
        assert_eq!(service.events[0].name, "Added");
        assert_eq!(service.events[1].fields.len(), 0);
    }

    #[test]
    fn test_variant_struct_payload_contributes_fields() {
        let doc = parse("type E = enum { Four: struct { a: u32, b: opt u16 } };").unwrap();
        match &doc.program.types[0].shape {
            TypeShape::Enum { variants } => {
                assert_eq!(variants[0].fields.len(), 2);
                assert_eq!(variants[0].fields[0].name.as_deref(), Some("a"));
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_composites() {
        let doc = parse("type T = struct { a: [u8, 32], b: vec str, c: (u32, str), d: map (str, u32) };")
            .unwrap();
        match &doc.program.types[0].shape {
            TypeShape::Struct { fields } => {
                assert_eq!(
                    fields[0].ty,
                    TypeDecl::Array {
                        item: Box::new(TypeDecl::Primitive(PrimitiveType::U8)),
                        len: 32
                    }
                );
                assert!(matches!(fields[1].ty, TypeDecl::Slice(_)));
                assert!(matches!(&fields[2].ty, TypeDecl::Tuple(elems) if elems.len() == 2));
                assert!(
                    matches!(&fields[3].ty, TypeDecl::Named { name, args } if name == "Map" && args.len() == 2)
                );
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_docs_attach_to_declarations() {
        let doc = parse(
            r#"
            /// A counter value.
            type Count = u64;
            "#,
        )
        .unwrap();
        assert_eq!(doc.program.types[0].docs, vec!["A counter value."]);
    }

    #[test]
    fn test_extends_list() {
        let doc = parse("service Child : Base, Mixin { Go : (); };").unwrap();
        let service = doc.service("Child").unwrap();
        assert_eq!(service.extends.len(), 2);
        assert_eq!(service.extends[0].name, "Base");
    }

    #[test]
    fn test_unrecognized_construct_fails_loudly() {
        let err = parse("typo Alias = u8;").unwrap_err();
        match err {
            ParseError::Syntax { line, col, .. } => {
                assert_eq!((line, col), (1, 1));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_fields_rejected() {
        assert!(parse("type T = struct { a: u32, u8 };").is_err());
    }

    #[test]
    fn test_missing_semicolon_rejected() {
        assert!(parse("type T = u8").is_err());
    }
}
