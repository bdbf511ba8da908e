//! Type resolution: declarations + generic environment -> canonical
//! wire descriptors, with memoized generic instantiation.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use mast_idl::{PrimitiveType, StructField, TypeDecl, TypeDef, TypeShape};

use crate::wire::WireDef;

/// Eager, fatal resolution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A named reference matches no declaration, builtin, or enclosing
    /// generic parameter.
    UnknownType { name: String },
    /// Generic argument count differs from the declared parameter count.
    GenericArity {
        name: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "unknown type `{}`", name),
            Self::GenericArity {
                name,
                expected,
                got,
            } => write!(
                f,
                "`{}` takes {} generic argument(s), got {}",
                name, expected, got
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

#[derive(Debug, Default)]
struct Registry {
    defs: HashMap<String, WireDef>,
    /// Registration order, for deterministic dumps.
    order: Vec<String>,
    /// Instantiations currently being expanded; guards recursive
    /// generic types against re-entry.
    in_progress: HashSet<String>,
}

/// One resolution scope: the types visible to a program or a service.
///
/// Non-generic declarations are registered eagerly at construction;
/// generic instantiations register lazily, exactly once, at first use.
/// Shared references may resolve concurrently; the registry sits behind
/// a mutex taken only for short lookups and inserts, never across
/// recursion.
#[derive(Debug)]
pub struct TypeResolver {
    decls: HashMap<String, TypeDef>,
    registry: Mutex<Registry>,
}

impl TypeResolver {
    /// Build a scope over `types`, eagerly registering every
    /// non-generic declaration. A later declaration of the same name
    /// shadows an earlier one (service-local types shadow program
    /// types).
    pub fn new<'a>(types: impl IntoIterator<Item = &'a TypeDef>) -> Result<Self, ResolveError> {
        let mut decls: HashMap<String, TypeDef> = HashMap::new();
        let mut order = Vec::new();
        for def in types {
            if decls.insert(def.name.clone(), def.clone()).is_none() {
                order.push(def.name.clone());
            }
        }
        let resolver = Self {
            decls,
            registry: Mutex::new(Registry::default()),
        };
        let empty = HashMap::new();
        for name in &order {
            let def = resolver.decls[name].clone();
            if def.type_params.is_empty() {
                let wire = resolver.lower_def(&def, &empty)?;
                resolver.register(name.clone(), wire);
            }
        }
        Ok(resolver)
    }

    /// Resolve a declaration outside any generic scope.
    pub fn resolve(&self, decl: &TypeDecl) -> Result<String, ResolveError> {
        self.resolve_with_env(decl, &HashMap::new())
    }

    /// Resolve under a generic-parameter substitution environment.
    /// Environment entries shadow declared type names.
    pub fn resolve_with_env(
        &self,
        decl: &TypeDecl,
        env: &HashMap<String, String>,
    ) -> Result<String, ResolveError> {
        match decl {
            TypeDecl::Primitive(prim) => Ok(primitive_wire_name(*prim).to_string()),
            TypeDecl::Tuple(elems) => {
                if elems.is_empty() {
                    return Ok("Null".to_string());
                }
                let parts = elems
                    .iter()
                    .map(|e| self.resolve_with_env(e, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(", ")))
            }
            TypeDecl::Slice(item) => {
                Ok(format!("Vec<{}>", self.resolve_with_env(item, env)?))
            }
            TypeDecl::Array { item, len } => {
                Ok(format!("[{}; {}]", self.resolve_with_env(item, env)?, len))
            }
            TypeDecl::Named { name, args } => self.resolve_named(name, args, env),
        }
    }

    /// The resolved registry in registration order.
    pub fn registry(&self) -> Vec<(String, WireDef)> {
        let registry = self.registry.lock();
        registry
            .order
            .iter()
            .map(|name| (name.clone(), registry.defs[name].clone()))
            .collect()
    }

    pub fn lookup(&self, name: &str) -> Option<WireDef> {
        self.registry.lock().defs.get(name).cloned()
    }

    /// Apply the struct lowering rule to a free-standing field list
    /// (an event variant's payload), outside any generic scope.
    pub fn lower_fields(&self, fields: &[StructField]) -> Result<WireDef, ResolveError> {
        self.struct_rule(fields, &HashMap::new())
    }

    fn resolve_named(
        &self,
        name: &str,
        args: &[TypeDecl],
        env: &HashMap<String, String>,
    ) -> Result<String, ResolveError> {
        // Generic parameters of the enclosing declaration shadow
        // everything else.
        if let Some(subst) = env.get(name) {
            if !args.is_empty() {
                return Err(ResolveError::GenericArity {
                    name: name.to_string(),
                    expected: 0,
                    got: args.len(),
                });
            }
            return Ok(subst.clone());
        }

        // Builtins keep their names, arguments joined with ", ".
        if let Some(expected) = builtin_arity(name) {
            if args.len() != expected {
                return Err(ResolveError::GenericArity {
                    name: name.to_string(),
                    expected,
                    got: args.len(),
                });
            }
            let parts = args
                .iter()
                .map(|a| self.resolve_with_env(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(format!("{}<{}>", name, parts.join(", ")));
        }

        let def = self
            .decls
            .get(name)
            .ok_or_else(|| ResolveError::UnknownType {
                name: name.to_string(),
            })?
            .clone();

        if def.type_params.len() != args.len() {
            return Err(ResolveError::GenericArity {
                name: name.to_string(),
                expected: def.type_params.len(),
                got: args.len(),
            });
        }

        // Non-generic reference: resolves to its own registered name.
        if args.is_empty() {
            return Ok(name.to_string());
        }

        // Generic instantiation: canonical name embeds the resolved
        // arguments, joined with "," and no spaces.
        let resolved_args = args
            .iter()
            .map(|a| self.resolve_with_env(a, env))
            .collect::<Result<Vec<_>, _>>()?;
        let canonical = format!("{}<{}>", name, resolved_args.join(","));

        {
            let mut registry = self.registry.lock();
            if registry.defs.contains_key(&canonical)
                || registry.in_progress.contains(&canonical)
            {
                return Ok(canonical);
            }
            registry.in_progress.insert(canonical.clone());
        }
        trace!(instantiation = %canonical, "expanding generic type");

        let fresh_env: HashMap<String, String> = def
            .type_params
            .iter()
            .cloned()
            .zip(resolved_args)
            .collect();
        let lowered = self.lower_def(&def, &fresh_env);

        let mut registry = self.registry.lock();
        registry.in_progress.remove(&canonical);
        let wire = lowered?;
        if !registry.defs.contains_key(&canonical) {
            registry.defs.insert(canonical.clone(), wire);
            registry.order.push(canonical.clone());
        }
        Ok(canonical)
    }

    fn register(&self, name: String, wire: WireDef) {
        let mut registry = self.registry.lock();
        if !registry.defs.contains_key(&name) {
            registry.defs.insert(name.clone(), wire);
            registry.order.push(name);
        }
    }

    fn lower_def(
        &self,
        def: &TypeDef,
        env: &HashMap<String, String>,
    ) -> Result<WireDef, ResolveError> {
        match &def.shape {
            TypeShape::Struct { fields } => self.struct_rule(fields, env),
            TypeShape::Enum { variants } => {
                if variants.iter().all(|v| v.fields.is_empty()) {
                    return Ok(WireDef::UnitEnum(
                        variants.iter().map(|v| v.name.clone()).collect(),
                    ));
                }
                let lowered = variants
                    .iter()
                    .map(|v| Ok((v.name.clone(), self.struct_rule(&v.fields, env)?)))
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                Ok(WireDef::DataEnum(lowered))
            }
            TypeShape::Alias(decl) => Ok(WireDef::Name(self.resolve_with_env(decl, env)?)),
        }
    }

    /// Struct lowering: no fields -> null; one unnamed field -> that
    /// field's descriptor; several unnamed -> tuple; named fields ->
    /// ordered name map. Field order is declaration order, never
    /// re-sorted.
    fn struct_rule(
        &self,
        fields: &[StructField],
        env: &HashMap<String, String>,
    ) -> Result<WireDef, ResolveError> {
        if fields.is_empty() {
            return Ok(WireDef::Null);
        }
        if fields.iter().any(|f| f.name.is_some()) {
            let lowered = fields
                .iter()
                .enumerate()
                .map(|(idx, f)| {
                    let name = f.name.clone().unwrap_or_else(|| idx.to_string());
                    Ok((name, self.resolve_with_env(&f.ty, env)?))
                })
                .collect::<Result<Vec<_>, ResolveError>>()?;
            return Ok(WireDef::Struct(lowered));
        }
        if fields.len() == 1 {
            return Ok(WireDef::Name(self.resolve_with_env(&fields[0].ty, env)?));
        }
        let parts = fields
            .iter()
            .map(|f| self.resolve_with_env(&f.ty, env))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WireDef::Name(format!("({})", parts.join(", "))))
    }
}

fn builtin_arity(name: &str) -> Option<usize> {
    match name {
        "Option" => Some(1),
        "Result" | "Map" => Some(2),
        _ => None,
    }
}

/// Canonical wire name of a primitive. `NonZero*` erases to the
/// underlying unsigned integer; whether non-zero-ness is re-validated
/// on decode is a concern of layers above this one.
fn primitive_wire_name(prim: PrimitiveType) -> &'static str {
    match prim {
        PrimitiveType::Null => "Null",
        PrimitiveType::Bool => "bool",
        PrimitiveType::Char => "char",
        PrimitiveType::Str => "String",
        PrimitiveType::U8 | PrimitiveType::NonZeroU8 => "u8",
        PrimitiveType::U16 | PrimitiveType::NonZeroU16 => "u16",
        PrimitiveType::U32 | PrimitiveType::NonZeroU32 => "u32",
        PrimitiveType::U64 | PrimitiveType::NonZeroU64 => "u64",
        PrimitiveType::U128 | PrimitiveType::NonZeroU128 => "u128",
        PrimitiveType::U256 | PrimitiveType::NonZeroU256 => "U256",
        PrimitiveType::I8 => "i8",
        PrimitiveType::I16 => "i16",
        PrimitiveType::I32 => "i32",
        PrimitiveType::I64 => "i64",
        PrimitiveType::I128 => "i128",
        PrimitiveType::ActorId | PrimitiveType::CodeId | PrimitiveType::MessageId => "[u8;32]",
        PrimitiveType::H160 => "H160",
        PrimitiveType::H256 => "H256",
    }
}
