//! Canonical identity strings and identity keys.
//!
//! Every entity kind has a canonical string built from its defining
//! characteristics, joined with a single space. The identity key is the
//! XXH3-64 hash (seed 0) of the string's UTF-8 bytes, reinterpreted as `i64`.
//!
//! | Kind | Canonical string |
//! |------|------------------|
//! | Type | `qualified.Name<P1,P2>` (no suffix without type parameters) |
//! | Method | `[lambdaOffset] enclosingType returnType name [p1, p2]` |
//! | Enum constant | `qualified.Enum NAME` |
//! | Field | `enclosingType fieldType name` |
//! | Variable | `enclosingMethod variableType name` |
//!
//! The lambda offset is only present when the method's declaring scope is a
//! lambda expression (see [`declaring_scope`]). It separates structurally
//! identical lambdas written at different places.
//!
//! Entities that differ only in generic bounds the binding resolver erases
//! produce identical strings and therefore identical keys. That precision is
//! bounded by the resolver, not recovered here.

use thiserror::Error;

use crate::types::EntityHash;
use crate::unit::{CompilationUnit, NodeId, ScopeKind};

/// Separator between canonical string components.
pub const SEPARATOR: &str = " ";

/// Malformed input to canonical string construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// A required component is empty
    #[error("empty {component}")]
    Empty {
        /// Which component
        component: &'static str,
    },

    /// A component contains characters that would make the string ambiguous
    #[error("malformed {component}: {value:?}")]
    Malformed {
        /// Which component
        component: &'static str,
        /// The offending value
        value: String,
    },
}

/// A canonical identity string together with its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    canonical: String,
    hash: EntityHash,
}

impl IdentityKey {
    /// Wrap an already-built canonical string.
    ///
    /// Used to chain identities whose canonical form is known but whose parts
    /// are not, such as an enclosing method taken from a stored record.
    #[must_use]
    pub fn from_canonical(canonical: String) -> Self {
        let hash = hash_canonical(&canonical);
        Self { canonical, hash }
    }

    /// The canonical identity string.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The identity key.
    #[must_use]
    pub fn hash(&self) -> EntityHash {
        self.hash
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.canonical, self.hash)
    }
}

/// Hash a canonical string to an identity key.
#[must_use]
pub fn hash_canonical(canonical: &str) -> EntityHash {
    let hash = xxhash_rust::xxh3::xxh3_64(canonical.as_bytes());
    EntityHash(i64::from_ne_bytes(hash.to_ne_bytes()))
}

/// Identity of a class, interface or enum.
///
/// # Errors
///
/// Returns `IdentityError` if the qualified name or a type parameter is
/// empty or malformed.
pub fn type_key<S: AsRef<str>>(
    qualified_name: &str,
    type_parameters: &[S],
) -> Result<IdentityKey, IdentityError> {
    validate_qualified("type qualified name", qualified_name)?;
    for parameter in type_parameters {
        validate_qualified("type parameter", parameter.as_ref())?;
    }
    Ok(IdentityKey::from_canonical(format!(
        "{qualified_name}{}",
        type_parameter_suffix(type_parameters)
    )))
}

/// Identity of a method, constructor or lambda body.
///
/// `lambda_offset` is the start offset of the declaring lambda, when the
/// declaring scope is one.
///
/// # Errors
///
/// Returns `IdentityError` if the return type, name or a parameter type is
/// empty or malformed.
pub fn method_key<S: AsRef<str>>(
    enclosing_type: &IdentityKey,
    return_type: &str,
    name: &str,
    parameter_types: &[S],
    lambda_offset: Option<usize>,
) -> Result<IdentityKey, IdentityError> {
    validate_qualified("return type", return_type)?;
    validate_simple("method name", name)?;
    for parameter in parameter_types {
        validate_qualified("parameter type", parameter.as_ref())?;
    }

    let parameters = parameter_list(parameter_types);
    let signature = [
        enclosing_type.canonical(),
        return_type,
        name,
        parameters.as_str(),
    ]
    .join(SEPARATOR);

    Ok(IdentityKey::from_canonical(match lambda_offset {
        Some(offset) => format!("{offset}{SEPARATOR}{signature}"),
        None => signature,
    }))
}

/// Identity of an enum constant.
///
/// # Errors
///
/// Returns `IdentityError` if either component is empty or malformed.
pub fn enum_constant_key(enum_name: &str, name: &str) -> Result<IdentityKey, IdentityError> {
    validate_qualified("enum qualified name", enum_name)?;
    validate_simple("enum constant name", name)?;
    Ok(IdentityKey::from_canonical(
        [enum_name, name].join(SEPARATOR),
    ))
}

/// Identity of a field.
///
/// # Errors
///
/// Returns `IdentityError` if the field type or name is empty or malformed.
pub fn field_key(
    enclosing_type: &IdentityKey,
    field_type: &str,
    name: &str,
) -> Result<IdentityKey, IdentityError> {
    validate_qualified("field type", field_type)?;
    validate_simple("field name", name)?;
    Ok(IdentityKey::from_canonical(
        [enclosing_type.canonical(), field_type, name].join(SEPARATOR),
    ))
}

/// Identity of a local variable or parameter.
///
/// # Errors
///
/// Returns `IdentityError` if the variable type or name is empty or malformed.
pub fn variable_key(
    enclosing_method: &IdentityKey,
    variable_type: &str,
    name: &str,
) -> Result<IdentityKey, IdentityError> {
    validate_qualified("variable type", variable_type)?;
    validate_simple("variable name", name)?;
    Ok(IdentityKey::from_canonical(
        [enclosing_method.canonical(), variable_type, name].join(SEPARATOR),
    ))
}

/// `"<A,B>"`, or empty without type parameters.
#[must_use]
pub fn type_parameter_suffix<S: AsRef<str>>(type_parameters: &[S]) -> String {
    if type_parameters.is_empty() {
        return String::new();
    }
    let joined: Vec<&str> = type_parameters.iter().map(AsRef::as_ref).collect();
    format!("<{}>", joined.join(","))
}

/// `"[a, b]"`, or `"[]"` without parameters.
#[must_use]
pub fn parameter_list<S: AsRef<str>>(parameter_types: &[S]) -> String {
    let joined: Vec<&str> = parameter_types.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(", "))
}

/// The scope a node is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaringScope {
    /// Scope node
    pub node: NodeId,
    /// Type, method or lambda
    pub kind: ScopeKind,
    /// Start offset of the scope node
    pub start: usize,
}

/// Find the scope a node is declared in.
///
/// A lambda is its own declaring scope. Any other node is declared in its
/// nearest type, method or lambda ancestor. Anonymous class bodies are not
/// scopes, so members of an anonymous class written inside a lambda resolve
/// to that lambda.
#[must_use]
pub fn declaring_scope(unit: &CompilationUnit, node: NodeId) -> Option<DeclaringScope> {
    let own = unit.node(node)?;
    if own.kind.scope_kind() == Some(ScopeKind::Lambda) {
        return Some(DeclaringScope {
            node,
            kind: ScopeKind::Lambda,
            start: own.start,
        });
    }

    unit.ancestors(node).find_map(|(id, ancestor)| {
        ancestor.kind.scope_kind().map(|kind| DeclaringScope {
            node: id,
            kind,
            start: ancestor.start,
        })
    })
}

/// Start offset of the declaring lambda, if the declaring scope is a lambda.
#[must_use]
pub fn lambda_offset(unit: &CompilationUnit, node: NodeId) -> Option<usize> {
    declaring_scope(unit, node)
        .filter(|scope| scope.kind == ScopeKind::Lambda)
        .map(|scope| scope.start)
}

fn validate_simple(component: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() {
        return Err(IdentityError::Empty { component });
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(IdentityError::Malformed {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

// Qualified names may contain inner spaces ("? extends java.lang.Number"),
// but never surrounding whitespace, control characters or empty segments.
fn validate_qualified(component: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.trim().is_empty() {
        return Err(IdentityError::Empty { component });
    }
    let malformed = value.trim() != value
        || value.chars().any(char::is_control)
        || value.starts_with('.')
        || value.ends_with('.')
        || value.contains("..");
    if malformed {
        return Err(IdentityError::Malformed {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}
