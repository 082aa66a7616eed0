//! `tessera key` command implementation.
//!
//! Computes identity keys by hand, for checking why two records that
//! should share a key don't.

use clap::Subcommand;
use colored::Colorize;
use tessera::IdentityKey;
use tessera::identity;

/// Entity kinds the key command can compute.
#[derive(Subcommand)]
pub enum KeyKind {
    /// Class, interface or enum
    Type {
        /// Qualified name (e.g. "java.util.List")
        qualified_name: String,
        /// Type parameter (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// Method, constructor or lambda
    Method {
        /// Qualified name of the enclosing type
        enclosing: String,
        /// Qualified return type ("void" for constructors)
        return_type: String,
        /// Method name
        name: String,
        /// Qualified parameter types in order
        params: Vec<String>,
        /// Type parameter of the enclosing type (repeatable)
        #[arg(short = 't', long = "type-param")]
        type_params: Vec<String>,
        /// Start offset of the declaring lambda
        #[arg(short, long)]
        lambda_offset: Option<usize>,
    },

    /// Field
    Field {
        /// Qualified name of the enclosing type
        enclosing: String,
        /// Qualified field type
        field_type: String,
        /// Field name
        name: String,
        /// Type parameter of the enclosing type (repeatable)
        #[arg(short = 't', long = "type-param")]
        type_params: Vec<String>,
    },

    /// Local variable or parameter
    Variable {
        /// Canonical identity string of the enclosing method
        method: String,
        /// Qualified variable type
        var_type: String,
        /// Variable name
        name: String,
    },

    /// Enum constant
    EnumConstant {
        /// Qualified name of the enum
        enum_name: String,
        /// Constant name
        name: String,
    },
}

/// Run the key command.
pub fn run(kind: &KeyKind) -> Result<(), tessera::Error> {
    let key = compute(kind)?;

    println!("{}", key.canonical());
    println!("{}: {}", "key".dimmed(), key.hash().as_i64().to_string().cyan());
    Ok(())
}

fn compute(kind: &KeyKind) -> Result<IdentityKey, identity::IdentityError> {
    match kind {
        KeyKind::Type {
            qualified_name,
            params,
        } => identity::type_key(qualified_name, params),
        KeyKind::Method {
            enclosing,
            return_type,
            name,
            params,
            type_params,
            lambda_offset,
        } => {
            let owner = identity::type_key(enclosing, type_params)?;
            identity::method_key(&owner, return_type, name, params, *lambda_offset)
        }
        KeyKind::Field {
            enclosing,
            field_type,
            name,
            type_params,
        } => {
            let owner = identity::type_key(enclosing, type_params)?;
            identity::field_key(&owner, field_type, name)
        }
        KeyKind::Variable {
            method,
            var_type,
            name,
        } => identity::variable_key(&IdentityKey::from_canonical(method.clone()), var_type, name),
        KeyKind::EnumConstant { enum_name, name } => identity::enum_constant_key(enum_name, name),
    }
}
