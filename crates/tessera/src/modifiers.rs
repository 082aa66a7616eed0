//! Modifier bit-set classification.
//!
//! Bits follow the JVM access-flag layout the front-end reports. Visibility
//! is decided by an ordered precedence table rather than by the order of
//! conditionals, so a malformed set with several access bits still yields a
//! single, documented answer.

use serde::{Deserialize, Serialize};

use crate::types::Visibility;

/// `public`
pub const PUBLIC: u32 = 0x0001;
/// `private`
pub const PRIVATE: u32 = 0x0002;
/// `protected`
pub const PROTECTED: u32 = 0x0004;
/// `static`
pub const STATIC: u32 = 0x0008;
/// `final`
pub const FINAL: u32 = 0x0010;
/// `abstract`
pub const ABSTRACT: u32 = 0x0400;

/// Access bits in precedence order. The first bit present wins.
pub const ACCESS_PRECEDENCE: [(u32, Visibility); 3] = [
    (PUBLIC, Visibility::Public),
    (PROTECTED, Visibility::Protected),
    (PRIVATE, Visibility::Private),
];

/// Raw modifier bit-set of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(pub u32);

impl Modifiers {
    /// Modifiers implied for enum constants.
    pub const ENUM_CONSTANT: Self = Self(PUBLIC | STATIC | FINAL);

    /// Whether every bit of `flag` is set.
    #[must_use]
    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// Visibility by access-bit precedence; no access bit means package-private.
    #[must_use]
    pub fn visibility(self) -> Visibility {
        ACCESS_PRECEDENCE
            .iter()
            .find(|(bit, _)| self.contains(*bit))
            .map_or(Visibility::PackagePrivate, |(_, visibility)| *visibility)
    }

    /// `final` bit set.
    #[must_use]
    pub fn is_final(self) -> bool {
        self.contains(FINAL)
    }

    /// `static` bit set.
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(STATIC)
    }

    /// `abstract` bit set.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(ABSTRACT)
    }
}

impl From<u32> for Modifiers {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}
