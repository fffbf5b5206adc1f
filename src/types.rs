//! Closed enumeration of parameter type tags understood by the encoder.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StageError};

/// Declared type of an action parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    U8,
    U64,
    U128,
    Bool,
    String,
    Address,
    Id,
    VectorU8,
    VectorString,
    VectorAddress,
    OptionU64,
    OptionU128,
    OptionBool,
    OptionString,
    OptionVectorU8,
    /// Bytes the caller has already encoded; passed through untouched.
    Raw,
}

/// Structural view of a tag used when binding loosely-typed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector(TypeTag),
    Option(TypeTag),
    Raw,
}

impl TypeTag {
    pub const ALL: [TypeTag; 16] = [
        TypeTag::U8,
        TypeTag::U64,
        TypeTag::U128,
        TypeTag::Bool,
        TypeTag::String,
        TypeTag::Address,
        TypeTag::Id,
        TypeTag::VectorU8,
        TypeTag::VectorString,
        TypeTag::VectorAddress,
        TypeTag::OptionU64,
        TypeTag::OptionU128,
        TypeTag::OptionBool,
        TypeTag::OptionString,
        TypeTag::OptionVectorU8,
        TypeTag::Raw,
    ];

    /// Return the canonical string atom for this type.
    pub fn as_atom(self) -> &'static str {
        match self {
            TypeTag::U8 => "u8",
            TypeTag::U64 => "u64",
            TypeTag::U128 => "u128",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Address => "address",
            TypeTag::Id => "id",
            TypeTag::VectorU8 => "vector<u8>",
            TypeTag::VectorString => "vector<string>",
            TypeTag::VectorAddress => "vector<address>",
            TypeTag::OptionU64 => "option<u64>",
            TypeTag::OptionU128 => "option<u128>",
            TypeTag::OptionBool => "option<bool>",
            TypeTag::OptionString => "option<string>",
            TypeTag::OptionVectorU8 => "option<vector<u8>>",
            TypeTag::Raw => "raw",
        }
    }

    /// Parse a canonical atom into a `TypeTag`.
    pub fn from_atom(atom: &str) -> Result<TypeTag> {
        let normalized: String = atom.chars().filter(|c| !c.is_whitespace()).collect();
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_atom() == normalized)
            .ok_or_else(|| StageError::UnsupportedType(atom.to_string()))
    }

    pub fn shape(self) -> Shape {
        match self {
            TypeTag::U8
            | TypeTag::U64
            | TypeTag::U128
            | TypeTag::Bool
            | TypeTag::String
            | TypeTag::Address
            | TypeTag::Id => Shape::Scalar,
            TypeTag::VectorU8 => Shape::Vector(TypeTag::U8),
            TypeTag::VectorString => Shape::Vector(TypeTag::String),
            TypeTag::VectorAddress => Shape::Vector(TypeTag::Address),
            TypeTag::OptionU64 => Shape::Option(TypeTag::U64),
            TypeTag::OptionU128 => Shape::Option(TypeTag::U128),
            TypeTag::OptionBool => Shape::Option(TypeTag::Bool),
            TypeTag::OptionString => Shape::Option(TypeTag::String),
            TypeTag::OptionVectorU8 => Shape::Option(TypeTag::VectorU8),
            TypeTag::Raw => Shape::Raw,
        }
    }

    /// Largest value an unsigned integer tag can carry.
    pub fn int_max(self) -> Option<u128> {
        match self {
            TypeTag::U8 => Some(u8::MAX as u128),
            TypeTag::U64 => Some(u64::MAX as u128),
            TypeTag::U128 => Some(u128::MAX),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_atom())
    }
}

impl FromStr for TypeTag {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        TypeTag::from_atom(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_roundtrip() -> Result<()> {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_atom(tag.as_atom())?, tag);
        }
        assert_eq!(TypeTag::from_atom("option< vector<u8> >")?, TypeTag::OptionVectorU8);
        Ok(())
    }

    #[test]
    fn unknown_atom_is_unsupported() {
        let err = TypeTag::from_atom("vector<u64>").unwrap_err();
        assert!(matches!(err, StageError::UnsupportedType(ref atom) if atom == "vector<u64>"));
    }

    #[test]
    fn option_of_vector_nests() {
        assert_eq!(TypeTag::OptionVectorU8.shape(), Shape::Option(TypeTag::VectorU8));
        assert_eq!(TypeTag::VectorU8.shape(), Shape::Vector(TypeTag::U8));
    }
}
