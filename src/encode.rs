//! Parameter encoder: one exhaustive dispatch from `TypeTag` to canonical bytes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::{Address, decode_hex, encode_hex};
use crate::bcs::{
    push_address, push_bool, push_bytes, push_len, push_none, push_some_tag, push_str, push_u8,
    push_u64, push_u128,
};
use crate::error::{Result, StageError};
use crate::types::TypeTag;
use crate::value::ArgValue;

/// Canonically encoded argument bytes, ready to be passed as a pure input.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedValue(Vec<u8>);

impl EncodedValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for EncodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedValue(0x{})", encode_hex(&self.0))
    }
}

// Hex in JSON output, raw bytes in CBOR.
impl Serialize for EncodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(&format_args!("0x{}", encode_hex(&self.0)))
        } else {
            serde_bytes::serialize(&self.0, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for EncodedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            decode_hex(&text)
                .map(EncodedValue)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex bytes `{text}`")))
        } else {
            let bytes: serde_bytes::ByteBuf = Deserialize::deserialize(deserializer)?;
            Ok(EncodedValue(bytes.into_vec()))
        }
    }
}

/// Encode `value` according to the declared `tag`.
pub fn encode(value: &ArgValue, tag: TypeTag) -> Result<EncodedValue> {
    let mut buf = Vec::new();
    encode_into(&mut buf, value, tag)?;
    Ok(EncodedValue(buf))
}

fn encode_into(buf: &mut Vec<u8>, value: &ArgValue, tag: TypeTag) -> Result<()> {
    match tag {
        TypeTag::U8 => push_u8(buf, uint_within(value, tag)? as u8),
        TypeTag::U64 => push_u64(buf, uint_within(value, tag)? as u64),
        TypeTag::U128 => push_u128(buf, uint_within(value, tag)?),
        TypeTag::Bool => match value {
            ArgValue::Bool(flag) => push_bool(buf, *flag),
            other => return Err(StageError::mismatch(tag, other.kind())),
        },
        TypeTag::String => match value {
            ArgValue::Text(text) => push_str(buf, text),
            other => return Err(StageError::mismatch(tag, other.kind())),
        },
        TypeTag::Address | TypeTag::Id => push_address(buf, address_of(value, tag)?.as_bytes()),
        TypeTag::VectorU8 => match value {
            ArgValue::Bytes(bytes) => push_bytes(buf, bytes),
            ArgValue::List(items) => encode_vector(buf, items, TypeTag::U8)?,
            other => return Err(StageError::mismatch(tag, other.kind())),
        },
        TypeTag::VectorString => encode_list(buf, value, tag, TypeTag::String)?,
        TypeTag::VectorAddress => encode_list(buf, value, tag, TypeTag::Address)?,
        TypeTag::OptionU64 => encode_option(buf, value, TypeTag::U64)?,
        TypeTag::OptionU128 => encode_option(buf, value, TypeTag::U128)?,
        TypeTag::OptionBool => encode_option(buf, value, TypeTag::Bool)?,
        TypeTag::OptionString => encode_option(buf, value, TypeTag::String)?,
        TypeTag::OptionVectorU8 => encode_option(buf, value, TypeTag::VectorU8)?,
        TypeTag::Raw => match value {
            ArgValue::Bytes(bytes) => buf.extend_from_slice(bytes),
            other => return Err(StageError::mismatch(tag, other.kind())),
        },
    }
    Ok(())
}

fn encode_list(buf: &mut Vec<u8>, value: &ArgValue, tag: TypeTag, element: TypeTag) -> Result<()> {
    match value {
        ArgValue::List(items) => encode_vector(buf, items, element),
        other => Err(StageError::mismatch(tag, other.kind())),
    }
}

fn encode_vector(buf: &mut Vec<u8>, items: &[ArgValue], element: TypeTag) -> Result<()> {
    push_len(buf, items.len());
    for item in items {
        encode_into(buf, item, element)?;
    }
    Ok(())
}

fn encode_option(buf: &mut Vec<u8>, value: &ArgValue, inner: TypeTag) -> Result<()> {
    match value {
        ArgValue::Null => push_none(buf),
        present => {
            push_some_tag(buf);
            encode_into(buf, present, inner)?;
        }
    }
    Ok(())
}

fn uint_within(value: &ArgValue, tag: TypeTag) -> Result<u128> {
    let ArgValue::Uint(n) = value else {
        return Err(StageError::mismatch(tag, value.kind()));
    };
    let max = tag.int_max().unwrap_or(u128::MAX);
    if *n > max {
        return Err(StageError::mismatch(tag, format!("{n} (exceeds {tag})")));
    }
    Ok(*n)
}

fn address_of(value: &ArgValue, tag: TypeTag) -> Result<Address> {
    match value {
        ArgValue::Address(address) => Ok(*address),
        ArgValue::Text(text) => {
            Address::parse(text).map_err(|_| StageError::mismatch(tag, format!("string `{text}`")))
        }
        other => Err(StageError::mismatch(tag, other.kind())),
    }
}
