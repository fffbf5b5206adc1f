//! Typed argument values and binding of loosely-typed input against declared tags.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::address::{Address, decode_hex};
use crate::catalog::ActionDefinition;
use crate::error::{Result, StageError};
use crate::types::{Shape, TypeTag};

/// A concrete value supplied for one action parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Uint(u128),
    Bool(bool),
    Text(String),
    Address(Address),
    Bytes(Vec<u8>),
    List(Vec<ArgValue>),
    /// Explicit "none" for `option<T>` slots. On an optional parameter of any
    /// other type it omits the slot, as if the value were absent.
    Null,
}

/// Named argument values, keyed by parameter name.
pub type ValueMap = BTreeMap<String, ArgValue>;

impl ArgValue {
    /// Short description of the value's shape for mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Uint(_) => "integer",
            ArgValue::Bool(_) => "bool",
            ArgValue::Text(_) => "string",
            ArgValue::Address(_) => "address",
            ArgValue::Bytes(_) => "bytes",
            ArgValue::List(_) => "list",
            ArgValue::Null => "null",
        }
    }

    /// Bind a JSON value against the declared tag.
    pub fn from_json(value: &JsonValue, tag: TypeTag) -> Result<ArgValue> {
        let mismatch = || StageError::mismatch(tag, json_kind(value));
        match tag.shape() {
            Shape::Raw => match value {
                JsonValue::String(text) => decode_hex(text).map(ArgValue::Bytes).ok_or_else(mismatch),
                JsonValue::Array(_) => Ok(ArgValue::Bytes(json_bytes(value, tag)?)),
                _ => Err(mismatch()),
            },
            Shape::Option(inner) => match value {
                JsonValue::Null => Ok(ArgValue::Null),
                other => ArgValue::from_json(other, inner),
            },
            Shape::Vector(TypeTag::U8) => match value {
                JsonValue::String(text) => decode_hex(text).map(ArgValue::Bytes).ok_or_else(mismatch),
                JsonValue::Array(_) => Ok(ArgValue::Bytes(json_bytes(value, tag)?)),
                _ => Err(mismatch()),
            },
            Shape::Vector(element) => match value {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| ArgValue::from_json(item, element))
                    .collect::<Result<Vec<_>>>()
                    .map(ArgValue::List),
                _ => Err(mismatch()),
            },
            Shape::Scalar => scalar_from_json(value, tag),
        }
    }

    /// Bind a command-line token against the declared tag.
    ///
    /// Vectors are comma separated; `vector<u8>`, `raw` and `option<vector<u8>>`
    /// take hex. `null` or `~` selects none for option slots.
    ///
    /// The text form cannot express a `vector<string>` element containing a
    /// comma, nor the literal strings `null`/`~` as `option<string>` values;
    /// use a JSON values file for those.
    pub fn parse_text(token: &str, tag: TypeTag) -> Result<ArgValue> {
        let mismatch = || StageError::mismatch(tag, format!("`{token}`"));
        match tag.shape() {
            Shape::Raw => decode_hex(token).map(ArgValue::Bytes).ok_or_else(mismatch),
            Shape::Option(inner) => {
                if token == "~" || token.eq_ignore_ascii_case("null") {
                    Ok(ArgValue::Null)
                } else {
                    ArgValue::parse_text(token, inner)
                }
            }
            Shape::Vector(TypeTag::U8) => decode_hex(token).map(ArgValue::Bytes).ok_or_else(mismatch),
            Shape::Vector(element) => {
                if token.trim().is_empty() {
                    return Ok(ArgValue::List(Vec::new()));
                }
                token
                    .split(',')
                    .map(|part| ArgValue::parse_text(part.trim(), element))
                    .collect::<Result<Vec<_>>>()
                    .map(ArgValue::List)
            }
            Shape::Scalar => match tag {
                TypeTag::U8 | TypeTag::U64 | TypeTag::U128 => {
                    token.parse::<u128>().map(ArgValue::Uint).map_err(|_| mismatch())
                }
                TypeTag::Bool => token.parse::<bool>().map(ArgValue::Bool).map_err(|_| mismatch()),
                TypeTag::Address | TypeTag::Id => Address::parse(token)
                    .map(ArgValue::Address)
                    .map_err(|_| mismatch()),
                _ => Ok(ArgValue::Text(token.to_string())),
            },
        }
    }
}

/// Bind a JSON object of named values against an action's parameter schema.
///
/// Keys the action does not declare are dropped with a warning.
pub fn bind_json(
    action: &ActionDefinition,
    object: &serde_json::Map<String, JsonValue>,
) -> Result<ValueMap> {
    let mut values = ValueMap::new();
    for (name, raw) in object {
        let Some(param) = action.param(name) else {
            tracing::warn!(action = action.id, param = %name, "ignoring undeclared parameter");
            continue;
        };
        if raw.is_null() && param.optional && !matches!(param.ty.shape(), Shape::Option(_)) {
            continue;
        }
        let value = ArgValue::from_json(raw, param.ty).map_err(|err| err.for_param(name))?;
        values.insert(name.clone(), value);
    }
    Ok(values)
}

fn scalar_from_json(value: &JsonValue, tag: TypeTag) -> Result<ArgValue> {
    let mismatch = || StageError::mismatch(tag, json_kind(value));
    match (tag, value) {
        (TypeTag::U8 | TypeTag::U64 | TypeTag::U128, JsonValue::Number(number)) => number
            .as_u64()
            .map(|n| ArgValue::Uint(n as u128))
            .ok_or_else(|| StageError::mismatch(tag, format!("number {number}"))),
        // Decimal strings carry values beyond JSON's safe integer range.
        (TypeTag::U8 | TypeTag::U64 | TypeTag::U128, JsonValue::String(text)) => text
            .parse::<u128>()
            .map(ArgValue::Uint)
            .map_err(|_| StageError::mismatch(tag, format!("string `{text}`"))),
        (TypeTag::Bool, JsonValue::Bool(flag)) => Ok(ArgValue::Bool(*flag)),
        (TypeTag::String, JsonValue::String(text)) => Ok(ArgValue::Text(text.clone())),
        (TypeTag::Address | TypeTag::Id, JsonValue::String(text)) => Address::parse(text)
            .map(ArgValue::Address)
            .map_err(|_| StageError::mismatch(tag, format!("string `{text}`"))),
        _ => Err(mismatch()),
    }
}

fn json_bytes(value: &JsonValue, tag: TypeTag) -> Result<Vec<u8>> {
    let JsonValue::Array(items) = value else {
        return Err(StageError::mismatch(tag, json_kind(value)));
    };
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| StageError::mismatch(tag, format!("byte element {item}")))
        })
        .collect()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl From<u8> for ArgValue {
    fn from(value: u8) -> Self {
        ArgValue::Uint(value.into())
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::Uint(value.into())
    }
}

impl From<u128> for ArgValue {
    fn from(value: u128) -> Self {
        ArgValue::Uint(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<Address> for ArgValue {
    fn from(value: Address) -> Self {
        ArgValue::Address(value)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(value: Vec<u8>) -> Self {
        ArgValue::Bytes(value)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Null, Into::into)
    }
}
