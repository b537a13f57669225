//! Conversion between URI text and schema-typed values.

use crate::data::{Decimal64, Value};
use crate::error::RestconfError;
use crate::schema::{QName, SchemaContext, TypeDefinition};

/// Turns a URL-decoded key or leaf string into a typed [`Value`].
pub trait IdentifierCodec: Send + Sync {
    /// `None` when `input` is not a valid lexical form of `type_def`.
    fn decode(&self, type_def: &TypeDefinition, input: &str, schema: &SchemaContext)
        -> Option<Value>;

    /// Lexical form used in URIs, before escaping.
    fn encode(&self, value: &Value, schema: &SchemaContext) -> String {
        match value {
            Value::Identity(qname) => identity_to_string(qname, schema),
            other => other.to_string(),
        }
    }
}

fn identity_to_string(qname: &QName, schema: &SchemaContext) -> String {
    match schema
        .module_of(qname)
        .and_then(|module| module.module_name().map(str::to_string))
    {
        Some(module) => format!("{module}:{}", qname.local_name),
        None => qname.local_name.clone(),
    }
}

/// Codec for the built-in type system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl IdentifierCodec for DefaultCodec {
    fn decode(
        &self,
        type_def: &TypeDefinition,
        input: &str,
        schema: &SchemaContext,
    ) -> Option<Value> {
        match type_def {
            TypeDefinition::String => Some(Value::string(input)),
            TypeDefinition::Boolean => match input {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            TypeDefinition::Empty => input.is_empty().then_some(Value::Empty),
            TypeDefinition::Decimal64 { fraction_digits } => {
                Decimal64::parse(input, *fraction_digits).map(Value::Decimal)
            }
            TypeDefinition::Enumeration { names } => names
                .iter()
                .any(|name| name == input)
                .then(|| Value::Enum(input.to_string())),
            TypeDefinition::IdentityRef { .. } => decode_identity(input, schema),
            TypeDefinition::Union { members } => members
                .iter()
                .find_map(|member| self.decode(member, input, schema)),
            TypeDefinition::Leafref { .. } | TypeDefinition::Derived { .. } => {
                let resolved = schema.resolve_leaf_type(type_def)?;
                self.decode(&resolved, input, schema)
            }
            integral => decode_integer(integral, input),
        }
    }
}

fn decode_integer(type_def: &TypeDefinition, input: &str) -> Option<Value> {
    let (min, max) = type_def.integer_range()?;
    let parsed: i128 = input.parse().ok()?;
    if parsed < min || parsed > max {
        return None;
    }
    if type_def.is_signed() {
        i64::try_from(parsed).ok().map(Value::Int)
    } else {
        u64::try_from(parsed).ok().map(Value::Uint)
    }
}

/// Identities are written `module:identity` and must be declared by that module.
fn decode_identity(input: &str, schema: &SchemaContext) -> Option<Value> {
    let (module_name, identity) = input.split_once(':')?;
    let module = schema.find_module(module_name, None)?;
    module
        .identities()
        .iter()
        .find(|declared| declared.local_name == identity)
        .cloned()
        .map(Value::Identity)
}

pub fn url_decode(input: &str) -> Result<String, RestconfError> {
    urlencoding::decode(input)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| {
            RestconfError::invalid_uri(format!("\"{input}\" is not a valid UTF-8 percent-encoding"))
        })
}

pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}
