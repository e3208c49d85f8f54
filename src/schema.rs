use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::models::{Components, RequestBody, Schema, SchemaKind};

static COMPONENT_REF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#/components/([^/]+)/([^/]+)$").unwrap());

/// Target of a `#/components/<category>/<name>` pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRef {
    Schema(String),
    RequestBody(String),
}

/// Split a local component pointer into its category and name.
pub fn parse_reference(pointer: &str) -> Result<ComponentRef, ConvertError> {
    let captures = COMPONENT_REF_REGEX
        .captures(pointer)
        .ok_or_else(|| ConvertError::UnsupportedReference(pointer.to_string()))?;
    let name = unescape_pointer(&captures[2]);

    match &captures[1] {
        "schemas" => Ok(ComponentRef::Schema(name)),
        "requestBodies" => Ok(ComponentRef::RequestBody(name)),
        _ => Err(ConvertError::UnsupportedReference(pointer.to_string())),
    }
}

// JSON pointer escapes: ~1 is '/', ~0 is '~'
fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

pub fn lookup_schema<'a>(components: &'a Components, pointer: &str) -> Result<&'a Schema, ConvertError> {
    match parse_reference(pointer)? {
        ComponentRef::Schema(name) => components
            .schemas
            .get(&name)
            .ok_or_else(|| ConvertError::UnresolvedReference(pointer.to_string())),
        _ => Err(ConvertError::UnsupportedReference(pointer.to_string())),
    }
}

pub fn lookup_request_body<'a>(
    components: &'a Components,
    pointer: &str,
) -> Result<&'a RequestBody, ConvertError> {
    match parse_reference(pointer)? {
        ComponentRef::RequestBody(name) => components
            .requestBodies
            .get(&name)
            .ok_or_else(|| ConvertError::UnresolvedReference(pointer.to_string())),
        _ => Err(ConvertError::UnsupportedReference(pointer.to_string())),
    }
}

/// Synthesizes a representative JSON value for a schema.
///
/// `$ref` pointers are followed into `components`. The pointers currently
/// being expanded are tracked so that a schema reaching itself again fails
/// with [`ConvertError::CyclicSchema`] instead of recursing forever.
pub struct ExampleResolver<'a> {
    components: &'a Components,
    chain: Vec<String>,
}

impl<'a> ExampleResolver<'a> {
    pub fn new(components: &'a Components) -> Self {
        Self {
            components,
            chain: Vec::new(),
        }
    }

    /// Resolve `schema` to an example. `Ok(None)` means the node has no
    /// content and nothing should be emitted for it.
    pub fn resolve(&mut self, schema: &Schema) -> Result<Option<Value>, ConvertError> {
        match schema.kind() {
            SchemaKind::Empty => Ok(None),
            SchemaKind::Reference(pointer) => {
                if self.chain.iter().any(|seen| seen == pointer) {
                    return Err(ConvertError::CyclicSchema(pointer.to_string()));
                }
                let target = lookup_schema(self.components, pointer)?;
                self.chain.push(pointer.to_string());
                let resolved = self.resolve(target);
                self.chain.pop();
                resolved
            }
            // First alternative wins; sibling properties are discarded
            SchemaKind::Composite(alternatives) => match alternatives.first() {
                Some(first) => self.resolve(first),
                None => Ok(None),
            },
            SchemaKind::Object(properties) => {
                let mut object = Map::new();
                for (name, property) in properties {
                    match self.resolve(property)? {
                        Some(value) => {
                            object.insert(name.clone(), value);
                        }
                        None => debug!("Property '{}' has no example, omitting it", name),
                    }
                }
                Ok(Some(Value::Object(object)))
            }
            SchemaKind::Array(items) => {
                let mut elements = Vec::new();
                if let Some(items) = items {
                    if let Some(element) = self.resolve(items)? {
                        elements.push(element);
                    }
                }
                Ok(Some(Value::Array(elements)))
            }
            SchemaKind::Scalar(scalar) => Ok(scalar_example(scalar)),
        }
    }
}

// Literal example, else the type name as a placeholder
fn scalar_example(schema: &Schema) -> Option<Value> {
    if let Some(example) = &schema.example {
        return Some(example.clone());
    }
    schema.type_name().map(|name| Value::String(name.to_string()))
}

/// Resolve a schema against `components` in one call.
pub fn resolve_example(schema: &Schema, components: &Components) -> Result<Option<Value>, ConvertError> {
    ExampleResolver::new(components).resolve(schema)
}
