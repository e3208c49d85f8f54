#![allow(non_snake_case)]

use indexmap::IndexMap;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Postman collection (v2.x) wire format
// ---------------------------------------------------------------------------

/// Root of a Postman collection export, as found on disk
#[derive(Debug, Deserialize, Clone)]
pub struct RawCollection {
    pub info: CollectionInfo,
    pub item: Vec<RawNode>,
    #[serde(default)]
    pub variable: Vec<Variable>,
}

/// Collection metadata block
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: String,
    pub description: Option<Description>,
}

/// Postman accepts a bare string or a `{content, type}` object for descriptions
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Rich {
        content: Option<String>,
        #[serde(rename = "type")]
        content_type: Option<String>,
    },
}

impl Description {
    pub fn text(&self) -> &str {
        match self {
            Description::Text(text) => text,
            Description::Rich { content, .. } => content.as_deref().unwrap_or(""),
        }
    }
}

/// A `{key, value}` variable, declared on the collection or on a URL
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Variable {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    pub description: Option<Description>,
    #[serde(default)]
    pub disabled: bool,
}

impl Variable {
    /// Value as it should appear on the right-hand side of `@name = value`
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_ref()
            .map(Description::text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Any entry of an `item` array. Folders carry `item`, requests carry `request`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawNode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<Description>,
    pub item: Option<Vec<RawNode>>,
    pub request: Option<RawRequest>,
}

/// Postman allows `request` to be a bare URL string
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawRequest {
    Url(String),
    Full(Request),
}

impl From<RawRequest> for Request {
    fn from(raw: RawRequest) -> Self {
        match raw {
            RawRequest::Url(url) => Request {
                url: Some(Url::Raw(url)),
                ..Default::default()
            },
            RawRequest::Full(request) => request,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Request {
    pub method: Option<String>,
    pub url: Option<Url>,
    #[serde(default)]
    pub header: Vec<Header>,
    pub body: Option<Body>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Url {
    Raw(String),
    Parts(UrlParts),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UrlParts {
    pub raw: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<Host>,
    pub path: Option<UrlPath>,
    #[serde(default)]
    pub query: Vec<QueryParam>,
    #[serde(default)]
    pub variable: Vec<Variable>,
}

impl UrlParts {
    pub fn host_text(&self) -> String {
        match &self.host {
            Some(Host::Labels(labels)) => labels.join("."),
            Some(Host::Joined(host)) => host.clone(),
            None => String::new(),
        }
    }

    pub fn segments(&self) -> Vec<&str> {
        match &self.path {
            Some(UrlPath::Segments(segments)) => segments.iter().map(String::as_str).collect(),
            Some(UrlPath::Joined(path)) => path.split('/').filter(|s| !s.is_empty()).collect(),
            None => Vec::new(),
        }
    }

    /// The declared URL variable with the given key, if any
    pub fn declared_variable(&self, key: &str) -> Option<&Variable> {
        self.variable.iter().find(|v| v.key == key)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum Host {
    Labels(Vec<String>),
    Joined(String),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum UrlPath {
    Segments(Vec<String>),
    Joined(String),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct QueryParam {
    pub key: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Header {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Body {
    pub mode: Option<String>,
    pub raw: Option<String>,
    #[serde(default)]
    pub urlencoded: Vec<FormParam>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormParam {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

// ---------------------------------------------------------------------------
// Classified collection tree
// ---------------------------------------------------------------------------

/// A collection whose nodes have been classified into folders and requests
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub name: String,
    pub description: Option<String>,
    pub variables: Vec<Variable>,
    pub children: Vec<CollectionNode>,
}

#[derive(Debug, Clone)]
pub enum CollectionNode {
    Group(Group),
    Item(Item),
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub name: String,
    pub description: Option<String>,
    pub children: Vec<CollectionNode>,
}

#[derive(Debug, Clone, Default)]
pub struct Item {
    pub id: Option<String>,
    pub name: Option<String>,
    pub request: Request,
}

/// An item that carries everything needed to emit a request block
#[derive(Debug, Clone, Copy)]
pub struct ValidItem<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub request: &'a Request,
    pub url: &'a Url,
}

impl Item {
    /// Returns `None` when the id, the name or a usable URL is missing.
    pub fn validate(&self) -> Option<ValidItem<'_>> {
        let id = self.id.as_deref()?;
        let name = self.name.as_deref()?;
        let url = self.request.url.as_ref()?;
        let resolvable = match url {
            Url::Raw(raw) => !raw.trim().is_empty(),
            Url::Parts(parts) => parts.raw.as_deref().map_or(false, |raw| !raw.trim().is_empty()),
        };
        if !resolvable {
            return None;
        }
        Some(ValidItem {
            id,
            name,
            request: &self.request,
            url,
        })
    }
}

// ---------------------------------------------------------------------------
// OpenAPI 3.x / Swagger 2.0 wire format (the subset the importer reads)
// ---------------------------------------------------------------------------

pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OpenApiDocument {
    // Unquoted YAML versions such as `openapi: 3.0` arrive as numbers
    pub openapi: Option<serde_json::Value>,
    pub swagger: Option<serde_json::Value>,
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    // Swagger 2.0 server description
    pub host: Option<String>,
    pub basePath: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerVariable {
    #[serde(default)]
    pub default: String,
}

/// Keys of a path item in document order, values left undecoded. Only the
/// HTTP-method keys are turned into [`Operation`]s, see
/// [`crate::parser::parse_operation`].
pub type PathItem = IndexMap<String, serde_yaml::Value>;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Operation {
    pub summary: Option<String>,
    pub requestBody: Option<RequestBodyOrRef>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_: String,
    },
    Body(RequestBody),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RequestBody {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// Reusable objects addressable as `#/components/<category>/<name>`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(default)]
    pub requestBodies: IndexMap<String, RequestBody>,
}

/// JSON-schema subset needed to synthesize example payloads
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Schema {
    #[serde(rename = "$ref")]
    pub ref_: Option<String>,
    // Either a single type name or, in OpenAPI 3.1, a list of them
    #[serde(rename = "type")]
    pub type_: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,
    pub items: Option<Box<Schema>>,
    #[serde(default)]
    pub anyOf: Vec<Schema>,
    #[serde(default)]
    pub oneOf: Vec<Schema>,
    pub example: Option<serde_json::Value>,
}

/// Shape of a schema node, as the example resolver dispatches on it
#[derive(Debug, Clone, Copy)]
pub enum SchemaKind<'a> {
    Empty,
    Reference(&'a str),
    Composite(&'a [Schema]),
    Object(&'a IndexMap<String, Schema>),
    Array(Option<&'a Schema>),
    Scalar(&'a Schema),
}

impl Schema {
    /// The declared type name. For a list of types the first non-null one wins.
    pub fn type_name(&self) -> Option<&str> {
        match self.type_.as_ref()? {
            serde_json::Value::String(name) => Some(name.as_str()),
            serde_json::Value::Array(names) => names
                .iter()
                .filter_map(serde_json::Value::as_str)
                .find(|name| *name != "null"),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ref_.is_none()
            && self.type_.is_none()
            && self.properties.is_empty()
            && self.items.is_none()
            && self.anyOf.is_empty()
            && self.oneOf.is_empty()
            && self.example.is_none()
    }

    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(reference) = &self.ref_ {
            return SchemaKind::Reference(reference);
        }
        if !self.anyOf.is_empty() {
            return SchemaKind::Composite(&self.anyOf);
        }
        if !self.oneOf.is_empty() {
            return SchemaKind::Composite(&self.oneOf);
        }
        match self.type_name() {
            Some("object") => SchemaKind::Object(&self.properties),
            Some("array") => SchemaKind::Array(self.items.as_deref()),
            None if !self.properties.is_empty() => SchemaKind::Object(&self.properties),
            _ if self.is_empty() => SchemaKind::Empty,
            _ => SchemaKind::Scalar(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_validation_requires_id_name_and_url() {
        let request: Request = serde_json::from_value(serde_json::json!({
            "method": "GET",
            "url": {"raw": "example.com/users", "host": ["example", "com"], "path": ["users"]}
        }))
        .unwrap();

        let item = Item {
            id: Some("r1".to_string()),
            name: Some("List".to_string()),
            request: request.clone(),
        };
        assert!(item.validate().is_some());

        let missing_id = Item {
            id: None,
            ..item.clone()
        };
        assert!(missing_id.validate().is_none());

        let missing_url = Item {
            request: Request::default(),
            ..item
        };
        assert!(missing_url.validate().is_none());
    }

    #[test]
    fn test_blank_raw_url_is_not_resolvable() {
        for url in [serde_json::json!({"raw": "", "host": "h"}), serde_json::json!("  ")] {
            let item = Item {
                id: Some("r1".to_string()),
                name: Some("Blank".to_string()),
                request: serde_json::from_value(serde_json::json!({"method": "GET", "url": url})).unwrap(),
            };
            assert!(item.validate().is_none());
        }
    }

    #[test]
    fn test_bare_string_request_becomes_raw_url() {
        let raw: RawRequest = serde_json::from_value(serde_json::json!("https://example.com/ping")).unwrap();
        let request = Request::from(raw);
        assert!(matches!(request.url, Some(Url::Raw(ref url)) if url == "https://example.com/ping"));
        assert!(request.method.is_none());
        assert!(request.header.is_empty());
    }

    #[test]
    fn test_schema_kind_dispatch() {
        let schema: Schema = serde_json::from_value(serde_json::json!({
            "type": "object",
            "properties": {"p": {"type": "string"}},
            "anyOf": [{"type": "integer"}]
        }))
        .unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Composite(alts) if alts.len() == 1));

        let nullable: Schema =
            serde_json::from_value(serde_json::json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(nullable.type_name(), Some("integer"));
        assert!(matches!(nullable.kind(), SchemaKind::Scalar(_)));

        assert!(matches!(Schema::default().kind(), SchemaKind::Empty));
    }

    #[test]
    fn test_host_and_path_forms() {
        let parts: UrlParts = serde_json::from_value(serde_json::json!({
            "raw": "{{base}}/a/b",
            "host": "{{base}}",
            "path": "a/b"
        }))
        .unwrap();
        assert_eq!(parts.host_text(), "{{base}}");
        assert_eq!(parts.segments(), vec!["a", "b"]);
    }
}
