use anyhow::{Context, Result};
use log::debug;
use std::{fs, path::Path};

use crate::error::ConvertError;
use crate::models::{
    Collection, CollectionNode, Group, Item, OpenApiDocument, Operation, RawCollection, RawNode,
};

/// Encoding of an input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension, defaulting to YAML
    /// (a YAML parser also accepts JSON).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown document format: {}", other)),
        }
    }
}

impl TryFrom<RawNode> for CollectionNode {
    type Error = ConvertError;

    fn try_from(node: RawNode) -> Result<Self, Self::Error> {
        let RawNode {
            id,
            name,
            description,
            item,
            request,
        } = node;

        match (item, request) {
            (Some(children), _) => Ok(CollectionNode::Group(Group {
                name: name.unwrap_or_default(),
                description: description.map(|d| d.text().to_string()),
                children: classify_nodes(children)?,
            })),
            (None, Some(request)) => Ok(CollectionNode::Item(Item {
                id,
                name,
                request: request.into(),
            })),
            (None, None) => Err(ConvertError::UnrecognizedNode {
                name: name.or(id).unwrap_or_else(|| "<unnamed>".to_string()),
            }),
        }
    }
}

fn classify_nodes(nodes: Vec<RawNode>) -> Result<Vec<CollectionNode>, ConvertError> {
    nodes.into_iter().map(CollectionNode::try_from).collect()
}

/// Parse a Postman collection (JSON) and classify its nodes.
pub fn parse_collection(input: &str) -> Result<Collection, ConvertError> {
    let raw: RawCollection = serde_json::from_str(input)?;
    debug!(
        "Parsed collection '{}' with {} top-level nodes",
        raw.info.name,
        raw.item.len()
    );

    Ok(Collection {
        name: raw.info.name,
        description: raw.info.description.map(|d| d.text().to_string()),
        variables: raw.variable,
        children: classify_nodes(raw.item)?,
    })
}

/// Parse an OpenAPI 3.x or Swagger 2.0 document.
pub fn parse_openapi(input: &str, format: DocumentFormat) -> Result<OpenApiDocument, ConvertError> {
    let document: OpenApiDocument = match format {
        DocumentFormat::Json => serde_json::from_str(input)?,
        DocumentFormat::Yaml => serde_yaml::from_str(input)?,
    };

    if document.openapi.is_none() && document.swagger.is_none() {
        return Err(ConvertError::MalformedInput(
            "document declares neither an 'openapi' nor a 'swagger' version".to_string(),
        ));
    }
    debug!(
        "Parsed API document '{}' with {} paths",
        document.info.title,
        document.paths.len()
    );

    Ok(document)
}

/// Decode the operation object found under `method` of `path`.
///
/// A method key whose value is not a valid operation aborts the conversion.
pub fn parse_operation(path: &str, method: &str, value: &serde_yaml::Value) -> Result<Operation, ConvertError> {
    serde_yaml::from_value(value.clone()).map_err(|err| {
        ConvertError::MalformedInput(format!("operation {} {}: {}", method.to_uppercase(), path, err))
    })
}

/// Read and parse a Postman collection file
pub fn load_collection(path: impl AsRef<Path>) -> Result<Collection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).context(format!("Failed to read collection: {:?}", path))?;
    parse_collection(&content).context(format!("Failed to parse collection: {:?}", path))
}

/// Read and parse an OpenAPI file. The format is inferred from the
/// extension unless given.
pub fn load_openapi(path: impl AsRef<Path>, format: Option<DocumentFormat>) -> Result<OpenApiDocument> {
    let path = path.as_ref();
    let format = format.unwrap_or_else(|| DocumentFormat::from_path(path));
    debug!("Reading {:?} as {:?}", path, format);

    let content = fs::read_to_string(path).context(format!("Failed to read API document: {:?}", path))?;
    parse_openapi(&content, format).context(format!("Failed to parse API document: {:?}", path))
}
