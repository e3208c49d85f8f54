use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use crate::comment::{format_comment, DEFAULT_COMMENT_PREFIX};
use crate::emitter::{emit_request, REQUEST_SEPARATOR};
use crate::error::ConvertError;
use crate::models::{
    Collection, CollectionNode, Components, Group, MediaType, OpenApiDocument, Operation,
    RequestBody, RequestBodyOrRef, HTTP_METHODS,
};
use crate::naming::VariableRegistry;
use crate::parser::parse_operation;
use crate::schema::{lookup_request_body, ExampleResolver};

static SERVER_VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// Knobs shared by both import pipelines
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Prefix written in front of every comment line
    pub comment_prefix: String,
    /// Protocol tag closing each request line
    pub http_version: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            http_version: DEFAULT_HTTP_VERSION.to_string(),
        }
    }
}

/// Result of one conversion call
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub script: String,
    /// Every variable declared in `script`
    pub variables: VariableRegistry,
    /// Collection items dropped for missing an id, a name or a URL
    pub skipped_items: usize,
}

/// Generates `.http` scripts from collections and OpenAPI documents
pub struct Generator {
    options: ImportOptions,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new Generator instance
    pub fn new() -> Self {
        Self::with_options(ImportOptions::default())
    }

    pub fn with_options(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Convert a classified Postman collection.
    ///
    /// Nodes are visited depth-first in document order. Items that fail
    /// validation produce no output and are only counted.
    pub fn convert_collection(&self, collection: &Collection) -> Conversion {
        let mut walk = CollectionWalk {
            options: &self.options,
            out: String::new(),
            registry: VariableRegistry::new(),
            skipped: 0,
        };

        walk.document_header(collection);
        walk.walk(&collection.children);

        if walk.skipped > 0 {
            debug!("Skipped {} invalid collection items", walk.skipped);
        }

        Conversion {
            script: walk.out,
            variables: walk.registry,
            skipped_items: walk.skipped,
        }
    }

    /// Convert an OpenAPI (or Swagger 2.0) document.
    pub fn convert_openapi(&self, document: &OpenApiDocument) -> Result<Conversion, ConvertError> {
        let prefix = self.options.comment_prefix.as_str();
        let mut out = String::new();

        out.push_str(&format!("### {}\n", document.info.title));
        if let Some(description) = document.info.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format_comment(Some(description), prefix));
            out.push('\n');
        }

        let base_url = base_url(document);
        debug!("Using base URL '{}'", base_url);

        for (path, item) in &document.paths {
            for (key, entry) in item {
                let method = key.to_lowercase();
                if !HTTP_METHODS.contains(&method.as_str()) {
                    debug!("Ignoring '{}' under path '{}'", key, path);
                    continue;
                }
                let operation = parse_operation(path, &method, entry)?;
                let url = format!("{}{}", base_url, path);
                self.emit_operation(&mut out, &method, &url, &operation, &document.components)?;
            }
        }

        Ok(Conversion {
            script: out,
            ..Default::default()
        })
    }

    fn emit_operation(
        &self,
        out: &mut String,
        method: &str,
        url: &str,
        operation: &Operation,
        components: &Components,
    ) -> Result<(), ConvertError> {
        let method = method.to_uppercase();
        let request_line = format!("{} {} {}\n", method, url, self.options.http_version);

        out.push('\n');
        match operation.summary.as_deref().and_then(|s| s.lines().next()) {
            Some(summary) if !summary.is_empty() => out.push_str(&format!("#{} {}\n", method, summary)),
            _ => out.push_str(&format!("#{}\n", method)),
        }

        let body = match &operation.requestBody {
            Some(RequestBodyOrRef::Ref { ref_ }) => Some(lookup_request_body(components, ref_)?),
            Some(RequestBodyOrRef::Body(body)) => Some(body),
            None => None,
        };

        match body.filter(|b: &&RequestBody| !b.content.is_empty()) {
            Some(body) => {
                for (content_type, media) in &body.content {
                    out.push_str(&request_line);
                    out.push_str(&format!("Content-Type: {}\n", content_type));
                    out.push('\n');
                    if let Some(example) = media_example(media, components)? {
                        out.push_str(&serde_json::to_string_pretty(&example)?);
                        out.push_str("\n\n");
                    }
                }
            }
            None => {
                out.push_str(&request_line);
                out.push('\n');
            }
        }

        out.push_str(REQUEST_SEPARATOR);
        out.push('\n');
        Ok(())
    }

    /// Write a finished script to `output`, or to stdout when no path is given
    pub fn write(&self, conversion: &Conversion, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .context(format!("Failed to create output directory: {:?}", parent))?;
                }
                fs::write(path, &conversion.script)
                    .context(format!("Failed to write script: {:?}", path))?;
                info!("Generated file: {:?}", path);
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(conversion.script.as_bytes())
                    .context("Failed to write script to stdout")?;
            }
        }
        Ok(())
    }
}

/// Accumulator threaded through one collection walk
struct CollectionWalk<'o> {
    options: &'o ImportOptions,
    out: String,
    registry: VariableRegistry,
    skipped: usize,
}

impl CollectionWalk<'_> {
    fn prefix(&self) -> &str {
        &self.options.comment_prefix
    }

    fn titled_comment(&mut self, title: &str, description: Option<&str>) {
        let prefix = self.options.comment_prefix.as_str();
        self.out.push_str(&format!("{}{}\n", prefix, title));
        self.out.push_str(prefix.trim_end());
        self.out.push('\n');
        self.out.push_str(&format_comment(description, prefix));
        self.out.push('\n');
    }

    fn document_header(&mut self, collection: &Collection) {
        self.titled_comment(&collection.name, collection.description.as_deref());

        for variable in collection.variables.iter().filter(|v| !v.disabled) {
            if let Some(description) = variable.description_text() {
                let comment = format_comment(Some(description), self.prefix());
                self.out.push_str(&comment);
                self.out.push('\n');
            }
            let value = variable.value_text();
            self.out.push_str(&format!("@{} = {}\n", variable.key, value));
            if !self.registry.declare(variable.key.as_str(), value) {
                debug!("Collection variable '{}' declared twice", variable.key);
            }
        }
    }

    fn group_header(&mut self, group: &Group) {
        self.out.push('\n');
        self.titled_comment(&group.name, group.description.as_deref());
    }

    fn walk(&mut self, nodes: &[CollectionNode]) {
        for node in nodes {
            match node {
                CollectionNode::Group(group) => {
                    self.group_header(group);
                    self.walk(&group.children);
                }
                CollectionNode::Item(item) => match item.validate() {
                    Some(valid) => {
                        emit_request(&mut self.out, valid, &mut self.registry, self.options)
                    }
                    None => {
                        debug!(
                            "Skipping item {:?} ({:?}): missing id, name or URL",
                            item.name, item.id
                        );
                        self.skipped += 1;
                    }
                },
            }
        }
    }
}

/// Base URL requests are issued against: the first server with its template
/// variables filled in, or the Swagger 2.0 scheme/host/basePath triple.
pub fn base_url(document: &OpenApiDocument) -> String {
    if let Some(server) = document.servers.first() {
        return SERVER_VARIABLE_REGEX
            .replace_all(&server.url, |captures: &regex::Captures| {
                match server.variables.get(&captures[1]) {
                    Some(variable) => variable.default.clone(),
                    None => captures[0].to_string(),
                }
            })
            .into_owned();
    }

    match &document.host {
        Some(host) => format!(
            "{}://{}{}",
            document.schemes.first().map(String::as_str).unwrap_or("http"),
            host,
            document.basePath.as_deref().unwrap_or("")
        ),
        None => String::new(),
    }
}

/// Example payload for one media type, synthesized from its schema.
/// Literal `example`/`examples` on the media type are not consulted.
fn media_example(
    media: &MediaType,
    components: &Components,
) -> Result<Option<serde_json::Value>, ConvertError> {
    match &media.schema {
        Some(schema) => ExampleResolver::new(components).resolve(schema),
        None => Ok(None),
    }
}
