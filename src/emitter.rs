use log::debug;

use crate::comment::format_comment;
use crate::generator::ImportOptions;
use crate::models::{Body, Request, Url, UrlParts, ValidItem};
use crate::naming::{placeholder_name, VariableRegistry};

/// Separator line closing every request block
pub const REQUEST_SEPARATOR: &str = "###";

/// URL of a request with its placeholders replaced by reference tokens,
/// plus the declarations those tokens need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedUrl {
    pub url: String,
    pub declarations: Vec<String>,
}

/// Render the URL of `request_id`, declaring every placeholder that has a
/// matching URL variable in `registry`.
///
/// Placeholders without a declared variable are copied verbatim. Two
/// placeholders of the same request with the same name share one
/// declaration.
pub fn resolve_url(request_id: &str, url: &Url, registry: &mut VariableRegistry) -> ResolvedUrl {
    let parts = match url {
        Url::Raw(raw) => {
            return ResolvedUrl {
                url: raw.clone(),
                declarations: Vec::new(),
            }
        }
        Url::Parts(parts) => parts,
    };

    let mut declarations = Vec::new();
    let mut path = String::new();
    for segment in parts.segments() {
        let rendered = match placeholder_name(request_id, segment) {
            Some(placeholder) => match parts.declared_variable(&placeholder.name) {
                Some(variable) => {
                    let value = variable.value_text();
                    if registry.declare(placeholder.key.as_str(), value.as_str()) {
                        declarations.push(format!("@{} = {}", placeholder.key, value));
                    } else {
                        debug!("Variable '{}' already declared, reusing it", placeholder.key);
                    }
                    placeholder.token
                }
                None => segment.to_string(),
            },
            None => segment.to_string(),
        };
        path.push_str(&rendered);
        path.push('/');
    }

    let mut url = String::new();
    if let Some(protocol) = parts.protocol.as_deref().filter(|p| !p.is_empty()) {
        url.push_str(protocol);
        url.push_str("://");
    }
    url.push_str(&parts.host_text());
    url.push('/');
    url.push_str(&path);
    url.push_str(&query_string(parts));

    ResolvedUrl { url, declarations }
}

fn query_string(parts: &UrlParts) -> String {
    let pairs: Vec<String> = parts
        .query
        .iter()
        .filter(|param| !param.disabled)
        .filter_map(|param| {
            let key = param.key.as_deref()?;
            Some(match param.value.as_deref() {
                Some(value) => format!("{}={}", key, value),
                None => key.to_string(),
            })
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

/// Payload text of a request body, if it has one
pub fn body_text(body: Option<&Body>) -> Option<String> {
    let body = body?;
    match body.mode.as_deref() {
        Some("raw") | None => body.raw.clone().filter(|raw| !raw.is_empty()),
        Some("urlencoded") => {
            let pairs: Vec<String> = body
                .urlencoded
                .iter()
                .filter(|param| !param.disabled)
                .map(|param| format!("{}={}", param.key, param.value))
                .collect();
            if pairs.is_empty() {
                None
            } else {
                Some(pairs.join("&"))
            }
        }
        Some(other) => {
            debug!("Body mode '{}' is not supported, emitting no body", other);
            None
        }
    }
}

fn method(request: &Request) -> String {
    request
        .method
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_uppercase()
}

/// Append the request block for one validated item to `out`.
pub fn emit_request(
    out: &mut String,
    item: ValidItem<'_>,
    registry: &mut VariableRegistry,
    options: &ImportOptions,
) {
    let prefix = options.comment_prefix.as_str();
    let request = item.request;

    out.push('\n');
    out.push_str(&format!("{}@name {}\n", prefix, item.id));
    out.push_str(&format_comment(Some(item.name), prefix));
    out.push('\n');

    let resolved = resolve_url(item.id, item.url, registry);
    for declaration in &resolved.declarations {
        out.push_str(declaration);
        out.push('\n');
    }

    out.push_str(&format!(
        "{} {} {}\n",
        method(request),
        resolved.url,
        options.http_version
    ));

    for header in request.header.iter().filter(|h| !h.disabled) {
        out.push_str(&format!("{}: {}\n", header.key, header.value));
    }

    if let Some(body) = body_text(request.body.as_ref()) {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(REQUEST_SEPARATOR);
    out.push('\n');
}
