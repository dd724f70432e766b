//! Declarative static route table.
//!
//! # Responsibilities
//! - Parse `[[route]]` entries from TOML
//! - Reject tables that would not mount cleanly (the router would panic)
//! - Mount compiled routes onto a router, grouping methods per path

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteTable {
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteSpec>,
}

/// One static route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSpec {
    pub path: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default)]
    pub body: String,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("failed to read routes file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse routes file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid routes: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<RouteError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route {index}: path '{path}' must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("route {index}: path '{path}' uses an unsupported segment (only static segments and {{name}} captures)")]
    UnsupportedSegment { index: usize, path: String },

    #[error("route {index}: path '{path}' is reserved for the dev server")]
    Reserved { index: usize, path: String },

    #[error("route {index}: unsupported method '{method}'")]
    Method { index: usize, method: String },

    #[error("route {index}: invalid status code {status}")]
    Status { index: usize, status: u16 },

    #[error("route {index}: invalid content type '{content_type}'")]
    ContentType { index: usize, content_type: String },

    #[error("route {index}: duplicate {method} {path}")]
    Duplicate {
        index: usize,
        method: String,
        path: String,
    },
}

/// Fixed response served by a compiled route.
#[derive(Debug, Clone)]
pub struct StaticReply {
    status: StatusCode,
    content_type: HeaderValue,
    body: String,
}

impl IntoResponse for StaticReply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// A validated route, ready to mount.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub path: String,
    pub filter: MethodFilter,
    pub reply: StaticReply,
}

impl RouteTable {
    /// Parse `content`; `path` only names the file in errors.
    pub fn parse(path: &Path, content: &str) -> Result<Self, RouteTableError> {
        toml::from_str(content).map_err(|source| RouteTableError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse the routes file at `path`.
    pub fn load(path: &Path) -> Result<Self, RouteTableError> {
        let content = fs::read_to_string(path).map_err(|source| RouteTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Validate every route, collecting all problems.
    ///
    /// Paths under `reserved_prefix` are rejected so the table can't shadow
    /// the server's own endpoints.
    pub fn compile(&self, reserved_prefix: &str) -> Result<Vec<CompiledRoute>, RouteTableError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(self.routes.len());

        for (index, spec) in self.routes.iter().enumerate() {
            match spec.compile(index, reserved_prefix) {
                Ok(route) => {
                    let method = spec.method.to_ascii_uppercase();
                    if seen.insert((method.clone(), spec.path.clone())) {
                        compiled.push(route);
                    } else {
                        errors.push(RouteError::Duplicate {
                            index,
                            method,
                            path: spec.path.clone(),
                        });
                    }
                }
                Err(mut route_errors) => errors.append(&mut route_errors),
            }
        }

        if errors.is_empty() {
            Ok(compiled)
        } else {
            Err(RouteTableError::Invalid(errors))
        }
    }
}

impl RouteSpec {
    fn compile(&self, index: usize, reserved_prefix: &str) -> Result<CompiledRoute, Vec<RouteError>> {
        let mut errors = Vec::new();
        let path = self.path.clone();

        if !path.starts_with('/') {
            errors.push(RouteError::RelativePath { index, path: path.clone() });
        } else if !segments_supported(&path) {
            errors.push(RouteError::UnsupportedSegment { index, path: path.clone() });
        } else if is_reserved(&path, reserved_prefix) {
            errors.push(RouteError::Reserved { index, path: path.clone() });
        }

        let filter = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .ok()
            .and_then(|method| MethodFilter::try_from(method).ok());
        if filter.is_none() {
            errors.push(RouteError::Method {
                index,
                method: self.method.clone(),
            });
        }

        let status = StatusCode::from_u16(self.status).ok();
        if status.is_none() {
            errors.push(RouteError::Status {
                index,
                status: self.status,
            });
        }

        let content_type = HeaderValue::from_str(&self.content_type).ok();
        if content_type.is_none() {
            errors.push(RouteError::ContentType {
                index,
                content_type: self.content_type.clone(),
            });
        }

        match (filter, status, content_type) {
            (Some(filter), Some(status), Some(content_type)) if errors.is_empty() => Ok(CompiledRoute {
                path,
                filter,
                reply: StaticReply {
                    status,
                    content_type,
                    body: self.body.clone(),
                },
            }),
            _ => Err(errors),
        }
    }
}

fn segments_supported(path: &str) -> bool {
    path.split('/').skip(1).all(|segment| {
        if segment.starts_with('{') {
            segment.len() > 2 && segment.ends_with('}') && !segment[1..segment.len() - 1].contains(['{', '}', '*'])
        } else {
            !segment.starts_with(':') && !segment.starts_with('*') && !segment.contains(['{', '}'])
        }
    })
}

fn is_reserved(path: &str, reserved_prefix: &str) -> bool {
    path == reserved_prefix
        || path
            .strip_prefix(reserved_prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Add `routes` to `router`, one method router per path.
pub fn mount(routes: Vec<CompiledRoute>, router: Router) -> Router {
    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();

    for route in routes {
        let reply = route.reply;
        let handler = move || {
            let reply = reply.clone();
            async move { reply }
        };
        let method_router = by_path
            .remove(&route.path)
            .unwrap_or_default()
            .on(route.filter, handler);
        by_path.insert(route.path, method_router);
    }

    by_path
        .into_iter()
        .fold(router, |router, (path, method_router)| router.route(&path, method_router))
}
