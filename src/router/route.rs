use crate::core::error::NavigationError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler invoked when its route matches
pub type RouteHandler = Arc<dyn Fn(&RouteContext) + Send + Sync>;

/// What a handler sees about the navigation that matched it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// The navigated path as given, query included
    pub path: String,
    /// Values bound by `:name` segments
    pub params: HashMap<String, String>,
}

impl RouteContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest,
}

/// Compiled path pattern
///
/// `/app/books/:id` binds `id`; a trailing `*` matches any remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, NavigationError> {
        let invalid = |reason: &str| NavigationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parts = split_segments(pattern);
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(invalid("'*' is only allowed as the last segment"));
                }
                Segment::Rest
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter segment needs a name"));
                }
                if segments.contains(&Segment::Param(name.to_string())) {
                    return Err(invalid("duplicate parameter name"));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a normalised path, returning bound params on success
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split_segments(path);
        let mut params = HashMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => return Some(params),
                Segment::Literal(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Strip query and fragment, and drop a trailing slash except on the root
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Whether two paths name the same location
///
/// A trailing slash and the fragment are ignored; the query is significant.
pub fn same_location(a: &str, b: &str) -> bool {
    location_key(a) == location_key(b)
}

fn location_key(path: &str) -> (&str, &str) {
    let without_fragment = path.split('#').next().unwrap_or(path);
    let query = without_fragment
        .find('?')
        .map_or("", |at| &without_fragment[at + 1..]);
    (normalize_path(without_fragment), query)
}

/// A registered (pattern, handler) pair
#[derive(Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub handler: RouteHandler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}
