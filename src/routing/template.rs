//! Path template module
//!
//! Parses route patterns with named variable segments, e.g.
//! `/profile/{user_id}` or `/files/{file_path:path}`, and matches them
//! against concrete request paths segment by segment.

/// One segment of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Binds exactly one path segment
    Var(String),
    /// Binds the remainder of the path, slashes included; final segment only
    Rest(String),
}

/// Parsed route pattern
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template string
    ///
    /// Variables are written `{name}`, a rest-of-path capture `{name:path}`.
    /// Variable names must be unique and a rest capture must be last.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let Some(stripped) = raw.strip_prefix('/') else {
            return Err(format!("template \"{raw}\" must start with '/'"));
        };

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        let parts: Vec<&str> = stripped.split('/').collect();
        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(inner) =
                part.strip_prefix('{').and_then(|p| p.strip_suffix('}'))
            {
                let (name, is_rest) = match inner.strip_suffix(":path") {
                    Some(name) => (name.trim(), true),
                    None => (inner.trim(), false),
                };
                if name.is_empty() {
                    return Err(format!("template \"{raw}\" has an unnamed variable"));
                }
                if names.contains(&name) {
                    return Err(format!(
                        "template \"{raw}\" binds \"{name}\" more than once"
                    ));
                }
                names.push(name);
                if is_rest {
                    if index + 1 != parts.len() {
                        return Err(format!(
                            "template \"{raw}\": rest capture \"{name}\" must be the final segment"
                        ));
                    }
                    Segment::Rest(name.to_string())
                } else {
                    Segment::Var(name.to_string())
                }
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Match decoded path segments, binding variables by name
    ///
    /// Returns `None` when the shape does not fit; coercion of the bound
    /// raw values happens later and is a validation concern, not a match
    /// concern.
    pub fn matches(&self, segments: &[String]) -> Option<Vec<(String, String)>> {
        let mut bindings = Vec::new();
        for (index, spec) in self.segments.iter().enumerate() {
            match spec {
                Segment::Literal(lit) => {
                    if segments.get(index).map(String::as_str) != Some(lit.as_str()) {
                        return None;
                    }
                }
                Segment::Var(name) => {
                    let value = segments.get(index)?;
                    bindings.push((name.clone(), value.clone()));
                }
                Segment::Rest(name) => {
                    if index >= segments.len() {
                        return None;
                    }
                    bindings.push((name.clone(), segments[index..].join("/")));
                    return Some(bindings);
                }
            }
        }
        if segments.len() == self.segments.len() {
            Some(bindings)
        } else {
            None
        }
    }

    /// Ranking when several templates match one path: more literal
    /// segments wins, a non-rest template beats a rest template.
    pub fn specificity(&self) -> (usize, usize) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        let no_rest = usize::from(!self.has_rest());
        (literals, no_rest)
    }

    /// Canonical shape with variable names erased, used to detect
    /// ambiguous registrations
    pub fn shape_key(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Var(_) => "{}",
                Segment::Rest(_) => "{*}",
            })
            .collect();
        parts.join("/")
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Var(name) | Segment::Rest(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_rest(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Rest(_)))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Split a request path into segments, leading slash stripped
pub fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &str) -> Vec<String> {
        split_path(path).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_literal_and_var() {
        let t = PathTemplate::parse("/profile/{user_id}").unwrap();
        assert_eq!(t.var_names(), vec!["user_id"]);
        assert!(!t.has_rest());
    }

    #[test]
    fn test_parse_rejects_duplicate_names() {
        assert!(PathTemplate::parse("/a/{x}/{x}").is_err());
        assert!(PathTemplate::parse("/a/{}").is_err());
        assert!(PathTemplate::parse("/a").is_ok());
    }

    #[test]
    fn test_rest_capture_must_be_final() {
        assert!(PathTemplate::parse("/files/{p:path}/tail").is_err());
        assert!(PathTemplate::parse("/files/{p:path}").is_ok());
    }

    #[test]
    fn test_match_binds_variables() {
        let t = PathTemplate::parse("/profile/{user_id}").unwrap();
        let bindings = t.matches(&segs("/profile/42")).unwrap();
        assert_eq!(bindings, vec![("user_id".to_string(), "42".to_string())]);
        assert!(t.matches(&segs("/profile")).is_none());
        assert!(t.matches(&segs("/profile/42/extra")).is_none());
    }

    #[test]
    fn test_match_root_and_trailing_slash() {
        let root = PathTemplate::parse("/").unwrap();
        assert!(root.matches(&segs("/")).is_some());
        assert!(root.matches(&segs("/x")).is_none());

        let trailing = PathTemplate::parse("/v2/items/").unwrap();
        assert!(trailing.matches(&segs("/v2/items/")).is_some());
        assert!(trailing.matches(&segs("/v2/items")).is_none());
    }

    #[test]
    fn test_rest_capture_joins_remaining_segments() {
        let t = PathTemplate::parse("/files/{file_path:path}").unwrap();
        let bindings = t.matches(&segs("/files/home/user/readme.txt")).unwrap();
        assert_eq!(
            bindings,
            vec![("file_path".to_string(), "home/user/readme.txt".to_string())]
        );
        assert!(t.matches(&segs("/files")).is_none());
    }

    #[test]
    fn test_specificity_prefers_literals() {
        let literal = PathTemplate::parse("/profile/me").unwrap();
        let var = PathTemplate::parse("/profile/{user_id}").unwrap();
        assert!(literal.specificity() > var.specificity());

        let var2 = PathTemplate::parse("/products/{product_id}").unwrap();
        let rest = PathTemplate::parse("/products/{rest:path}").unwrap();
        assert!(var2.specificity() > rest.specificity());
    }

    #[test]
    fn test_shape_key_erases_names() {
        let a = PathTemplate::parse("/plan/{plan_id}").unwrap();
        let b = PathTemplate::parse("/plan/{other}").unwrap();
        assert_eq!(a.shape_key(), b.shape_key());
        let c = PathTemplate::parse("/plan/free").unwrap();
        assert_ne!(a.shape_key(), c.shape_key());
    }
}
