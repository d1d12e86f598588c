//! Path pattern helpers.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A single trailing slash is ignored, as most HTTP frameworks do
//! - Any prefix is accepted in front of the known endpoint names

/// Drop one trailing slash, except for the root path.
pub fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// `…/{segment}` as the final path segment.
pub fn ends_with_segment(path: &str, segment: &str) -> bool {
    path.rsplit_once('/')
        .map(|(_, last)| last == segment)
        .unwrap_or(false)
}

/// `…/{name}/{param}`: returns `param` when non-empty.
pub fn trailing_param<'a>(path: &'a str, name: &str) -> Option<&'a str> {
    let (head, param) = path.rsplit_once('/')?;
    if param.is_empty() || !ends_with_segment(head, name) {
        return None;
    }
    Some(param)
}

/// `{prefix}/…`: returns the remainder including its leading slash.
pub fn under_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
