//! Conversion between the adapter's external paths and repository paths.
//!
//! External paths are relative to the configured root prefix and never start
//! with `/`. Repository addressing uses slash-wrapped absolute paths
//! (`/a/b/`).

/// Applies and strips the configured root prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathCodec {
    prefix: String,
}

impl PathCodec {
    /// An empty (or `/`) prefix disables prefixing; any other prefix is
    /// stored as `/{prefix}/`, whatever slashes it was given with.
    pub fn new(root_prefix: &str) -> Self {
        let trimmed = root_prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}/", trimmed)
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Root the external `path` under the prefix.
    pub fn apply_prefix(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path.trim_start_matches('/'))
    }

    /// Strip the prefix from a repository path.
    ///
    /// The prefix folder itself maps to `""`. Input that does not start
    /// with the prefix is returned unchanged, so this is not a validity
    /// check.
    pub fn to_external(&self, internal: &str) -> String {
        if self.prefix.is_empty() {
            return internal.trim_start_matches('/').to_string();
        }
        if internal.trim_end_matches('/') == self.prefix.trim_end_matches('/') {
            return String::new();
        }
        match internal.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.trim_start_matches('/').to_string(),
            None => internal.to_string(),
        }
    }
}

/// Wrap a path in single leading and trailing slashes. The root is `/`.
pub fn to_internal(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Parent of `path`: `""` for a bare name, `/` for a top-level absolute path.
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "" }.to_string();
    }
    match trimmed.rfind('/') {
        None => String::new(),
        Some(i) => {
            let parent = trimmed[..i].trim_end_matches('/');
            if parent.is_empty() {
                "/".to_string()
            } else {
                parent.to_string()
            }
        }
    }
}

/// Last segment of `path`.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Non-empty segments of `path`, in order.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
