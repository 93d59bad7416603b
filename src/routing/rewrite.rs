//! Path rewriting by capture-group substitution.

use regex::Regex;
use std::collections::HashMap;

/// Rewrites a matched path before it is forwarded, e.g.
/// `/api/auth/(?<segment>.*)` → `/api/auth/${segment}`.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    regex: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(regex: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(regex)?,
            replacement: replacement.into(),
        })
    }

    /// Replace every match in `path`. A path the regex does not match is returned unchanged.
    pub fn apply(&self, path: &str) -> String {
        self.regex
            .replace_all(path, self.replacement.as_str())
            .into_owned()
    }

    /// Named captures of the first match, or `None` if the regex does not match.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                .collect(),
        )
    }

    pub fn regex(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}
