//! HTML sanitization used to detect unsafe markup in rich-text fields.
//!
//! The sanitizer is only used for detection: a field is unsafe when sanitizing
//! it changes it. The cleaned output is never written anywhere.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Tags whose content is dropped together with the tag when not allow-listed
const DISCARDED_CONTENT_TAGS: &[&str] = &["script", "style", "textarea", "option"];

/// Allow-list of tags, per-tag attributes and URL schemes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HtmlPolicy {
    pub allowed_tags: Vec<String>,
    pub allowed_attributes: BTreeMap<String, Vec<String>>,
    pub allowed_schemes: Vec<String>,
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        let tags = ["b", "i", "em", "strong", "a", "p", "ul", "li", "br"];
        let mut allowed_attributes = BTreeMap::new();
        allowed_attributes.insert(
            "a".to_string(),
            vec!["href".to_string(), "title".to_string(), "target".to_string()],
        );

        Self {
            allowed_tags: tags.iter().map(|t| t.to_string()).collect(),
            allowed_attributes,
            allowed_schemes: ["http", "https", "mailto"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl HtmlPolicy {
    /// Policy that allows no markup at all
    pub fn strict() -> Self {
        Self {
            allowed_tags: Vec::new(),
            allowed_attributes: BTreeMap::new(),
            allowed_schemes: Vec::new(),
        }
    }

    /// Check the policy is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        for tag in &self.allowed_tags {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(format!("Invalid HTML tag name in policy: '{}'", tag));
            }
        }

        for (tag, attributes) in &self.allowed_attributes {
            if !self.allowed_tags.contains(tag) {
                return Err(format!(
                    "Attributes are allowed for '{}' but the tag itself is not allowed",
                    tag
                ));
            }
            if attributes.iter().any(|a| a.eq_ignore_ascii_case("rel")) {
                return Err(format!("The 'rel' attribute cannot be allowed on '{}'", tag));
            }
        }

        for scheme in &self.allowed_schemes {
            let valid = scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if scheme.is_empty() || !valid {
                return Err(format!("Invalid URL scheme in policy: '{}'", scheme));
            }
        }

        Ok(())
    }
}

/// Narrow seam over the HTML sanitizer implementation
#[cfg_attr(test, mockall::automock)]
pub trait HtmlSanitizer {
    /// Return `html` with everything outside the policy removed
    fn sanitize(&self, html: &str) -> String;
}

/// [`HtmlSanitizer`] backed by `ammonia`
#[derive(Debug, Clone)]
pub struct AmmoniaSanitizer {
    policy: HtmlPolicy,
}

impl AmmoniaSanitizer {
    pub fn new(policy: HtmlPolicy) -> Self {
        Self { policy }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new(HtmlPolicy::default())
    }
}

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let tags: HashSet<&str> = self.policy.allowed_tags.iter().map(String::as_str).collect();

        let tag_attributes: HashMap<&str, HashSet<&str>> = self
            .policy
            .allowed_attributes
            .iter()
            .map(|(tag, attributes)| {
                (
                    tag.as_str(),
                    attributes.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        let schemes: HashSet<&str> = self
            .policy
            .allowed_schemes
            .iter()
            .map(String::as_str)
            .collect();

        // ammonia rejects a tag that is both allowed and content-discarded
        let discarded: HashSet<&str> = DISCARDED_CONTENT_TAGS
            .iter()
            .copied()
            .filter(|tag| !tags.contains(tag))
            .collect();

        ammonia::Builder::empty()
            .tags(tags)
            .tag_attributes(tag_attributes)
            .url_schemes(schemes)
            .clean_content_tags(discarded)
            .link_rel(None)
            .clean(html)
            .to_string()
    }
}
