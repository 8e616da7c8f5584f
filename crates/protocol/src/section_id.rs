use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier of an anchorable page section (`"about"`, `"contact"`).
///
/// Wraps `Arc<str>` so the navigator can hand the active id to every
/// renderer on each frame without reallocating it.
#[derive(Debug, Clone, Eq)]
pub struct SectionId(Arc<str>);

impl SectionId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse an in-page anchor such as `"#about"`. A bare id is accepted too.
    pub fn from_anchor(anchor: &str) -> Option<Self> {
        let id = anchor.strip_prefix('#').unwrap_or(anchor).trim();
        if id.is_empty() {
            None
        } else {
            Some(Self::from(id))
        }
    }

    /// The in-page anchor for this section.
    pub fn anchor(&self) -> String {
        format!("#{}", self.0)
    }
}

impl PartialEq for SectionId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PartialEq<str> for SectionId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::hash::Hash for SectionId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl std::ops::Deref for SectionId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SectionId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    #[inline]
    fn from(s: &str) -> Self {
        SectionId(Arc::from(s))
    }
}

impl From<String> for SectionId {
    #[inline]
    fn from(s: String) -> Self {
        SectionId(Arc::from(s))
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Serialized as a plain string; avoids serde's `rc` feature.
impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SectionId::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_parsing() {
        assert_eq!(SectionId::from_anchor("#about"), Some(SectionId::from("about")));
        assert_eq!(SectionId::from_anchor("contact"), Some(SectionId::from("contact")));
        assert_eq!(SectionId::from_anchor("#"), None);
        assert_eq!(SectionId::from("skills").anchor(), "#skills");
    }

    #[test]
    fn set_lookup_by_str() {
        let mut set = std::collections::HashSet::new();
        set.insert(SectionId::from("home"));
        assert!(set.contains("home"));
        assert!(!set.contains("about"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&SectionId::from("experience")).unwrap_or_default();
        assert_eq!(json, "\"experience\"");
        let back: Option<SectionId> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(SectionId::from("experience")));
    }
}
