//! Static guidance for each waste category.
//!
//! The catalog is a JSON document compiled into the binary. It is parsed and
//! validated once; afterwards every [`Label`] is guaranteed to have an entry.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::classifier::Label;

const BUILTIN_CATALOG: &str = include_str!("../../data/categories.json");

lazy_static! {
    static ref BUILTIN: KnowledgeBase =
        KnowledgeBase::from_json(BUILTIN_CATALOG).expect("built-in category catalog must cover every label");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Video,
    Article,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferenceLink {
    pub kind: LinkKind,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInfo {
    pub description: String,
    pub example_items: Vec<String>,
    pub disposal_tips: Vec<String>,
    pub reference_links: Vec<ReferenceLink>,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Invalid category catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Category {0} is defined more than once")]
    Duplicate(Label),
    #[error("No category information for {0}")]
    Missing(Label),
    #[error("Category {label} has no {field}")]
    Incomplete { label: Label, field: &'static str },
    #[error("Category {label} has an invalid or repeated link: {url}")]
    InvalidLink { label: Label, url: String },
    #[error("Unknown waste category: {0}")]
    UnknownLabel(String),
}

#[derive(Deserialize)]
struct CatalogEntry {
    label: Label,
    #[serde(flatten)]
    info: CategoryInfo,
}

#[derive(Deserialize)]
struct Catalog {
    categories: Vec<CatalogEntry>,
}

/// Read-only mapping from every [`Label`] to its [`CategoryInfo`].
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    // Indexed by Label::index()
    entries: Vec<CategoryInfo>,
}

impl KnowledgeBase {
    /// The catalog shipped with the crate.
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Parses and validates a catalog. Every label must appear exactly once with
    /// a description, at least one example item, disposal tip and link.
    pub fn from_json(json: &str) -> Result<Self, KnowledgeError> {
        let catalog: Catalog = serde_json::from_str(json)?;

        let mut by_label = HashMap::new();
        for entry in catalog.categories {
            Self::validate_entry(entry.label, &entry.info)?;
            if by_label.insert(entry.label, entry.info).is_some() {
                return Err(KnowledgeError::Duplicate(entry.label));
            }
        }

        let entries = Label::ALL
            .iter()
            .map(|label| by_label.remove(label).ok_or(KnowledgeError::Missing(*label)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    fn validate_entry(label: Label, info: &CategoryInfo) -> Result<(), KnowledgeError> {
        if info.description.trim().is_empty() {
            return Err(KnowledgeError::Incomplete { label, field: "description" });
        }
        if info.example_items.iter().all(|item| item.trim().is_empty()) {
            return Err(KnowledgeError::Incomplete { label, field: "example items" });
        }
        if info.disposal_tips.iter().all(|tip| tip.trim().is_empty()) {
            return Err(KnowledgeError::Incomplete { label, field: "disposal tips" });
        }
        if info.reference_links.is_empty() {
            return Err(KnowledgeError::Incomplete { label, field: "reference links" });
        }

        let mut seen = HashSet::new();
        for link in &info.reference_links {
            let is_http = link.url.starts_with("https://") || link.url.starts_with("http://");
            if !is_http || !seen.insert(link.url.as_str()) {
                return Err(KnowledgeError::InvalidLink { label, url: link.url.clone() });
            }
        }
        Ok(())
    }

    /// Guidance for a label. Total over [`Label`].
    pub fn lookup(&self, label: Label) -> &CategoryInfo {
        &self.entries[label.index()]
    }

    /// Looks up a category by display name or slug.
    pub fn get(&self, name: &str) -> Result<(Label, &CategoryInfo), KnowledgeError> {
        let label = name
            .parse::<Label>()
            .map_err(|_| KnowledgeError::UnknownLabel(name.to_string()))?;
        Ok((label, self.lookup(label)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &CategoryInfo)> {
        Label::ALL.iter().copied().zip(self.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
