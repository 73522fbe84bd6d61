use std::collections::HashMap;

use log::error;
use serde::Deserialize;
use thiserror::Error;

const EMBEDDED_CATALOG: &str = include_str!("../../assets/faq.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse FAQ catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate FAQ entry id `{0}`")]
    DuplicateEntry(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqCategory {
    pub id: String,
    pub title: String,
    pub entries: Vec<FaqEntry>,
}

#[derive(Deserialize)]
struct RawCatalog {
    categories: Vec<RawCategory>,
}

#[derive(Deserialize)]
struct RawCategory {
    id: String,
    title: String,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    question: String,
    answer: String,
}

/// Questions and answers grouped by category. Immutable once loaded; the
/// flattened entry order (category by category) is the keyboard traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqCatalog {
    categories: Vec<FaqCategory>,
    // (category, entry) location of each flattened index
    locations: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
}

impl FaqCatalog {
    pub fn new(categories: Vec<FaqCategory>) -> Result<Self, CatalogError> {
        let mut locations = Vec::new();
        let mut index_by_id = HashMap::new();
        for (c, category) in categories.iter().enumerate() {
            for (e, entry) in category.entries.iter().enumerate() {
                if index_by_id.insert(entry.id.clone(), locations.len()).is_some() {
                    return Err(CatalogError::DuplicateEntry(entry.id.clone()));
                }
                locations.push((c, e));
            }
        }
        Ok(Self {
            categories,
            locations,
            index_by_id,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let categories = raw
            .categories
            .into_iter()
            .map(|category| {
                let entries = category
                    .entries
                    .into_iter()
                    .map(|entry| FaqEntry {
                        id: entry.id,
                        question: entry.question,
                        answer: entry.answer,
                        category_id: category.id.clone(),
                    })
                    .collect();
                FaqCategory {
                    id: category.id,
                    title: category.title,
                    entries,
                }
            })
            .collect();
        Self::new(categories)
    }

    /// The catalog bundled into the binary. A broken bundle degrades to an
    /// empty catalog, which renders as "no results".
    pub fn embedded() -> Self {
        match Self::from_json(EMBEDDED_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Falling back to an empty FAQ: {}", e);
                Self::default()
            }
        }
    }

    pub fn categories(&self) -> &[FaqCategory] {
        &self.categories
    }

    pub fn entries(&self) -> impl Iterator<Item = &FaqEntry> {
        self.categories.iter().flat_map(|c| c.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the entry in flattened order.
    pub fn position(&self, entry_id: &str) -> Option<usize> {
        self.index_by_id.get(entry_id).copied()
    }

    pub fn entry_at(&self, index: usize) -> Option<&FaqEntry> {
        let &(c, e) = self.locations.get(index)?;
        self.categories.get(c)?.entries.get(e)
    }
}
