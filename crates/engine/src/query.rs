//! List filters and pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docflow_documents::{Document, DocumentKind, DocumentStatus};

/// Filter for the document list operation. All criteria are conjunctive;
/// unset criteria match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Case-insensitive substring match against the document number.
    pub search: Option<String>,
    pub status: Option<DocumentStatus>,
    pub kind: Option<DocumentKind>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Deleted (removed) documents are hidden unless asked for.
    pub include_removed: bool,
    /// Zero-based page index.
    pub page: usize,
    pub per_page: Option<usize>,
}

const DEFAULT_PER_PAGE: usize = 25;

impl DocumentFilter {
    pub fn per_page(&self) -> usize {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1)
    }

    pub fn matches(&self, document: &Document) -> bool {
        if !self.include_removed && document.status() == DocumentStatus::Removed {
            return false;
        }
        if let Some(status) = self.status {
            if document.status() != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if document.kind() != kind {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if document.created_at() < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if document.created_at() > to {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !document.number().to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Paginate an already-filtered, already-sorted collection.
    pub fn paginate(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(page * per_page)
            .take(per_page)
            .collect();
        Self {
            items,
            total,
            page,
            per_page,
        }
    }
}
