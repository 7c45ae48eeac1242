use serde::{Deserialize, Serialize};

/// Sentinel slug used while real course content has not loaded yet.
///
/// Pages carrying it are excluded from aggregation, and it doubles as the
/// fallback `pageSlug` in normalized user documents.
pub const PLACEHOLDER_SLUG: &str = "loading_placeholder";

/// A named milestone within a page. Learners move through a page's steps
/// in order, so position within [`Page::steps`] is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
}

impl Step {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A unit of course content identified by a slug.
///
/// `title` may contain markup; it is stripped for display when the page is
/// summarized. `index` controls display order across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The full set of course pages, in the order the content source supplied
/// them. Sorting by `index` happens at aggregation time; equal indices keep
/// this input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCatalog {
    pages: Vec<Page>,
}

impl PageCatalog {
    #[must_use]
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.slug == slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
