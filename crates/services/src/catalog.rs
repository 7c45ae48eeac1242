//! Page-catalog loading.
//!
//! The catalog is supplied by an external content source as a JSON file,
//! either as an array of pages or as an object keyed by slug. In the
//! keyed form a page may omit its own `slug` field; the key fills it in.

use std::path::Path;

use progress_core::model::{Page, PageCatalog};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Page>),
    Keyed(Map<String, Value>),
}

/// Read and parse the catalog file at `path`.
///
/// # Errors
///
/// Returns `CatalogError::Io` when the file cannot be read and
/// `CatalogError::Parse` when its contents are not a valid catalog.
pub fn load_catalog(path: &Path) -> Result<PageCatalog, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    parse_catalog(&raw)
}

/// Parse catalog JSON, preserving the source's page order.
///
/// # Errors
///
/// Returns `CatalogError::Parse` for malformed JSON or page entries.
pub fn parse_catalog(raw: &str) -> Result<PageCatalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(raw)?;
    let pages = match file {
        CatalogFile::List(pages) => pages,
        CatalogFile::Keyed(entries) => {
            let mut pages = Vec::with_capacity(entries.len());
            for (slug, value) in entries {
                let mut page: Page = serde_json::from_value(value)?;
                if page.slug.is_empty() {
                    page.slug = slug;
                }
                pages.push(page);
            }
            pages
        }
    };
    Ok(PageCatalog::new(pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_array_form() {
        let catalog = parse_catalog(
            r#"[
                {"slug": "intro", "title": "Intro", "index": 0,
                 "steps": [{"name": "start"}, {"name": "end"}]},
                {"slug": "loops", "title": "Loops", "index": 1, "steps": []}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("intro").unwrap().steps.len(), 2);
    }

    #[test]
    fn parses_the_slug_keyed_form_and_fills_missing_slugs() {
        let catalog = parse_catalog(
            r#"{
                "intro": {"title": "Intro", "index": 1, "steps": [{"name": "a"}]},
                "loops": {"slug": "loops", "title": "Loops", "index": 0, "steps": []}
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.get("intro").unwrap().index, 1);
        assert_eq!(catalog.get("loops").unwrap().title, "Loops");
    }

    #[test]
    fn keyed_form_keeps_source_order() {
        let catalog = parse_catalog(
            r#"{
                "zulu": {"title": "Z", "steps": []},
                "alpha": {"title": "A", "steps": []}
            }"#,
        )
        .unwrap();
        let slugs: Vec<&str> = catalog
            .pages()
            .iter()
            .map(|page| page.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["zulu", "alpha"]);
    }

    #[test]
    fn malformed_catalog_is_a_parse_error() {
        let err = parse_catalog(r#"{"intro": 5}"#);
        assert!(matches!(err, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(err, Err(CatalogError::Io(_))));
    }
}
