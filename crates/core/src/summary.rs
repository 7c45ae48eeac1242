//! Progress aggregation.
//!
//! Given the page catalog and one user's `pagesProgress` map, classify
//! each page and roll the results up into an overall completion figure.
//! This is pure computation over already-fetched data; every malformed
//! input defaults instead of erroring.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Page, PageCatalog, ProgressRecord, PLACEHOLDER_SLUG};

/// Classification of one page for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKey {
    Completed,
    InProgress,
    NotStarted,
    NoSteps,
}

/// One page's line in the dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummaryRow {
    pub slug: String,
    pub title: String,
    pub total_steps: usize,
    pub percent: u32,
    pub status_key: StatusKey,
    pub updated_at: Option<String>,
    pub current_step_number: usize,
    pub step_name: String,
}

/// Pages in each non-empty status. `noSteps` pages are counted in
/// [`ProgressSummary::total_pages`] but in none of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

/// The rollup across all included pages for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub rows: Vec<PageSummaryRow>,
    pub overall_percent: u32,
    pub counts: StatusCounts,
    pub total_pages: usize,
}

/// Aggregate a user's progress over the catalog.
///
/// Pages with an empty or placeholder slug are excluded entirely. The
/// rest are ordered by `index` ascending; equal indices keep their
/// catalog order.
#[must_use]
pub fn aggregate(catalog: &PageCatalog, pages_progress: &Map<String, Value>) -> ProgressSummary {
    let mut pages: Vec<&Page> = catalog
        .pages()
        .iter()
        .filter(|page| !page.slug.is_empty() && page.slug != PLACEHOLDER_SLUG)
        .collect();
    pages.sort_by_key(|page| page.index);

    let mut rows = Vec::with_capacity(pages.len());
    let mut counts = StatusCounts::default();
    let mut percent_sum: u64 = 0;
    for page in pages {
        let record = ProgressRecord::from_value(pages_progress.get(&page.slug));
        let row = summarize_page(page, record);
        percent_sum += u64::from(row.percent);
        match row.status_key {
            StatusKey::Completed => counts.completed += 1,
            StatusKey::InProgress => counts.in_progress += 1,
            StatusKey::NotStarted => counts.not_started += 1,
            StatusKey::NoSteps => {}
        }
        rows.push(row);
    }

    let total_pages = rows.len();
    let overall_percent = if total_pages == 0 {
        0
    } else {
        round_ratio(percent_sum as f64, total_pages as f64)
    };

    ProgressSummary {
        rows,
        overall_percent,
        counts,
        total_pages,
    }
}

fn summarize_page(page: &Page, record: ProgressRecord) -> PageSummaryRow {
    let steps = &page.steps;
    let total_steps = steps.len();

    let step_name = record
        .step_name
        .clone()
        .or_else(|| steps.first().map(|step| step.name.clone()))
        .unwrap_or_default();
    let step_index = steps
        .iter()
        .position(|step| step.name == step_name)
        .unwrap_or(0);
    let has_activity = record.has_timestamp() || step_index > 0;

    let (status_key, completed_steps) = if total_steps == 0 {
        (StatusKey::NoSteps, 0)
    } else if has_activity && step_index >= total_steps - 1 {
        // Reaching the final step with any activity counts the page as
        // completed, even though the step itself may still be underway.
        (StatusKey::Completed, total_steps)
    } else if has_activity {
        (StatusKey::InProgress, step_index.min(total_steps))
    } else {
        (StatusKey::NotStarted, step_index.min(total_steps))
    };

    let percent = if total_steps == 0 {
        0
    } else {
        round_ratio(completed_steps as f64 * 100.0, total_steps as f64)
    };
    let current_step_number = if total_steps == 0 {
        0
    } else {
        (step_index + 1).min(total_steps)
    };

    PageSummaryRow {
        slug: page.slug.clone(),
        title: display_title(page),
        total_steps,
        percent,
        status_key,
        updated_at: record.updated_at,
        current_step_number,
        step_name,
    }
}

fn round_ratio(numerator: f64, denominator: f64) -> u32 {
    (numerator / denominator).round() as u32
}

fn display_title(page: &Page) -> String {
    let stripped = strip_markup(&page.title);
    if stripped.is_empty() {
        page.slug.clone()
    } else {
        stripped
    }
}

/// Remove `<...>` tag spans from a title. An unterminated `<` and the
/// empty pair `<>` are kept verbatim.
fn strip_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        match rest[open + 1..].find('>') {
            Some(span) if span > 0 => {
                output.push_str(&rest[..open]);
                rest = &rest[open + span + 2..];
            }
            Some(_) => {
                output.push_str(&rest[..open + 2]);
                rest = &rest[open + 2..];
            }
            None => break,
        }
    }
    output.push_str(rest);
    output
}
