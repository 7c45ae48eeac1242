//! Server-rendered admin dashboard.
//!
//! A single static HTML page built from the aggregated summary; styling
//! is intentionally minimal.

use std::fmt::Write as _;

use chrono::DateTime;
use progress_core::model::NormalizedUser;
use progress_core::summary::{ProgressSummary, StatusKey};

pub fn render(
    users: &[NormalizedUser],
    active: Option<&NormalizedUser>,
    summary: &ProgressSummary,
) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Admin Progress Dashboard</title>\n</head>\n<body>\n",
    );
    page.push_str("<h1>Admin Progress Dashboard</h1>\n");

    let learner = active
        .map(display_name)
        .unwrap_or_else(|| "selected learner".to_owned());
    let _ = writeln!(
        page,
        "<p>Tracking progress for {} across {} pages.</p>",
        escape_html(&learner),
        summary.total_pages
    );

    if users.len() > 1 {
        page.push_str("<p>Select learner:</p>\n<ul>\n");
        for user in users {
            let _ = writeln!(
                page,
                "<li><a href=\"/admin/dashboard?user={}\">{}</a></li>",
                escape_html(&user.user_id),
                escape_html(&display_name(user))
            );
        }
        page.push_str("</ul>\n");
    }

    let _ = writeln!(
        page,
        "<p>Overall completion: <strong>{}%</strong></p>\n\
         <p>Pages completed: {} / {} &mdash; in progress: {}, not started: {}</p>",
        summary.overall_percent,
        summary.counts.completed,
        summary.total_pages,
        summary.counts.in_progress,
        summary.counts.not_started
    );

    page.push_str(
        "<table border=\"1\">\n<thead>\n<tr>\
         <th>Page</th><th>Current step</th><th>Progress</th>\
         <th>Status</th><th>Last updated</th></tr>\n</thead>\n<tbody>\n",
    );
    if summary.rows.is_empty() {
        page.push_str(
            "<tr><td colspan=\"5\">Course content is still loading. \
             Please check back shortly.</td></tr>\n",
        );
    }
    for row in &summary.rows {
        let current_step = if row.total_steps == 0 {
            "No steps available".to_owned()
        } else {
            format!(
                "Step {} of {} ({})",
                row.current_step_number,
                row.total_steps,
                escape_html(&row.step_name)
            )
        };
        let _ = writeln!(
            page,
            "<tr><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.title),
            current_step,
            row.percent,
            status_label(row.status_key),
            escape_html(&format_timestamp(row.updated_at.as_deref()))
        );
    }
    page.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    page
}

fn display_name(user: &NormalizedUser) -> String {
    user.email
        .clone()
        .filter(|email| !email.is_empty())
        .unwrap_or_else(|| user.user_id.clone())
}

fn status_label(status: StatusKey) -> &'static str {
    match status {
        StatusKey::Completed => "Completed",
        StatusKey::InProgress => "In progress",
        StatusKey::NotStarted => "Not started",
        StatusKey::NoSteps => "No steps defined",
    }
}

/// Format an RFC 3339 timestamp for display; anything unparseable reads
/// as never updated.
fn format_timestamp(raw: Option<&str>) -> String {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|parsed| parsed.format("%b %e, %Y %H:%M").to_string())
        .unwrap_or_else(|| "Not updated yet".to_owned())
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::summary::{PageSummaryRow, StatusCounts};
    use serde_json::Map;

    fn user(user_id: &str, email: Option<&str>) -> NormalizedUser {
        NormalizedUser {
            user_id: user_id.to_owned(),
            email: email.map(str::to_owned),
            page_slug: "loading_placeholder".to_owned(),
            developer_mode: false,
            editor_content: String::new(),
            last_active_at: None,
            is_admin: false,
            pages_progress: Map::new(),
        }
    }

    #[test]
    fn formats_timestamps_with_fallback() {
        assert_eq!(format_timestamp(None), "Not updated yet");
        assert_eq!(format_timestamp(Some("not a date")), "Not updated yet");
        assert!(format_timestamp(Some("2024-01-01T00:00:00Z")).contains("2024"));
    }

    #[test]
    fn empty_summary_renders_loading_row() {
        let html = render(&[], None, &ProgressSummary::default());
        assert!(html.contains("Course content is still loading"));
        assert!(html.contains("selected learner"));
    }

    #[test]
    fn rows_and_counts_are_rendered() {
        let summary = ProgressSummary {
            rows: vec![PageSummaryRow {
                slug: "intro".to_owned(),
                title: "Intro".to_owned(),
                total_steps: 2,
                percent: 50,
                status_key: StatusKey::InProgress,
                updated_at: Some("2024-01-01T00:00:00Z".to_owned()),
                current_step_number: 2,
                step_name: "end".to_owned(),
            }],
            overall_percent: 50,
            counts: StatusCounts {
                in_progress: 1,
                ..StatusCounts::default()
            },
            total_pages: 1,
        };
        let active = user("u1", Some("learner@example.com"));
        let html = render(std::slice::from_ref(&active), Some(&active), &summary);
        assert!(html.contains("learner@example.com"));
        assert!(html.contains("Step 2 of 2"));
        assert!(html.contains("In progress"));
        assert!(html.contains("50%"));
    }

    #[test]
    fn learner_names_are_escaped() {
        let active = user("u1", Some("<script>alert(1)</script>"));
        let html = render(
            std::slice::from_ref(&active),
            Some(&active),
            &ProgressSummary::default(),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
