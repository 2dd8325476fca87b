//! HTML result report.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizkit_core::model::Quiz;
use quizkit_core::result::QuizResult;
use quizkit_core::scoring::{FitBreakdown, GroupScore};

use crate::export::{format_score, result_rows};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for one result.
pub fn generate_html(quiz: &Quiz, result: &QuizResult) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} | quizkit result</title>\n",
        html_escape(&quiz.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&quiz.title)));
    let respondent = if result.user_data.name.is_empty() {
        "anonymous".to_string()
    } else {
        html_escape(&result.user_data.name)
    };
    html.push_str(&format!(
        "<p class=\"meta\">Respondent: <strong>{}</strong> | {} responses | {}</p>\n",
        respondent,
        result.responses.len(),
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Score</th><th>Max</th><th>Percentage</th><th>Profile</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        format_score(result.score),
        format_score(result.max_score),
        result
            .percentage()
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "-".to_string()),
        html_escape(&result.profile),
    ));
    html.push_str("</table>\n");
    if let Some(description) = result.profile_description.as_deref().filter(|d| !d.is_empty()) {
        html.push_str(&format!(
            "<p class=\"profile\">{}</p>\n",
            html_escape(description)
        ));
    }

    if !result.group_scores.is_empty() {
        html.push_str("<h3>Groups</h3>\n");
        html.push_str(&generate_bar_chart(&result.group_scores));
    }

    if let Some(fit) = &result.fit {
        html.push_str(&fit_table(fit));
    }
    html.push_str("</section>\n");

    // Responses
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Responses</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Question</th><th onclick=\"sortTable(1)\">Answer</th><th onclick=\"sortTable(2)\">Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for row in result_rows(quiz, result) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&row.label),
            html_escape(&row.answer),
            row.score.map(format_score).unwrap_or_default()
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(result).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(quiz: &Quiz, result: &QuizResult, path: &Path) -> Result<()> {
    let html = generate_html(quiz, result);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(groups: &[GroupScore]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = groups.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, group) in groups.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let share = (group.percentage / 100.0).clamp(0.0, 1.0);
        let width = (share * max_width as f64) as usize;

        let color = if share >= 0.7 {
            "#22c55e"
        } else if share >= 0.4 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&group.title)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            group.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn fit_table(fit: &FitBreakdown) -> String {
    let mut out = String::from("<h3>Dimension fit</h3>\n<table class=\"fit\">\n");
    out.push_str("<thead><tr><th>Dimension</th><th>Organization</th><th>You</th></tr></thead>\n<tbody>\n");
    for (org, user) in fit.organization.iter().zip(&fit.user) {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{:.0}%</td><td>{:.0}%</td></tr>\n",
            org.dimension,
            org.normalized * 100.0,
            user.normalized * 100.0
        ));
    }
    out.push_str("</tbody></table>\n");
    out.push_str(&format!(
        "<p class=\"meta\">Fit {:.1}% | dominant {} and {} | {}</p>\n",
        fit.fit_score,
        fit.dominant[0],
        fit.dominant[1],
        html_escape(&fit.leadership_profile)
    ));
    out
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --accent: #eef2ff; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --accent: #1e1b4b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.profile { padding: 1rem; background: var(--accent); border-radius: 8px; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = !(table.dataset.sortCol == col && table.dataset.sortDir == 'asc');
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
