//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined and the
//! ability trajectory drawn as inline SVG.

use std::path::Path;

use anyhow::{Context, Result};

use adaptest_core::catalog;
use adaptest_core::estimator::{THETA_MAX, THETA_MIN};
use adaptest_core::model::option_letter;
use adaptest_core::report::{ReportItem, SessionReport};
use adaptest_core::statistics::ReviewFilter;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Elapsed time as `H:MM:SS`, or `MM:SS` under an hour.
pub fn format_elapsed(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Generate an HTML page for a session report.
pub fn generate_html(report: &SessionReport) -> String {
    let summary = &report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>adaptest session {}</title>\n",
        report.created_at.format("%Y-%m-%d %H:%M")
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>CISSP adaptive practice session</h1>\n");
    let ended = report
        .termination
        .map(|t| t.to_string())
        .unwrap_or_else(|| "in progress".into());
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} mode | {} | {}</p>\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.config.mode,
        html_escape(&ended),
        report.id
    ));
    html.push_str("</header>\n");

    // Headline metrics
    html.push_str("<section class=\"dashboard\">\n<div class=\"cards\">\n");
    let track_class = if summary.on_track { "pass" } else { "fail" };
    let cards = [
        ("Score", format!("{}%", summary.percent), ""),
        (
            "Correct",
            format!("{}/{}", summary.correct, summary.total),
            "",
        ),
        ("Ability", summary.ability_label.to_string(), ""),
        ("θ", format!("{:+.2}", summary.theta), ""),
        (
            "Pass probability",
            format!("{}%", summary.pass_probability),
            track_class,
        ),
        ("Time", format_elapsed(report.elapsed_secs), ""),
    ];
    for (label, value, class) in cards {
        html.push_str(&format!(
            "<div class=\"card {class}\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
            html_escape(label),
            html_escape(&value)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Ability trajectory</h2>\n");
    html.push_str(&generate_trajectory_chart(&summary.trajectory));
    html.push_str("</section>\n");

    // Breakdown tables
    html.push_str("<section class=\"breakdown\">\n<h2>By difficulty</h2>\n");
    html.push_str("<table>\n<thead><tr><th>Difficulty</th><th>Correct</th><th>Total</th><th>%</th></tr></thead>\n<tbody>\n");
    for (tier, tally) in &summary.by_tier {
        html.push_str(&format!(
            "<tr><td>{} ({})</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            tier.label(),
            tier,
            tally.correct,
            tally.total,
            pct_cell(tally.correct, tally.total)
        ));
    }
    html.push_str("</tbody></table>\n");

    html.push_str("<h2>By domain</h2>\n");
    html.push_str("<table>\n<thead><tr><th>Domain</th><th>Correct</th><th>Total</th><th>%</th></tr></thead>\n<tbody>\n");
    for (domain_id, tally) in &summary.by_domain {
        let name = catalog::domain(*domain_id)
            .map(|d| d.name)
            .unwrap_or("Unknown domain");
        html.push_str(&format!(
            "<tr><td>D{} {}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            domain_id,
            html_escape(name),
            tally.correct,
            tally.total,
            pct_cell(tally.correct, tally.total)
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    // Review
    html.push_str("<section class=\"review\">\n<h2>Review</h2>\n");
    for item in report.review(ReviewFilter::All) {
        html.push_str(&review_item(item));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn pct_cell(correct: u32, total: u32) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.0}", correct as f64 / total as f64 * 100.0)
    }
}

fn review_item(item: &ReportItem) -> String {
    let q = &item.question;
    let correct = item.correct.unwrap_or(false);
    let mut out = format!(
        "<article class=\"item {}\">\n<h3>Q{}{} <small>D{} · {} · {}</small></h3>\n<p>{}</p>\n<ol type=\"A\">\n",
        if correct { "pass" } else { "fail" },
        item.number,
        if item.flagged { " ⚑" } else { "" },
        q.domain_id,
        q.tier.label(),
        html_escape(&q.topic),
        html_escape(&q.prompt)
    );
    for (i, option) in q.options.iter().enumerate() {
        let mut classes = Vec::new();
        if q.is_correct(i) {
            classes.push("answer");
        }
        if item.selected == Some(i) {
            classes.push("selected");
        }
        out.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            classes.join(" "),
            html_escape(option)
        ));
    }
    out.push_str("</ol>\n");
    let yours = item
        .selected
        .map(|s| option_letter(s).to_string())
        .unwrap_or_else(|| "-".into());
    out.push_str(&format!(
        "<p class=\"meta\">Your answer: {} | Correct answer: {}</p>\n<p class=\"explanation\">{}</p>\n</article>\n",
        yours,
        q.correct_letter(),
        html_escape(&q.explanation)
    ));
    out
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &SessionReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_trajectory_chart(trajectory: &[f64]) -> String {
    let width = 640.0;
    let height = 240.0;
    let pad = 32.0;
    let plot_w = width - 2.0 * pad;
    let plot_h = height - 2.0 * pad;

    let y_of = |theta: f64| pad + (THETA_MAX - theta) / (THETA_MAX - THETA_MIN) * plot_h;
    let steps = trajectory.len().saturating_sub(1).max(1) as f64;
    let x_of = |i: usize| pad + i as f64 / steps * plot_w;

    let mut svg = format!(
        "<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    for theta in [THETA_MIN, 0.0, THETA_MAX] {
        let y = y_of(theta);
        svg.push_str(&format!(
            "  <line x1=\"{pad}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#9ca3af\" stroke-dasharray=\"4 4\"/>\n",
            pad + plot_w
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{y:.1}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{theta:+.0}</text>\n",
            pad - 6.0
        ));
    }

    let points: Vec<String> = trajectory
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{:.1},{:.1}", x_of(i), y_of(*t)))
        .collect();
    svg.push_str(&format!(
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
        points.join(" ")
    ));
    for (i, t) in trajectory.iter().enumerate() {
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#2563eb\"><title>{}: θ {t:+.2}</title></circle>\n",
            x_of(i),
            y_of(*t),
            i
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --accent: #2563eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --accent: #60a5fa; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 960px; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 0.75rem 1rem; min-width: 120px; }
.card .label { display: block; font-size: 0.8rem; color: #6b7280; }
.card .value { font-size: 1.4rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.item { border: 1px solid var(--border); border-radius: 8px; padding: 0 1rem; margin: 1rem 0; }
.item small { font-weight: normal; color: #6b7280; }
li.answer { font-weight: bold; }
li.selected { text-decoration: underline; }
.explanation { border-left: 3px solid var(--accent); padding-left: 0.75rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use adaptest_core::estimator::AbilityEstimator;
    use adaptest_core::model::{DifficultyTier, Provenance, Question, SessionConfig};
    use adaptest_core::session::Termination;
    use adaptest_core::statistics::summarize;

    fn make_test_report() -> SessionReport {
        let question = Question {
            domain_id: 3,
            tier: DifficultyTier::Medium,
            topic: "cryptography".into(),
            prompt: "Which is <b>BEST</b> for integrity?".into(),
            options: [
                "AES".into(),
                "SHA-256".into(),
                "RSA & DH".into(),
                "3DES".into(),
            ],
            correct_index: 1,
            explanation: "Hashes verify integrity.".into(),
            provenance: Provenance::Bank,
            bank_id: Some("crypto-1".into()),
        };
        let mut est = AbilityEstimator::new(DifficultyTier::Medium);
        est.update(DifficultyTier::Medium, false);

        SessionReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            termination: Some(Termination::Completed),
            elapsed_secs: 3725,
            config: SessionConfig::default(),
            summary: summarize(std::slice::from_ref(&question), &est),
            items: vec![ReportItem {
                number: 1,
                question,
                selected: Some(0),
                correct: Some(false),
                flagged: true,
            }],
        }
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(754), "12:34");
        assert_eq!(format_elapsed(3725), "1:02:05");
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html(&make_test_report());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("<polyline"));
        assert!(html.contains("Security Architecture &amp; Engineering"));
        assert!(html.contains("1:02:05"));
        assert!(html.contains("Your answer: A | Correct answer: B"));
        assert!(html.contains("Hashes verify integrity."));
    }

    #[test]
    fn html_escapes_content() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("&lt;b&gt;BEST&lt;/b&gt;"));
        assert!(!html.contains("<b>BEST</b>"));
        assert!(html.contains("RSA &amp; DH"));
    }

    #[test]
    fn trajectory_chart_has_point_per_entry() {
        let svg = generate_trajectory_chart(&[0.0, 0.15, -0.1, 0.2]);
        assert_eq!(svg.matches("<circle").count(), 4);
        // Single-point trajectories still render.
        assert_eq!(generate_trajectory_chart(&[0.0]).matches("<circle").count(), 1);
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
