//! HTML rendering for the web dashboard.
//!
//! Pure presentation: takes the results of one pass and returns a complete
//! page.  Every provider-supplied string goes through [`escape`].

use std::fmt::Write;
use std::time::Duration;

use crate::status::{tally, Indicator, StatusResult};

const TITLE: &str = "Outage Watch";

/// Page-level knobs that only affect presentation.
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    /// Browser auto-refresh interval.
    pub refresh: Duration,
    /// Response cache TTL, shown in the caption.
    pub cache_ttl: Duration,
}

fn colour(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Green => "#2e7d32",
        Indicator::Yellow => "#f9a825",
        Indicator::Red => "#c62828",
        Indicator::Unknown => "#9e9e9e",
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn caption(settings: &PageSettings) -> String {
    let refresh = settings.refresh.as_secs();
    match settings.cache_ttl.as_secs() {
        0 => format!("Auto-refreshes every {refresh}s; network responses are not cached."),
        ttl => format!("Auto-refreshes every {refresh}s; network responses cached for {ttl}s."),
    }
}

/// Provider name, linked to the vendor's own page when one is known.
fn provider_cell(r: &StatusResult) -> String {
    match &r.link {
        Some(link) => format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape(link),
            escape(&r.provider_name)
        ),
        None => escape(&r.provider_name),
    }
}

/// Render the full dashboard page.
pub fn render(results: &[StatusResult], settings: &PageSettings) -> String {
    let mut html = String::with_capacity(4096);

    // `write!` into a String cannot fail.
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<title>{TITLE}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ padding: .4rem .8rem; border-bottom: 1px solid #ddd; text-align: left; }}
.dot {{ display: inline-block; width: .8rem; height: .8rem; border-radius: 50%; }}
.caption, .when {{ color: #666; }}
.summary span {{ margin-right: 1.2rem; }}
</style>
</head>
<body>
<h1>{TITLE}</h1>
<p class="caption">{caption}</p>
"#,
        refresh = settings.refresh.as_secs().max(1),
        caption = escape(&caption(settings)),
    );

    html.push_str("<p class=\"summary\">");
    for (indicator, count) in tally(results) {
        let _ = write!(
            html,
            r#"<span><span class="dot" style="background:{}"></span> {} {}</span>"#,
            colour(indicator),
            count,
            indicator.label(),
        );
    }
    html.push_str("</p>\n");

    if results.is_empty() {
        html.push_str("<p>No providers configured.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th></th><th>Provider</th><th>Source</th><th>Status</th><th>Message</th><th>Last checked</th></tr></thead>\n<tbody>\n",
        );
        for r in results {
            let _ = writeln!(
                html,
                r#"<tr class="{class}"><td><span class="dot" style="background:{colour}" title="{class}"></span></td><td>{name}</td><td>{kind}</td><td>{label}</td><td>{message}</td><td class="when">{when}</td></tr>"#,
                class = r.indicator.as_str(),
                colour = colour(r.indicator),
                name = provider_cell(r),
                kind = r.kind,
                label = r.indicator.label(),
                message = escape(r.message.as_deref().unwrap_or("")),
                when = r.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
