// src/render.rs

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::{
    models::{
        item::{ContentItem, Field, Section, parse_timestamp},
        kind::ItemKind,
    },
    page::Container,
    utils::html::{SchemePolicy, escape_html, sanitize_html},
};

/// The two text transforms the composer depends on.
///
/// Plain-text fields go through `escape`, rich-text fields through `sanitize`.
/// Tests may substitute their own implementation.
pub trait HtmlFilter {
    fn escape(&self, text: &str) -> String;
    fn sanitize(&self, html: &str) -> String;
}

/// The production filter backed by `utils::html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomFilter {
    pub scheme_policy: SchemePolicy,
}

impl DomFilter {
    pub fn new(scheme_policy: SchemePolicy) -> Self {
        Self { scheme_policy }
    }
}

impl HtmlFilter for DomFilter {
    fn escape(&self, text: &str) -> String {
        escape_html(text)
    }

    fn sanitize(&self, html: &str) -> String {
        sanitize_html(html, self.scheme_policy)
    }
}

/// Composer settings that are not part of the items themselves.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// chrono `strftime` pattern for the "Created:" line.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: crate::config::DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Placeholder emitted instead of an item list when there is nothing to show.
pub fn empty_placeholder(kind: ItemKind) -> String {
    format!(r#"<p class="empty">No {} found</p>"#, kind)
}

/// Render a list of items to markup.
///
/// Output order follows input order exactly. Each plain-text field is escaped once,
/// each rich-text field sanitized once.
pub fn render_items(
    kind: ItemKind,
    items: &[ContentItem],
    filter: &dyn HtmlFilter,
    options: &RenderOptions,
) -> String {
    if items.is_empty() {
        return empty_placeholder(kind);
    }

    let mut html = String::new();
    for item in items {
        render_item(&mut html, item, filter, options);
    }
    html
}

/// Render `items` and assign the result wholesale to `container`.
pub fn render_into(
    kind: ItemKind,
    items: &[ContentItem],
    filter: &dyn HtmlFilter,
    options: &RenderOptions,
    container: &Container,
) {
    container.set_html(render_items(kind, items, filter, options));
}

fn render_item(html: &mut String, item: &ContentItem, filter: &dyn HtmlFilter, options: &RenderOptions) {
    let title = plain(filter, item.title(), "No title");
    let intro = rich(filter, item.intro(), "No introduction");

    let _ = write!(html, r#"<div class="item"><h3>{}</h3>"#, title);

    if let Some(created) = item.created_at() {
        match parse_timestamp(created) {
            Some(dt) => {
                let _ = write!(
                    html,
                    "<p><small>Created: {}</small></p>",
                    format_date(&dt, &options.date_format)
                );
            }
            None => tracing::warn!("Skipping unparseable createdAt: {:?}", created),
        }
    }

    let _ = write!(html, r#"<div class="intro">{}</div>"#, intro);

    match item.sections.as_deref() {
        Some(sections) if !sections.is_empty() => {
            for section in sections {
                render_section(html, section, filter);
            }
        }
        _ => html.push_str(r#"<p class="empty">No sections available</p>"#),
    }

    if let Some(link) = item.link() {
        let href = plain(filter, Some(link), "");
        let _ = write!(
            html,
            r#"<p><a href="{href}" target="_blank" rel="noopener noreferrer">View Link: {label}</a></p>"#,
            href = href,
            label = plain(filter, Some(link), ""),
        );
    }

    html.push_str("</div>");
}

fn render_section(html: &mut String, section: &Section, filter: &dyn HtmlFilter) {
    let _ = write!(
        html,
        r#"<div class="section"><h4>{}</h4>"#,
        plain(filter, section.title(), "Untitled Section")
    );

    // A section without a content list renders its title only.
    for paragraph in section.content.iter().flatten() {
        let _ = write!(
            html,
            r#"<div class="section-content">{}</div>"#,
            rich(filter, paragraph.as_ref(), "")
        );
    }

    html.push_str("</div>");
}

fn format_date(dt: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    // An invalid pattern makes chrono's Display fail; fall back to ISO dates.
    if write!(out, "{}", dt.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", dt.format("%Y-%m-%d"));
    }
    out
}

/// Escape a plain-text field, falling back to `default` when it is missing.
fn plain(filter: &dyn HtmlFilter, field: Option<&Field>, default: &str) -> String {
    match field {
        Some(field) => transform(field, |text| filter.escape(text)),
        None => filter.escape(default),
    }
}

/// Sanitize a rich-text field, falling back to `default` when it is missing.
fn rich(filter: &dyn HtmlFilter, field: Option<&Field>, default: &str) -> String {
    match field {
        Some(field) => transform(field, |text| filter.sanitize(text)),
        None => filter.sanitize(default),
    }
}

/// Text goes through the transform; numbers and booleans pass through as is.
fn transform(field: &Field, apply: impl Fn(&str) -> String) -> String {
    match field {
        Field::Text(text) => apply(text),
        Field::Number(n) => n.to_string(),
        Field::Flag(b) => b.to_string(),
        Field::Compound(value) => {
            tracing::warn!("Dropping non-scalar field value: {}", value);
            String::new()
        }
    }
}
