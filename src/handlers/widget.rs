// src/handlers/widget.rs

use std::sync::LazyLock;

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::{Config, WidgetOverrides},
    error::AppError,
    models::kind::ItemKind,
    page::Page,
    widget::Widget,
};

static TARGET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{0,63}$").expect("valid target id pattern"));

/// Query parameters overriding the widget defaults.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct WidgetQuery {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: Option<String>,

    pub show_title: Option<bool>,

    #[validate(custom(function = validate_target_id))]
    pub target_id: Option<String>,
}

/// Target ids end up in an `id` attribute; keep them to a plain identifier.
fn validate_target_id(id: &str) -> Result<(), validator::ValidationError> {
    if !TARGET_ID.is_match(id) {
        return Err(validator::ValidationError::new("invalid_target_id"));
    }
    Ok(())
}

impl From<WidgetQuery> for WidgetOverrides {
    fn from(query: WidgetQuery) -> Self {
        WidgetOverrides {
            title: query.title,
            show_title: query.show_title,
            target_id: query.target_id,
            ..WidgetOverrides::default()
        }
    }
}

/// Builds a fresh page holding the target element and mounts a widget on it.
fn mount(config: &Config, kind: &str, query: WidgetQuery) -> Result<(Page, Widget), AppError> {
    let kind: ItemKind = kind.parse()?;

    if let Err(validation_errors) = query.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let overrides = WidgetOverrides::from(query);
    let page = Page::new();
    page.create_element(
        overrides
            .target_id
            .as_deref()
            .unwrap_or_else(|| kind.css_class()),
    );

    let widget = Widget::init(kind, config.widget_options(kind), overrides, &page)?;
    Ok((page, widget))
}

/// Renders a complete widget: stylesheet link plus the target element.
/// Fetch failures are rendered inline, so only setup errors produce an error status.
pub async fn show_widget(
    State(config): State<Config>,
    Path(kind): Path<String>,
    Query(query): Query<WidgetQuery>,
) -> Result<Html<String>, AppError> {
    let (page, widget) = mount(&config, &kind, query)?;
    widget.load().await;

    Ok(Html(format!(
        "{}{}",
        page.head_html(),
        widget.target().outer_html()
    )))
}

/// Renders only the result region's content (items or inline error).
pub async fn list_items(
    State(config): State<Config>,
    Path(kind): Path<String>,
) -> Result<Html<String>, AppError> {
    let (_page, widget) = mount(&config, &kind, WidgetQuery::default())?;
    widget.load().await;

    Ok(Html(widget.result().inner_html()))
}

pub async fn health() -> &'static str {
    "ok"
}
