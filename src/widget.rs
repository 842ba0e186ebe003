// src/widget.rs

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::{
    client::{ContentSource, HttpContentSource},
    config::{WidgetOptions, WidgetOverrides},
    error::AppError,
    models::kind::ItemKind,
    page::{Container, Page},
    render::{DomFilter, HtmlFilter, RenderOptions, render_into},
    utils::html::escape_html,
};

/// What happened to a `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items were rendered into the result region.
    Rendered(usize),
    /// An inline error block was rendered instead.
    Failed,
    /// A newer load started meanwhile; nothing was written.
    Stale,
}

/// One widget mounted on one target element.
///
/// Each `init` yields an independent handle. Clones share the target and the
/// request generation, so a slow response from an older `load` can never
/// overwrite what a newer one rendered.
#[derive(Clone)]
pub struct Widget {
    kind: ItemKind,
    options: WidgetOptions,
    target: Container,
    result: Container,
    source: Arc<dyn ContentSource>,
    filter: DomFilter,
    render_options: RenderOptions,
    generation: Arc<Mutex<u64>>,
}

impl Widget {
    /// Merges `overrides` over `base`, then mounts a widget talking to the content API.
    pub fn init(
        kind: ItemKind,
        base: WidgetOptions,
        overrides: WidgetOverrides,
        page: &Page,
    ) -> Result<Self, AppError> {
        let options = base.merge(overrides);
        require_api_key(kind, &options)?;
        let source = HttpContentSource::new(
            options.api_base_url.clone(),
            options.api_key.clone(),
            options.request_timeout,
        )?;
        Self::mount(kind, options, page, Arc::new(source))
    }

    /// Like `init`, with an explicit content source.
    pub fn init_with_source(
        kind: ItemKind,
        base: WidgetOptions,
        overrides: WidgetOverrides,
        page: &Page,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self, AppError> {
        Self::mount(kind, base.merge(overrides), page, source)
    }

    fn mount(
        kind: ItemKind,
        options: WidgetOptions,
        page: &Page,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self, AppError> {
        require_api_key(kind, &options)?;

        let target = page.element_by_id(&options.target_id).ok_or_else(|| {
            let msg = format!(
                r#"{}: Target element with id "{}" not found"#,
                kind.widget_name(),
                options.target_id
            );
            tracing::error!("{}", msg);
            AppError::Config(msg)
        })?;

        page.ensure_stylesheet(&kind.stylesheet_id(), &options.stylesheet_href(kind));
        target.add_class(kind.css_class());

        let widget = Self {
            kind,
            filter: DomFilter::new(options.scheme_policy),
            render_options: RenderOptions {
                date_format: options.date_format.clone(),
            },
            result: page.create_element(&kind.result_id()),
            options,
            target,
            source,
            generation: Arc::new(Mutex::new(0)),
        };
        widget.render();
        Ok(widget)
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn target(&self) -> &Container {
        &self.target
    }

    /// The region fetched items are rendered into.
    pub fn result(&self) -> &Container {
        &self.result
    }

    /// Writes the widget shell with the result region in its loading state.
    pub fn render(&self) {
        let title_html = if self.options.show_title {
            format!("<h1>{}</h1>", self.filter.escape(&self.options.title))
        } else {
            String::new()
        };
        self.target.set_html(title_html);

        self.result.set_html(format!("Loading {}...", self.kind));
        self.result.add_class("loading");

        let wrapper = Container::anonymous();
        wrapper.add_class("container");
        wrapper.append_child(self.result.clone());
        self.target.append_child(wrapper);
    }

    /// Fetches the items and renders them, or an inline error, into the result region.
    pub async fn load(&self) -> LoadOutcome {
        let ticket = {
            let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
            *generation += 1;
            *generation
        };

        let fetched = self.source.fetch(self.kind).await;

        // Held until the write is done so a newer load cannot slip in between.
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *generation != ticket {
            tracing::warn!(
                "{}: discarding stale response (request {}, current {})",
                self.kind.widget_name(),
                ticket,
                *generation
            );
            return LoadOutcome::Stale;
        }

        let outcome = match fetched {
            Ok(items) => {
                render_into(
                    self.kind,
                    &items,
                    &self.filter,
                    &self.render_options,
                    &self.result,
                );
                LoadOutcome::Rendered(items.len())
            }
            Err(AppError::UnexpectedShape(payload)) => {
                tracing::error!("Error fetching {}: unexpected response structure", self.kind);
                self.result.set_html(shape_error_block(&payload));
                LoadOutcome::Failed
            }
            Err(e) => {
                tracing::error!("Error fetching {}: {}", self.kind, e);
                self.result.set_html(error_block(&e.to_string()));
                LoadOutcome::Failed
            }
        };
        self.result.remove_class("loading");
        outcome
    }
}

fn require_api_key(kind: ItemKind, options: &WidgetOptions) -> Result<(), AppError> {
    if options.api_key.is_empty() {
        let msg = format!("{}: API key is required", kind.widget_name());
        tracing::error!("{}", msg);
        return Err(AppError::Config(msg));
    }
    Ok(())
}

/// Inline error shown in place of the items.
pub fn error_block(message: &str) -> String {
    format!(r#"<div class="error">Error: {}</div>"#, escape_html(message))
}

/// Error block followed by a dump of the payload that could not be used.
pub fn shape_error_block(payload: &Value) -> String {
    let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    format!(
        r#"<div class="error">Error: Unexpected response structure</div><pre>{}</pre>"#,
        escape_html(&pretty)
    )
}
