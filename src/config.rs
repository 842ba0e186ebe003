// src/config.rs

use std::{env, time::Duration};

use dotenvy::dotenv;
use url::Url;

use crate::{models::kind::ItemKind, utils::html::SchemePolicy};

pub const DEFAULT_API_BASE_URL: &str = "https://content-api-2020-5886a3310333.herokuapp.com/api";
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Process-wide settings read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Empty when unset; widget init reports it as a configuration error.
    pub api_key: String,
    /// Base URL the widget stylesheets are served from.
    pub asset_base_url: Option<String>,
    pub listen_addr: String,
    pub allowed_origins: Vec<String>,
    /// No timeout when `None`.
    pub request_timeout: Option<Duration>,
    pub scheme_policy: SchemePolicy,
    pub date_format: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_base_url = env::var("CONTENT_API_BASE_URL")
            .ok()
            .filter(|url| {
                let valid = Url::parse(url).is_ok();
                if !valid {
                    tracing::warn!("Ignoring invalid CONTENT_API_BASE_URL: {}", url);
                }
                valid
            })
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let api_key = env::var("CONTENT_API_KEY").unwrap_or_default();

        let asset_base_url = env::var("WIDGET_ASSET_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty());

        let listen_addr =
            env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs);

        let scheme_policy = match env::var("STRICT_SCHEME_CHECK").as_deref() {
            Ok("true") | Ok("1") => SchemePolicy::TrimmedPrefix,
            _ => SchemePolicy::Prefix,
        };

        let date_format =
            env::var("DATE_FORMAT").unwrap_or_else(|_| DEFAULT_DATE_FORMAT.to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            api_base_url,
            api_key,
            asset_base_url,
            listen_addr,
            allowed_origins,
            request_timeout,
            scheme_policy,
            date_format,
            rust_log,
        }
    }

    /// Per-widget defaults derived from this configuration.
    pub fn widget_options(&self, kind: ItemKind) -> WidgetOptions {
        WidgetOptions {
            api_base_url: self.api_base_url.clone(),
            api_key: self.api_key.clone(),
            asset_base_url: self.asset_base_url.clone(),
            scheme_policy: self.scheme_policy,
            date_format: self.date_format.clone(),
            request_timeout: self.request_timeout,
            ..WidgetOptions::defaults(kind)
        }
    }
}

/// Options of a single widget instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    pub api_base_url: String,
    pub api_key: String,
    pub target_id: String,
    pub title: String,
    pub show_title: bool,
    pub asset_base_url: Option<String>,
    pub scheme_policy: SchemePolicy,
    pub date_format: String,
    pub request_timeout: Option<Duration>,
}

impl WidgetOptions {
    pub fn defaults(kind: ItemKind) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: String::new(),
            target_id: kind.css_class().to_string(),
            title: kind.default_title().to_string(),
            show_title: true,
            asset_base_url: None,
            scheme_policy: SchemePolicy::Prefix,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            request_timeout: None,
        }
    }

    /// Applies every override that is set; unset ones keep the current value.
    pub fn merge(mut self, overrides: WidgetOverrides) -> Self {
        if let Some(api_base_url) = overrides.api_base_url {
            self.api_base_url = api_base_url;
        }
        if let Some(api_key) = overrides.api_key {
            self.api_key = api_key;
        }
        if let Some(target_id) = overrides.target_id {
            self.target_id = target_id;
        }
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if let Some(show_title) = overrides.show_title {
            self.show_title = show_title;
        }
        if let Some(asset_base_url) = overrides.asset_base_url {
            self.asset_base_url = Some(asset_base_url);
        }
        if let Some(date_format) = overrides.date_format {
            self.date_format = date_format;
        }
        self
    }

    /// `{asset_base_url}/{file}`, or the bare file name when no base is set.
    pub fn stylesheet_href(&self, kind: ItemKind) -> String {
        match &self.asset_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), kind.stylesheet_file()),
            None => kind.stylesheet_file(),
        }
    }
}

/// Caller-supplied options; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetOverrides {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub target_id: Option<String>,
    pub title: Option<String>,
    pub show_title: Option<bool>,
    pub asset_base_url: Option<String>,
    pub date_format: Option<String>,
}
