// src/models/kind.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The two kinds of content a widget can display.
/// Everything that differs between the factsheet and newsletter widgets is derived from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Factsheets,
    Newsletters,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Factsheets, ItemKind::Newsletters];

    /// API path segment, also the key of the list inside the response's `data` object.
    pub fn path(self) -> &'static str {
        match self {
            ItemKind::Factsheets => "factsheets",
            ItemKind::Newsletters => "newsletters",
        }
    }

    /// Name used as the prefix of diagnostics, e.g. `FactsheetWidget: API key is required`.
    pub fn widget_name(self) -> &'static str {
        match self {
            ItemKind::Factsheets => "FactsheetWidget",
            ItemKind::Newsletters => "NewsletterWidget",
        }
    }

    /// CSS class added to the target element; also the default target id.
    pub fn css_class(self) -> &'static str {
        match self {
            ItemKind::Factsheets => "factsheet-widget",
            ItemKind::Newsletters => "newsletter-widget",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            ItemKind::Factsheets => "Factsheets",
            ItemKind::Newsletters => "Newsletters",
        }
    }

    /// Id of the marker `<link>` element guarding stylesheet injection.
    pub fn stylesheet_id(self) -> String {
        format!("{}-css", self.css_class())
    }

    pub fn stylesheet_file(self) -> String {
        format!("{}.css", self.css_class())
    }

    /// Id of the region that receives the fetched items.
    pub fn result_id(self) -> String {
        format!("{}-result", self.path())
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown widget kind '{}'", s)))
    }
}
