// src/page.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::utils::html::escape_html;

/// Shared handle to an element the widget renders into.
///
/// Clones point at the same element. Content is replaced wholesale, so a reader
/// never observes a half-written render.
#[derive(Debug, Clone, Default)]
pub struct Container {
    inner: Arc<Mutex<Element>>,
}

#[derive(Debug, Default)]
struct Element {
    id: Option<String>,
    classes: Vec<String>,
    html: String,
    children: Vec<Container>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Element {
                id: Some(id.into()),
                ..Element::default()
            })),
        }
    }

    /// An element without an id, e.g. a layout wrapper.
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Element> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> Option<String> {
        self.lock().id.clone()
    }

    /// Adds a class unless it is already present.
    pub fn add_class(&self, class: &str) {
        let mut element = self.lock();
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.lock().classes.retain(|c| c != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.lock().classes.iter().any(|c| c == class)
    }

    /// Replaces the element's content and drops its children.
    pub fn set_html(&self, html: impl Into<String>) {
        let mut element = self.lock();
        element.html = html.into();
        element.children.clear();
    }

    /// Appends a child element after the current content.
    pub fn append_child(&self, child: Container) {
        self.lock().children.push(child);
    }

    pub fn inner_html(&self) -> String {
        let element = self.lock();
        let mut html = element.html.clone();
        for child in &element.children {
            html.push_str(&child.outer_html());
        }
        html
    }

    pub fn outer_html(&self) -> String {
        let (id, classes) = {
            let element = self.lock();
            (element.id.clone(), element.classes.join(" "))
        };

        let mut html = String::from("<div");
        if let Some(id) = id {
            html.push_str(&format!(r#" id="{}""#, escape_html(&id)));
        }
        if !classes.is_empty() {
            html.push_str(&format!(r#" class="{}""#, escape_html(&classes)));
        }
        html.push('>');
        html.push_str(&self.inner_html());
        html.push_str("</div>");
        html
    }
}

/// A stylesheet `<link>` placed in the page head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub id: String,
    pub href: String,
}

/// The host page widgets are mounted into: elements by id plus the head.
#[derive(Debug, Clone, Default)]
pub struct Page {
    inner: Arc<Mutex<PageState>>,
}

#[derive(Debug, Default)]
struct PageState {
    elements: HashMap<String, Container>,
    head: Vec<Stylesheet>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an element under its id. Anonymous elements are ignored.
    pub fn insert(&self, element: Container) {
        if let Some(id) = element.id() {
            self.lock().elements.insert(id, element);
        }
    }

    /// Creates, registers and returns an element with the given id.
    pub fn create_element(&self, id: &str) -> Container {
        let element = Container::new(id);
        self.insert(element.clone());
        element
    }

    pub fn element_by_id(&self, id: &str) -> Option<Container> {
        self.lock().elements.get(id).cloned()
    }

    /// Inserts a stylesheet link unless an element with `id` already exists.
    /// Returns whether a link was inserted.
    pub fn ensure_stylesheet(&self, id: &str, href: &str) -> bool {
        let mut state = self.lock();
        if state.head.iter().any(|sheet| sheet.id == id) || state.elements.contains_key(id) {
            return false;
        }
        state.head.push(Stylesheet {
            id: id.to_string(),
            href: href.to_string(),
        });
        true
    }

    pub fn stylesheets(&self) -> Vec<Stylesheet> {
        self.lock().head.clone()
    }

    /// The head's `<link>` tags, in insertion order.
    pub fn head_html(&self) -> String {
        self.lock()
            .head
            .iter()
            .map(|sheet| {
                format!(
                    r#"<link id="{}" rel="stylesheet" type="text/css" href="{}">"#,
                    escape_html(&sheet.id),
                    escape_html(&sheet.href)
                )
            })
            .collect()
    }
}
