// src/utils/html.rs

use html5ever::{
    Attribute, ParseOpts, QualName, local_name, namespace_url, ns, parse_fragment,
    serialize::{SerializeOpts, TraversalScope, serialize},
    tendril::TendrilSink,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Elements removed together with their whole subtree.
pub const DENIED_TAGS: [&str; 7] = [
    "script", "iframe", "object", "embed", "form", "input", "button",
];

/// Attributes that may carry a URL and are checked for the `javascript:` scheme.
const URL_ATTRIBUTES: [&str; 2] = ["href", "src"];

const JAVASCRIPT_SCHEME: &str = "javascript:";

/// How `href`/`src` values are compared against the `javascript:` scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemePolicy {
    /// The lower-cased value must start with `javascript:` as is.
    /// Leading whitespace is not stripped.
    #[default]
    Prefix,
    /// Leading whitespace is stripped before the prefix check.
    TrimmedPrefix,
}

impl SchemePolicy {
    fn is_script_url(self, value: &str) -> bool {
        let value = match self {
            SchemePolicy::Prefix => value,
            SchemePolicy::TrimmedPrefix => value.trim_start(),
        };
        value
            .get(..JAVASCRIPT_SCHEME.len())
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case(JAVASCRIPT_SCHEME))
    }
}

/// Escape plain text for use as element content or a quoted attribute value.
///
/// Replaces exactly `&`, `<`, `>`, `"` and `'` with character references.
/// Every other character is copied through untouched.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Strip script-capable constructs from a rich-text HTML fragment.
///
/// The fragment is parsed into a detached tree and walked in document order:
/// 1. Denylisted elements (`DENIED_TAGS`) are dropped with their subtree.
/// 2. Attributes whose name starts with `on` are dropped, whatever the case.
/// 3. `href`/`src` attributes pointing at `javascript:` are dropped; the element stays.
///
/// Everything else survives as is. This is a denylist, not an allow-list:
/// an element absent from `DENIED_TAGS` is never removed.
pub fn sanitize_html(html: &str, policy: SchemePolicy) -> String {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("div")),
        Vec::new(),
    )
    .one(html);

    // The fragment parser roots its output in a synthetic <html> element.
    let Some(root) = dom.document.children.borrow().first().cloned() else {
        return String::new();
    };

    scrub(&root, policy);

    let mut out = Vec::with_capacity(html.len());
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    if let Err(e) = serialize(&mut out, &SerializableHandle::from(root), opts) {
        tracing::error!("Failed to serialize sanitized fragment: {}", e);
        return String::new();
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn scrub(node: &Handle, policy: SchemePolicy) {
    node.children.borrow_mut().retain(|child| !is_denied(child));

    for child in node.children.borrow().iter() {
        if let NodeData::Element {
            attrs,
            template_contents,
            ..
        } = &child.data
        {
            attrs.borrow_mut().retain(|attr| keep_attribute(attr, policy));

            // The serializer only walks `children`, so template content is hoisted
            // there and scrubbed along with it.
            if let Some(contents) = template_contents.borrow().as_ref() {
                let hoisted = contents.children.take();
                child.children.borrow_mut().extend(hoisted);
            }
        }
        scrub(child, policy);
    }
}

fn is_denied(node: &Handle) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => {
            let local: &str = &name.local;
            DENIED_TAGS.iter().any(|tag| local.eq_ignore_ascii_case(tag))
        }
        _ => false,
    }
}

fn keep_attribute(attr: &Attribute, policy: SchemePolicy) -> bool {
    let name: &str = &attr.name.local;

    if name
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
    {
        return false;
    }

    let is_url_attribute = URL_ATTRIBUTES
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate));

    !(is_url_attribute && policy.is_script_url(&attr.value))
}
