//! Document model: an owned, mutable SVG tree and its layer index.
//!
//! Markup is parsed with `roxmltree` and copied into an arena of nodes so the
//! surfaces can flip attributes (layer visibility, normalized strokes) and
//! serialize the result back to markup for display or rasterization.
//!
//! Element and attribute names are stored qualified (`cvjs:layername`), using
//! the prefix the source document bound to the namespace. Namespace
//! declarations are kept on the element that introduced them.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use crate::error::ParseError;

/// Handle to a node in an [`SvgDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element node.
#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified tag name as written in the output.
    pub name: String,
    /// Local tag name, used for matching.
    pub local: String,
    /// Attributes in source order, with qualified names.
    pub attrs: Vec<(String, String)>,
    /// Namespace declarations introduced on this element (`None` = default namespace).
    pub namespaces: Vec<(Option<String>, String)>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
}

/// Parsed drawing content.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SvgDocument {
    /// Parse SVG markup.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Xml`] for malformed markup and
    /// [`ParseError::NotSvg`] when the root element is not `<svg>`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let options = roxmltree::ParsingOptions { allow_dtd: true, ..roxmltree::ParsingOptions::default() };
        let xml = roxmltree::Document::parse_with_options(text, options)?;
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(ParseError::NotSvg(root.tag_name().name().to_owned()));
        }
        let mut doc = Self { nodes: Vec::new(), root: NodeId(0) };
        doc.root = doc.import(root, None);
        Ok(doc)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<roxmltree::Node<'_, '_>>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::Text(String::new()));

        let tag = node.tag_name();
        let mut element = Element {
            name: qualified_name(node, tag.namespace(), tag.name()),
            local: tag.name().to_owned(),
            attrs: node
                .attributes()
                .map(|a| (qualified_name(node, a.namespace(), a.name()), a.value().to_owned()))
                .collect(),
            namespaces: declared_namespaces(node, parent),
            children: Vec::new(),
        };

        for child in node.children() {
            if child.is_element() {
                element.children.push(self.import(child, Some(node)));
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    element.children.push(NodeId(self.nodes.len()));
                    self.nodes.push(NodeData::Text(text.to_owned()));
                }
            }
        }

        self.nodes[id.0] = NodeData::Element(element);
        id
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The element behind `id`, or `None` for text nodes.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Value of attribute `name` (qualified) on element `id`.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set (`Some`) or remove (`None`) an attribute. Returns false for non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: Option<&str>) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let pos = el.attrs.iter().position(|(k, _)| k == name);
        match (pos, value) {
            (Some(i), Some(v)) => v.clone_into(&mut el.attrs[i].1),
            (None, Some(v)) => el.attrs.push((name.to_owned(), v.to_owned())),
            (Some(i), None) => {
                el.attrs.remove(i);
            }
            (None, None) => {}
        }
        true
    }

    /// All elements in document order, root first.
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    /// Elements below `id` in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(el) = self.element(id) {
            for &child in &el.children {
                self.collect_elements(child, &mut out);
            }
        }
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(el) = self.element(id) {
            out.push(id);
            for &child in &el.children {
                self.collect_elements(child, out);
            }
        }
    }

    /// First element whose `id` attribute equals `value`.
    #[must_use]
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements().into_iter().find(|&n| self.attr(n, "id") == Some(value))
    }

    /// Concatenated text of all text nodes under `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.nodes.get(id.0) {
            Some(NodeData::Text(t)) => out.push_str(t),
            Some(NodeData::Element(el)) => {
                for &child in &el.children {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Text of every `<style>` element, concatenated in document order.
    #[must_use]
    pub fn style_text(&self) -> String {
        self.elements()
            .into_iter()
            .filter(|&n| self.element(n).is_some_and(|el| el.local == "style"))
            .map(|n| self.text_content(n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The root `viewBox` attribute, verbatim.
    #[must_use]
    pub fn view_box(&self) -> Option<&str> {
        self.attr(self.root, "viewBox")
    }

    /// The root `viewBox` as `(min_x, min_y, width, height)`. Malformed or
    /// empty boxes yield `None`.
    #[must_use]
    pub fn view_box_rect(&self) -> Option<(f64, f64, f64, f64)> {
        let parts: Result<Vec<f64>, _> = self
            .view_box()?
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse::<f64>)
            .collect();
        match parts.as_deref() {
            Ok(&[x, y, w, h]) if w > 0.0 && h > 0.0 => Some((x, y, w, h)),
            _ => None,
        }
    }

    /// Intrinsic `(width, height)` of the drawing in world units.
    ///
    /// Taken from the `viewBox`, falling back to absolute `width`/`height`.
    #[must_use]
    pub fn intrinsic_size(&self) -> Option<(f64, f64)> {
        if let Some((_, _, w, h)) = self.view_box_rect() {
            return Some((w, h));
        }
        let w = parse_length(self.attr(self.root, "width")?)?;
        let h = parse_length(self.attr(self.root, "height")?)?;
        (w > 0.0 && h > 0.0).then_some((w, h))
    }

    /// Build the layer-key index for `selector` over the whole document.
    #[must_use]
    pub fn layer_index(&self, selector: &LayerSelector) -> LayerIndex {
        let mut index = LayerIndex::default();
        for id in self.elements() {
            let Some(el) = self.element(id) else {
                continue;
            };
            if let Some(key) = selector.key(el) {
                index.push(key, id);
            }
        }
        index
    }

    /// Serialize the tree back to markup.
    #[must_use]
    pub fn to_markup(&self) -> String {
        self.to_markup_with(|css| css.to_owned())
    }

    /// Serialize the tree, passing the text of `<style>` elements through `style`.
    #[must_use]
    pub fn to_markup_with(&self, style: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        self.write_node(self.root, false, &style, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, in_style: bool, style: &dyn Fn(&str) -> String, out: &mut String) {
        match self.nodes.get(id.0) {
            Some(NodeData::Text(t)) if in_style => escape_into(&style(t), false, out),
            Some(NodeData::Text(t)) => escape_into(t, false, out),
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.name);
                for (prefix, uri) in &el.namespaces {
                    out.push_str(" xmlns");
                    if let Some(p) = prefix {
                        out.push(':');
                        out.push_str(p);
                    }
                    out.push_str("=\"");
                    escape_into(uri, true, out);
                    out.push('"');
                }
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                if el.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                let child_in_style = el.local == "style";
                for &child in &el.children {
                    self.write_node(child, child_in_style, style, out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
            None => {}
        }
    }
}

/// How elements are grouped into named layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelector {
    /// Every element carrying this (qualified) attribute belongs to the layer named by its value.
    Attribute(String),
    /// Every `<g>` with an `id` is a layer named by that id.
    GroupId,
}

impl LayerSelector {
    /// The layer key `el` belongs to under this selector, if any.
    #[must_use]
    pub fn key<'a>(&self, el: &'a Element) -> Option<&'a str> {
        let wanted = match self {
            Self::Attribute(name) => name.as_str(),
            Self::GroupId if el.local == "g" => "id",
            Self::GroupId => return None,
        };
        el.attrs
            .iter()
            .find(|(k, _)| k == wanted)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Map from layer key to the elements it selects, built once per load.
#[derive(Debug, Clone, Default)]
pub struct LayerIndex {
    order: Vec<String>,
    members: HashMap<String, Vec<NodeId>>,
}

impl LayerIndex {
    fn push(&mut self, key: &str, id: NodeId) {
        if let Some(list) = self.members.get_mut(key) {
            list.push(id);
        } else {
            self.order.push(key.to_owned());
            self.members.insert(key.to_owned(), vec![id]);
        }
    }

    /// Distinct keys in document order of first appearance.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// Elements selected by `key`, in document order.
    #[must_use]
    pub fn members(&self, key: &str) -> &[NodeId] {
        self.members.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_owned(),
    }
}

fn declared_namespaces(
    node: roxmltree::Node<'_, '_>,
    parent: Option<roxmltree::Node<'_, '_>>,
) -> Vec<(Option<String>, String)> {
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| {
            parent.is_none_or(|p| !p.namespaces().any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri()))
        })
        .map(|ns| (ns.name().map(str::to_owned), ns.uri().to_owned()))
        .collect()
}

fn parse_length(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

fn escape_into(text: &str, attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Escape `value` for use inside a double-quoted attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(value, true, &mut out);
    out
}
