//! An in-memory [`Host`] for tests and headless use.
//!
//! Nodes live in an arena and are never reused, so a stale [`NodeId`] keeps pointing at its
//! (detached) node. Events bubble from the target to the topmost ancestor; a detached subtree
//! never reaches the document.

use std::collections::BTreeMap;

use super::{Element, Event, EventKind, Host, ListenerId, NodeId, Rect, Viewport};

const DOCUMENT_TAG: &str = "#document";
const TEXT_TAG: &str = "#text";

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    value: String,
    styles: BTreeMap<String, String>,
    rect: Option<Rect>,
    size: Option<(f64, f64)>,
    label_font: Option<String>,
}

#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<Node>,
    document: NodeId,
    body: Option<NodeId>,
    listeners: BTreeMap<ListenerId, (NodeId, EventKind)>,
    next_listener: u32,
    viewport: Viewport,
    changes: Vec<NodeId>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A document with an empty body and a 1024x768 viewport.
    pub fn new() -> Self {
        let mut host = Self::without_body();
        let body = host.create_element(host.document, Element::new("body"));
        host.body = Some(body);
        host
    }

    /// A document that has not produced its body yet.
    pub fn without_body() -> Self {
        Self {
            nodes: vec![Node {
                tag: DOCUMENT_TAG.to_owned(),
                ..Default::default()
            }],
            document: NodeId(0),
            body: None,
            listeners: BTreeMap::new(),
            next_listener: 0,
            viewport: Viewport {
                width: 1024.0,
                height: 768.0,
                ..Default::default()
            },
            changes: Vec::new(),
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn exists(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    fn build(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let attributes: BTreeMap<String, String> = element.attributes.into_iter().collect();
        let value = attributes.get("value").cloned().unwrap_or_default();
        self.nodes.push(Node {
            tag: element.tag,
            parent: Some(parent),
            classes: element.classes,
            attributes,
            text: element.text,
            value,
            ..Default::default()
        });
        self.node_mut(parent).children.push(id);
        for child in element.children {
            self.build(id, child);
        }
        id
    }

    fn walk(&self, root: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(root);
        for &child in &self.node(root).children {
            self.walk(child, visit);
        }
    }

    /// Append a text node, which is not an element.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.build(parent, Element::new(TEXT_TAG).text(text))
    }

    /// Append `<input type="text" id=...>` under `parent`, tagged with `marker` when given.
    pub fn append_input(&mut self, parent: NodeId, id: &str, marker: Option<&str>) -> NodeId {
        let mut input = Element::new("input").attr("type", "text").attr("id", id);
        if let Some(marker) = marker {
            input = input.attr(marker, "");
        }
        self.create_element(parent, input)
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.node(node).tag
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.node(node).text.as_deref()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node).styles.get(property).map(String::as_str)
    }

    /// Descendants of `root` (itself included) carrying `class`, in document order.
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(root, &mut |id| {
            if self.node(id).classes.iter().any(|c| c == class) {
                found.push(id);
            }
        });
        found
    }

    /// Pin the viewport box of `node`.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        self.node_mut(node).rect = Some(rect);
    }

    /// Give a `top`/`left` positioned node a size for [`Host::bounding_rect`].
    pub fn set_size(&mut self, node: NodeId, width: f64, height: f64) {
        self.node_mut(node).size = Some((width, height));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Font of the label whose field group contains `node` and its descendants.
    pub fn set_label_font(&mut self, node: NodeId, font: &str) {
        self.node_mut(node).label_font = Some(font.to_owned());
    }

    /// Nodes that received a change notification, oldest first.
    pub fn changes(&self) -> &[NodeId] {
        &self.changes
    }

    /// Number of live listeners of `kind` on `node`.
    pub fn listener_count(&self, node: NodeId, kind: EventKind) -> usize {
        self.listeners
            .values()
            .filter(|&&(n, k)| n == node && k == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }
}

fn parse_px(value: Option<&String>) -> f64 {
    value
        .and_then(|v| v.trim_end_matches("px").parse().ok())
        .unwrap_or_default()
}

impl Host for MemoryHost {
    fn document(&self) -> NodeId {
        self.document
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.exists(node) && !self.node(node).tag.starts_with('#')
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk(self.document, &mut |node| {
            if found.is_none() && self.node(node).attributes.get("id").is_some_and(|v| v == id) {
                found = Some(node);
            }
        });
        found
    }

    fn query_all(&self, attribute: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.document, &mut |node| {
            if self.node(node).attributes.contains_key(attribute) {
                found.push(node);
            }
        });
        found
    }

    fn matches_within(&self, node: NodeId, attribute: &str) -> bool {
        let mut matched = false;
        self.walk(node, &mut |id| {
            matched |= self.node(id).attributes.contains_key(attribute);
        });
        matched
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.node_mut(node)
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.node_mut(node).attributes.remove(name);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).classes.iter().any(|c| c == class)
    }

    fn value(&self, node: NodeId) -> String {
        self.node(node).value.clone()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        self.node_mut(node).value = value.to_owned();
    }

    fn dispatch_change(&mut self, node: NodeId) {
        self.changes.push(node);
    }

    fn create_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.build(parent, element)
    }

    fn replace_children(&mut self, node: NodeId, content: Option<Element>) {
        for child in std::mem::take(&mut self.node_mut(node).children) {
            self.node_mut(child).parent = None;
        }
        if let Some(content) = content {
            self.build(node, content);
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.node_mut(node)
            .styles
            .insert(property.to_owned(), value.to_owned());
    }

    fn listen(&mut self, node: NodeId, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, (node, kind));
        id
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn propagation_path(&self, event: &Event) -> Vec<(NodeId, ListenerId)> {
        let mut path = Vec::new();
        let mut current = Some(event.target);
        while let Some(node) = current {
            path.extend(
                self.listeners
                    .iter()
                    .filter(|&(_, &(n, k))| n == node && k == event.kind)
                    .map(|(&id, _)| (node, id)),
            );
            current = self.node(node).parent;
        }
        path
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let n = self.node(node);
        if let Some(rect) = n.rect {
            return rect;
        }
        let (width, height) = n.size.unwrap_or_default();
        Rect::new(
            parse_px(n.styles.get("left")) - self.viewport.scroll_x,
            parse_px(n.styles.get("top")) - self.viewport.scroll_y,
            width,
            height,
        )
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn label_font(&self, node: NodeId) -> Option<String> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(font) = &self.node(id).label_font {
                return Some(font.clone());
            }
            current = self.node(id).parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let host = MemoryHost::new();
        let body = host.body().unwrap();
        assert_eq!(host.parent(body), Some(host.document()));
        assert!(host.is_element(body));
        assert!(!host.is_element(host.document()));
        assert!(MemoryHost::without_body().body().is_none());
    }

    #[test]
    fn test_query_and_lookup() {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let a = host.append_input(body, "a", Some("data-persian-date"));
        let group = host.create_element(body, Element::new("div"));
        let b = host.append_input(group, "b", Some("data-persian-date"));
        let _plain = host.append_input(body, "c", None);

        assert_eq!(host.query_all("data-persian-date"), vec![a, b]);
        assert_eq!(host.element_by_id("b"), Some(b));
        assert_eq!(host.element_by_id("missing"), None);
        assert!(host.matches_within(group, "data-persian-date"));
        assert!(host.contains(body, b));
        assert!(!host.contains(group, a));

        let text = host.append_text(body, "hello");
        assert!(!host.is_element(text));
    }

    #[test]
    fn test_bubbling_path() {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let input = host.append_input(body, "a", None);
        let on_input = host.listen(input, EventKind::Click);
        let on_doc = host.listen(host.document(), EventKind::Click);
        let _on_change = host.listen(input, EventKind::Change);

        let document = host.document();
        assert_eq!(
            host.propagation_path(&Event::click(input)),
            vec![(input, on_input), (document, on_doc)]
        );
        host.unlisten(on_input);
        assert_eq!(
            host.propagation_path(&Event::click(input)),
            vec![(document, on_doc)]
        );

        host.remove(input);
        assert!(host.propagation_path(&Event::click(input)).is_empty());
    }

    #[test]
    fn test_replace_children_detaches() {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let box_ = host.create_element(body, Element::new("div"));
        host.replace_children(
            box_,
            Some(Element::new("div").child(Element::new("span").class("x").text("1"))),
        );
        let old = host.find_by_class(box_, "x")[0];
        host.replace_children(box_, None);
        assert!(host.children(box_).is_empty());
        assert!(!host.contains(box_, old));
    }

    #[test]
    fn test_rect_from_position() {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let popup = host.create_element(body, Element::new("div"));
        host.set_viewport(Viewport {
            width: 800.0,
            height: 600.0,
            scroll_x: 0.0,
            scroll_y: 100.0,
        });
        host.set_style(popup, "left", "20px");
        host.set_style(popup, "top", "150px");
        host.set_size(popup, 300.0, 280.0);
        assert_eq!(host.bounding_rect(popup), Rect::new(20.0, 50.0, 300.0, 280.0));
    }
}
