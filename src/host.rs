//! The document the picker lives in.
//!
//! Nothing in this crate touches a real DOM. The widget, the controller and the binder talk to a
//! [`Host`], which owns the nodes, routes events and reports geometry. A browser host maps these
//! calls onto `web-sys`, a native toolkit onto its own tree, and [`memory::MemoryHost`] keeps an
//! in-memory tree for tests.

use core::fmt;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

/// Handle of a node owned by a [`Host`].
///
/// A plain identifier, holding one never keeps the node alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of an event listener registered through [`Host::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
}

/// An event as delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// The node the event was dispatched on.
    pub target: NodeId,
}

impl Event {
    pub const fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
        }
    }

    pub const fn change(target: NodeId) -> Self {
        Self {
            kind: EventKind::Change,
            target,
        }
    }
}

/// What a listener wants done with the rest of the propagation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    Stop,
}

/// Walk a propagation path, handing each listener to `deliver`.
///
/// A [`Propagation::Stop`] still lets the remaining listeners of the same node run, then ends the
/// walk. Returns whether the walk was stopped.
pub fn propagate(
    path: &[(NodeId, ListenerId)],
    mut deliver: impl FnMut(ListenerId) -> Propagation,
) -> Propagation {
    let mut stopped_at = None;
    for &(node, listener) in path {
        if stopped_at.is_some_and(|at| at != node) {
            break;
        }
        if deliver(listener) == Propagation::Stop {
            stopped_at = Some(node);
        }
    }
    match stopped_at {
        Some(_) => Propagation::Stop,
        None => Propagation::Continue,
    }
}

/// A box in viewport coordinates, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visible area of the document and how far it is scrolled, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Owned markup handed to [`Host::create_element`] and [`Host::replace_children`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every element of this subtree carrying `class`, in document order.
    pub fn find_all(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_class(class, &mut found);
        found
    }

    fn collect_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_class(class, found);
        }
    }
}

/// The document capabilities the picker needs.
///
/// All calls are synchronous and run on the host's single event thread.
pub trait Host {
    /// The document root, where document-level listeners attach.
    fn document(&self) -> NodeId;

    /// The body popups are appended to, `None` while the document is not ready.
    fn body(&self) -> Option<NodeId>;

    fn is_element(&self, node: NodeId) -> bool;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Every element carrying `attribute`, in document order.
    fn query_all(&self, attribute: &str) -> Vec<NodeId>;

    /// Whether `node` or one of its descendants carries `attribute`.
    fn matches_within(&self, node: NodeId, attribute: &str) -> bool;

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Current text of a form control.
    fn value(&self, node: NodeId) -> String;

    fn set_value(&mut self, node: NodeId, value: &str);

    /// Fire a bubbling change notification on `node` for outside subscribers.
    fn dispatch_change(&mut self, node: NodeId);

    /// Append `element` under `parent` and return the new node.
    fn create_element(&mut self, parent: NodeId, element: Element) -> NodeId;

    /// Drop every child of `node` and, when given, build `content` as its only child.
    fn replace_children(&mut self, node: NodeId, content: Option<Element>);

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn listen(&mut self, node: NodeId, kind: EventKind) -> ListenerId;

    fn unlisten(&mut self, listener: ListenerId);

    /// Listeners an event reaches with the node each one is attached to, from the target up to
    /// the document. Listeners of one node are in registration order.
    fn propagation_path(&self, event: &Event) -> Vec<(NodeId, ListenerId)>;

    /// Box of `node` relative to the viewport.
    fn bounding_rect(&self, node: NodeId) -> Rect;

    fn viewport(&self) -> Viewport;

    /// Font family of the label belonging to the field group of `node`, if any.
    fn label_font(&self, node: NodeId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagate_stops_after_node() {
        let path = [
            (NodeId(3), ListenerId(0)),
            (NodeId(3), ListenerId(1)),
            (NodeId(2), ListenerId(2)),
            (NodeId(0), ListenerId(3)),
        ];

        let mut seen = Vec::new();
        let result = propagate(&path, |l| {
            seen.push(l.0);
            match l.0 {
                0 => Propagation::Stop,
                _ => Propagation::Continue,
            }
        });
        assert_eq!(result, Propagation::Stop);
        assert_eq!(seen, [0, 1]);

        let mut seen = Vec::new();
        let result = propagate(&path, |l| {
            seen.push(l.0);
            Propagation::Continue
        });
        assert_eq!(result, Propagation::Continue);
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn test_element_builder() {
        let tree = Element::new("div")
            .class("outer")
            .attr("role", "grid")
            .child(Element::new("span").class("cell").text("1"))
            .child(Element::new("span").class("cell").class("empty"));
        assert_eq!(tree.attribute("role"), Some("grid"));
        assert_eq!(tree.attribute("missing"), None);
        assert_eq!(tree.find_all("cell").len(), 2);
        assert!(tree.find_all("empty")[0].has_class("cell"));
        assert_eq!(Rect::new(1.0, 2.0, 3.0, 4.0).right(), 4.0);
        assert_eq!(Rect::new(1.0, 2.0, 3.0, 4.0).bottom(), 6.0);
    }
}
