//! Attaches the picker to every input tagged with the marker attribute.
//!
//! The [`FieldBinder`] owns the [`PickerController`] and is the entry point for host events: it
//! walks the propagation path of each event, runs the trigger listeners it registered itself and
//! hands everything else to the controller.

use std::collections::BTreeMap;

use crate::{
    Error, PickerController, Result,
    host::{Event, EventKind, Host, ListenerId, NodeId, Propagation, propagate},
};

/// A field to bind, by handle or by element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Node(NodeId),
    Id(&'a str),
}

impl From<NodeId> for FieldRef<'_> {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

/// What handling an event asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResult {
    /// The host must skip its default action (focus, caret placement, native pickers).
    pub default_prevented: bool,
    pub propagation: Propagation,
}

/// Binds trigger inputs and routes host events.
pub struct FieldBinder<H: Host> {
    controller: PickerController<H>,
    /// Click listener of each bound trigger.
    triggers: BTreeMap<ListenerId, NodeId>,
}

impl<H: Host> FieldBinder<H> {
    pub fn new(controller: PickerController<H>) -> Self {
        Self {
            controller,
            triggers: BTreeMap::new(),
        }
    }

    pub fn controller(&self) -> &PickerController<H> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PickerController<H> {
        &mut self.controller
    }

    /// Make `input` a trigger. `Ok(false)` when it already is one.
    pub fn bind(&mut self, input: NodeId) -> Result<bool> {
        let initialized = &self.controller.config().initialized_attribute;
        let host = self.controller.host();
        if !host.is_element(input) {
            return Err(Error::NotAnElement(input));
        }
        if host.attribute(input, initialized).is_some() {
            return Ok(false);
        }

        let initialized = initialized.clone();
        let host = self.controller.host_mut();
        host.set_attribute(input, &initialized, "true");
        let listener = host.listen(input, EventKind::Click);
        self.triggers.insert(listener, input);
        tracing::debug!(%input, "trigger bound");
        Ok(true)
    }

    /// Bind one field if it is not bound yet.
    ///
    /// Returns whether an element answers to `field`, so a field bound earlier gives `Ok(true)`.
    /// Use [`Self::bind`] to learn whether this call bound it.
    pub fn init_field<'a>(&mut self, field: impl Into<FieldRef<'a>>) -> Result<bool> {
        let node = match field.into() {
            FieldRef::Node(node) => node,
            FieldRef::Id(id) => match self.controller.host().element_by_id(id) {
                Some(node) => node,
                None => {
                    tracing::debug!(id, "no field with this id");
                    return Ok(false);
                }
            },
        };
        self.bind(node).map(|_| true)
    }

    /// Bind every marked element that is not a trigger yet. Returns how many were bound.
    pub fn init_all_fields(&mut self) -> usize {
        let marker = &self.controller.config().marker_attribute;
        let candidates = self.controller.host().query_all(marker);
        candidates
            .into_iter()
            .filter(|&node| match self.bind(node) {
                Ok(bound) => bound,
                Err(error) => {
                    tracing::warn!(%error, "marked node skipped");
                    false
                }
            })
            .count()
    }

    /// Tell the binder that `nodes` were inserted into the document.
    ///
    /// Rescans the document when any of them carries the marker or contains a node that does.
    pub fn notify_nodes_added(&mut self, nodes: &[NodeId]) -> usize {
        let marker = &self.controller.config().marker_attribute;
        let host = self.controller.host();
        let marked = nodes.iter().any(|&node| host.matches_within(node, marker));
        match marked {
            true => self.init_all_fields(),
            false => 0,
        }
    }

    /// Deliver a host event along its propagation path.
    pub fn handle_event(&mut self, event: Event) -> EventResult {
        let path = self.controller.host().propagation_path(&event);
        let mut default_prevented = false;
        let propagation = propagate(&path, |listener| match self.triggers.get(&listener) {
            Some(&input) => {
                self.controller.toggle(input);
                default_prevented = true;
                Propagation::Stop
            }
            None => self
                .controller
                .dispatch(listener, &event)
                .unwrap_or_default(),
        });
        EventResult {
            default_prevented,
            propagation,
        }
    }

    /// Close the popup, whatever state it is in.
    pub fn hide_picker(&mut self) {
        self.controller.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::{
        GregorianDate, PickerConfig,
        host::{Element, memory::MemoryHost},
        traits::{IRAN_OFFSET_MINUTES, ManualClock},
        widget::{CLASS_DAY, DAY_ATTRIBUTE},
    };

    const MARKER: &str = "data-persian-date";

    struct Fixture {
        binder: FieldBinder<MemoryHost>,
        clock: ManualClock,
        a: NodeId,
        b: NodeId,
        outside: NodeId,
    }

    fn start() -> SystemTime {
        GregorianDate::new(2023, 4, 9)
            .unwrap()
            .midnight_at_offset(IRAN_OFFSET_MINUTES)
            + Duration::from_secs(9 * 3600)
    }

    fn fixture() -> Fixture {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let a = host.append_input(body, "a", Some(MARKER));
        let b = host.append_input(body, "b", Some(MARKER));
        let outside = host.create_element(body, Element::new("p"));
        let clock = ManualClock::new(start());
        let controller = PickerController::new(host, clock.clone(), PickerConfig::default());
        let mut binder = FieldBinder::new(controller);
        assert_eq!(binder.init_all_fields(), 2);
        Fixture {
            binder,
            clock,
            a,
            b,
            outside,
        }
    }

    fn host(f: &Fixture) -> &MemoryHost {
        f.binder.controller().host()
    }

    #[test]
    fn test_binding_is_idempotent() {
        let mut f = fixture();
        assert_eq!(f.binder.init_all_fields(), 0);
        assert_eq!(f.binder.bind(f.a), Ok(false));
        assert_eq!(f.binder.init_field(f.a), Ok(true));
        assert_eq!(f.binder.init_field("b"), Ok(true));
        assert_eq!(f.binder.init_field("b"), Ok(true));
        assert_eq!(host(&f).listener_count(f.b, EventKind::Click), 1);
        assert_eq!(host(&f).listener_count(f.a, EventKind::Click), 1);
        assert_eq!(
            host(&f).attribute(f.a, "data-persian-date-initialized").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_init_field_by_id() {
        let mut host = MemoryHost::new();
        let body = host.body().unwrap();
        let plain = host.append_input(body, "plain", None);
        let controller =
            PickerController::new(host, ManualClock::new(start()), PickerConfig::default());
        let mut binder = FieldBinder::new(controller);

        assert_eq!(binder.init_all_fields(), 0);
        assert_eq!(binder.init_field("missing"), Ok(false));
        assert_eq!(binder.init_field("plain"), Ok(true));
        assert_eq!(binder.init_field("plain"), Ok(true));
        assert_eq!(binder.init_field(plain), Ok(true));
        assert_eq!(binder.controller().host().listener_count(plain, EventKind::Click), 1);
    }

    #[test]
    fn test_non_element_is_rejected() {
        let mut f = fixture();
        let body = host(&f).body().unwrap();
        let text = f.binder.controller_mut().host_mut().append_text(body, "x");
        assert_eq!(f.binder.bind(text), Err(Error::NotAnElement(text)));
        assert_eq!(
            f.binder.init_field(FieldRef::Node(text)),
            Err(Error::NotAnElement(text))
        );
    }

    #[test]
    fn test_trigger_click_toggles() {
        let mut f = fixture();
        let result = f.binder.handle_event(Event::click(f.a));
        assert!(result.default_prevented);
        assert_eq!(result.propagation, Propagation::Stop);
        // the opening click never reaches the document listener
        assert!(f.binder.controller().is_open_for(f.a));

        f.clock.advance(Duration::from_secs(1));
        f.binder.handle_event(Event::click(f.a));
        assert!(!f.binder.controller().is_open());
    }

    #[test]
    fn test_one_picker_at_a_time() {
        let mut f = fixture();
        f.binder.handle_event(Event::click(f.a));
        f.binder.handle_event(Event::click(f.b));
        assert!(f.binder.controller().is_open_for(f.b));
        assert_eq!(host(&f).attribute(f.a, "data-calendar-open"), None);
    }

    #[test]
    fn test_outside_click_after_guard() {
        let mut f = fixture();
        f.binder.handle_event(Event::click(f.a));

        f.clock.advance(Duration::from_millis(99));
        let result = f.binder.handle_event(Event::click(f.outside));
        assert!(!result.default_prevented);
        assert!(f.binder.controller().is_open());

        f.clock.advance(Duration::from_millis(1));
        f.binder.handle_event(Event::click(f.outside));
        assert!(!f.binder.controller().is_open());
    }

    #[test]
    fn test_pick_a_day() {
        let mut f = fixture();
        f.binder
            .controller_mut()
            .host_mut()
            .set_value(f.a, "1402/01/15");
        f.binder.handle_event(Event::click(f.a));
        let popup = f.binder.controller().popup().unwrap();
        let cell = host(&f)
            .find_by_class(popup, CLASS_DAY)
            .into_iter()
            .find(|&n| host(&f).attribute(n, DAY_ATTRIBUTE).as_deref() == Some("20"))
            .unwrap();

        let result = f.binder.handle_event(Event::click(cell));
        assert!(!result.default_prevented);
        assert_eq!(host(&f).value(f.a), "1402/01/20");
        assert_eq!(host(&f).changes(), [f.a]);
        assert!(!f.binder.controller().is_open());
    }

    #[test]
    fn test_dynamic_insertion() {
        let mut f = fixture();
        let body = host(&f).body().unwrap();
        let host_mut = f.binder.controller_mut().host_mut();
        let plain = host_mut.create_element(body, Element::new("div"));
        let wrapper = host_mut.create_element(
            body,
            Element::new("div").child(Element::new("input").attr(MARKER, "")),
        );

        assert_eq!(f.binder.notify_nodes_added(&[plain]), 0);
        assert_eq!(f.binder.notify_nodes_added(&[plain, wrapper]), 1);
        assert_eq!(f.binder.notify_nodes_added(&[wrapper]), 0);

        let input = host(&f).children(wrapper)[0];
        f.binder.handle_event(Event::click(input));
        assert!(f.binder.controller().is_open_for(input));
    }

    #[test]
    fn test_hide_picker() {
        let mut f = fixture();
        f.binder.hide_picker();
        f.binder.handle_event(Event::click(f.a));
        f.binder.hide_picker();
        assert!(!f.binder.controller().is_open());
        assert_eq!(host(&f).attribute(f.a, "data-calendar-open"), None);
    }
}
