//! The shared popup and the rules deciding when it opens, moves and closes.
//!
//! One [`PickerController`] serves every trigger of a document. At most one popup is open at a
//! time and it is reused between triggers. Clicks anywhere else in the document dismiss it,
//! except during a short window right after opening so the click that opened it does not close
//! it again.

use std::time::SystemTime;

use crate::{
    PickerConfig,
    host::{Element, Event, EventKind, Host, ListenerId, NodeId, Propagation, Rect, propagate},
    traits::Clock,
    utility::{format_date_text, parse_date_text},
    widget::{CalendarWidget, WidgetConfig, WidgetOutcome},
};

#[derive(Debug, Clone, Copy)]
struct Popup {
    node: NodeId,
    /// Keeps clicks inside the popup from reaching the document listener.
    listener: ListenerId,
}

/// Owner of the popup, the calendar inside it and the document click listener.
pub struct PickerController<H: Host> {
    host: H,
    clock: Box<dyn Clock>,
    config: PickerConfig,
    document_listener: ListenerId,
    popup: Option<Popup>,
    widget: Option<CalendarWidget>,
    current_trigger: Option<NodeId>,
    last_open: Option<SystemTime>,
    /// Trigger box of the last open, until [`Self::on_layout_settled`] consumes it.
    pending_reflow: Option<Rect>,
    reported_unavailable: bool,
}

impl<H: Host> PickerController<H> {
    /// Take over `host` and start listening for document clicks.
    pub fn new(mut host: H, clock: impl Clock + 'static, config: PickerConfig) -> Self {
        let document = host.document();
        let document_listener = host.listen(document, EventKind::Click);
        Self {
            host,
            clock: Box::new(clock),
            config,
            document_listener,
            popup: None,
            widget: None,
            current_trigger: None,
            last_open: None,
            pending_reflow: None,
            reported_unavailable: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// The calendar of the open popup.
    pub fn widget(&self) -> Option<&CalendarWidget> {
        self.widget.as_ref()
    }

    /// The popup node, once it has been created.
    pub fn popup(&self) -> Option<NodeId> {
        self.popup.map(|p| p.node)
    }

    pub fn current_trigger(&self) -> Option<NodeId> {
        self.current_trigger
    }

    pub fn is_open(&self) -> bool {
        self.current_trigger.is_some()
    }

    pub fn is_open_for(&self, input: NodeId) -> bool {
        self.current_trigger == Some(input)
    }

    /// Show the calendar for `input`, closing the one open for another input first.
    pub fn open(&mut self, input: NodeId) {
        match self.current_trigger {
            Some(current) if current == input => return,
            Some(_) => self.close(),
            None => {}
        }
        let Some(popup) = self.ensure_popup() else {
            return;
        };

        if let Some(mut widget) = self.widget.take() {
            widget.destroy(&mut self.host);
        }
        self.host.replace_children(popup, None);

        let offset = self.config.utc_offset_minutes;
        let stored = self.host.value(input);
        let initial_date = match stored.trim() {
            "" => None,
            text => match parse_date_text(text).and_then(|date| date.to_gregorian()) {
                Ok(date) => Some(date.midnight_at_offset(offset)),
                Err(error) => {
                    tracing::warn!(%input, %error, "stored date ignored");
                    None
                }
            },
        };

        let mut config = WidgetConfig::from(&self.config)
            .now(self.clock.now())
            .on_date_select(move |host, selection| {
                host.set_value(input, &format_date_text(&selection.jalali));
                host.dispatch_change(input);
            });
        config.initial_date = initial_date;

        let widget = match CalendarWidget::new(&mut self.host, popup, config) {
            Ok(widget) => widget,
            Err(error) => {
                tracing::error!(%error, "calendar could not be built");
                return;
            }
        };
        self.widget = Some(widget);
        self.current_trigger = Some(input);
        self.last_open = Some(self.clock.now());
        self.host
            .set_attribute(input, &self.config.open_attribute, "true");

        if let Some(font) = self.host.label_font(input) {
            self.host.set_style(popup, "font-family", &font);
        }
        self.host.set_style(popup, "display", "block");

        let anchor = self.host.bounding_rect(input);
        let viewport = self.host.viewport();
        self.place(
            popup,
            anchor.left + viewport.scroll_x,
            anchor.bottom() + viewport.scroll_y + self.config.popup_gap,
        );
        self.pending_reflow = Some(anchor);
        tracing::debug!(%input, "picker opened");
    }

    /// Hide the popup and tear down its calendar.
    pub fn close(&mut self) {
        self.pending_reflow = None;
        if let Some(mut widget) = self.widget.take() {
            widget.destroy(&mut self.host);
        }
        if let Some(popup) = self.popup() {
            self.host.set_style(popup, "display", "none");
            self.host.replace_children(popup, None);
        }
        if let Some(trigger) = self.current_trigger.take() {
            self.host
                .remove_attribute(trigger, &self.config.open_attribute);
            tracing::debug!(%trigger, "picker closed");
        }
    }

    /// Close when open for `input`, open otherwise.
    pub fn toggle(&mut self, input: NodeId) {
        match self.is_open_for(input) {
            true => self.close(),
            false => self.open(input),
        }
    }

    /// Keep the popup inside the viewport once the host has laid it out.
    ///
    /// Pulls the popup left when it overflows the right edge and flips it above the trigger when
    /// it overflows the bottom. Only the first call after an open does anything.
    pub fn on_layout_settled(&mut self) {
        let Some(anchor) = self.pending_reflow.take() else {
            return;
        };
        let Some(popup) = self.popup() else {
            return;
        };

        let rect = self.host.bounding_rect(popup);
        let viewport = self.host.viewport();
        if rect.right() > viewport.width {
            let left = viewport.width - rect.width - self.config.viewport_margin + viewport.scroll_x;
            self.host.set_style(popup, "left", &format!("{left}px"));
        }
        if rect.bottom() > viewport.height {
            let top = anchor.top + viewport.scroll_y - rect.height - self.config.popup_gap;
            self.host.set_style(popup, "top", &format!("{top}px"));
        }
    }

    /// Dismiss the popup for a click that reached the document.
    ///
    /// Returns whether the popup was closed.
    pub fn handle_document_click(&mut self, event: &Event) -> bool {
        let Some(trigger) = self.current_trigger else {
            return false;
        };
        if let Some(opened) = self.last_open {
            let guard = self.config.open_guard();
            // a clock running backwards counts as still inside the window
            let fresh = self
                .clock
                .now()
                .duration_since(opened)
                .map_or(true, |elapsed| elapsed < guard);
            if fresh {
                return false;
            }
        }
        if self
            .popup()
            .is_some_and(|popup| self.host.contains(popup, event.target))
        {
            return false;
        }
        if event.target == trigger {
            return false;
        }
        self.close();
        true
    }

    /// Run the listener `listener` for `event`, `None` when the controller does not own it.
    pub fn dispatch(&mut self, listener: ListenerId, event: &Event) -> Option<Propagation> {
        if listener == self.document_listener {
            self.handle_document_click(event);
            return Some(Propagation::Continue);
        }
        if self.popup.is_some_and(|p| p.listener == listener) {
            return Some(Propagation::Stop);
        }

        let widget = self.widget.as_mut().filter(|w| w.owns_listener(listener))?;
        let outcome = widget.handle_event(&mut self.host, event);
        match outcome {
            WidgetOutcome::Selected(_) | WidgetOutcome::Closed => self.close(),
            WidgetOutcome::Navigated | WidgetOutcome::Ignored => {}
        }
        Some(Propagation::Continue)
    }

    /// Deliver `event` to every controller listener on its path.
    pub fn handle_event(&mut self, event: &Event) -> Propagation {
        let path = self.host.propagation_path(event);
        propagate(&path, |listener| {
            self.dispatch(listener, event).unwrap_or_default()
        })
    }

    fn ensure_popup(&mut self) -> Option<NodeId> {
        if let Some(popup) = self.popup {
            return Some(popup.node);
        }
        let Some(body) = self.host.body() else {
            if !self.reported_unavailable {
                tracing::error!("document has no body, the picker cannot open");
                self.reported_unavailable = true;
            }
            return None;
        };

        let node = self
            .host
            .create_element(body, Element::new("div").class(&self.config.popup_class));
        self.host.set_style(node, "position", "absolute");
        self.host.set_style(node, "z-index", "999999");
        self.host.set_style(node, "display", "none");
        let listener = self.host.listen(node, EventKind::Click);
        self.popup = Some(Popup { node, listener });
        tracing::debug!(%node, "popup created");
        Some(node)
    }

    fn place(&mut self, popup: NodeId, left: f64, top: f64) {
        self.host.set_style(popup, "left", &format!("{left}px"));
        self.host.set_style(popup, "top", &format!("{top}px"));
    }
}
