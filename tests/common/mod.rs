#![allow(dead_code)]

use egui::{Rect, pos2, vec2};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use viewer_session::input::{EventKind, InputSource, ListenerHandle, NormalizedEvent, RenderSurface, SurfaceId};
use viewer_session::tools::{Tool, ToolFeatures};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Surface double that records listener registrations and lifecycle calls
pub struct RecordingSurface {
    pub name: &'static str,
    pub id: SurfaceId,
    pub bounds: Rect,
    pub listeners: HashMap<EventKind, Vec<ListenerHandle>>,
    pub interaction_bound: bool,
    pub context_menu_enabled: bool,
    journal: Journal,
}

impl RecordingSurface {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            id: SurfaceId::new(),
            bounds: Rect::from_min_size(pos2(100.0, 50.0), vec2(512.0, 512.0)),
            listeners: HashMap::new(),
            interaction_bound: false,
            context_menu_enabled: true,
            journal: Rc::clone(journal),
        }
    }

    pub fn shared(name: &'static str, journal: &Journal) -> Rc<RefCell<RecordingSurface>> {
        Rc::new(RefCell::new(Self::new(name, journal)))
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// The handle the host would call back with for `kind`
    pub fn handle_for(&self, kind: EventKind) -> ListenerHandle {
        self.listeners[&kind][0]
    }
}

impl InputSource for RecordingSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn add_event_listener(&mut self, kind: EventKind, handle: ListenerHandle) {
        self.listeners.entry(kind).or_default().push(handle);
    }

    fn remove_event_listener(&mut self, kind: EventKind, handle: ListenerHandle) {
        if let Some(handles) = self.listeners.get_mut(&kind) {
            handles.retain(|h| *h != handle);
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn bind_interaction(&mut self) {
        self.interaction_bound = true;
        self.journal.borrow_mut().push(format!("{}:bind", self.name));
    }

    fn unbind_interaction(&mut self) {
        self.interaction_bound = false;
        self.journal.borrow_mut().push(format!("{}:unbind", self.name));
    }

    fn set_context_menu_enabled(&mut self, enabled: bool) {
        self.context_menu_enabled = enabled;
    }
}

/// Keyboard source double
pub struct RecordingKeyboard {
    pub id: SurfaceId,
    pub listeners: Vec<ListenerHandle>,
}

impl RecordingKeyboard {
    pub fn shared() -> Rc<RefCell<RecordingKeyboard>> {
        Rc::new(RefCell::new(Self {
            id: SurfaceId::new(),
            listeners: Vec::new(),
        }))
    }
}

impl InputSource for RecordingKeyboard {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn add_event_listener(&mut self, kind: EventKind, handle: ListenerHandle) {
        assert_eq!(kind, EventKind::KeyDown);
        self.listeners.push(handle);
    }

    fn remove_event_listener(&mut self, _kind: EventKind, handle: ListenerHandle) {
        self.listeners.retain(|h| *h != handle);
    }
}

/// Tool double that journals lifecycle calls and keeps received events
pub struct RecordingTool {
    name: &'static str,
    kinds: Vec<EventKind>,
    journal: Journal,
    pub events: Rc<RefCell<Vec<NormalizedEvent>>>,
    pub features: Rc<RefCell<Vec<ToolFeatures>>>,
}

impl RecordingTool {
    pub fn new(name: &'static str, kinds: &[EventKind], journal: &Journal) -> Self {
        Self {
            name,
            kinds: kinds.to_vec(),
            journal: Rc::clone(journal),
            events: Rc::new(RefCell::new(Vec::new())),
            features: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Tool for RecordingTool {
    fn init(&mut self) {
        self.journal.borrow_mut().push(format!("{}:init", self.name));
    }

    fn activate(&mut self, active: bool) {
        self.journal.borrow_mut().push(format!("{}:activate({})", self.name, active));
    }

    fn set_features(&mut self, features: &ToolFeatures) {
        self.features.borrow_mut().push(features.clone());
    }

    fn handles(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn handle_event(&mut self, event: &NormalizedEvent) {
        self.journal.borrow_mut().push(format!("{}:{:?}", self.name, event.kind));
        self.events.borrow_mut().push(event.clone());
    }
}
