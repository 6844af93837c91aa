use std::collections::HashMap;

use egui::{PointerButton, Rect};
use log::{debug, trace, warn};

use super::{EventKind, GroupId, ListenerHandle, NormalizedEvent, RawEvent, SharedSource, SharedSurface, SurfaceId};
use crate::id_generator::generate_id;
use crate::tools::ToolRegistry;

/// Tool that receives secondary-button input regardless of the selection
pub const DEFAULT_OVERRIDE_TOOL: &str = "WindowLevel";

/// What a listener handle was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dispatcher {
    source: SurfaceId,
    kind: EventKind,
}

/// Keyboard listener registration. Dropping it removes the listener from its source.
pub struct KeyboardRegistration {
    source: SharedSource,
    handle: ListenerHandle,
}

impl std::fmt::Debug for KeyboardRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardRegistration")
            .field("handle", &self.handle)
            .finish()
    }
}

impl KeyboardRegistration {
    pub fn handle(&self) -> ListenerHandle {
        self.handle
    }
}

impl Drop for KeyboardRegistration {
    fn drop(&mut self) {
        match self.source.try_borrow_mut() {
            Ok(mut source) => source.remove_event_listener(EventKind::KeyDown, self.handle),
            Err(_) => warn!("Keyboard source busy, listener {:?} not removed", self.handle),
        }
    }
}

/// Binds render surfaces to interaction input and routes their events to tools.
///
/// Listener handles are memoized per `(source, kind)`: binding the same
/// surface again hands out the handles created the first time.
pub struct SurfaceBinder {
    bound: HashMap<GroupId, SharedSurface>,
    handles: HashMap<(SurfaceId, EventKind), ListenerHandle>,
    dispatchers: HashMap<ListenerHandle, Dispatcher>,
    override_tool: String,
    suppress_context_menu: bool,
}

impl std::fmt::Debug for SurfaceBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceBinder")
            .field("bound", &self.bound.keys().collect::<Vec<_>>())
            .field("dispatchers", &self.dispatchers.len())
            .field("override_tool", &self.override_tool)
            .finish()
    }
}

impl Default for SurfaceBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceBinder {
    pub fn new() -> Self {
        Self {
            bound: HashMap::new(),
            handles: HashMap::new(),
            dispatchers: HashMap::new(),
            override_tool: DEFAULT_OVERRIDE_TOOL.to_string(),
            suppress_context_menu: true,
        }
    }

    pub fn with_override_tool(mut self, name: impl Into<String>) -> Self {
        self.override_tool = name.into();
        self
    }

    pub fn set_suppress_context_menu(&mut self, suppress: bool) {
        self.suppress_context_menu = suppress;
    }

    pub fn override_tool(&self) -> &str {
        &self.override_tool
    }

    /// Number of memoized dispatchers
    pub fn dispatcher_count(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn bound_layer(&self, group: &GroupId) -> Option<&SharedSurface> {
        self.bound.get(group)
    }

    fn dispatcher_handle(&mut self, source: SurfaceId, kind: EventKind) -> ListenerHandle {
        if let Some(handle) = self.handles.get(&(source, kind)) {
            return *handle;
        }
        let handle = ListenerHandle(generate_id());
        self.handles.insert((source, kind), handle);
        self.dispatchers.insert(handle, Dispatcher { source, kind });
        handle
    }

    /// Bind `surface` as the interactive layer of `group`, unbinding the
    /// surface previously bound there.
    pub fn bind_layer(&mut self, surface: SharedSurface, group: impl Into<GroupId>) {
        let group = group.into();
        let id = surface.borrow().id();
        if self.bound.contains_key(&group) {
            self.unbind_layer(&group);
        }
        // A surface belongs to one group at a time
        if let Some(other) = self.group_of(id) {
            debug!("Moving surface {} from group {} to {}", id, other, group);
            self.unbind_layer(&other);
        }

        {
            let mut target = surface.borrow_mut();
            target.bind_interaction();
            for kind in EventKind::SURFACE_KINDS {
                let handle = self.dispatcher_handle(id, kind);
                target.add_event_listener(kind, handle);
            }
            if self.suppress_context_menu {
                target.set_context_menu_enabled(false);
            }
        }
        debug!("Bound surface {} to group {}", id, group);
        self.bound.insert(group, surface);
    }

    /// Unbind the surface of `group` and hand it back
    pub fn unbind_layer(&mut self, group: &GroupId) -> Option<SharedSurface> {
        let surface = self.bound.remove(group)?;
        {
            let mut target = surface.borrow_mut();
            let id = target.id();
            target.unbind_interaction();
            for kind in EventKind::SURFACE_KINDS {
                if let Some(handle) = self.handles.get(&(id, kind)) {
                    target.remove_event_listener(kind, *handle);
                }
            }
            if self.suppress_context_menu {
                target.set_context_menu_enabled(true);
            }
            debug!("Unbound surface {} from group {}", id, group);
        }
        Some(surface)
    }

    fn group_of(&self, id: SurfaceId) -> Option<GroupId> {
        self.bound
            .iter()
            .find(|(_, surface)| surface.borrow().id() == id)
            .map(|(group, _)| group.clone())
    }

    pub fn bound_groups(&self) -> Vec<&GroupId> {
        self.bound.keys().collect()
    }

    pub fn unbind_all(&mut self) {
        let groups: Vec<GroupId> = self.bound.keys().cloned().collect();
        for group in &groups {
            self.unbind_layer(group);
        }
    }

    /// Register the key-down listener of a keyboard source
    pub fn attach_keyboard(&mut self, source: SharedSource) -> KeyboardRegistration {
        let id = source.borrow().id();
        let handle = self.dispatcher_handle(id, EventKind::KeyDown);
        source.borrow_mut().add_event_listener(EventKind::KeyDown, handle);
        debug!("Attached keyboard source {}", id);
        KeyboardRegistration { source, handle }
    }

    fn surface_bounds(&self, id: SurfaceId) -> Option<Rect> {
        self.bound.values().find_map(|surface| {
            let surface = surface.borrow();
            (surface.id() == id).then(|| surface.bounds())
        })
    }

    /// Deliver an event received under `handle` to the tool that should get it.
    /// Events without a resolvable handler are dropped.
    pub fn dispatch(&self, handle: ListenerHandle, raw: RawEvent, tools: &mut ToolRegistry) {
        let Some(dispatcher) = self.dispatchers.get(&handle) else {
            trace!("Dropping event for unknown listener {:?}", handle);
            return;
        };
        let kind = dispatcher.kind;

        // Key-down handles belong to keyboard sources, which are never bound as layers
        let bounds = self.surface_bounds(dispatcher.source);
        if bounds.is_none() && kind != EventKind::KeyDown {
            trace!("Dropping {:?} from unbound surface {}", kind, dispatcher.source);
            return;
        }

        if kind.is_forwarded() {
            if let Some(handler) = tools.selected_tool_event_handler(kind) {
                handler.handle(&NormalizedEvent::forwarded(kind, raw));
            }
            return;
        }

        let Some(bounds) = bounds else {
            return;
        };
        let event = NormalizedEvent::on_surface(kind, raw, bounds);

        let handler = if routes_to_override(&event) {
            if !tools.has_tool(&self.override_tool) {
                warn!("Override tool '{}' is not registered, dropping {:?}", self.override_tool, kind);
            }
            tools.tool_event_handler(&self.override_tool, kind)
        } else {
            tools.selected_tool_event_handler(kind)
        };

        match handler {
            Some(handler) => handler.handle(&event),
            None => trace!("No handler for {:?}", kind),
        }
    }
}

/// Secondary-button press, or a move with only the secondary button held
fn routes_to_override(event: &NormalizedEvent) -> bool {
    match event.kind {
        EventKind::PointerDown => event.raw.button == Some(PointerButton::Secondary),
        EventKind::PointerMove => event.raw.held_buttons == [PointerButton::Secondary],
        _ => false,
    }
}
