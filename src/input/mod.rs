use egui::{Key, Modifiers, PointerButton, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

mod binder;
mod gestures;

pub use binder::{DEFAULT_OVERRIDE_TOOL, KeyboardRegistration, SurfaceBinder};

/// Canonical interaction event kinds a surface can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    /// Pointer left the surface
    PointerOut,
    Wheel,
    DoubleClick,
    TouchStart,
    TouchMove,
    /// Last contact lifted; carries no position
    TouchEnd,
    KeyDown,
}

impl EventKind {
    /// Every kind a bound render surface listens to
    pub const SURFACE_KINDS: [EventKind; 9] = [
        EventKind::PointerDown,
        EventKind::PointerMove,
        EventKind::PointerUp,
        EventKind::PointerOut,
        EventKind::Wheel,
        EventKind::DoubleClick,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
    ];

    /// Kinds handed to tools unchanged, without surface coordinates
    pub fn is_forwarded(self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::TouchEnd)
    }

    pub fn is_touch(self) -> bool {
        matches!(self, EventKind::TouchStart | EventKind::TouchMove | EventKind::TouchEnd)
    }
}

/// Identifier of a rendering surface or other input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a layer group; at most one surface is bound per group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token a source stores for a registered listener.
/// The host hands it back to [`SurfaceBinder::dispatch`] with each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// Raw input as delivered by the host, positions in client coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEvent {
    /// Pointer position, or one position per touch contact
    pub contacts: Vec<Pos2>,
    /// Button that changed state, for press and release
    pub button: Option<PointerButton>,
    /// Buttons that are currently held down
    pub held_buttons: Vec<PointerButton>,
    pub wheel_delta: Vec2,
    pub key: Option<Key>,
    pub modifiers: Modifiers,
}

impl RawEvent {
    pub fn pointer(pos: Pos2) -> Self {
        Self {
            contacts: vec![pos],
            ..Self::default()
        }
    }

    pub fn press(pos: Pos2, button: PointerButton) -> Self {
        Self {
            contacts: vec![pos],
            button: Some(button),
            held_buttons: vec![button],
            ..Self::default()
        }
    }

    pub fn drag(pos: Pos2, held_buttons: Vec<PointerButton>) -> Self {
        Self {
            contacts: vec![pos],
            held_buttons,
            ..Self::default()
        }
    }

    pub fn wheel(pos: Pos2, delta: Vec2) -> Self {
        Self {
            contacts: vec![pos],
            wheel_delta: delta,
            ..Self::default()
        }
    }

    pub fn touches(contacts: Vec<Pos2>) -> Self {
        Self {
            contacts,
            ..Self::default()
        }
    }

    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: Some(key),
            modifiers,
            ..Self::default()
        }
    }
}

/// An input event as seen by tools: the raw event plus surface-relative
/// coordinates of its first contact and, for two-contact input, its second.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    pub raw: RawEvent,
    pub position: Option<Pos2>,
    pub second: Option<Pos2>,
}

impl NormalizedEvent {
    pub fn x(&self) -> Option<f32> {
        self.position.map(|p| p.x)
    }

    pub fn y(&self) -> Option<f32> {
        self.position.map(|p| p.y)
    }

    pub fn x1(&self) -> Option<f32> {
        self.second.map(|p| p.x)
    }

    pub fn y1(&self) -> Option<f32> {
        self.second.map(|p| p.y)
    }
}

/// Something that delivers input to registered listener handles
pub trait InputSource {
    fn id(&self) -> SurfaceId;

    fn add_event_listener(&mut self, kind: EventKind, handle: ListenerHandle);

    fn remove_event_listener(&mut self, kind: EventKind, handle: ListenerHandle);
}

/// An interactive drawable region that tools receive input from
pub trait RenderSurface: InputSource {
    /// Surface rectangle in client coordinates
    fn bounds(&self) -> Rect;

    /// Start capturing interaction input
    fn bind_interaction(&mut self);

    /// Stop capturing interaction input
    fn unbind_interaction(&mut self);

    /// Toggle the host's native context menu on this surface
    fn set_context_menu_enabled(&mut self, enabled: bool);
}

pub type SharedSource = Rc<RefCell<dyn InputSource>>;
pub type SharedSurface = Rc<RefCell<dyn RenderSurface>>;
