use egui::{Pos2, Rect};

use super::{EventKind, NormalizedEvent, RawEvent};

impl NormalizedEvent {
    /// Wrap an event that tools receive unchanged
    pub fn forwarded(kind: EventKind, raw: RawEvent) -> Self {
        Self {
            kind,
            raw,
            position: None,
            second: None,
        }
    }

    /// Attach coordinates relative to `bounds`. Exactly two contacts give a
    /// second pair; any other count only uses the first contact.
    pub fn on_surface(kind: EventKind, raw: RawEvent, bounds: Rect) -> Self {
        let origin = bounds.min.to_vec2();
        let position = raw.contacts.first().map(|p| *p - origin);
        let second = match raw.contacts.as_slice() {
            [_, second] => Some(*second - origin),
            _ => None,
        };
        Self {
            kind,
            raw,
            position,
            second,
        }
    }

    /// Center between the two contacts of a pinch
    pub fn contact_center(&self) -> Option<Pos2> {
        let (p1, p2) = (self.position?, self.second?);
        Some(p1 + (p2 - p1) / 2.0)
    }

    /// Distance between the two contacts of a pinch
    pub fn contact_distance(&self) -> Option<f32> {
        let (p1, p2) = (self.position?, self.second?);
        Some((p2 - p1).length())
    }
}
