use eframe::egui::{Pos2, Rect, Vec2};

pub(super) const MIN_ZOOM: f32 = 0.1;
pub(super) const MAX_ZOOM: f32 = 4.0;

/// Pan/zoom transform between graph space and screen space. Graph-space
/// origin maps to the canvas center at identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Wheel zoom anchored at `pointer`: the graph point under the cursor
    /// stays under the cursor.
    pub fn zoom_at(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = self.to_world(rect, pointer);
        self.zoom_by(factor);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn rect() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 500.0))
    }

    #[test]
    fn zoom_round_trip_restores_the_transform() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(1.2);
        viewport.zoom_by(1.0 / 1.2);
        assert!((viewport.zoom - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_yields_identity_from_any_state() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(rect(), pos2(120.0, 40.0), 2.5);
        viewport.pan_by(vec2(-300.0, 85.0));
        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(100.0);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.zoom_by(1e-6);
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn screen_world_mapping_inverts_exactly() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(1.7);
        viewport.pan_by(vec2(42.0, -13.0));

        let world = vec2(120.5, -64.25);
        let screen = viewport.to_screen(rect(), world);
        let back = viewport.to_world(rect(), screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn anchored_zoom_keeps_the_pointer_world_point_fixed() {
        let mut viewport = Viewport::default();
        viewport.pan_by(vec2(30.0, 10.0));
        let pointer = pos2(200.0, 333.0);
        let world_before = viewport.to_world(rect(), pointer);

        viewport.zoom_at(rect(), pointer, 1.6);
        let world_after = viewport.to_world(rect(), pointer);
        assert!((world_after - world_before).length() < 1e-3);
    }
}
