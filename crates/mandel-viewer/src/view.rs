use glam::{DVec2, IVec2};

/// Maps window pixels to the complex plane.
///
/// `world = screen / scale + offset`: `scale` is pixels per unit on each axis
/// and `offset` is the world point under the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    pub scale: DVec2,
    pub offset: DVec2,
}

impl ViewTransform {
    pub fn new(scale: DVec2) -> Self {
        Self {
            scale,
            offset: DVec2::ZERO,
        }
    }

    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        screen / self.scale + self.offset
    }

    /// Puts the world origin at the centre of a window of `size` pixels.
    pub fn center_on_origin(&mut self, size: IVec2) {
        self.offset = DVec2::ZERO;
        self.offset = -self.screen_to_world(size.as_dvec2() / 2.0);
    }

    /// Multiplies `scale` by `factor`, keeping the world point under `cursor`
    /// fixed on screen. `factor > 1` magnifies.
    pub fn zoom_at(&mut self, cursor: DVec2, factor: f64) {
        let before = self.screen_to_world(cursor);
        self.scale *= factor;
        let after = self.screen_to_world(cursor);
        self.offset += before - after;
    }

    /// Moves the content by `delta` screen pixels.
    pub fn pan(&mut self, delta: DVec2) {
        self.offset -= delta / self.scale;
    }

    pub fn one_over_scale(&self) -> DVec2 {
        DVec2::ONE / self.scale
    }
}

/// Press-move-release drag tracking in screen space.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Drag {
    last: Option<DVec2>,
}

impl Drag {
    pub fn begin(&mut self, at: DVec2) {
        self.last = Some(at);
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    /// Screen-space movement since the previous position, while dragging.
    pub fn update(&mut self, to: DVec2) -> Option<DVec2> {
        let last = self.last.as_mut()?;
        let delta = to - *last;
        *last = to;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: DVec2, b: DVec2) {
        assert!((a - b).abs().max_element() < EPS, "{a} != {b}");
    }

    fn view() -> ViewTransform {
        let mut v = ViewTransform::new(DVec2::splat(200.0));
        v.center_on_origin(IVec2::new(1280, 960));
        v
    }

    #[test]
    fn origin_is_centered() {
        let v = view();
        assert_close(v.screen_to_world(DVec2::new(640.0, 480.0)), DVec2::ZERO);
        assert_close(v.offset, DVec2::new(-3.2, -2.4));
    }

    #[test]
    fn zoom_keeps_cursor_world_point_fixed() {
        let cursors = [DVec2::new(0.0, 0.0), DVec2::new(100.5, 733.25), DVec2::new(1279.0, 1.0)];
        let factors = [0.9, 1.1, 0.5, 3.0, 1e-3, 1e3];

        for cursor in cursors {
            for factor in factors {
                let mut v = view();
                let before = v.screen_to_world(cursor);
                v.zoom_at(cursor, factor);
                assert_close(v.screen_to_world(cursor), before);
            }
        }
    }

    #[test]
    fn zoom_scales_pixels_per_unit() {
        let mut v = view();
        v.zoom_at(DVec2::ZERO, 1.1);
        assert_close(v.scale, DVec2::splat(220.0));
        assert_close(v.one_over_scale(), DVec2::splat(1.0 / 220.0));
    }

    #[test]
    fn drag_there_and_back_restores_offset() {
        let mut v = view();
        v.zoom_at(DVec2::new(10.0, 10.0), 1.7);
        let original = v.offset;

        let a = DVec2::new(100.0, 120.0);
        let b = DVec2::new(431.5, -20.25);

        let mut drag = Drag::default();
        drag.begin(a);
        v.pan(drag.update(b).unwrap());
        assert!((v.offset - original).length() > 0.1);
        v.pan(drag.update(a).unwrap());
        drag.end();

        assert_close(v.offset, original);
    }

    #[test]
    fn dragging_right_moves_view_left_in_world() {
        let mut v = view();
        let before = v.offset;
        v.pan(DVec2::new(200.0, 0.0));
        assert_close(v.offset, before - DVec2::new(1.0, 0.0));
    }

    #[test]
    fn drag_reports_nothing_when_inactive() {
        let mut drag = Drag::default();
        assert_eq!(drag.update(DVec2::ONE), None);

        drag.begin(DVec2::ZERO);
        assert!(drag.is_active());
        assert_eq!(drag.update(DVec2::new(3.0, 4.0)), Some(DVec2::new(3.0, 4.0)));
        assert_eq!(drag.update(DVec2::new(3.0, 4.0)), Some(DVec2::ZERO));

        drag.end();
        assert!(!drag.is_active());
        assert_eq!(drag.update(DVec2::ZERO), None);
    }
}
