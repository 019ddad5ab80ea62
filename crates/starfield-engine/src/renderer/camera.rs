use glam::Vec2;
use serde::Serialize;

use crate::api::types::Viewport;

/// Where the camera is heading, in normalized viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub center: Vec2,
    pub zoom: f32,
}

/// Read-only camera state for the host and the draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub cx: f32,
    pub cy: f32,
    pub zoom: f32,
    pub animating: bool,
}

/// Smoothed zoom/pan camera over normalized coordinates.
/// `(0.5, 0.5)` at zoom 1.0 shows the whole viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraNavigator {
    pub center: Vec2,
    pub zoom: f32,
    pub target: Option<CameraTarget>,
    /// Fraction of the remaining distance covered per nominal frame.
    pub smoothing: f32,
    /// Below this on every axis the camera snaps onto the target.
    pub convergence: f32,
}

impl Default for CameraNavigator {
    fn default() -> Self {
        Self::new(0.08, 0.001)
    }
}

impl CameraNavigator {
    pub const DEFAULT_CENTER: Vec2 = Vec2::new(0.5, 0.5);
    pub const DEFAULT_ZOOM: f32 = 1.0;
    /// Targets closer than this count as the same focus point.
    const SAME_POINT: f32 = 1e-6;

    pub fn new(smoothing: f32, convergence: f32) -> Self {
        Self {
            center: Self::DEFAULT_CENTER,
            zoom: Self::DEFAULT_ZOOM,
            target: None,
            smoothing: smoothing.clamp(0.0, 1.0),
            convergence: convergence.max(0.0),
        }
    }

    /// Aim at `center`/`zoom`. Aiming again at the point already targeted (or
    /// settled on) toggles back to the default view.
    pub fn zoom_to(&mut self, center: Vec2, zoom: f32) {
        let aimed = self.target.map_or(self.center, |t| t.center);
        let away_from_default = self.target.map_or(self.zoom, |t| t.zoom) != Self::DEFAULT_ZOOM
            || aimed != Self::DEFAULT_CENTER;
        if away_from_default && aimed.distance(center) < Self::SAME_POINT {
            self.reset();
            return;
        }
        self.target = Some(CameraTarget {
            center,
            zoom: zoom.max(0.1),
        });
    }

    /// Head back to the default view.
    pub fn reset(&mut self) {
        self.target = Some(CameraTarget {
            center: Self::DEFAULT_CENTER,
            zoom: Self::DEFAULT_ZOOM,
        });
    }

    /// Jump to the default view with no animation.
    pub fn snap_home(&mut self) {
        self.center = Self::DEFAULT_CENTER;
        self.zoom = Self::DEFAULT_ZOOM;
        self.target = None;
    }

    /// Ease toward the target. `dt_ms` is the frame delta; 16 ms moves by
    /// exactly `smoothing` of the remaining distance.
    pub fn update(&mut self, dt_ms: f32) {
        let Some(target) = self.target else {
            return;
        };
        let frames = (dt_ms / 16.0).max(0.0);
        let t = 1.0 - (1.0 - self.smoothing).powf(frames);
        self.center += (target.center - self.center) * t;
        self.zoom += (target.zoom - self.zoom) * t;

        let d = (target.center - self.center).abs();
        if d.x < self.convergence && d.y < self.convergence && (target.zoom - self.zoom).abs() < self.convergence {
            self.center = target.center;
            self.zoom = target.zoom;
            self.target = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// True when the camera is (or is heading) away from the default view.
    pub fn is_focused(&self) -> bool {
        let (center, zoom) = self.target.map_or((self.center, self.zoom), |t| (t.center, t.zoom));
        center != Self::DEFAULT_CENTER || zoom != Self::DEFAULT_ZOOM
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            cx: self.center.x,
            cy: self.center.y,
            zoom: self.zoom,
            animating: self.is_animating(),
        }
    }

    /// World pixels to screen pixels: the camera center lands on the viewport center.
    pub fn world_to_screen(&self, world: Vec2, viewport: Viewport) -> Vec2 {
        (world - viewport.to_px(self.center)) * self.zoom + viewport.center()
    }

    pub fn screen_to_world(&self, screen: Vec2, viewport: Viewport) -> Vec2 {
        (screen - viewport.center()) / self.zoom.max(f32::EPSILON) + viewport.to_px(self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_within_one_hundred_ticks() {
        let mut cam = CameraNavigator::default();
        cam.center = Vec2::ZERO;
        cam.target = Some(CameraTarget {
            center: Vec2::ONE,
            zoom: 2.0,
        });
        let mut ticks = 0;
        while cam.is_animating() && ticks < 100 {
            cam.update(16.0);
            ticks += 1;
        }
        assert!(!cam.is_animating(), "still animating after {} ticks", ticks);
        assert_eq!(cam.center, Vec2::ONE);
        assert_eq!(cam.zoom, 2.0);
    }

    #[test]
    fn zoom_to_same_point_toggles_home() {
        let mut cam = CameraNavigator::default();
        let p = Vec2::new(0.2, 0.3);
        cam.zoom_to(p, 2.5);
        assert_eq!(cam.target.map(|t| t.center), Some(p));
        cam.zoom_to(p, 2.5);
        assert_eq!(cam.target.map(|t| t.center), Some(CameraNavigator::DEFAULT_CENTER));
        assert_eq!(cam.target.map(|t| t.zoom), Some(1.0));
    }

    #[test]
    fn settled_focus_also_toggles() {
        let mut cam = CameraNavigator::default();
        let p = Vec2::new(0.8, 0.2);
        cam.zoom_to(p, 2.0);
        for _ in 0..200 {
            cam.update(16.0);
        }
        assert!(cam.is_focused());
        cam.zoom_to(p, 2.0);
        for _ in 0..200 {
            cam.update(16.0);
        }
        assert!(!cam.is_focused());
    }

    #[test]
    fn screen_world_round_trip() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let mut cam = CameraNavigator::default();
        cam.center = Vec2::new(0.25, 0.5);
        cam.zoom = 2.0;
        let world = Vec2::new(200.0, 300.0);
        assert_eq!(cam.world_to_screen(world, vp), Vec2::new(400.0, 300.0));
        let back = cam.screen_to_world(Vec2::new(500.0, 350.0), vp);
        assert!((cam.world_to_screen(back, vp) - Vec2::new(500.0, 350.0)).length() < 1e-3);
    }

    #[test]
    fn default_view_is_identity() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let cam = CameraNavigator::default();
        let p = Vec2::new(123.0, 456.0);
        assert_eq!(cam.world_to_screen(p, vp), p);
    }
}
