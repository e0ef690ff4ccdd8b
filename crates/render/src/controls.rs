use crate::camera::PerspectiveCamera;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const POLE_EPSILON: f32 = 1e-6;
const ZOOM_BASE: f32 = 0.95;

/// Spherical coordinates around the orbit target. `phi` is measured from +Y,
/// `theta` around Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Damped orbit controls.
///
/// Input accumulates into a pending rotation. Each [`update`] applies
/// `damping` of what is pending and keeps the rest, so the camera eases toward
/// its target orientation over many frames.
///
/// [`update`]: OrbitControls::update
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical: Spherical,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitControls {
    /// Orbit the camera's current position around its current target.
    pub fn new(camera: &PerspectiveCamera, damping: f32) -> Self {
        Self {
            target: camera.target,
            damping: damping.clamp(0.0, 1.0),
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: camera.near * 10.0,
            max_distance: camera.far * 0.5,
            spherical: Spherical::from_offset(camera.position - camera.target),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Pointer drag in pixels. A drag the full viewport height turns one revolution.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.rotate_left(TAU * dx / h * self.rotate_speed);
        self.rotate_up(TAU * dy / h * self.rotate_speed);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.pending_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.pending_phi -= angle;
    }

    /// Positive steps move the camera closer.
    pub fn dolly(&mut self, steps: f32) {
        if steps.is_finite() {
            self.pending_scale *= ZOOM_BASE.powf(self.zoom_speed * steps);
        }
    }

    /// Whether rotation input is still being eased in.
    pub fn is_settling(&self) -> bool {
        self.pending_theta.abs() > 1e-6 || self.pending_phi.abs() > 1e-6
    }

    /// Apply one damped step and move the camera. Returns true if it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = self.spherical;

        self.spherical.theta += self.pending_theta * self.damping;
        self.spherical.phi = (self.spherical.phi + self.pending_phi * self.damping)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.spherical.radius =
            (self.spherical.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        self.pending_theta *= 1.0 - self.damping;
        self.pending_phi *= 1.0 - self.damping;
        self.pending_scale = 1.0;

        camera.target = self.target;
        camera.position = self.target + self.spherical.to_offset();

        before != self.spherical
    }
}
