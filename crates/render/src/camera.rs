use glam::{Mat4, Vec3};
use tumble_common::SceneConfig;

/// Perspective camera looking at a target point.
///
/// The projection matrix is cached; call [`update_projection_matrix`] after
/// touching `fov`, `aspect`, `near` or `far` directly.
///
/// [`update_projection_matrix`]: PerspectiveCamera::update_projection_matrix
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default(), 16.0 / 9.0)
    }
}

impl PerspectiveCamera {
    /// Camera on the +Z axis at the configured distance, facing the origin.
    pub fn from_config(config: &SceneConfig, aspect: f32) -> Self {
        let mut cam = Self {
            position: Vec3::new(0.0, 0.0, config.camera_distance),
            target: Vec3::ZERO,
            fov: config.camera_fov_degrees.to_radians(),
            aspect,
            near: config.camera_near,
            far: config.camera_far,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((cam.fov - 20.0_f32.to_radians()).abs() < 1e-6);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn aspect_change_updates_projection() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(4.0 / 3.0);
        assert_ne!(before, cam.projection_matrix());
        let expected = Mat4::perspective_rh(cam.fov, 4.0 / 3.0, cam.near, cam.far);
        assert_eq!(cam.projection_matrix(), expected);
    }
}
