//! Free-look camera, keyboard state and projection.
//!
//! The camera is integrated once per frame from the held keys with fixed
//! increments. There is no frame-time normalisation: the faster the frame
//! rate, the faster the camera moves.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::keyboard::KeyCode;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const RIGHT_ANGLE: Rad<f32> = Rad(std::f32::consts::FRAC_PI_2);

/// Position plus yaw/pitch orientation.
///
/// A yaw of `-90°` with zero pitch looks down the negative z axis which is
/// where the demos place their geometry.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Spherical to cartesian conversion of yaw and pitch.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    /// Horizontal right vector: yaw rotated by a quarter turn in the xz plane.
    pub fn right(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = (self.yaw + RIGHT_ANGLE).0.sin_cos();
        Vector3::new(cos_yaw, 0.0, sin_yaw)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(
            self.position,
            self.forward().normalize(),
            Vector3::unit_y(),
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 0.0), cgmath::Deg(-90.0), cgmath::Deg(0.0))
    }
}

/// Vertical field of view perspective, OpenGL clip conventions.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Keeps the previous aspect while either side is zero.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// The standard perspective matrix (depth mapped to `[-1, 1]`).
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The eight keys the camera reacts to. Not remappable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub w: bool,
    pub s: bool,
    pub a: bool,
    pub d: bool,
    pub g: bool,
    pub j: bool,
    pub y: bool,
    pub h: bool,
}

impl KeyState {
    /// Records a key transition. Returns `false` for keys outside the set.
    pub fn set(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW => &mut self.w,
            KeyCode::KeyS => &mut self.s,
            KeyCode::KeyA => &mut self.a,
            KeyCode::KeyD => &mut self.d,
            KeyCode::KeyG => &mut self.g,
            KeyCode::KeyJ => &mut self.j,
            KeyCode::KeyY => &mut self.y,
            KeyCode::KeyH => &mut self.h,
            _ => return false,
        };
        *flag = pressed;
        true
    }
}

/// Applies held keys to a [`Camera`] once per frame.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub keys: KeyState,
    step: f32,
    turn: Rad<f32>,
}

impl CameraController {
    pub fn new<R: Into<Rad<f32>>>(step: f32, turn: R) -> Self {
        Self {
            keys: KeyState::default(),
            step,
            turn: turn.into(),
        }
    }

    pub fn handle_window_events(&mut self, event: &winit::event::WindowEvent) -> bool {
        use winit::{event::WindowEvent, keyboard::PhysicalKey};
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => self.keys.set(code, event.state.is_pressed()),
                PhysicalKey::Unidentified(_) => false,
            },
            _ => false,
        }
    }

    /// One frame of camera integration.
    ///
    /// Rotation is applied first, so movement in the same frame already
    /// follows the new heading.
    pub fn update(&self, camera: &mut Camera) {
        let keys = &self.keys;
        if keys.g {
            camera.yaw -= self.turn;
        }
        if keys.j {
            camera.yaw += self.turn;
        }
        if keys.y {
            camera.pitch += self.turn;
        }
        if keys.h {
            camera.pitch -= self.turn;
        }

        let forward = camera.forward();
        let right = camera.right();
        if keys.w {
            camera.position += forward * self.step;
        }
        if keys.s {
            camera.position -= forward * self.step;
        }
        if keys.a {
            camera.position -= right * self.step;
        }
        if keys.d {
            camera.position += right * self.step;
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.05, cgmath::Deg(1.0))
    }
}

/// Projection and view matrices as the vertex shader sees them.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            projection: cgmath::Matrix4::identity().into(),
            view: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_projection(&mut self, projection: &Projection) {
        self.projection = (OPENGL_TO_WGPU_MATRIX * projection.calc_matrix()).into();
    }

    pub fn update_view(&mut self, camera: &Camera) {
        self.view = camera.calc_matrix().into();
    }

    /// Resets the view to identity. The demos without a free-look camera
    /// render from the origin looking down `-z`.
    pub fn reset_view(&mut self) {
        use cgmath::SquareMatrix;
        self.view = cgmath::Matrix4::identity().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera plus the state that drives it.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    /// When false the view matrix stays identity.
    pub free_look: bool,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    /// Runs one frame of the camera and stages the uniform for upload.
    pub fn update(&mut self, projection: &Projection, queue: &wgpu::Queue) {
        if self.free_look {
            self.controller.update(&mut self.camera);
            self.uniform.update_view(&self.camera);
        } else {
            self.uniform.reset_view();
        }
        self.uniform.update_projection(projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{AbsDiffEq, Deg, EuclideanSpace, Matrix4};

    use super::*;

    fn controller() -> CameraController {
        CameraController::new(0.1, Deg(2.0))
    }

    #[test]
    fn forward_key_moves_along_initial_forward() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let initial_forward = camera.forward();
        let mut ctrl = controller();
        ctrl.keys.w = true;
        for _ in 0..25 {
            ctrl.update(&mut camera);
        }
        let expected = initial_forward * (25.0 * 0.1);
        assert!(camera.position.to_vec().abs_diff_eq(&expected, 1e-5));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut ctrl = controller();
        ctrl.keys.w = true;
        ctrl.keys.s = true;
        ctrl.keys.a = true;
        ctrl.keys.d = true;
        for _ in 0..10 {
            ctrl.update(&mut camera);
        }
        assert!(camera.position.abs_diff_eq(&start, 1e-5));
    }

    #[test]
    fn yaw_round_trip_restores_forward() {
        let mut camera = Camera::new((1.0, 2.0, 3.0), Deg(-90.0), Deg(10.0));
        let before = camera.forward();
        let mut ctrl = controller();
        ctrl.keys.j = true;
        ctrl.update(&mut camera);
        ctrl.keys.j = false;
        ctrl.keys.g = true;
        ctrl.update(&mut camera);
        assert!(camera.forward().abs_diff_eq(&before, 1e-6));
    }

    #[test]
    fn right_is_perpendicular_and_horizontal() {
        let camera = Camera::new((0.0, 0.0, 0.0), Deg(33.0), Deg(20.0));
        let right = camera.right();
        assert_eq!(right.y, 0.0);
        assert!(right.dot(Vector3::new(camera.forward().x, 0.0, camera.forward().z)).abs() < 1e-6);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.forward().abs_diff_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));
        assert!(camera.right().abs_diff_eq(&Vector3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn pitch_keys_change_vertical_heading_only() {
        let mut camera = Camera::default();
        let mut ctrl = controller();
        ctrl.keys.y = true;
        ctrl.update(&mut camera);
        assert!(camera.forward().y > 0.0);
        assert!(camera.position.abs_diff_eq(&Point3::new(0.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn key_state_ignores_unknown_keys() {
        let mut keys = KeyState::default();
        assert!(keys.set(KeyCode::KeyG, true));
        assert!(keys.g);
        assert!(!keys.set(KeyCode::KeyQ, true));
        assert!(keys.set(KeyCode::KeyG, false));
        assert_eq!(keys, KeyState::default());
    }

    #[test]
    fn projection_matches_perspective_formula() {
        let near = 0.1_f32;
        let far = 10.0_f32;
        let projection = Projection::new(800, 600, Deg(45.0), near, far);
        let f = 1.0 / (std::f32::consts::PI / 8.0).tan();
        let aspect = 4.0 / 3.0;
        #[rustfmt::skip]
        let expected = Matrix4::new(
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (far + near) / (near - far), -1.0,
            0.0, 0.0, 2.0 * far * near / (near - far), 0.0,
        );
        let actual = projection.calc_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (actual[col][row] - expected[col][row]).abs() < 1e-5,
                    "slot [{col}][{row}]: {} != {}",
                    actual[col][row],
                    expected[col][row]
                );
            }
        }
    }

    #[test]
    fn projection_resize_ignores_zero_sides() {
        let mut projection = Projection::new(400, 300, Deg(45.0), 0.1, 10.0);
        projection.resize(1000, 0);
        assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
        projection.resize(0, 500);
        assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
        projection.resize(1000, 500);
        assert!((projection.aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn minimised_window_projection_uploads() {
        // a window can report 0x0 before its surface is configured
        for (width, height) in [(0, 0), (0, 600), (800, 0)] {
            let projection = Projection::new(width, height, Deg(45.0), 0.1, 10.0);
            assert!(projection.aspect() > 0.0 && projection.aspect().is_finite());
            let mut uniform = CameraUniform::new();
            uniform.update_projection(&projection);
        }
    }
}
