//! Model transforms.
//!
//! A [`Transform`] is translation, rotation and scale. The demos recompute it
//! every frame from an accumulated spin angle and upload the resulting model
//! matrix as a uniform.

use cgmath::{One, Rotation3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// `translate(position) · rotateY(yaw) · rotateX(tilt)`, the spin every
    /// demo object performs.
    pub fn spinning<Y, X>(position: cgmath::Vector3<f32>, yaw: Y, tilt: X) -> Self
    where
        Y: Into<cgmath::Rad<f32>>,
        X: Into<cgmath::Rad<f32>>,
    {
        Self {
            position,
            rotation: cgmath::Quaternion::from_angle_y(yaw) * cgmath::Quaternion::from_angle_x(tilt),
            ..Self::new()
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> ModelUniform {
        ModelUniform {
            model: self.to_matrix().into(),
        }
    }
}

/**
 * The model matrix as stored in the per-object uniform buffer.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    model: [[f32; 4]; 4],
}
