//! Engine data structures: meshes, transforms, animated objects and the depth
//! target.
//!
//! - `mesh` contains geometry builders (rectangle, triangle, cube) and GPU meshes
//! - `transform` holds per-object translation/rotation/scale and its uniform
//! - `object` ties a mesh to its animated transform
//! - `texture` contains the depth texture used for depth testing

pub mod mesh;
pub mod object;
pub mod texture;
pub mod transform;
