//! Geometric primitives.

use super::{check_axis, non_negative, non_negative_all};
use crate::model::Validate;
use crate::{model_node, model_union};

model_node! {
    /// Axis-aligned box.
    pub struct BoxGeometry: "Box" {
        center: [f64; 3],
        size: [f64; 3],
    }
}

impl Validate for BoxGeometry {
    fn validate(&self) -> Result<(), String> {
        non_negative_all("size", &self.size)
    }
}

model_node! {
    pub struct Sphere: "Sphere" {
        center: [f64; 3],
        radius: f64,
    }
}

impl Validate for Sphere {
    fn validate(&self) -> Result<(), String> {
        non_negative("radius", self.radius)
    }
}

model_node! {
    /// Cylinder with its axis along x (0), y (1) or z (2).
    pub struct Cylinder: "Cylinder" {
        center: [f64; 3],
        radius: f64,
        length: f64,
        axis: u8,
    }
}

impl Validate for Cylinder {
    fn validate(&self) -> Result<(), String> {
        non_negative("radius", self.radius)?;
        non_negative("length", self.length)?;
        check_axis(self.axis)
    }
}

model_node! {
    /// Polygon in the plane normal to `axis`, extruded between `slab_bounds`.
    pub struct PolySlab: "PolySlab" {
        vertices: Vec<[f64; 2]>,
        slab_bounds: [f64; 2],
        axis: u8,
    }
}

impl Validate for PolySlab {
    fn validate(&self) -> Result<(), String> {
        check_axis(self.axis)?;
        if self.vertices.len() < 3 {
            return Err(format!(
                "a polygon needs at least 3 vertices, got {}",
                self.vertices.len()
            ));
        }
        let [lower, upper] = self.slab_bounds;
        if lower > upper {
            return Err(format!("slab_bounds are reversed: {lower} > {upper}"));
        }
        Ok(())
    }
}

model_union! {
    /// Any geometric primitive.
    pub enum Geometry {
        Box(BoxGeometry),
        Sphere(Sphere),
        Cylinder(Cylinder),
        PolySlab(PolySlab),
    }
}
