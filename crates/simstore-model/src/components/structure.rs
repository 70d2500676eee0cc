use super::geometry::Geometry;
use super::medium::MediumSpec;
use crate::model::Validate;
use crate::model_node;

model_node! {
    /// A geometry filled with a medium.
    pub struct Structure: "Structure" {
        geometry: Geometry,
        medium: MediumSpec,
    }
}

impl Validate for Structure {}
