pub use self::material::{create_material, material_from_json, CoreMaterial, Material};
pub use self::mohr_coulomb_surfaces::*;
pub use self::plasticity_mohr_coulomb::*;
pub use self::properties::{MaterialError, MaterialId, MaterialProperties};
pub use self::softening::*;
pub use self::stress_invariants::*;
pub use self::viscoplasticity_bingham::*;

mod material;
mod mohr_coulomb_surfaces;
mod plasticity_mohr_coulomb;
mod properties;
mod softening;
mod stress_invariants;
mod viscoplasticity_bingham;
