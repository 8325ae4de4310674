use crate::dynamics::models::{Bingham, MaterialError, MaterialId, MaterialProperties, MohrCoulomb};
use crate::dynamics::{ParticleAccessor, StateVariables};
use crate::math::{Real, StrainTensor, StressTensor, VoigtVector, DIM};
use anyhow::Context;

/// A constitutive law usable by any particle, whatever the model behind it.
///
/// Models are immutable once built; everything that changes from one step to the
/// next lives in the caller-owned [`StateVariables`].
pub trait Material: Send + Sync {
    fn id(&self) -> MaterialId;

    fn density(&self) -> Real;

    /// Pressure associated to a volumetric strain: `-K·εv`.
    fn thermodynamic_pressure(&self, volumetric_strain: Real) -> Real;

    /// Computes the stress at the end of a step.
    fn compute_stress(
        &self,
        stress: &StressTensor,
        dstrain: &StrainTensor,
        particle: &dyn ParticleAccessor,
        state: &mut StateVariables,
    ) -> StressTensor;

    fn dirac_delta(&self) -> VoigtVector<Real> {
        crate::math::dirac_delta()
    }

    fn initialise_state_variables(&self) -> StateVariables {
        StateVariables::default()
    }

    fn to_core_model(&self) -> Option<CoreMaterial>;
}

/// The concrete materials of this crate, as plain data.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CoreMaterial {
    MohrCoulomb(MohrCoulomb),
    Bingham(Bingham),
}

impl CoreMaterial {
    pub fn as_material(&self) -> &dyn Material {
        match self {
            Self::MohrCoulomb(m) => m,
            Self::Bingham(m) => m,
        }
    }
}

/// Builds the material registered under `name` for the compiled dimension.
///
/// Missing properties do not prevent construction: they are reported and left at zero.
pub fn create_material(
    name: &str,
    id: MaterialId,
    properties: &MaterialProperties,
) -> Result<Box<dyn Material>, MaterialError> {
    if name == format!("MohrCoulomb{}D", DIM) {
        Ok(Box::new(MohrCoulomb::new(id, properties)))
    } else if name == format!("Bingham{}D", DIM) {
        Ok(Box::new(Bingham::new(id, properties)))
    } else {
        Err(MaterialError::UnknownMaterial(name.to_string()))
    }
}

/// Builds a material from a JSON description such as
/// `{"id": 0, "type": "MohrCoulomb3D", "properties": {"density": 1800, ...}}`.
pub fn material_from_json(json: &str) -> anyhow::Result<Box<dyn Material>> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("failed to parse the material description")?;
    let id = value["id"]
        .as_u64()
        .context("the material description has no integer `id`")?;
    let name = value["type"]
        .as_str()
        .context("the material description has no `type`")?;
    let properties = MaterialProperties::from_json(&value["properties"]);

    Ok(create_material(name, id as MaterialId, &properties)?)
}
