use crate::dynamics::models::Material;
use crate::math::{Real, StrainTensor, StressTensor};

/// Read access to the particle-level quantities a material may need.
///
/// Implemented by whatever particle representation drives the time stepping.
/// Phase `0` is the only phase read by the models of this crate.
pub trait ParticleAccessor {
    /// Strain rate of the given phase, in Voigt notation with engineering shear components.
    fn strain_rate(&self, phase: usize) -> StrainTensor;
    /// Pressure of the given phase.
    fn pressure(&self, phase: usize) -> Real;
}

/// History variables a material carries from one call to the next.
///
/// Owned by the particle, handed to the material by mutable reference once per step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct StateVariables {
    /// Accumulated equivalent plastic deviatoric strain.
    pub pdstrain: Real,
    /// Plastic strain increment of the last step (engineering shear components).
    pub plastic_strain: StrainTensor,
}

impl Default for StateVariables {
    fn default() -> Self {
        Self {
            pdstrain: 0.0,
            plastic_strain: StrainTensor::zeros(),
        }
    }
}

/// A minimal single-phase particle.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Particle {
    pub stress: StressTensor,
    pub strain_rate: StrainTensor,
    pub pressure: Real,
    pub state: StateVariables,
}

impl Particle {
    pub fn new(stress: StressTensor) -> Self {
        Self {
            stress,
            strain_rate: StrainTensor::zeros(),
            pressure: 0.0,
            state: StateVariables::default(),
        }
    }

    /// Advances the stress of this particle by one strain increment.
    pub fn update_stress(&mut self, material: &dyn Material, dstrain: &StrainTensor) {
        let mut state = self.state;
        self.stress = material.compute_stress(&self.stress, dstrain, &*self, &mut state);
        self.state = state;
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(StressTensor::zeros())
    }
}

impl ParticleAccessor for Particle {
    fn strain_rate(&self, _phase: usize) -> StrainTensor {
        self.strain_rate
    }

    fn pressure(&self, _phase: usize) -> Real {
        self.pressure
    }
}
