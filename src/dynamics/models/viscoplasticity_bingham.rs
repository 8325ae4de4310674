use crate::dynamics::models::{
    CoreMaterial, Material, MaterialError, MaterialId, MaterialProperties,
};
use crate::dynamics::{ParticleAccessor, StateVariables};
use crate::math::{dirac_delta, mask_out_of_plane, Real, StrainTensor, StressTensor};
use crate::utils;

/// Lower bound of the critical shear rate, to keep the threshold test meaningful.
pub const MIN_CRITICAL_SHEAR_RATE: Real = 1.0e-15;

/// Whether the fluid flows during the current step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinghamFlow {
    /// Shear rate at or below the critical shear rate.
    Rigid,
    Flowing,
}

/// A Bingham viscoplastic fluid: rigid below its yield stress `tau0`, viscous above.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bingham {
    pub id: MaterialId,
    pub density: Real,
    pub youngs_modulus: Real,
    pub poisson_ratio: Real,
    pub bulk_modulus: Real,
    /// Yield stress.
    pub tau0: Real,
    /// Plastic viscosity.
    pub mu: Real,
    pub critical_shear_rate: Real,
}

impl Bingham {
    pub fn new(id: MaterialId, properties: &MaterialProperties) -> Self {
        Self::try_new(id, properties).unwrap_or_else(|e| {
            error!("{}", e);
            Self::read(id, properties).0
        })
    }

    pub fn try_new(id: MaterialId, properties: &MaterialProperties) -> Result<Self, MaterialError> {
        let (result, missing) = Self::read(id, properties);
        missing.map(|_| result)
    }

    fn read(id: MaterialId, properties: &MaterialProperties) -> (Self, Result<(), MaterialError>) {
        let mut reader = properties.reader();
        let youngs_modulus = reader.required("youngs_modulus");
        let poisson_ratio = reader.required("poisson_ratio");

        let result = Self {
            id,
            density: reader.required("density"),
            youngs_modulus,
            poisson_ratio,
            bulk_modulus: utils::bulk_modulus(youngs_modulus, poisson_ratio),
            tau0: reader.required("tau0"),
            mu: reader.required("mu"),
            critical_shear_rate: reader.required("critical_shear_rate"),
        };

        (result, reader.finish(id))
    }

    /// Magnitude `√(2·D:D)` of a tensorial strain rate in Voigt notation.
    pub fn shear_rate(strain_rate: &StrainTensor) -> Real {
        // Each Voigt shear entry stands for two tensor components.
        let shear = strain_rate.fixed_rows::<3>(3);
        (2.0 * (strain_rate.norm_squared() + shear.norm_squared())).sqrt()
    }

    pub fn flow(&self, shear_rate: Real) -> BinghamFlow {
        let critical = self.critical_shear_rate.max(MIN_CRITICAL_SHEAR_RATE);

        if shear_rate * shear_rate > critical * critical {
            BinghamFlow::Flowing
        } else {
            BinghamFlow::Rigid
        }
    }

    /// `2·(tau0/γ̇ + mu)` while flowing, zero otherwise.
    pub fn apparent_viscosity(&self, shear_rate: Real) -> Real {
        match self.flow(shear_rate) {
            BinghamFlow::Flowing => 2.0 * (self.tau0 / shear_rate + self.mu),
            BinghamFlow::Rigid => 0.0,
        }
    }

    /// Deviatoric stress of a strain rate given with engineering shear components.
    pub fn deviatoric_stress(&self, strain_rate: &StrainTensor) -> StressTensor {
        let mut strain_rate = mask_out_of_plane(*strain_rate);
        for i in 3..6 {
            strain_rate[i] *= 0.5;
        }

        let shear_rate = Self::shear_rate(&strain_rate);
        let tau = self.apparent_viscosity(shear_rate) * strain_rate;

        trace!(
            "Bingham material {}: {:?}, shear rate = {}",
            self.id,
            self.flow(shear_rate),
            shear_rate
        );

        von_mises_cap(tau, self.tau0)
    }
}

/// Zeroes a deviatoric stress whose normal part stays below the yield stress:
/// `½·(τxx² + τyy² + τzz²) < tau0²`.
pub fn von_mises_cap(tau: StressTensor, tau0: Real) -> StressTensor {
    let normal = tau.fixed_rows::<3>(0);
    let trace_invariant2 = 0.5 * normal.norm_squared();

    if trace_invariant2 < tau0 * tau0 {
        StressTensor::zeros()
    } else {
        tau
    }
}

impl Material for Bingham {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn density(&self) -> Real {
        self.density
    }

    fn thermodynamic_pressure(&self, volumetric_strain: Real) -> Real {
        -self.bulk_modulus * volumetric_strain
    }

    /// `-p·δ + τ`; the incoming stress and strain increment are not used, the strain rate and
    /// pressure of phase `0` are read from the particle instead.
    fn compute_stress(
        &self,
        _stress: &StressTensor,
        _dstrain: &StrainTensor,
        particle: &dyn ParticleAccessor,
        _state: &mut StateVariables,
    ) -> StressTensor {
        let phase = 0;
        let tau = self.deviatoric_stress(&particle.strain_rate(phase));
        -particle.pressure(phase) * dirac_delta() + tau
    }

    fn to_core_model(&self) -> Option<CoreMaterial> {
        Some(CoreMaterial::Bingham(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::Particle;
    use approx::assert_relative_eq;

    fn material(tau0: Real) -> Bingham {
        let props = MaterialProperties::new()
            .with("density", 1000.0)
            .with("youngs_modulus", 1.0e6)
            .with("poisson_ratio", 0.3)
            .with("tau0", tau0)
            .with("mu", 1.0)
            .with("critical_shear_rate", 1.0);
        Bingham::try_new(0, &props).unwrap()
    }

    fn stress_of(material: &Bingham, particle: &Particle) -> StressTensor {
        let mut state = material.initialise_state_variables();
        material.compute_stress(
            &StressTensor::zeros(),
            &StrainTensor::zeros(),
            particle,
            &mut state,
        )
    }

    // Tensorial rate (3, -3, 0, 4, 0, 0): shear rate 10.
    fn sheared_particle() -> Particle {
        let mut particle = Particle::default();
        particle.strain_rate = StrainTensor::new(3.0, -3.0, 0.0, 8.0, 0.0, 0.0);
        particle
    }

    #[test]
    fn missing_properties() {
        let props = MaterialProperties::new().with("tau0", 1.0);
        assert!(Bingham::try_new(2, &props).is_err());

        let material = Bingham::new(2, &props);
        assert_eq!(material.tau0, 1.0);
        assert_eq!(material.mu, 0.0);
    }

    #[test]
    fn pressure_is_linear_in_volumetric_strain() {
        let material = material(10.0);
        let k = 1.0e6 / (3.0 * 0.4);

        assert_relative_eq!(material.thermodynamic_pressure(0.01), -0.01 * k, epsilon = 1.0e-6);
        assert_relative_eq!(material.thermodynamic_pressure(-0.01), 0.01 * k, epsilon = 1.0e-6);
    }

    #[test]
    fn no_strain_rate_gives_pure_pressure() {
        let material = material(10.0);
        let mut particle = Particle::default();
        particle.pressure = 250.0;

        assert_eq!(stress_of(&material, &particle), -250.0 * dirac_delta());
        assert_eq!(material.dirac_delta(), dirac_delta());
    }

    #[test]
    fn below_critical_shear_rate_there_is_no_viscosity() {
        let material = material(10.0);

        assert_eq!(material.flow(0.5), BinghamFlow::Rigid);
        assert_eq!(material.apparent_viscosity(0.5), 0.0);
        assert_eq!(material.apparent_viscosity(1.0), 0.0);

        let mut particle = Particle::default();
        particle.pressure = 3.0;
        particle.strain_rate = StrainTensor::new(0.1, -0.1, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(stress_of(&material, &particle), -3.0 * dirac_delta());
    }

    #[test]
    fn zero_critical_shear_rate_is_clamped() {
        let mut material = material(10.0);
        material.critical_shear_rate = 0.0;

        assert_eq!(material.flow(0.0), BinghamFlow::Rigid);
        assert_eq!(material.apparent_viscosity(0.0), 0.0);
        assert_eq!(material.flow(1.0e-10), BinghamFlow::Flowing);
    }

    #[test]
    fn shear_rate_counts_voigt_shear_twice() {
        let rate = StrainTensor::new(3.0, -3.0, 0.0, 4.0, 0.0, 0.0);
        assert_eq!(Bingham::shear_rate(&rate), 10.0);
    }

    #[test]
    fn flowing_stress() {
        let material = material(10.0);
        let mut particle = sheared_particle();
        particle.pressure = 2.0;

        // η = 2·(10/10 + 1) = 4
        let expected = StressTensor::new(12.0, -12.0, 0.0, 16.0, 0.0, 0.0) - 2.0 * dirac_delta();
        assert_relative_eq!(stress_of(&material, &particle), expected, epsilon = 1.0e-12);
    }

    #[test]
    fn doubling_the_yield_stress_engages_the_cap() {
        // η = 2·(20/10 + 1) = 6, ½·(18² + 18²) = 324 < 400.
        assert_eq!(
            stress_of(&material(20.0), &sheared_particle()),
            StressTensor::zeros()
        );
    }

    #[test]
    fn cap_boundary_is_not_capped() {
        // η = 2·(15/10 + 1) = 5, ½·(15² + 15²) = 225 = tau0².
        let expected = StressTensor::new(15.0, -15.0, 0.0, 20.0, 0.0, 0.0);
        assert_eq!(stress_of(&material(15.0), &sheared_particle()), expected);

        let tau = StressTensor::new(3.0, -3.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(von_mises_cap(tau, 3.0), tau);
        assert_eq!(von_mises_cap(tau, 3.0 + 1.0e-9), StressTensor::zeros());
    }

    #[test]
    fn pure_shear_flow_is_capped() {
        let mut particle = Particle::default();
        particle.strain_rate = StrainTensor::new(0.0, 0.0, 0.0, 20.0, 0.0, 0.0);

        assert_eq!(stress_of(&material(1.0), &particle), StressTensor::zeros());
    }

    #[cfg(feature = "dim2")]
    #[test]
    fn out_of_plane_rates_are_ignored_in_2d() {
        let mut particle = sheared_particle();
        particle.strain_rate[4] = 50.0;
        particle.strain_rate[5] = -50.0;

        assert_eq!(
            stress_of(&material(10.0), &particle),
            stress_of(&material(10.0), &sheared_particle())
        );
        assert_eq!(dirac_delta()[2], 0.0);
    }

    #[cfg(feature = "dim3")]
    #[test]
    fn pressure_acts_on_all_normal_components_in_3d() {
        let mut particle = Particle::default();
        particle.pressure = 1.5;

        assert_eq!(
            stress_of(&material(10.0), &particle),
            StressTensor::new(-1.5, -1.5, -1.5, 0.0, 0.0, 0.0)
        );
    }
}
