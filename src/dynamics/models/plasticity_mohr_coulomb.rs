use crate::dynamics::models::{
    CoreMaterial, FlowGradients, Material, MaterialError, MaterialId, MaterialProperties,
    SofteningRule, StrengthParameters, StressInvariants, YieldState, DENOMINATOR_EPSILON,
    DENOMINATOR_SUBSTITUTE,
};
use crate::dynamics::{ParticleAccessor, StateVariables};
use crate::math::{mask_out_of_plane, ElasticTensor, Real, StrainTensor, StressTensor};
use crate::utils;

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MohrCoulombParameters {
    pub density: Real,
    pub youngs_modulus: Real,
    pub poisson_ratio: Real,
    /// Peak/residual friction, dilation (radians) and cohesion, with their thresholds.
    pub softening: SofteningRule,
    pub tension_cutoff: Real,
    pub porosity: Real,
}

/// Which branch of the return mapping produced a stress update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReturnMapping {
    /// Neither the initial nor the trial stress violates the yield criterion.
    Elastic,
    /// The initial stress was already on or outside the yield surface.
    Yielded,
    /// The step crossed the yield surface.
    Crossed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MohrCoulombUpdate {
    pub stress: StressTensor,
    pub plastic_multiplier: Real,
    pub plastic_strain: StrainTensor,
    pub branch: ReturnMapping,
}

/// Non-associated Mohr-Coulomb elastoplasticity with strain softening.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MohrCoulomb {
    pub id: MaterialId,
    pub parameters: MohrCoulombParameters,
    pub bulk_modulus: Real,
    pub shear_modulus: Real,
    de: ElasticTensor,
    de_inv: ElasticTensor,
}

impl MohrCoulomb {
    pub fn from_parameters(id: MaterialId, parameters: MohrCoulombParameters) -> Self {
        let bulk_modulus = utils::bulk_modulus(parameters.youngs_modulus, parameters.poisson_ratio);
        let shear_modulus =
            utils::shear_modulus(parameters.youngs_modulus, parameters.poisson_ratio);
        let de = utils::isotropic_elastic_tensor(bulk_modulus, shear_modulus);

        Self {
            id,
            parameters,
            bulk_modulus,
            shear_modulus,
            de,
            de_inv: utils::elastic_compliance(&de),
        }
    }

    /// Builds the model, reporting missing properties and misordered softening
    /// thresholds without failing.
    pub fn new(id: MaterialId, properties: &MaterialProperties) -> Self {
        let (mut parameters, missing) = Self::read_parameters(id, properties);

        if let Err(e) = missing {
            error!("{}", e);
        }

        let softening = &mut parameters.softening;
        if !softening.thresholds_are_ordered() {
            warn!(
                "Material {}: peak plastic strain {} exceeds critical plastic strain {}, swapping them.",
                id, softening.peak_pdstrain, softening.critical_pdstrain
            );
            std::mem::swap(&mut softening.peak_pdstrain, &mut softening.critical_pdstrain);
        }

        Self::from_parameters(id, parameters)
    }

    pub fn try_new(id: MaterialId, properties: &MaterialProperties) -> Result<Self, MaterialError> {
        let (parameters, missing) = Self::read_parameters(id, properties);
        missing?;

        let softening = &parameters.softening;
        if !softening.thresholds_are_ordered() {
            return Err(MaterialError::InvalidSofteningThresholds {
                material_id: id,
                peak: softening.peak_pdstrain,
                critical: softening.critical_pdstrain,
            });
        }

        Ok(Self::from_parameters(id, parameters))
    }

    fn read_parameters(
        id: MaterialId,
        properties: &MaterialProperties,
    ) -> (MohrCoulombParameters, Result<(), MaterialError>) {
        let mut reader = properties.reader();
        let mut angle = |key: &str| reader.required(key).to_radians();

        let peak = StrengthParameters {
            friction: angle("friction"),
            dilation: angle("dilation"),
            cohesion: 0.0,
        };
        let residual = StrengthParameters {
            friction: angle("residual_friction"),
            dilation: angle("residual_dilation"),
            cohesion: 0.0,
        };

        let parameters = MohrCoulombParameters {
            density: reader.required("density"),
            youngs_modulus: reader.required("youngs_modulus"),
            poisson_ratio: reader.required("poisson_ratio"),
            softening: SofteningRule {
                peak: StrengthParameters {
                    cohesion: reader.required("cohesion"),
                    ..peak
                },
                residual: StrengthParameters {
                    cohesion: reader.required("residual_cohesion"),
                    ..residual
                },
                peak_pdstrain: reader.required("peak_pdstrain"),
                critical_pdstrain: reader.required("critical_pdstrain"),
            },
            tension_cutoff: reader.required("tension_cutoff"),
            porosity: reader.required("porosity"),
        };

        (parameters, reader.finish(id))
    }

    pub fn elastic_tensor(&self) -> &ElasticTensor {
        &self.de
    }

    /// Current (softened) strength for the given history.
    pub fn strength(&self, state: &StateVariables) -> StrengthParameters {
        self.parameters.softening.strength(state.pdstrain)
    }

    /// Hardening/softening modulus entering the plastic multiplier.
    ///
    /// Strength degradation only acts between steps, through the softening rule, so this
    /// is zero.
    pub fn softening_modulus(&self) -> Real {
        0.0
    }

    /// `F / (∂F/∂σ · D · ∂P/∂σ + H)` and friends, with the denominator kept away from zero.
    fn multiplier(&self, numerator: Real, gradients: &FlowGradients) -> Real {
        let denominator =
            gradients.df_dsigma.dot(&(self.de * gradients.dp_dsigma)) + self.softening_modulus();
        numerator
            / utils::floor_denominator(denominator, DENOMINATOR_EPSILON, DENOMINATOR_SUBSTITUTE)
    }

    /// Elastic predictor followed by a single plastic correction.
    pub fn update_stress(
        &self,
        stress: &StressTensor,
        dstrain: &StrainTensor,
        state: &mut StateVariables,
    ) -> MohrCoulombUpdate {
        let dstrain = mask_out_of_plane(*dstrain);
        let strength = self.strength(state);

        let invariants = StressInvariants::new(stress);
        let yield_state = YieldState::evaluate(&invariants, &strength);
        let gradients = FlowGradients::new(&invariants, &strength);

        let de_dstrain = self.de * dstrain;
        let lambda = if yield_state.yielded {
            self.multiplier(gradients.df_dsigma.dot(&de_dstrain), &gradients)
        } else {
            0.0
        };

        let trial_stress = stress + de_dstrain;
        let trial_invariants = StressInvariants::new(&trial_stress);
        let trial_yield_state = YieldState::evaluate(&trial_invariants, &strength);
        let trial_gradients = FlowGradients::new(&trial_invariants, &strength);
        let lambda_trial = self.multiplier(trial_yield_state.value, &trial_gradients);

        let (branch, plastic_multiplier) = match (yield_state.yielded, trial_yield_state.yielded) {
            (true, _) => (ReturnMapping::Yielded, lambda),
            (false, true) => (ReturnMapping::Crossed, lambda_trial),
            (false, false) => (ReturnMapping::Elastic, 0.0),
        };

        // The correction always follows the flow direction of the initial stress.
        let updated_stress = trial_stress - plastic_multiplier * (self.de * gradients.dp_dsigma);

        let plastic_strain = mask_out_of_plane(dstrain - self.de_inv * (updated_stress - stress));
        state.plastic_strain = plastic_strain;
        state.pdstrain += equivalent_plastic_deviatoric_strain(&plastic_strain);

        trace!(
            "Mohr-Coulomb material {}: {:?} step, F = {}, F_trial = {}, multiplier = {}",
            self.id,
            branch,
            yield_state.value,
            trial_yield_state.value,
            plastic_multiplier
        );

        MohrCoulombUpdate {
            stress: updated_stress,
            plastic_multiplier,
            plastic_strain,
            branch,
        }
    }
}

/// Equivalent measure `√(2/3·e:e)` of the deviatoric part `e` of a plastic strain increment
/// given with engineering shear components.
pub fn equivalent_plastic_deviatoric_strain(plastic_strain: &StrainTensor) -> Real {
    let mut strain = *plastic_strain;
    for i in 3..6 {
        strain[i] *= 0.5;
    }

    let volumetric = strain[0] + strain[1] + strain[2];
    let mut sum = 0.0;
    for i in 0..3 {
        sum += (strain[i] - volumetric / 3.0).powi(2);
    }
    for i in 3..6 {
        sum += 2.0 * strain[i] * strain[i];
    }

    (2.0 / 3.0 as Real).sqrt() * sum.sqrt()
}

impl Material for MohrCoulomb {
    fn id(&self) -> MaterialId {
        self.id
    }

    fn density(&self) -> Real {
        self.parameters.density
    }

    fn thermodynamic_pressure(&self, volumetric_strain: Real) -> Real {
        -self.bulk_modulus * volumetric_strain
    }

    fn compute_stress(
        &self,
        stress: &StressTensor,
        dstrain: &StrainTensor,
        _particle: &dyn ParticleAccessor,
        state: &mut StateVariables,
    ) -> StressTensor {
        self.update_stress(stress, dstrain, state).stress
    }

    fn to_core_model(&self) -> Option<CoreMaterial> {
        Some(CoreMaterial::MohrCoulomb(*self))
    }
}
