use crate::math::{mask_out_of_plane, DecomposedTensor, Real, StressTensor};
use std::f64::consts::FRAC_PI_3;

/// Bound applied to the Lode ratio before taking its arc-cosine.
pub const LODE_RATIO_LIMIT: Real = 0.99;

/// Below this magnitude, `J2` and `ρ` are treated as zero.
pub const DENOMINATOR_EPSILON: Real = 1.0e-22;

/// Stand-in for a vanishing denominator.
pub const DENOMINATOR_SUBSTITUTE: Real = 1.0e-5;

/// Floor of `1 - r²` under the square root of `dθ/dr`.
pub const LODE_RADICAND_FLOOR: Real = 0.001;

/// Invariant description of a stress state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StressInvariants {
    /// Mean normal stress `p`.
    pub mean_stress: Real,
    /// `σ - p·I`.
    pub deviatoric_stress: StressTensor,
    pub j2: Real,
    pub j3: Real,
    /// Lode angle, in `[0, π/3]`.
    pub lode_angle: Real,
    /// `√(2·J2)`.
    pub rho: Real,
    /// Axial coordinate `(σ1 + σ2 + σ3) / √3`.
    pub epsilon: Real,
}

impl StressInvariants {
    pub fn new(stress: &StressTensor) -> Self {
        let stress = mask_out_of_plane(*stress);
        let decomposed = DecomposedTensor::decompose(&stress);
        let s = decomposed.deviatoric_part;

        let j2 = ((stress[0] - stress[1]).powi(2)
            + (stress[1] - stress[2]).powi(2)
            + (stress[0] - stress[2]).powi(2))
            / 6.0
            + stress[3] * stress[3]
            + stress[4] * stress[4]
            + stress[5] * stress[5];

        // Determinant of the symmetric deviator; the last three terms vanish in 2D.
        let j3 = s[0] * s[1] * s[2] - s[2] * s[3] * s[3]
            + 2.0 * s[3] * s[4] * s[5]
            - s[0] * s[4] * s[4]
            - s[1] * s[5] * s[5];

        let lode_angle = lode_angle(j2, j3);

        Self {
            mean_stress: decomposed.spherical_part,
            deviatoric_stress: s,
            j2,
            j3,
            lode_angle,
            rho: (2.0 * j2).sqrt(),
            epsilon: 3.0 * decomposed.spherical_part / (3.0 as Real).sqrt(),
        }
    }

    /// The Lode ratio `r = (3√3/2)·J3/J2^1.5`, zero for a vanishing deviator.
    pub fn lode_ratio(&self) -> Real {
        lode_ratio(self.j2, self.j3)
    }

    /// `∂ε/∂σ`.
    pub fn depsilon_dsigma(&self) -> StressTensor {
        let k = 1.0 / (3.0 as Real).sqrt();
        StressTensor::new(k, k, k, 0.0, 0.0, 0.0)
    }

    /// `∂ρ/∂σ`, the unit deviatoric direction, or zero at the hydrostatic axis.
    pub fn drho_dsigma(&self) -> StressTensor {
        if self.rho > DENOMINATOR_EPSILON {
            mask_out_of_plane(self.deviatoric_stress / self.rho)
        } else {
            StressTensor::zeros()
        }
    }

    /// `∂J3/∂σ` built from the rows of the deviator matrix: `s·s - (2/3)·J2·I`.
    pub fn dj3_dsigma(&self) -> StressTensor {
        let s = &self.deviatoric_stress;
        let row1 = na::Vector3::new(s[0], s[3], s[5]);
        let row2 = na::Vector3::new(s[3], s[1], s[4]);
        let row3 = na::Vector3::new(s[5], s[4], s[2]);
        let two_thirds_j2 = (2.0 / 3.0) * self.j2;

        StressTensor::new(
            row1.dot(&row1) - two_thirds_j2,
            row2.dot(&row2) - two_thirds_j2,
            row3.dot(&row3) - two_thirds_j2,
            row1.dot(&row2),
            row2.dot(&row3),
            row1.dot(&row3),
        )
    }

    /// `∂θ/∂σ` through the chain `θ(r(J2, J3))`.
    pub fn dtheta_dsigma(&self) -> StressTensor {
        if self.j2.abs() <= DENOMINATOR_EPSILON {
            return StressTensor::zeros();
        }

        let r = self.lode_ratio();
        let sqrt3 = (3.0 as Real).sqrt();
        let dr_dj2 = (-9.0 * sqrt3 / 4.0) * self.j3 / self.j2.powf(2.5);
        let dr_dj3 = (1.5 * sqrt3) / self.j2.powf(1.5);
        let dtheta_dr = -1.0 / (3.0 * (1.0 - r * r).max(LODE_RADICAND_FLOOR).sqrt());

        let dj2_dsigma = self.deviatoric_stress;
        mask_out_of_plane(dtheta_dr * (dr_dj2 * dj2_dsigma + dr_dj3 * self.dj3_dsigma()))
    }
}

fn lode_ratio(j2: Real, j3: Real) -> Real {
    if j2.abs() > DENOMINATOR_EPSILON {
        (3.0 * (3.0 as Real).sqrt() / 2.0) * j3 / j2.powf(1.5)
    } else {
        0.0
    }
}

/// The Lode angle `θ = acos(r)/3`, saturated so it always lies in `[0, π/3]`.
pub fn lode_angle(j2: Real, j3: Real) -> Real {
    let r = lode_ratio(j2, j3).clamp(-LODE_RATIO_LIMIT, LODE_RATIO_LIMIT);
    (r.acos() / 3.0).clamp(0.0, FRAC_PI_3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn random_stress(rng: &mut oorandom::Rand64, scale: Real) -> StressTensor {
        StressTensor::from_fn(|_, _| (rng.rand_float() - 0.5) * 2.0 * scale)
    }

    #[test]
    fn hydrostatic_stress_has_no_deviator() {
        let inv = StressInvariants::new(&StressTensor::new(-10.0, -10.0, -10.0, 0.0, 0.0, 0.0));

        assert_relative_eq!(inv.mean_stress, -10.0);
        assert_eq!(inv.j2, 0.0);
        assert_eq!(inv.j3, 0.0);
        assert_eq!(inv.rho, 0.0);
        assert_relative_eq!(inv.epsilon, -30.0 / (3.0 as Real).sqrt(), epsilon = 1.0e-12);
        assert_relative_eq!(inv.lode_angle, (0.0 as Real).acos() / 3.0);
        assert_eq!(inv.drho_dsigma(), StressTensor::zeros());
        assert_eq!(inv.dtheta_dsigma(), StressTensor::zeros());
    }

    #[test]
    fn uniaxial_stress_invariants() {
        let inv = StressInvariants::new(&StressTensor::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        assert_relative_eq!(inv.mean_stress, 1.0);
        assert_relative_eq!(inv.j2, 3.0, epsilon = 1.0e-12);
        // s = (2, -1, -1)
        assert_relative_eq!(inv.j3, 2.0, epsilon = 1.0e-12);
        assert_relative_eq!(inv.rho, (6.0 as Real).sqrt(), epsilon = 1.0e-12);
        // r = 1 saturates to the Lode ratio limit.
        assert_relative_eq!(inv.lode_angle, LODE_RATIO_LIMIT.acos() / 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn j2_matches_half_the_deviator_contraction() {
        let mut rng = oorandom::Rand64::new(7);

        for _ in 0..100 {
            let inv = StressInvariants::new(&random_stress(&mut rng, 100.0));
            let s = inv.deviatoric_stress;
            let contraction = s[0] * s[0]
                + s[1] * s[1]
                + s[2] * s[2]
                + 2.0 * (s[3] * s[3] + s[4] * s[4] + s[5] * s[5]);

            assert!(inv.j2 >= 0.0);
            assert!(inv.rho >= 0.0);
            assert_relative_eq!(inv.j2, 0.5 * contraction, epsilon = 1.0e-8, max_relative = 1.0e-10);
        }
    }

    #[test]
    fn lode_angle_is_always_in_range() {
        let mut rng = oorandom::Rand64::new(1234);

        for _ in 0..500 {
            let inv = StressInvariants::new(&random_stress(&mut rng, 1.0e3));
            assert!(inv.lode_angle >= 0.0 && inv.lode_angle <= FRAC_PI_3);
        }

        // Raw ratios far outside [-1, 1] must saturate instead of producing NaN.
        for &(j2, j3) in &[(1.0e-3, 1.0e3), (1.0e-3, -1.0e3), (1.0, Real::MAX), (0.0, 5.0)] {
            let theta = lode_angle(j2, j3);
            assert!(theta.is_finite());
            assert!(theta >= 0.0 && theta <= FRAC_PI_3);
        }
    }

    #[test]
    fn dj3_dsigma_matches_finite_differences() {
        let stress = StressTensor::new(12.0, -4.0, 3.0, 2.5, -1.5, 0.75);
        let inv = StressInvariants::new(&stress);
        let grad = inv.dj3_dsigma();
        let h = 1.0e-6;

        // Voigt shear entries count twice in the tensor, hence the factor 2 for them.
        for i in 0..6 {
            if crate::math::DIM == 2 && i >= 4 {
                continue;
            }
            let mut plus = stress;
            let mut minus = stress;
            plus[i] += h;
            minus[i] -= h;
            let fd = (StressInvariants::new(&plus).j3 - StressInvariants::new(&minus).j3)
                / (2.0 * h);
            let factor = if i < 3 { 1.0 } else { 2.0 };
            assert_relative_eq!(factor * grad[i], fd, epsilon = 1.0e-5);
        }
    }

    #[cfg(feature = "dim2")]
    #[test]
    fn out_of_plane_shear_is_ignored_in_2d() {
        let a = StressInvariants::new(&StressTensor::new(5.0, -2.0, 1.0, 3.0, 0.0, 0.0));
        let b = StressInvariants::new(&StressTensor::new(5.0, -2.0, 1.0, 3.0, 9.0, -7.0));

        assert_eq!(a, b);
        assert_eq!(b.drho_dsigma()[4], 0.0);
        assert_eq!(b.dtheta_dsigma()[5], 0.0);
    }

    #[cfg(feature = "dim3")]
    #[test]
    fn all_shear_components_contribute_in_3d() {
        let a = StressInvariants::new(&StressTensor::new(5.0, -2.0, 1.0, 3.0, 0.0, 0.0));
        let b = StressInvariants::new(&StressTensor::new(5.0, -2.0, 1.0, 3.0, 1.0, -1.0));

        assert_relative_eq!(b.j2 - a.j2, 2.0, epsilon = 1.0e-12);
        assert!(b.drho_dsigma()[4] != 0.0);
    }
}
