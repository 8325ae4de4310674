//! Yield surface and plastic potential of the Mohr-Coulomb model, in invariant form.
//!
//! Both are written in terms of the axial coordinate `ε`, the deviatoric radius `ρ` and the
//! Lode angle `θ` (see [`StressInvariants`]). Their stress gradients are assembled through
//! the chain rule `∂X/∂σ = ∂X/∂ε·∂ε/∂σ + ∂X/∂ρ·∂ρ/∂σ + ∂X/∂θ·∂θ/∂σ`.

use crate::dynamics::models::{
    StrengthParameters, StressInvariants, DENOMINATOR_EPSILON, DENOMINATOR_SUBSTITUTE,
};
use crate::math::{mask_out_of_plane, Real, StressTensor};
use crate::utils;
use std::f64::consts::FRAC_PI_3;

/// The yield function must exceed this value for the state to count as yielded.
pub const YIELD_TOLERANCE: Real = 1.0e-22;

/// Meridional eccentricity of the hyperbolic plastic potential.
pub const MERIDIONAL_ECCENTRICITY: Real = 0.1;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct YieldState {
    pub value: Real,
    pub yielded: bool,
}

impl YieldState {
    pub fn evaluate(invariants: &StressInvariants, strength: &StrengthParameters) -> Self {
        let value = yield_function(invariants, strength);
        Self {
            value,
            yielded: value > YIELD_TOLERANCE,
        }
    }
}

/// `F = √(3/2)·ρ·[sin(θ+π/3)/(√3·cosφ) + cos(θ+π/3)·tanφ/3] + (ε/3)·tanφ - c`.
pub fn yield_function(invariants: &StressInvariants, strength: &StrengthParameters) -> Real {
    let (_, df_drho, _) = yield_partials(invariants, strength);
    invariants.rho * df_drho + (invariants.epsilon / 3.0) * strength.friction.tan()
        - strength.cohesion
}

/// `(∂F/∂ε, ∂F/∂ρ, ∂F/∂θ)`.
fn yield_partials(
    invariants: &StressInvariants,
    strength: &StrengthParameters,
) -> (Real, Real, Real) {
    let phi = strength.friction;
    let sqrt3 = (3.0 as Real).sqrt();
    let k = (1.5 as Real).sqrt();
    let (sin_t, cos_t) = (invariants.lode_angle + FRAC_PI_3).sin_cos();

    let df_depsilon = phi.tan() / 3.0;
    let df_drho = k * (sin_t / (sqrt3 * phi.cos()) + cos_t * phi.tan() / 3.0);
    let df_dtheta = k * invariants.rho * (cos_t / (sqrt3 * phi.cos()) - sin_t * phi.tan() / 3.0);

    (df_depsilon, df_drho, df_dtheta)
}

/// Menetrey–Willam rounding of the deviatoric section, driven by the friction angle.
#[derive(Copy, Clone, Debug, PartialEq)]
struct MenetreyWillam {
    eccentricity: Real,
    r_mc: Real,
}

impl MenetreyWillam {
    fn new(friction: Real) -> Self {
        let sin_phi = friction.sin();
        Self {
            eccentricity: ((3.0 - sin_phi) / (3.0 + sin_phi)).clamp(0.5, 1.0),
            r_mc: (3.0 - sin_phi) / (6.0 * friction.cos()),
        }
    }

    /// `R_mw(θ)` and `dR_mw/dθ`.
    fn radius(&self, theta: Real) -> (Real, Real) {
        let e = self.eccentricity;
        let a = 1.0 - e * e;
        let b = 2.0 * e - 1.0;
        let (sin_t, cos_t) = theta.sin_cos();

        let sqpart = 4.0 * a * cos_t * cos_t + 5.0 * e * e - 4.0 * e;
        let sqpart = if sqpart < DENOMINATOR_EPSILON {
            DENOMINATOR_SUBSTITUTE
        } else {
            sqpart
        };
        let sqrt_part = sqpart.sqrt();

        let num = 4.0 * a * cos_t * cos_t + b * b;
        let den = utils::floor_denominator(
            2.0 * a * cos_t + b * sqrt_part,
            DENOMINATOR_EPSILON,
            DENOMINATOR_SUBSTITUTE,
        );

        let dnum = -8.0 * a * cos_t * sin_t;
        let dden = -2.0 * a * sin_t - b * 4.0 * a * cos_t * sin_t / sqrt_part;

        (
            self.r_mc * num / den,
            self.r_mc * (dnum * den - num * dden) / (den * den),
        )
    }
}

/// `P = √((m·c·tanψ)² + (R_mw(θ)·q)²) + (ε/3)·tanψ`, with `q = √(3/2)·ρ`.
pub fn plastic_potential(invariants: &StressInvariants, strength: &StrengthParameters) -> Real {
    let (r_mw, _) = MenetreyWillam::new(strength.friction).radius(invariants.lode_angle);
    let q = (1.5 as Real).sqrt() * invariants.rho;
    let tan_psi = strength.dilation.tan();
    let apex = MERIDIONAL_ECCENTRICITY * strength.cohesion * tan_psi;

    (apex * apex + (r_mw * q).powi(2)).sqrt() + (invariants.epsilon / 3.0) * tan_psi
}

/// `(∂P/∂ε, ∂P/∂ρ, ∂P/∂θ)`.
fn potential_partials(
    invariants: &StressInvariants,
    strength: &StrengthParameters,
) -> (Real, Real, Real) {
    let (r_mw, dr_mw_dtheta) = MenetreyWillam::new(strength.friction).radius(invariants.lode_angle);
    let rho = invariants.rho;
    let tan_psi = strength.dilation.tan();
    let apex = MERIDIONAL_ECCENTRICITY * strength.cohesion * tan_psi;

    let omega = apex * apex + 1.5 * (r_mw * rho).powi(2);
    let omega = if omega < DENOMINATOR_EPSILON {
        DENOMINATOR_SUBSTITUTE
    } else {
        omega
    };
    let sqrt_omega = omega.sqrt();

    let dp_depsilon = tan_psi / 3.0;
    let dp_drho = 1.5 * r_mw * r_mw * rho / sqrt_omega;
    let dp_dtheta = 1.5 * r_mw * dr_mw_dtheta * rho * rho / sqrt_omega;

    (dp_depsilon, dp_drho, dp_dtheta)
}

/// Stress gradients of the yield function and of the plastic potential.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlowGradients {
    /// `∂F/∂σ`, the associated direction.
    pub df_dsigma: StressTensor,
    /// `∂P/∂σ`, the plastic flow direction.
    pub dp_dsigma: StressTensor,
}

impl FlowGradients {
    pub fn new(invariants: &StressInvariants, strength: &StrengthParameters) -> Self {
        let depsilon_dsigma = invariants.depsilon_dsigma();
        let drho_dsigma = invariants.drho_dsigma();
        let dtheta_dsigma = invariants.dtheta_dsigma();

        let chain = |(d_eps, d_rho, d_theta): (Real, Real, Real)| {
            mask_out_of_plane(
                d_eps * depsilon_dsigma + d_rho * drho_dsigma + d_theta * dtheta_dsigma,
            )
        };

        Self {
            df_dsigma: chain(yield_partials(invariants, strength)),
            dp_dsigma: chain(potential_partials(invariants, strength)),
        }
    }
}
