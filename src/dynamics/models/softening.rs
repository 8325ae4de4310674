use crate::math::Real;

/// Strength parameters of a frictional material.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct StrengthParameters {
    /// Friction angle (radians).
    pub friction: Real,
    /// Dilation angle (radians).
    pub dilation: Real,
    pub cohesion: Real,
}

/// Piecewise-linear degradation of strength with accumulated plastic deviatoric strain.
///
/// Full (peak) strength is kept up to `peak_pdstrain`, the residual strength is reached
/// at `critical_pdstrain`, and each parameter is interpolated independently in between.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SofteningRule {
    pub peak: StrengthParameters,
    pub residual: StrengthParameters,
    pub peak_pdstrain: Real,
    pub critical_pdstrain: Real,
}

impl SofteningRule {
    pub fn strength(&self, pdstrain: Real) -> StrengthParameters {
        if pdstrain <= self.peak_pdstrain {
            self.peak
        } else if pdstrain >= self.critical_pdstrain {
            self.residual
        } else {
            // 1 at the peak threshold, 0 at the critical one.
            let fraction = (pdstrain - self.critical_pdstrain)
                / (self.peak_pdstrain - self.critical_pdstrain);
            let lerp = |peak: Real, residual: Real| residual + fraction * (peak - residual);

            StrengthParameters {
                friction: lerp(self.peak.friction, self.residual.friction),
                dilation: lerp(self.peak.dilation, self.residual.dilation),
                cohesion: lerp(self.peak.cohesion, self.residual.cohesion),
            }
        }
    }

    pub fn thresholds_are_ordered(&self) -> bool {
        self.peak_pdstrain <= self.critical_pdstrain
    }
}
