pub extern crate nalgebra as na;

#[macro_use]
extern crate log;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

pub mod prelude {
    pub use crate::dynamics::models::*;
    pub use crate::dynamics::*;
    pub use crate::math::*;
}

pub mod math {
    use na::{Matrix6, Vector6};

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub type Real = f64;

    /// The dimension of the space.
    #[cfg(feature = "dim2")]
    pub const DIM: usize = 2;

    /// The dimension of the space.
    #[cfg(feature = "dim3")]
    pub const DIM: usize = 3;

    /// A symmetric second-order tensor in Voigt notation: `[xx, yy, zz, xy, yz, zx]`.
    pub type VoigtVector<N> = Vector6<N>;

    /// Stress in Voigt notation, shear components unfactored.
    pub type StressTensor = VoigtVector<Real>;

    /// Strain (or strain rate) in Voigt notation, engineering shear components.
    pub type StrainTensor = VoigtVector<Real>;

    /// Fourth-order stiffness tensor acting on Voigt vectors.
    pub type ElasticTensor = Matrix6<Real>;

    /// The identity-like vector used to split a stress into pressure and deviator.
    ///
    /// Only the in-plane normal components are set in 2D.
    #[cfg(feature = "dim2")]
    pub fn dirac_delta() -> VoigtVector<Real> {
        VoigtVector::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// The identity-like vector used to split a stress into pressure and deviator.
    #[cfg(feature = "dim3")]
    pub fn dirac_delta() -> VoigtVector<Real> {
        VoigtVector::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0)
    }

    /// Zeroes the `yz` and `zx` shear components, which do not exist in plane problems.
    #[cfg(feature = "dim2")]
    #[inline]
    pub fn mask_out_of_plane(mut v: VoigtVector<Real>) -> VoigtVector<Real> {
        v[4] = 0.0;
        v[5] = 0.0;
        v
    }

    /// Identity in 3D: every shear component participates.
    #[cfg(feature = "dim3")]
    #[inline]
    pub fn mask_out_of_plane(v: VoigtVector<Real>) -> VoigtVector<Real> {
        v
    }

    #[derive(Copy, Clone, Debug, PartialEq)]
    pub struct DecomposedTensor {
        pub deviatoric_part: VoigtVector<Real>,
        pub spherical_part: Real,
    }

    impl DecomposedTensor {
        /// Splits a Voigt tensor into its mean normal component and the remaining deviator.
        ///
        /// The mean is always taken over the three normal components, plane problems included.
        pub fn decompose(tensor: &VoigtVector<Real>) -> Self {
            let spherical_part = (tensor[0] + tensor[1] + tensor[2]) / 3.0;
            let mut deviatoric_part = *tensor;

            for i in 0..3 {
                deviatoric_part[i] -= spherical_part;
            }

            Self {
                deviatoric_part,
                spherical_part,
            }
        }

        pub fn recompose(&self) -> VoigtVector<Real> {
            let mut result = self.deviatoric_part;
            for i in 0..3 {
                result[i] += self.spherical_part;
            }
            result
        }
    }
}

pub mod dynamics;
pub mod utils;
