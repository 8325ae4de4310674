use crate::math::{ElasticTensor, Real};

/// Replaces a near-zero denominator by a small positive substitute.
///
/// `x` is kept untouched whenever `|x| >= epsilon`.
#[inline]
pub fn floor_denominator(x: Real, epsilon: Real, substitute: Real) -> Real {
    if x.abs() < epsilon {
        substitute
    } else {
        x
    }
}

pub fn shear_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
    young_modulus / (2.0 * (1.0 + poisson_ratio))
}

pub fn bulk_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
    young_modulus / (3.0 * (1.0 - 2.0 * poisson_ratio))
}

/// The isotropic stiffness acting on Voigt strains with engineering shear components.
pub fn isotropic_elastic_tensor(bulk_modulus: Real, shear_modulus: Real) -> ElasticTensor {
    let a1 = bulk_modulus + (4.0 / 3.0) * shear_modulus;
    let a2 = bulk_modulus - (2.0 / 3.0) * shear_modulus;

    let mut de = ElasticTensor::zeros();
    for i in 0..3 {
        for j in 0..3 {
            de[(i, j)] = if i == j { a1 } else { a2 };
        }
        de[(i + 3, i + 3)] = shear_modulus;
    }

    de
}

/// Inverse of the elastic tensor, or zero if the moduli make it singular.
pub fn elastic_compliance(de: &ElasticTensor) -> ElasticTensor {
    de.try_inverse().unwrap_or_else(|| {
        warn!("Singular elastic tensor, the plastic strain increment will not be reduced.");
        ElasticTensor::zeros()
    })
}
