pub use self::particle::{Particle, ParticleAccessor, StateVariables};

pub mod models;
mod particle;
