use crate::math::Real;
use std::collections::BTreeMap;
use std::iter::FromIterator;

/// Identifier of a material, as given by the input that declared it.
pub type MaterialId = u32;

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("material {material_id}: missing required properties {keys:?}")]
    MissingParameters {
        material_id: MaterialId,
        keys: Vec<String>,
    },
    #[error(
        "material {material_id}: peak plastic strain {peak} exceeds critical plastic strain {critical}"
    )]
    InvalidSofteningThresholds {
        material_id: MaterialId,
        peak: Real,
        critical: Real,
    },
    #[error("unknown material model `{0}`")]
    UnknownMaterial(String),
    #[error("invalid material properties: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named set of scalar material properties.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MaterialProperties {
    values: BTreeMap<String, Real>,
}

impl MaterialProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of numbers, e.g. `{"density": 1800, "friction": 30}`.
    ///
    /// Entries that are not numbers are ignored.
    pub fn from_json_str(json: &str) -> Result<Self, MaterialError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_json(&value))
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut result = Self::new();

        if let Some(object) = value.as_object() {
            for (key, entry) in object {
                match entry.as_f64() {
                    Some(v) => result.insert(key, v as Real),
                    None => debug!("Ignoring non-numeric material property `{}`.", key),
                }
            }
        }

        result
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Real) {
        let _ = self.values.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: Real) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<Real> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn reader(&self) -> PropertyReader {
        PropertyReader {
            properties: self,
            missing: Vec::new(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Real)> for MaterialProperties {
    fn from_iter<T: IntoIterator<Item = (K, Real)>>(iter: T) -> Self {
        let mut result = Self::new();
        for (key, value) in iter {
            result.insert(key, value);
        }
        result
    }
}

/// Reads required properties, remembering the keys that were absent.
pub(crate) struct PropertyReader<'a> {
    properties: &'a MaterialProperties,
    missing: Vec<String>,
}

impl<'a> PropertyReader<'a> {
    /// The value of `key`, or `0.0` if absent.
    pub fn required(&mut self, key: &str) -> Real {
        match self.properties.get(key) {
            Some(value) => value,
            None => {
                self.missing.push(key.to_string());
                0.0
            }
        }
    }

    pub fn finish(self, material_id: MaterialId) -> Result<(), MaterialError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(MaterialError::MissingParameters {
                material_id,
                keys: self.missing,
            })
        }
    }
}
