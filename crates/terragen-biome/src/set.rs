//! Biome set: validated biome list with [`BiomeId`] indexing and name lookup.

use hashbrown::HashMap;

use crate::Biome;

/// Index of a biome within its [`BiomeSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// Errors that can occur when building a [`BiomeSet`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BiomeSetError {
    /// A biome with this name is already in the set.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// A band has `min > max`.
    #[error("biome `{name}` has an inverted {axis} band")]
    InvertedBand {
        /// Biome name.
        name: String,
        /// Axis name.
        axis: &'static str,
    },
    /// A band bound is non-finite or outside `[0, 1]`.
    #[error("biome `{name}` has a {axis} band outside [0, 1]")]
    BandOutOfRange {
        /// Biome name.
        name: String,
        /// Axis name.
        axis: &'static str,
    },
    /// Weight bias is non-finite or outside `[0, 1]`.
    #[error("biome `{0}` has a weight bias outside [0, 1]")]
    WeightBias(String),
    /// More biomes than a [`BiomeId`] can address.
    #[error("too many biomes: {0}")]
    TooMany(usize),
}

/// Validated, immutable list of biomes.
///
/// List order matters: classification ties go to the earlier biome.
#[derive(Clone, Debug)]
pub struct BiomeSet {
    biomes: Vec<Biome>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeSet {
    /// Validate `biomes` and build the set, keeping the given order.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names, inverted or out-of-range bands, or a weight
    /// bias outside `[0, 1]`.
    pub fn new(biomes: Vec<Biome>) -> Result<Self, BiomeSetError> {
        if biomes.len() > u16::MAX as usize {
            return Err(BiomeSetError::TooMany(biomes.len()));
        }

        let mut name_to_id = HashMap::with_capacity(biomes.len());
        for (i, biome) in biomes.iter().enumerate() {
            for (axis, band) in biome.bands() {
                let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
                if !in_unit(band.min) || !in_unit(band.max) {
                    return Err(BiomeSetError::BandOutOfRange {
                        name: biome.name.clone(),
                        axis,
                    });
                }
                if band.min > band.max {
                    return Err(BiomeSetError::InvertedBand {
                        name: biome.name.clone(),
                        axis,
                    });
                }
            }
            if !(0.0..=1.0).contains(&biome.weight_bias) {
                return Err(BiomeSetError::WeightBias(biome.name.clone()));
            }
            if name_to_id
                .insert(biome.name.clone(), BiomeId(i as u16))
                .is_some()
            {
                return Err(BiomeSetError::DuplicateName(biome.name.clone()));
            }
        }

        Ok(Self { biomes, name_to_id })
    }

    /// Like [`BiomeSet::new`], after a stable sort by `(min height, min temperature)`.
    pub fn new_sorted(mut biomes: Vec<Biome>) -> Result<Self, BiomeSetError> {
        sort_biomes(&mut biomes);
        Self::new(biomes)
    }

    /// Returns the biome for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this set.
    pub fn get(&self, id: BiomeId) -> &Biome {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Iterate `(id, biome)` pairs in list order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &Biome)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, b)| (BiomeId(i as u16), b))
    }

    /// Returns the number of biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

/// Stable sort by `(min height, min temperature)`; equal keys keep authoring order.
pub fn sort_biomes(biomes: &mut [Biome]) {
    biomes.sort_by(|a, b| {
        a.height
            .min
            .total_cmp(&b.height.min)
            .then(a.temperature.min.total_cmp(&b.temperature.min))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Band, Color};

    fn biome(name: &str, h: (f32, f32), t: (f32, f32)) -> Biome {
        Biome {
            name: name.into(),
            height: Band::new(h.0, h.1),
            temperature: Band::new(t.0, t.1),
            humidity: Band::FULL,
            weight_bias: 0.0,
            color: Color::rgb(0, 0, 0),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let set = BiomeSet::new(vec![
            biome("Ocean", (0.0, 0.3), (0.0, 1.0)),
            biome("Land", (0.3, 1.0), (0.0, 1.0)),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.lookup_by_name("Land"), Some(BiomeId(1)));
        assert_eq!(set.lookup_by_name("Lava"), None);
        assert_eq!(set.get(BiomeId(0)).name, "Ocean");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = BiomeSet::new(vec![
            biome("Hills", (0.5, 0.7), (0.0, 1.0)),
            biome("Hills", (0.6, 0.8), (0.0, 1.0)),
        ])
        .unwrap_err();
        assert_eq!(err, BiomeSetError::DuplicateName("Hills".into()));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let err = BiomeSet::new(vec![biome("Bad", (0.2, 0.3), (0.9, 0.1))]).unwrap_err();
        assert_eq!(
            err,
            BiomeSetError::InvertedBand {
                name: "Bad".into(),
                axis: "temperature"
            }
        );
    }

    #[test]
    fn test_out_of_range_band_rejected() {
        let err = BiomeSet::new(vec![biome("High", (0.2, 1.5), (0.0, 1.0))]).unwrap_err();
        assert!(matches!(err, BiomeSetError::BandOutOfRange { axis: "height", .. }));
    }

    #[test]
    fn test_sort_is_stable_by_height_then_temperature() {
        let mut biomes = vec![
            biome("Snow", (0.8, 1.0), (0.0, 0.2)),
            biome("Desert", (0.4, 0.6), (0.7, 1.0)),
            biome("Tundra", (0.4, 0.6), (0.0, 0.3)),
            biome("Steppe", (0.4, 0.6), (0.0, 0.3)),
            biome("Ocean", (0.0, 0.3), (0.0, 1.0)),
        ];
        sort_biomes(&mut biomes);
        let names: Vec<&str> = biomes.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Ocean", "Tundra", "Steppe", "Desert", "Snow"]);
    }
}
