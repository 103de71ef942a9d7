use crate::animal::Species;
use crate::ecology::{Fodder, Terrain};
use crate::error::ConfigError;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

/**
The constants that drive the life of every individual of one species. The
names follow the usual notation of the model description, so they are also
the keys accepted by [`Parameters::with_species_parameters`].
 */
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeciesParameters {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of birth weight
    pub sigma_birth: f64,
    /// Weight gained per unit of food eaten
    pub beta: f64,
    /// Fraction of weight lost every year
    pub eta: f64,
    /// Age at which the age factor of fitness is one half
    pub a_half: f64,
    pub phi_age: f64,
    /// Weight at which the weight factor of fitness is one half
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration propensity, multiplied with fitness
    pub mu: f64,
    /// Birth propensity
    pub gamma: f64,
    /// Minimum weight for giving birth, in units of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Weight lost by the mother per unit of newborn weight
    pub xi: f64,
    /// Death propensity for an individual of fitness zero
    pub omega: f64,
    /// Maximum food intake per year
    #[serde(rename = "F")]
    pub f: Fodder,
    /// Fitness gap above which a kill is certain. Predators only.
    #[serde(rename = "DeltaPhiMax")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParameters {
    pub fn herbivore() -> Self {
        SpeciesParameters {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: Fodder::from(10.0),
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        SpeciesParameters {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: Fodder::from(50.0),
            delta_phi_max: Some(10.0),
        }
    }

    /// The fitness gap at which a predator is sure to kill; infinite for
    /// species that do not hunt.
    pub fn kill_threshold(&self) -> f64 {
        self.delta_phi_max.unwrap_or(f64::INFINITY)
    }

    fn set(&mut self, species: Species, name: &str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || value < 0. {
            return Err(ConfigError::invalid(
                name,
                value,
                "parameters must be non-negative numbers",
            ));
        }
        match name {
            "w_birth" => self.w_birth = value,
            "sigma_birth" => self.sigma_birth = value,
            "beta" => self.beta = value,
            "eta" => {
                if value >= 1. {
                    return Err(ConfigError::invalid(
                        name,
                        value,
                        "the yearly weight loss must be a fraction below 1",
                    ));
                }
                self.eta = value
            }
            "a_half" => self.a_half = value,
            "phi_age" => self.phi_age = value,
            "w_half" => self.w_half = value,
            "phi_weight" => self.phi_weight = value,
            "mu" => self.mu = value,
            "gamma" => self.gamma = value,
            "zeta" => self.zeta = value,
            "xi" => self.xi = value,
            "omega" => self.omega = value,
            "F" => self.f = Fodder::from(value),
            "DeltaPhiMax" if species == Species::Carnivore => {
                if value <= 0. {
                    return Err(ConfigError::invalid(
                        name,
                        value,
                        "the fitness gap for a certain kill must be positive",
                    ));
                }
                self.delta_phi_max = Some(value)
            }
            _ => {
                return Err(ConfigError::UnknownParameter {
                    owner: species.name().to_string(),
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/**
Fodder capacity of the passable terrain kinds. Water has no capacity at all
and cannot be given one.
 */
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TerrainParameters {
    pub lowland: Fodder,
    pub highland: Fodder,
    pub desert: Fodder,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        TerrainParameters {
            lowland: Fodder::from(800.),
            highland: Fodder::from(300.),
            desert: Fodder::from(0.),
        }
    }
}

impl TerrainParameters {
    pub fn f_max(&self, terrain: Terrain) -> Fodder {
        match terrain {
            Terrain::Water => Fodder::ZERO,
            Terrain::Lowland => self.lowland,
            Terrain::Highland => self.highland,
            Terrain::Desert => self.desert,
        }
    }

    fn f_max_mut(&mut self, terrain: Terrain) -> Option<&mut Fodder> {
        match terrain {
            Terrain::Water => None,
            Terrain::Lowland => Some(&mut self.lowland),
            Terrain::Highland => Some(&mut self.highland),
            Terrain::Desert => Some(&mut self.desert),
        }
    }
}

/**
All parameters of a simulation. They are assembled before the simulation
starts and not touched afterwards: the `with_*` methods validate a set of
overrides completely and return a new value, leaving `self` as it was.
 */
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Parameters {
    pub herbivore: SpeciesParameters,
    pub carnivore: SpeciesParameters,
    pub terrain: TerrainParameters,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            herbivore: SpeciesParameters::herbivore(),
            carnivore: SpeciesParameters::carnivore(),
            terrain: TerrainParameters::default(),
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParameters {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn f_max(&self, terrain: Terrain) -> Fodder {
        self.terrain.f_max(terrain)
    }

    /**
    Override some constants of one species.

    ```rust
    # use model::parameters::Parameters;
    # use model::animal::Species;
    # use std::collections::BTreeMap;
    let p = Parameters::default();
    let mut o = BTreeMap::new();
    o.insert("eta".to_string(), 1.5);
    assert!(p.with_species_parameters(Species::Herbivore, &o).is_err());
    o.insert("eta".to_string(), 0.1);
    let q = p.with_species_parameters(Species::Herbivore, &o).unwrap();
    assert_eq!(q.herbivore.eta, 0.1);
    assert_eq!(p.herbivore.eta, 0.05);
    ```
     */
    pub fn with_species_parameters(
        &self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Parameters, ConfigError> {
        let mut updated = self.species(species).clone();
        for (name, value) in overrides {
            updated.set(species, name, *value)?;
        }
        let mut p = self.clone();
        match species {
            Species::Herbivore => p.herbivore = updated,
            Species::Carnivore => p.carnivore = updated,
        }
        Ok(p)
    }

    pub fn with_terrain_parameters(
        &self,
        terrain: Terrain,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Parameters, ConfigError> {
        let mut p = self.clone();
        for (name, value) in overrides {
            let f_max = match (name.as_str(), p.terrain.f_max_mut(terrain)) {
                ("f_max", Some(f_max)) => f_max,
                _ => {
                    return Err(ConfigError::UnknownParameter {
                        owner: terrain.name().to_string(),
                        name: name.to_string(),
                    })
                }
            };
            if !value.is_finite() || *value < 0. {
                return Err(ConfigError::invalid(
                    name,
                    *value,
                    "fodder capacity must be non-negative",
                ));
            }
            *f_max = Fodder::from(*value);
        }
        Ok(p)
    }

    /**
    Apply a whole table of overrides, as read from a parameter file. Keys are
    species names or terrain names; every table is validated by the matching
    `with_*` method.
     */
    pub fn with_overrides(
        &self,
        table: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Result<Parameters, ConfigError> {
        let mut p = self.clone();
        for (owner, overrides) in table {
            p = match owner.parse::<Species>() {
                Ok(species) => p.with_species_parameters(species, overrides)?,
                Err(_) => {
                    let terrain: Terrain = owner.parse()?;
                    p.with_terrain_parameters(terrain, overrides)?
                }
            };
        }
        Ok(p)
    }
}
