/*!
Individual animals.

Both species share one type. What differs between herbivores and carnivores
is the table of constants in [`SpeciesParameters`], which every operation
takes by reference, and the ability to hunt, which only carnivores have.

All stochastic decisions take the generator they draw from as an argument, so
a simulation seeded once is reproducible down to every single draw.
 */

use crate::error::ConfigError;
use crate::parameters::SpeciesParameters;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl FromStr for Species {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownSpecies(s.to_string()))
    }
}

#[derive(Clone, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    dead: bool,
    has_migrated: bool,
}

/**
Fitness summarizes the condition of an animal as a number between 0 and 1.
It is the product of an age factor that decays around `a_half` and a weight
factor that grows around `w_half`:

  Φ = 1 / (1 + exp(φ_age (a − a_half))) · 1 / (1 + exp(−φ_weight (w − w_half)))

and an animal without weight has fitness 0. Any weight at all keeps the
fitness above 0, even where the exponentials overflow.

```rust
# use model::animal::fitness;
# use model::parameters::SpeciesParameters;
let p = SpeciesParameters::herbivore();
assert_eq!(fitness(40, 10., &p), 0.25);
assert_eq!(fitness(3, 0., &p), 0.);
```
 */
pub fn fitness(age: u32, weight: f64, p: &SpeciesParameters) -> f64 {
    if weight <= 0. {
        return 0.;
    }
    let q_age = 1. / (1. + (p.phi_age * (age as f64 - p.a_half)).exp());
    let q_weight = 1. / (1. + (-p.phi_weight * (weight - p.w_half)).exp());
    f64::max(q_age * q_weight, f64::MIN_POSITIVE)
}

/// Draw a birth weight from the species' Gaussian.
pub fn birth_weight<R: Rng + ?Sized>(p: &SpeciesParameters, rng: &mut R) -> f64 {
    match Normal::new(p.w_birth, p.sigma_birth) {
        Err(_) => p.w_birth,
        Ok(d) => d.sample(rng),
    }
}

impl Animal {
    /// A negative weight, as the tail of the birth weight Gaussian can
    /// produce, is taken as 0: such an animal is stillborn and dies in the
    /// next mortality phase.
    pub fn new(species: Species, age: u32, weight: f64, p: &SpeciesParameters) -> Animal {
        let weight = weight.max(0.);
        Animal {
            species,
            age,
            weight,
            fitness: fitness(age, weight, p),
            dead: false,
            has_migrated: false,
        }
    }

    /// An animal of age 0 with a random birth weight.
    pub fn newborn<R: Rng + ?Sized>(species: Species, p: &SpeciesParameters, rng: &mut R) -> Animal {
        Animal::new(species, 0, birth_weight(p, rng), p)
    }

    pub fn species(&self) -> Species {
        self.species
    }
    pub fn age(&self) -> u32 {
        self.age
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
    pub fn is_dead(&self) -> bool {
        self.dead
    }
    pub fn has_migrated(&self) -> bool {
        self.has_migrated
    }

    fn refresh_fitness(&mut self, p: &SpeciesParameters) {
        self.fitness = fitness(self.age, self.weight, p);
    }

    /// Growing older also makes the animal eligible for migration again.
    pub fn age_one_year(&mut self, p: &SpeciesParameters) {
        self.age += 1;
        self.has_migrated = false;
        self.refresh_fitness(p);
    }

    pub fn gain_weight(&mut self, food: f64, p: &SpeciesParameters) {
        self.weight += p.beta * food;
        self.refresh_fitness(p);
    }

    pub fn lose_weight_annual(&mut self, p: &SpeciesParameters) {
        self.weight -= p.eta * self.weight;
        self.refresh_fitness(p);
    }

    /**
    Decide whether the animal dies this year. An animal without weight dies
    for certain, without consulting the generator; otherwise death comes with
    probability ω (1 − Φ). Once dead, always dead.
     */
    pub fn decide_death<R: Rng + ?Sized>(&mut self, p: &SpeciesParameters, rng: &mut R) -> bool {
        if self.dead {
            return true;
        }
        self.dead = if self.weight <= 0. {
            true
        } else {
            rng.gen::<f64>() < p.omega * (1. - self.fitness)
        };
        self.dead
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }

    /**
    Try to give birth, given the number of animals of the same species in the
    patch (the mother included).

    The mother must be heavy enough, then wins a draw against
    min(1, γ Φ (n − 1)). The newborn's weight is drawn next, and only if the
    mother can afford losing ξ times that weight does the birth happen.
    Otherwise nothing changes.
     */
    pub fn attempt_birth<R: Rng + ?Sized>(
        &mut self,
        n_same_species: usize,
        p: &SpeciesParameters,
        rng: &mut R,
    ) -> Option<Animal> {
        if n_same_species < 2 || self.weight < p.zeta * (p.w_birth + p.sigma_birth) {
            return None;
        }
        let probability = f64::min(1., p.gamma * self.fitness * (n_same_species - 1) as f64);
        if rng.gen::<f64>() >= probability {
            return None;
        }
        let newborn = Animal::newborn(self.species, p, rng);
        let cost = p.xi * newborn.weight;
        if newborn.weight <= 0. || self.weight - cost < 0. {
            return None;
        }
        self.weight -= cost;
        self.refresh_fitness(p);
        Some(newborn)
    }

    /// Whether the animal wants to leave its patch, with probability μ Φ.
    /// Animals that already moved this year are not asked.
    pub fn decide_migrate<R: Rng + ?Sized>(&self, p: &SpeciesParameters, rng: &mut R) -> bool {
        if self.has_migrated {
            return false;
        }
        rng.gen::<f64>() < p.mu * self.fitness
    }

    pub(crate) fn set_migrated(&mut self) {
        self.has_migrated = true;
    }

    /**
    The probability that this animal, hunting, kills `prey`. Only carnivores
    hunt. A fitter prey always escapes, a much weaker one never does, and in
    between the chance of a kill grows linearly with the fitness gap.
     */
    pub fn kill_probability(&self, prey: &Animal, p: &SpeciesParameters) -> f64 {
        if self.species != Species::Carnivore {
            return 0.;
        }
        let gap = self.fitness - prey.fitness;
        let threshold = p.kill_threshold();
        if gap <= 0. {
            0.
        } else if gap > threshold {
            1.
        } else {
            gap / threshold
        }
    }
}
