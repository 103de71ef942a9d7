/*!
Model Description
=================

This model description follows the ODD (Overview, Design concept, Details)
protocol (Grimm et al., 2006; Grimm et al., 2010). As far as it is useful in
Rust source code, it follows the idea of literate programming: the model
description and the code that implements it live side by side, and each
section points to the module that carries it out.

# 1. Purpose

The model simulates the population dynamics of two species on an island, a
herbivore feeding on the island's plants and a carnivore feeding on the
herbivores. Animals age, eat, reproduce, wander and die, each according to a
simple stochastic rule that depends on its fitness. The island is a grid of
patches of different terrain, which differ in how much fodder they grow.

Boom and bust cycles of prey and predators, and the way they spread across
the island, are emergent properties of these individual rules.

 */

// Load useful modules

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info};

pub mod cli;
pub mod error;
mod debug;

use error::ConfigError;

/**

# 2. Entities, state variables, and scales

The model consists of individual animals living on a rectangular grid of
patches in discrete time. One time step is one year.

 */
pub type Years = u32;

/**
Fodder, the plant food, is measured in arbitrary units shared by the
capacity of patches and the appetite of animals. Food eaten turns into body
weight in the same units, at a species specific rate. Terrain kinds are
named by the single letters the island map uses for them.
 */
pub mod ecology;

/**
## 2.1 Animals

Every animal has a species, an age in years, a weight, and a fitness derived
from age and weight. Both species follow the same rules, parametrized by
species specific constants.

 */
pub mod animal;

/**
## 2.2 Patches

Each cell of the grid is a patch with a terrain. A patch holds the fodder
currently growing on it, the herbivores and carnivores currently living on
it, and the list of its passable neighbours.

 */
pub mod landscape;

/**
## 2.3 Island

The island is the whole grid. Its border is water, and nothing ever lives in
water.

 */
pub mod island;

/**
## 2.4 State

Island, parameters and the random number generator, together with the number
of years simulated so far, make up the complete state of a simulation.

 */
#[derive(Debug, Clone)]
pub struct State {
    /// The patches with everything living on them
    island: island::Island,
    /// The parameters of the model, fixed for the whole run
    p: parameters::Parameters,
    /// The single source of randomness
    rng: ChaCha8Rng,
    /// Years simulated since the start
    pub year: Years,
}

/**
# 3. Process overview and scheduling

The model progresses in discrete steps of one year. A year consists of two
parts.

First, every patch goes through its yearly cycle of regrowth, feeding,
hunting, reproduction, aging, weight loss and death. Patches do not interact
during this part, and they are handled one after the other in the order of
their locations, row by row.

Then, animals migrate: each animal may move to a neighbouring patch, at most
once per year. This concludes a time step.

 */
impl State {
    /**
    Set up an empty island from its map. All randomness of the simulation
    derives from `seed`.
     */
    pub fn new(map: &str, p: parameters::Parameters, seed: u64) -> Result<State, ConfigError> {
        Ok(State {
            island: island::Island::from_map(map)?,
            p,
            rng: ChaCha8Rng::seed_from_u64(seed),
            year: 0,
        })
    }

    pub fn add_population(
        &mut self,
        population: &[island::PopulationEntry],
    ) -> Result<(), ConfigError> {
        self.island
            .add_population(population, &self.p, &mut self.rng)?;
        info!(
            herbivores = self.island.count(animal::Species::Herbivore),
            carnivores = self.island.count(animal::Species::Carnivore),
            "Population added"
        );
        Ok(())
    }

    pub fn step(&mut self) {
        self.island.annual_cycle(&self.p, &mut self.rng);
        self.year += 1;
        debug!(
            year = self.year,
            herbivores = self.island.count(animal::Species::Herbivore),
            carnivores = self.island.count(animal::Species::Carnivore),
            "Year simulated"
        );
    }

    /**
    Simulate `years` more years, reporting as configured in `o`. Only
    setting up or writing the count log can fail.
     */
    pub fn run(&mut self, years: Years, o: &observation::Settings) -> Result<(), ConfigError> {
        let mut count_log = match &o.count_log {
            None => None,
            Some(path) => Some(observation::CountLog::new(std::io::BufWriter::new(
                std::fs::File::create(path)?,
            ))?),
        };
        let end = self.year.saturating_add(years);
        info!("Simulating until year {}", end);
        while self.year < end {
            let alive_before = self.num_animals();
            self.step();
            if let Some(log) = count_log.as_mut() {
                log.record(self.year, &self.island)?;
            }
            if (o.log_every > 0) && (self.year % o.log_every == 0) {
                observation::log_population(self.year, &self.island);
            }
            if alive_before > 0 && self.num_animals() == 0 {
                info!("Died out in year {}", self.year);
            }
        }
        if let Some(log) = count_log {
            log.into_inner().flush()?;
        }
        info!("Ended");
        Ok(())
    }

    pub fn year(&self) -> Years {
        self.year
    }

    pub fn num_animals(&self) -> usize {
        animal::Species::ALL
            .iter()
            .map(|s| self.island.count(*s))
            .sum()
    }

    pub fn num_animals_per_species(&self) -> BTreeMap<animal::Species, usize> {
        animal::Species::ALL
            .iter()
            .map(|s| (*s, self.island.count(*s)))
            .collect()
    }

    pub fn island(&self) -> &island::Island {
        &self.island
    }

    pub fn parameters(&self) -> &parameters::Parameters {
        &self.p
    }
}

/**
# 4. Design concepts

Under the ODD protocol, the design principles largely fall into questions.
Where an answer is an invariant of the simulation, a test in `tests.rs` or in
the module implementing it checks it.

## 4.1 Basic principles

Individuals are described by a single summary of their condition, fitness,
and every decision they take is a random draw weighted by that fitness. The
fitter an animal, the more likely it is to reproduce and to wander off, the
less likely to die and, for prey, the less likely to be caught.

## 4.2 Emergence

Population sizes, their oscillation and the spatial spread of both species
emerge from the individual rules. Nothing in the model constrains them
directly, apart from the fodder capacity of the terrain.

## 4.3 Adaptation, objectives, learning, prediction

Animals do not adapt, learn or predict. They do not choose where to migrate:
every passable neighbour is equally likely.

## 4.4 Sensing

Herbivores sense how much fodder is left in their patch. Carnivores sense the
fitness of all herbivores in their patch, and go for the weakest first.

## 4.5 Interaction

Herbivores of a patch compete for fodder, in random order. Carnivores of a
patch compete for herbivores, in random order. Reproduction depends on the
number of conspecifics in the same patch.

## 4.6 Stochasticity

All randomness comes from one generator, seeded once when the state is set
up. Given the same map, population, parameters and seed, a simulation
reproduces the exact same history.

## 4.7 Observation

The model can report a population summary per species every few years, and
write the number of animals of each species after every year to a file.

 */
pub mod observation;

/**
# 5. Initialization

A simulation starts from an island map and an empty island. Animals are
placed on it in batches, each animal with a species, an age and optionally a
weight; animals without weight get a random birth weight. A batch that places
anything in the water, off the map, or names an unknown species is rejected
as a whole.

# 6. Input Data

The island map is a text file, one line per row of patches, one letter per
patch. Population batches and parameter overrides are read from JSON files
by the `simulation` binary.

# 7. Submodels

The yearly cycle of a patch is described in [`landscape`], the rules for
individual animals in [`animal`], and migration in [`island`]. All constants
live in [`parameters`].

 */
pub mod parameters;
