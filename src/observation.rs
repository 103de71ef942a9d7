/*!
What a running simulation reports about itself.

Two channels exist. A population summary goes to the log every `log_every`
years, and a count log records the number of animals of each species after
every year in CSV form, for plotting elsewhere.
 */

use crate::animal::{Animal, Species};
use crate::island::Island;
use itertools::Itertools;
use serde_derive::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Period of population logging, in years. 0 turns it off.
    pub log_every: u32,
    /// File to write the yearly counts to
    pub count_log: Option<String>,
}

/// Headcount and averages for the animals of one species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub species: Species,
    pub count: usize,
    pub mean_age: f64,
    pub mean_weight: f64,
    pub mean_fitness: f64,
}

impl Summary {
    /// Averages of an empty population are reported as 0.
    pub fn of<'a, I>(species: Species, animals: I) -> Summary
    where
        I: IntoIterator<Item = &'a Animal>,
    {
        let (count, age, weight, fitness) = animals.into_iter().fold(
            (0usize, 0., 0., 0.),
            |(n, age, weight, fitness), a| {
                (
                    n + 1,
                    age + a.age() as f64,
                    weight + a.weight(),
                    fitness + a.fitness(),
                )
            },
        );
        let mean = |total: f64| if count == 0 { 0. } else { total / count as f64 };
        Summary {
            species,
            count,
            mean_age: mean(age),
            mean_weight: mean(weight),
            mean_fitness: mean(fitness),
        }
    }

    pub fn of_island(species: Species, island: &Island) -> Summary {
        Summary::of(species, island.animals(species))
    }
}

pub fn log_population(year: u32, island: &Island) {
    for species in Species::ALL.iter().copied() {
        let s = Summary::of_island(species, island);
        info!(
            year,
            species = species.name(),
            count = s.count,
            mean_age = s.mean_age,
            mean_weight = s.mean_weight,
            mean_fitness = s.mean_fitness,
            "POPULATION"
        );
    }
}

/**
Yearly animal counts, one CSV row per year:

```rust
# use model::observation::CountLog;
# use model::island::Island;
let island = Island::from_map("WWW\nWLW\nWWW").unwrap();
let mut log = CountLog::new(Vec::new()).unwrap();
log.record(0, &island).unwrap();
let text = String::from_utf8(log.into_inner()).unwrap();
assert_eq!(text, "year,herbivores,carnivores\n0,0,0\n");
```
 */
pub struct CountLog<W: Write> {
    out: W,
}

impl<W: Write> CountLog<W> {
    pub fn new(mut out: W) -> std::io::Result<CountLog<W>> {
        writeln!(
            out,
            "year,{}",
            Species::ALL
                .iter()
                .map(|s| s.name().to_lowercase() + "s")
                .join(",")
        )?;
        Ok(CountLog { out })
    }

    pub fn record(&mut self, year: u32, island: &Island) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{},{}",
            year,
            Species::ALL.iter().map(|s| island.count(*s)).join(",")
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
