/*!
The island is a rectangular grid of patches, read from a text map with one
terrain code per cell. Rows and columns count from 1 at the top left corner,
and the outermost ring of cells must be water.

The island drives the yearly cycle: every patch first runs its local phases,
then one migration pass moves animals between neighbouring patches.
 */

use crate::animal::{birth_weight, Animal, Species};
use crate::ecology::{Fodder, Terrain};
use crate::error::ConfigError;
use crate::landscape::Patch;
use crate::parameters::Parameters;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// (row, column), both starting at 1.
pub type Location = (usize, usize);

/// North, east, south, west
const CARDINAL_STEPS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

#[derive(Clone)]
pub struct Island {
    /// Ordered by location, so iterating the map walks the island row by row.
    patches: BTreeMap<Location, Patch>,
    rows: usize,
    cols: usize,
}

/// One animal to be placed on the island. Without a weight, the animal gets
/// a random birth weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub species: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// A group of animals to be placed into the same patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub loc: Location,
    pub pop: Vec<AnimalRecord>,
}

impl Island {
    /**
    Build an island from its map. Leading and trailing whitespace of every
    line is ignored, and so are blank lines.

    ```rust
    # use model::island::Island;
    # use model::ecology::Terrain;
    let island = Island::from_map("
        WWWW
        WLHW
        WWWW
    ").unwrap();
    assert_eq!((island.rows(), island.cols()), (3, 4));
    assert_eq!(island.patch((2, 3)).unwrap().terrain(), Terrain::Highland);
    assert_eq!(island.patch((2, 2)).unwrap().neighbours(), &[(2, 3)]);
    ```
     */
    pub fn from_map(map: &str) -> Result<Island, ConfigError> {
        let lines: Vec<Vec<char>> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();
        let cols = match lines.first() {
            None => return Err(ConfigError::EmptyMap),
            Some(line) => line.len(),
        };
        let rows = lines.len();

        let mut patches = BTreeMap::new();
        for (r, line) in lines.iter().enumerate() {
            if line.len() != cols {
                return Err(ConfigError::RaggedMap {
                    row: r + 1,
                    expected: cols,
                    found: line.len(),
                });
            }
            for (c, &code) in line.iter().enumerate() {
                let location = (r + 1, c + 1);
                let terrain = Terrain::from_code(code)
                    .ok_or(ConfigError::UnknownTerrain { code, location })?;
                let on_border = r == 0 || c == 0 || r + 1 == rows || c + 1 == cols;
                if on_border && terrain.is_passable() {
                    return Err(ConfigError::OpenBorder { location });
                }
                patches.insert(location, Patch::new(terrain));
            }
        }

        let mut island = Island {
            patches,
            rows,
            cols,
        };
        island.link_neighbours();
        debug!(
            "Built an island of {}x{} cells, {} of them passable",
            rows,
            cols,
            island.passable_locations().count()
        );
        Ok(island)
    }

    fn passable_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.patches
            .iter()
            .filter(|(_, patch)| patch.terrain().is_passable())
            .map(|(location, _)| *location)
    }

    fn link_neighbours(&mut self) {
        let passable: BTreeSet<Location> = self.passable_locations().collect();
        for (&(r, c), patch) in self.patches.iter_mut() {
            patch.neighbours = CARDINAL_STEPS
                .iter()
                .map(|&(dr, dc)| ((r as isize + dr) as usize, (c as isize + dc) as usize))
                .filter(|location| passable.contains(location))
                .collect();
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn patch(&self, location: Location) -> Option<&Patch> {
        self.patches.get(&location)
    }

    /// All patches, row by row.
    pub fn patches(&self) -> impl Iterator<Item = (&Location, &Patch)> {
        self.patches.iter()
    }

    fn is_passable(&self, location: Location) -> bool {
        self.patches
            .get(&location)
            .map_or(false, |patch| patch.terrain().is_passable())
    }

    /**
    Place animals on the island. The whole batch is checked before anything
    is placed: an unknown species, a location off the map or in the water, or
    a weight that is not a non-negative number rejects all of it.
     */
    pub fn add_population<R: Rng + ?Sized>(
        &mut self,
        population: &[PopulationEntry],
        p: &Parameters,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        let mut checked = vec![];
        for entry in population {
            match self.patches.get(&entry.loc) {
                None => return Err(ConfigError::OutsideMap(entry.loc)),
                Some(patch) if !patch.terrain().is_passable() => {
                    return Err(ConfigError::Uninhabitable(entry.loc))
                }
                Some(_) => {}
            }
            for record in entry.pop.iter() {
                let species: Species = record.species.parse()?;
                if let Some(w) = record.weight {
                    if !w.is_finite() || w < 0. {
                        return Err(ConfigError::invalid(
                            "weight",
                            w,
                            "animals must have a non-negative weight",
                        ));
                    }
                }
                checked.push((entry.loc, species, record));
            }
        }

        let n = checked.len();
        for (location, species, record) in checked {
            let sp = p.species(species);
            let weight = match record.weight {
                Some(w) => w,
                None => birth_weight(sp, rng),
            };
            if let Some(patch) = self.patches.get_mut(&location) {
                patch.add(Animal::new(species, record.age, weight, sp));
            }
        }
        debug!("Placed {} animals on the island", n);
        Ok(())
    }

    /// One year: every patch runs its local cycle, then animals migrate.
    pub fn annual_cycle<R: Rng + ?Sized>(&mut self, p: &Parameters, rng: &mut R) {
        for patch in self.patches.values_mut() {
            patch.annual_cycle(p, rng);
        }
        self.migrate(p, rng);
    }

    /**
    Walk the patches row by row. Every animal that has not moved yet this
    year decides whether to leave, and a leaving animal picks one of its
    patch's neighbours at random. Animals that arrive somewhere are marked as
    migrated, so they stay put when their new patch's turn comes. An animal
    in a patch without any passable neighbour stays where it is.
     */
    pub fn migrate<R: Rng + ?Sized>(&mut self, p: &Parameters, rng: &mut R) {
        let locations: Vec<Location> = self.passable_locations().collect();
        let mut moved = 0;
        for location in locations {
            for species in Species::ALL.iter().copied() {
                let sp = p.species(species);
                let (animals, neighbours) = match self.patches.get_mut(&location) {
                    None => continue,
                    Some(patch) => (
                        std::mem::take(patch.animals_mut(species)),
                        patch.neighbours.clone(),
                    ),
                };

                let mut staying = Vec::with_capacity(animals.len());
                let mut leaving = vec![];
                for mut animal in animals {
                    if animal.decide_migrate(sp, rng) {
                        if let Some(&destination) = neighbours.choose(rng) {
                            if self.is_passable(destination) {
                                animal.set_migrated();
                                leaving.push((destination, animal));
                                continue;
                            }
                        }
                    }
                    staying.push(animal);
                }

                moved += leaving.len();
                if let Some(patch) = self.patches.get_mut(&location) {
                    *patch.animals_mut(species) = staying;
                }
                for (destination, animal) in leaving {
                    if let Some(patch) = self.patches.get_mut(&destination) {
                        patch.add(animal);
                    }
                }
            }
        }
        debug!("{} animals migrated", moved);
    }

    pub fn count(&self, species: Species) -> usize {
        self.patches.values().map(|patch| patch.count(species)).sum()
    }

    /// Number of animals of one species in every cell, indexed
    /// `[row - 1][col - 1]`.
    pub fn count_matrix(&self, species: Species) -> Vec<Vec<usize>> {
        let mut matrix = vec![vec![0; self.cols]; self.rows];
        for (&(r, c), patch) in self.patches.iter() {
            matrix[r - 1][c - 1] = patch.count(species);
        }
        matrix
    }

    /// Every animal of one species, row by row.
    pub fn animals(&self, species: Species) -> Vec<&Animal> {
        self.patches
            .values()
            .flat_map(|patch| patch.animals(species).iter())
            .collect()
    }

    pub fn total_fodder(&self) -> Fodder {
        self.patches.values().map(|patch| patch.fodder()).sum()
    }
}
