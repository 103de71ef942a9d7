/*!
A single patch of the island and the yearly life cycle that happens inside it.

Every phase is a separate public method so the cycle can be inspected step by
step. [`Patch::annual_cycle`] runs them in the fixed order:

1. fodder regrowth
2. herbivores feed
3. carnivores hunt
4. both species reproduce
5. everybody ages
6. everybody loses weight
7. some die

Lists are never mutated while being walked: phases first mark animals dead,
then rebuild the list from the survivors.
 */

use crate::animal::{Animal, Species};
use crate::ecology::{Fodder, Terrain};
use crate::island::Location;
use crate::parameters::{Parameters, SpeciesParameters};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::{min, Ordering};
use tracing::trace;

#[derive(Clone)]
pub struct Patch {
    pub(crate) terrain: Terrain,
    /// Fodder currently available to herbivores
    pub(crate) fodder: Fodder,
    pub(crate) herbivores: Vec<Animal>,
    pub(crate) carnivores: Vec<Animal>,
    /// Passable patches one cardinal step away. Filled in once, when the
    /// island is built.
    pub(crate) neighbours: Vec<Location>,
}

impl Patch {
    pub fn new(terrain: Terrain) -> Patch {
        Patch {
            terrain,
            fodder: Fodder::ZERO,
            herbivores: vec![],
            carnivores: vec![],
            neighbours: vec![],
        }
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }
    pub fn fodder(&self) -> Fodder {
        self.fodder
    }
    pub fn neighbours(&self) -> &[Location] {
        &self.neighbours
    }
    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }
    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub(crate) fn animals_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.animals(species).len()
    }

    pub(crate) fn add(&mut self, animal: Animal) {
        self.animals_mut(animal.species()).push(animal);
    }

    /// Run one year of local life. Water does nothing.
    pub fn annual_cycle<R: Rng + ?Sized>(&mut self, p: &Parameters, rng: &mut R) {
        if !self.terrain.is_passable() {
            return;
        }
        self.regrow(p);
        self.feed_herbivores(&p.herbivore, rng);
        self.feed_carnivores(&p.carnivore, rng);
        self.reproduce(p, rng);
        self.age(p);
        self.lose_weight(p);
        self.die(p, rng);
    }

    /**
    Fodder grows back to the capacity of the terrain every year, regardless of
    how much was left.
     */
    pub fn regrow(&mut self, p: &Parameters) {
        self.fodder = p.f_max(self.terrain);
    }

    /**
    Herbivores eat in random order, each taking as much as it can (up to `F`)
    from what is left, until the fodder runs out.
     */
    pub fn feed_herbivores<R: Rng + ?Sized>(&mut self, p: &SpeciesParameters, rng: &mut R) {
        self.herbivores.shuffle(rng);
        for herbivore in self.herbivores.iter_mut() {
            if self.fodder <= Fodder::ZERO {
                break;
            }
            let portion = min(self.fodder, p.f);
            herbivore.gain_weight(portion.amount(), p);
            self.fodder -= portion;
        }
    }

    /**
    Carnivores hunt in random order. Each one tries the herbivores from the
    weakest to the fittest, skipping those already killed this year, until it
    has eaten `F`. The last kill may be eaten only partially. Carcasses are
    removed once every carnivore has hunted.
     */
    pub fn feed_carnivores<R: Rng + ?Sized>(&mut self, p: &SpeciesParameters, rng: &mut R) {
        if self.carnivores.is_empty() || self.herbivores.is_empty() {
            return;
        }
        self.carnivores.shuffle(rng);
        let herbivores = &mut self.herbivores;
        let ranking: Vec<usize> = (0..herbivores.len())
            .sorted_by(|&a, &b| {
                herbivores[a]
                    .fitness()
                    .partial_cmp(&herbivores[b].fitness())
                    .unwrap_or(Ordering::Equal)
            })
            .collect();

        for hunter in self.carnivores.iter_mut() {
            let mut eaten = Fodder::ZERO;
            for &i in ranking.iter() {
                if eaten >= p.f {
                    break;
                }
                let prey = &mut herbivores[i];
                if prey.is_dead() {
                    continue;
                }
                if rng.gen::<f64>() < hunter.kill_probability(prey, p) {
                    prey.mark_dead();
                    let meal = min(Fodder::from(prey.weight()), p.f - eaten);
                    eaten += meal;
                    hunter.gain_weight(meal.amount(), p);
                }
            }
            trace!("carnivore ate {:?}", eaten);
        }
        herbivores.retain(|h| !h.is_dead());
    }

    /**
    Every animal in a species with at least two members present tries to give
    birth. All try against the head count at the start of the phase, and
    newborns only join the patch afterwards.
     */
    pub fn reproduce<R: Rng + ?Sized>(&mut self, p: &Parameters, rng: &mut R) {
        for species in Species::ALL.iter().copied() {
            let sp = p.species(species);
            let animals = self.animals_mut(species);
            let n = animals.len();
            if n < 2 {
                continue;
            }
            let newborns: Vec<Animal> = animals
                .iter_mut()
                .filter_map(|mother| mother.attempt_birth(n, sp, rng))
                .collect();
            animals.extend(newborns);
        }
    }

    pub fn age(&mut self, p: &Parameters) {
        for species in Species::ALL.iter().copied() {
            let sp = p.species(species);
            for animal in self.animals_mut(species).iter_mut() {
                animal.age_one_year(sp);
            }
        }
    }

    pub fn lose_weight(&mut self, p: &Parameters) {
        for species in Species::ALL.iter().copied() {
            let sp = p.species(species);
            for animal in self.animals_mut(species).iter_mut() {
                animal.lose_weight_annual(sp);
            }
        }
    }

    pub fn die<R: Rng + ?Sized>(&mut self, p: &Parameters, rng: &mut R) {
        for species in Species::ALL.iter().copied() {
            let sp = p.species(species);
            let animals = self.animals_mut(species);
            for animal in animals.iter_mut() {
                animal.decide_death(sp, rng);
            }
            animals.retain(|a| !a.is_dead());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    fn lowland_with(p: &Parameters, herbivores: &[(u32, f64)], carnivores: &[(u32, f64)]) -> Patch {
        let mut patch = Patch::new(Terrain::Lowland);
        for &(age, weight) in herbivores {
            patch.add(Animal::new(Species::Herbivore, age, weight, &p.herbivore));
        }
        for &(age, weight) in carnivores {
            patch.add(Animal::new(Species::Carnivore, age, weight, &p.carnivore));
        }
        patch
    }

    #[test]
    fn test_regrow() {
        let p = Parameters::default();
        let mut patch = Patch::new(Terrain::Lowland);
        patch.regrow(&p);
        assert_eq!(patch.fodder(), Fodder::from(800.));
        let mut water = Patch::new(Terrain::Water);
        water.regrow(&p);
        assert_eq!(water.fodder(), Fodder::ZERO);
    }

    #[test]
    fn test_three_herbivores_eat_thirty() {
        let p = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut patch = lowland_with(&p, &[(10, 12.5), (9, 10.3), (5, 8.1)], &[]);
        patch.regrow(&p);
        patch.feed_herbivores(&p.herbivore, &mut rng);
        assert_eq!(patch.fodder(), Fodder::from(770.));
        let total: f64 = patch.herbivores().iter().map(|h| h.weight()).sum();
        assert_relative_eq!(total, 12.5 + 10.3 + 8.1 + 3. * 0.9 * 10.);
    }

    #[test]
    fn test_feeding_never_eats_more_than_capacity() {
        let p = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let herd: Vec<(u32, f64)> = (0..100).map(|i| (i % 10, 10.)).collect();
        let mut patch = Patch::new(Terrain::Highland);
        for &(age, weight) in herd.iter() {
            patch.add(Animal::new(Species::Herbivore, age, weight, &p.herbivore));
        }
        patch.regrow(&p);
        patch.feed_herbivores(&p.herbivore, &mut rng);
        assert_eq!(patch.fodder(), Fodder::ZERO);
        let fed = patch
            .herbivores()
            .iter()
            .filter(|h| h.weight() > 10.)
            .count();
        // 300 fodder feeds 30 herbivores
        assert_eq!(fed, 30);
    }

    #[test]
    fn test_no_fodder_no_gain() {
        let p = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut patch = lowland_with(&p, &[(10, 12.5)], &[]);
        patch.feed_herbivores(&p.herbivore, &mut rng);
        assert_eq!(patch.herbivores()[0].weight(), 12.5);
    }

    #[test]
    fn test_predation_respects_appetite() {
        let mut overrides = BTreeMap::new();
        overrides.insert("DeltaPhiMax".to_string(), 0.01);
        let p = Parameters::default()
            .with_species_parameters(Species::Carnivore, &overrides)
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let old_weak_herd = [(100, 40.); 5];
        let mut patch = lowland_with(&p, &old_weak_herd, &[(5, 30.)]);

        patch.feed_carnivores(&p.carnivore, &mut rng);

        // F = 50: one whole herbivore of 40, then 10 of the next one
        assert_eq!(patch.herbivores().len(), 3);
        assert_relative_eq!(patch.carnivores()[0].weight(), 30. + 0.75 * 50.);
    }

    #[test]
    fn test_carcasses_are_eaten_once() {
        let mut overrides = BTreeMap::new();
        overrides.insert("DeltaPhiMax".to_string(), 0.01);
        let p = Parameters::default()
            .with_species_parameters(Species::Carnivore, &overrides)
            .unwrap();
        let old_weak_herd = [(100, 40.); 5];
        let mut patch = lowland_with(&p, &old_weak_herd, &[(5, 30.), (5, 30.)]);

        patch.feed_carnivores(&p.carnivore, &mut StepRng::new(0, 0));

        // each hunter eats one whole herbivore and 10 of a second one, so
        // four distinct kills out of five
        assert_eq!(patch.herbivores().len(), 1);
        let gains: Vec<f64> = patch.carnivores().iter().map(|c| c.weight() - 30.).collect();
        for &gain in gains.iter() {
            assert!(gain <= 0.75 * 50. + 1e-9);
        }
        assert_relative_eq!(gains.iter().sum::<f64>(), 0.75 * (40. + 10. + 40. + 10.));
    }

    #[test]
    fn test_predation_spares_fitter_prey() {
        let p = Parameters::default();
        let mut patch = lowland_with(&p, &[(5, 40.), (6, 35.)], &[(60, 3.)]);
        patch.feed_carnivores(&p.carnivore, &mut StepRng::new(0, 0));
        assert_eq!(patch.herbivores().len(), 2);
        assert_eq!(patch.carnivores()[0].weight(), 3.);
    }

    #[test]
    fn test_weakest_prey_goes_first() {
        let mut overrides = BTreeMap::new();
        overrides.insert("DeltaPhiMax".to_string(), 0.01);
        overrides.insert("F".to_string(), 5.);
        let p = Parameters::default()
            .with_species_parameters(Species::Carnivore, &overrides)
            .unwrap();
        let mut patch = lowland_with(&p, &[(5, 30.), (80, 30.), (10, 30.)], &[(5, 30.)]);
        patch.feed_carnivores(&p.carnivore, &mut ChaCha8Rng::seed_from_u64(5));
        let ages: Vec<u32> = patch.herbivores().iter().map(|h| h.age()).collect();
        assert_eq!(ages, vec![5, 10]);
    }

    #[test]
    fn test_lone_animals_do_not_reproduce() {
        let p = Parameters::default();
        let mut patch = lowland_with(&p, &[(5, 60.)], &[(5, 60.)]);
        patch.reproduce(&p, &mut StepRng::new(0, 0));
        assert_eq!(patch.count(Species::Herbivore), 1);
        assert_eq!(patch.count(Species::Carnivore), 1);
    }

    #[test]
    fn test_newborns_join_after_the_phase() {
        let mut overrides = BTreeMap::new();
        overrides.insert("gamma".to_string(), 10.);
        let p = Parameters::default()
            .with_species_parameters(Species::Herbivore, &overrides)
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut patch = lowland_with(&p, &[(5, 60.), (5, 60.)], &[]);
        patch.reproduce(&p, &mut rng);
        // both mothers are certain to give birth, and the newborns cannot
        // give birth in the same year
        assert_eq!(patch.count(Species::Herbivore), 4);
        let newborns = patch.herbivores().iter().filter(|h| h.age() == 0).count();
        assert_eq!(newborns, 2);
        assert!(patch.herbivores().iter().all(|h| h.weight() >= 0.));
    }

    #[test]
    fn test_aging_and_weight_loss() {
        let p = Parameters::default();
        let mut patch = lowland_with(&p, &[(10, 10.)], &[(10, 10.)]);
        patch.age(&p);
        patch.lose_weight(&p);
        assert_eq!(patch.herbivores()[0].age(), 11);
        assert_relative_eq!(patch.herbivores()[0].weight(), 9.5);
        assert_relative_eq!(patch.carnivores()[0].weight(), 8.75);
    }

    #[test]
    fn test_dead_are_removed() {
        let p = Parameters::default();
        let mut patch = lowland_with(&p, &[(10, 12.5), (9, 0.), (5, 8.1)], &[(3, 0.)]);
        patch.die(&p, &mut StepRng::new(u64::MAX, 0));
        assert_eq!(patch.count(Species::Herbivore), 2);
        assert_eq!(patch.count(Species::Carnivore), 0);
    }

    #[test]
    fn test_water_has_no_cycle() {
        let p = Parameters::default();
        let mut water = Patch::new(Terrain::Water);
        water.annual_cycle(&p, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(water.fodder(), Fodder::ZERO);
        assert_eq!(water.count(Species::Herbivore), 0);
    }

    #[test]
    fn test_full_cycle_keeps_invariants() {
        let p = Parameters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let herd: Vec<(u32, f64)> = (0..50).map(|i| (i % 8, 20.)).collect();
        let pack: Vec<(u32, f64)> = (0..10).map(|i| (i % 5, 25.)).collect();
        let mut patch = lowland_with(&p, &herd, &pack);
        for _ in 0..20 {
            patch.annual_cycle(&p, &mut rng);
            assert!(patch.fodder() <= Fodder::from(800.));
            for a in patch.herbivores().iter().chain(patch.carnivores()) {
                assert!(!a.is_dead());
                assert!(a.weight() > 0.);
                assert!((0.0..=1.0).contains(&a.fitness()));
            }
        }
    }
}
