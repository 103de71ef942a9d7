use model::animal::Species;
use model::cli::OverrideTable;
use model::ecology::Terrain;
use model::island::PopulationEntry;
use model::parameters::Parameters;
use model::State;
use proptest::prelude::*;

const ROSSUMOYA: &str = "WWWWWWWWWWWWWWWWWWWWW
                         WWWWWWWWHWWWWLLLLLLLW
                         WHHHHHLLLLWWLLLLLLLWW
                         WHHHHHHHHHWWLLLLLLWWW
                         WHHHHHLLLLLLLLLLLLWWW
                         WHHHHHLLLDDLLLHLLLWWW
                         WHHLLLLLDDDLLLHHHHWWW
                         WWHHHHLLLDDLLLHWWWWWW
                         WHHHLLLLLDDLLLLLLLWWW
                         WHHHHLLLLDDLLLLWWWWWW
                         WWHHHHLLLLLLLLWWWWWWW
                         WWWHHHHLLLLLLLWWWWWWW
                         WWWWWWWWWWWWWWWWWWWWW";

const POPULATION: &str = r#"[
    {"loc": [6, 10], "pop": [
        {"species": "Herbivore", "age": 5, "weight": 20},
        {"species": "Herbivore", "age": 5, "weight": 20},
        {"species": "Herbivore", "age": 3},
        {"species": "herbivore", "weight": 15.5}
    ]},
    {"loc": [7, 12], "pop": [
        {"species": "Carnivore", "age": 5, "weight": 20}
    ]}
]"#;

fn start(seed: u64) -> State {
    let population: Vec<PopulationEntry> = serde_json::from_str(POPULATION).unwrap();
    let mut s = State::new(ROSSUMOYA, Parameters::default(), seed).unwrap();
    s.add_population(&population).unwrap();
    s
}

#[test]
fn population_file_format() {
    let population: Vec<PopulationEntry> = serde_json::from_str(POPULATION).unwrap();
    assert_eq!(population[0].loc, (6, 10));
    assert_eq!(population[0].pop[2].weight, None);
    assert_eq!(population[0].pop[3].age, 0);

    let s = start(1);
    assert_eq!(s.num_animals(), 5);
    let herbivores = s.island().count_matrix(Species::Herbivore);
    assert_eq!(herbivores[5][9], 4);
    assert_eq!(s.island().patch((6, 10)).unwrap().terrain(), Terrain::Desert);
}

#[test]
fn parameter_file_format() {
    let table: OverrideTable = serde_json::from_str(
        r#"{"Herbivore": {"F": 12.0, "mu": 0.3}, "Highland": {"f_max": 250}}"#,
    )
    .unwrap();
    let p = Parameters::default().with_overrides(&table).unwrap();
    assert_eq!(p.herbivore.f.amount(), 12.);
    assert_eq!(p.herbivore.mu, 0.3);
    assert_eq!(p.f_max(Terrain::Highland).amount(), 250.);

    let bad: OverrideTable =
        serde_json::from_str(r#"{"Herbivore": {"DeltaPhiMax": 1.0}}"#).unwrap();
    assert!(Parameters::default().with_overrides(&bad).is_err());
}

#[test]
fn fifty_years_on_rossumoya() {
    let mut s = start(2024);
    let herd: Vec<PopulationEntry> = serde_json::from_str(
        r#"[{"loc": [3, 8], "pop": [{"species": "Herbivore", "age": 5, "weight": 20}]}]"#,
    )
    .unwrap();
    for _ in 0..30 {
        s.add_population(&herd).unwrap();
    }
    assert_eq!(s.num_animals_per_species()[&Species::Herbivore], 34);

    for _ in 0..50 {
        s.step();
    }
    assert_eq!(s.year(), 50);
    // the herbivores spread out from the lowlands they started in
    let occupied = s
        .island()
        .count_matrix(Species::Herbivore)
        .iter()
        .flatten()
        .filter(|&&n| n > 0)
        .count();
    assert!(occupied > 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn histories_depend_only_on_the_seed(seed in any::<u64>()) {
        let mut a = start(seed);
        let mut b = start(seed);
        for _ in 0..10 {
            a.step();
            b.step();
            prop_assert_eq!(a.num_animals_per_species(), b.num_animals_per_species());
        }
        for species in Species::ALL.iter().copied() {
            prop_assert_eq!(
                a.island().count_matrix(species),
                b.island().count_matrix(species)
            );
        }
    }

    #[test]
    fn animals_stay_on_land(seed in any::<u64>()) {
        let mut s = start(seed);
        for _ in 0..10 {
            s.step();
            for (_, patch) in s.island().patches() {
                if patch.terrain() == Terrain::Water {
                    prop_assert_eq!(patch.herbivores().len() + patch.carnivores().len(), 0);
                }
                for a in patch.herbivores().iter().chain(patch.carnivores()) {
                    prop_assert!(a.weight() > 0.);
                    prop_assert!(a.fitness() > 0. && a.fitness() <= 1.);
                }
            }
        }
    }
}
