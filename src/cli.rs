use crate::observation::Settings;
use crate::Years;
use argparse::action::Action::Single;
use argparse::action::ParseResult;
use argparse::action::ParseResult::{Error, Parsed};
use argparse::action::TypedAction;
use argparse::action::{Action, IArgAction};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Parameter overrides, by species or terrain name and then parameter name.
/// This is also the layout of a parameter file.
pub type OverrideTable = BTreeMap<String, BTreeMap<String, f64>>;

/**
Split an override of the form `OWNER.NAME=VALUE`.

```rust
# use model::cli::parse_override;
assert_eq!(
    parse_override("Carnivore.DeltaPhiMax=2.5"),
    Some(("Carnivore".to_string(), "DeltaPhiMax".to_string(), 2.5))
);
assert_eq!(parse_override("Lowland=2.5"), None);
```
 */
pub fn parse_override(arg: &str) -> Option<(String, String, f64)> {
    let (key, value) = arg.split_once('=')?;
    let (owner, name) = key.split_once('.')?;
    let value: f64 = value.trim().parse().ok()?;
    Some((owner.trim().to_string(), name.trim().to_string(), value))
}

pub struct StoreOverrideAction<'a> {
    pub cell: Rc<RefCell<&'a mut OverrideTable>>,
}

impl<'a> IArgAction for StoreOverrideAction<'a> {
    fn parse_arg(&self, arg: &str) -> ParseResult {
        match parse_override(arg) {
            Some((owner, name, value)) => {
                self.cell
                    .borrow_mut()
                    .entry(owner)
                    .or_default()
                    .insert(name, value);
                Parsed
            }
            None => Error(format!("Bad override {}, expected OWNER.NAME=VALUE", arg)),
        }
    }
}

struct StoreOverride;

impl TypedAction<OverrideTable> for StoreOverride {
    fn bind<'x>(&self, cell: Rc<RefCell<&'x mut OverrideTable>>) -> Action<'x> {
        Single(Box::new(StoreOverrideAction { cell }))
    }
}

/// Everything the `simulation` binary needs to know to set up a run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub map: String,
    pub population: Option<String>,
    pub parameters: Option<String>,
    pub overrides: OverrideTable,
    pub seed: u64,
    pub years: Years,
}

impl Default for Inputs {
    fn default() -> Self {
        Inputs {
            map: "island.txt".to_string(),
            population: None,
            parameters: None,
            overrides: OverrideTable::new(),
            seed: 1,
            years: 100,
        }
    }
}

pub fn parse_args<'a>(
    inputs: &'a mut Inputs,
    observation: &'a mut Settings,
) -> argparse::ArgumentParser<'a> {
    let mut parser = argparse::ArgumentParser::new();
    parser.set_description("Simulate herbivores and carnivores on an island");
    parser.refer(&mut inputs.map).add_option(
        &["--map"],
        argparse::Store,
        "text file with the island map, one terrain letter (W, L, H, D) per patch",
    );
    parser.refer(&mut inputs.population).add_option(
        &["--population"],
        argparse::StoreOption,
        "JSON file with the initial population",
    );
    parser.refer(&mut inputs.parameters).add_option(
        &["--parameters"],
        argparse::StoreOption,
        "JSON file with parameter overrides, by species or terrain name",
    );
    parser.refer(&mut inputs.overrides).add_option(
        &["--set"],
        StoreOverride,
        "override one parameter, as OWNER.NAME=VALUE, e.g. Herbivore.mu=0.3 or Lowland.f_max=700. Applied after the parameter file.",
    );
    parser.refer(&mut inputs.seed).add_option(
        &["--seed"],
        argparse::Store,
        "seed of the random number generator",
    );
    parser.refer(&mut inputs.years).add_option(
        &["--years"],
        argparse::Store,
        "number of years to simulate",
    );
    parser.refer(&mut observation.log_every).add_option(
        &["--log-every"],
        argparse::Store,
        "period of population logging, in years",
    );
    parser.refer(&mut observation.count_log).add_option(
        &["--count-log"],
        argparse::StoreOption,
        "CSV file to write the number of animals per species to, every year",
    );

    parser
}
