use model::cli::{parse_args, Inputs, OverrideTable};
use model::island::PopulationEntry;
use model::observation::Settings;
use model::parameters::Parameters;
use model::State;
use std::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return Err(format!("{}: {}", path, e)),
    };
    match serde_json::from_str(&contents) {
        Ok(c) => Ok(c),
        Err(e) => Err(format!("{}: {}", path, e)),
    }
}

fn main() -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())?;

    let mut inputs = Inputs::default();
    let mut o = Settings {
        log_every: 10,
        count_log: None,
    };
    {
        let parser = parse_args(&mut inputs, &mut o);
        parser.parse_args_or_exit();
    }

    let mut p = Parameters::default();
    if let Some(path) = &inputs.parameters {
        let table: OverrideTable = read_json(path)?;
        p = p.with_overrides(&table).map_err(|e| e.to_string())?;
    }
    p = p
        .with_overrides(&inputs.overrides)
        .map_err(|e| e.to_string())?;

    let map = match fs::read_to_string(&inputs.map) {
        Ok(m) => m,
        Err(e) => return Err(format!("{}: {}", inputs.map, e)),
    };
    let mut s = State::new(&map, p, inputs.seed).map_err(|e| e.to_string())?;
    if let Some(path) = &inputs.population {
        let population: Vec<PopulationEntry> = read_json(path)?;
        s.add_population(&population).map_err(|e| e.to_string())?;
    }

    s.run(inputs.years, &o).map_err(|e| e.to_string())?;
    for (species, n) in s.num_animals_per_species() {
        info!("{} {}: {}", s.year(), species.name(), n);
    }
    Ok(())
}
