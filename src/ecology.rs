use serde_derive::{Deserialize, Serialize};
use std::str::FromStr;

/**
Fodder is a number with units: the amount of plant food in a patch, or the
amount of food an animal takes in during one year.
*/
#[derive(Default, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fodder {
    f: f64,
}

impl Fodder {
    pub const ZERO: Fodder = Fodder { f: 0.0 };

    /// Strip the unit again.
    pub fn amount(self) -> f64 {
        self.f
    }
}

/**
We need comparability (`std::cmp::min` on remaining fodder and intake caps),
so we cheat this implementation and treat NaN as equal to everything.
 */
impl PartialEq for Fodder {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}
impl Eq for Fodder {}
impl PartialOrd for Fodder {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Fodder {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.f.partial_cmp(&other.f) {
            None => std::cmp::Ordering::Equal,
            Some(c) => c,
        }
    }
}

/**
Attach the unit to a number
*/
impl From<f64> for Fodder {
    fn from(f: f64) -> Self {
        Fodder { f }
    }
}

/**
Amounts of fodder can be added, and subtracted
 */
impl std::ops::Sub for Fodder {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Fodder { f: self.f - other.f }
    }
}
impl std::ops::SubAssign for Fodder {
    fn sub_assign(&mut self, other: Self) {
        self.f -= other.f
    }
}
impl std::ops::Add for Fodder {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Fodder { f: self.f + other.f }
    }
}
impl std::ops::AddAssign for Fodder {
    fn add_assign(&mut self, other: Self) {
        self.f += other.f
    }
}
impl std::iter::Sum for Fodder {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        Fodder {
            f: iter.map(|o| o.f).sum(),
        }
    }
}

impl std::fmt::Debug for Fodder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} fodder", self.f)
    }
}

/**
The kinds of terrain a patch can have. Each kind is written as a single
letter in the island map.

Water is the only impassable terrain: it never holds animals, never grows
fodder and is never entered during migration. Desert is passable, but grows
no fodder by default, so only carnivores find food there.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Terrain {
    pub const ALL: [Terrain; 4] = [
        Terrain::Water,
        Terrain::Lowland,
        Terrain::Highland,
        Terrain::Desert,
    ];

    pub fn from_code(code: char) -> Option<Terrain> {
        match code {
            'W' => Some(Terrain::Water),
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'D' => Some(Terrain::Desert),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
        }
    }

    pub fn is_passable(self) -> bool {
        self != Terrain::Water
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Water => "Water",
            Terrain::Lowland => "Lowland",
            Terrain::Highland => "Highland",
            Terrain::Desert => "Desert",
        }
    }
}

/**
Terrain names are accepted in any capitalization, and also as their map code.
 */
impl FromStr for Terrain {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(t) = Terrain::from_code(c) {
                return Ok(t);
            }
        }
        Terrain::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::error::ConfigError::UnknownTerrainName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fodder_is_ordered_for_min() {
        let remaining = Fodder::from(7.5);
        let cap = Fodder::from(10.);
        assert_eq!(std::cmp::min(remaining, cap), remaining);
        assert_eq!((cap - remaining).amount(), 2.5);
    }

    #[test]
    fn terrain_codes_round_trip_through_names() {
        for t in Terrain::ALL.iter() {
            assert_eq!(Terrain::from_code(t.code()), Some(*t));
            assert_eq!(t.name().to_lowercase().parse::<Terrain>().unwrap(), *t);
        }
        assert!("Swamp".parse::<Terrain>().is_err());
        assert_eq!(Terrain::from_code('X'), None);
    }

    #[test]
    fn only_water_is_impassable() {
        assert!(!Terrain::Water.is_passable());
        assert!(Terrain::Desert.is_passable());
        assert!(Terrain::Lowland.is_passable());
        assert!(Terrain::Highland.is_passable());
    }
}
