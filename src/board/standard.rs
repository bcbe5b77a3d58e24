//! The standard 1901 starting position.
//!
//! Supply-centre ownership and starting units are read from JSON records
//! keyed by region code. The initial owners double as the home centres used
//! to validate builds.

use std::collections::HashSet;

use serde::Deserialize;

use super::location::{BoardKey, Phase, RegionId};
use super::map::RegionMap;
use super::state::{Board, Centre, World};
use super::unit::{Nation, Unit, UnitType};

const STANDARD_CENTRES: &str = include_str!("../../data/centres.json");
const STANDARD_UNITS: &str = include_str!("../../data/units.json");

/// Errors raised while loading the starting position.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("malformed world data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown region {0}")]
    UnknownRegion(String),
    #[error("centre {0} is listed twice")]
    DuplicateCentre(String),
    #[error("two units start in {0}")]
    DuplicateUnit(String),
    #[error("unit in {0} does not start on a supply centre")]
    UnitOffCentre(String),
}

#[derive(Debug, Deserialize)]
struct CentreRecord {
    #[serde(rename = "regionId")]
    region_id: String,
    owner: Option<Nation>,
}

#[derive(Debug, Deserialize)]
struct UnitRecord {
    #[serde(rename = "regionId")]
    region_id: String,
    owner: Nation,
    #[serde(rename = "type")]
    unit_type: UnitType,
}

/// Builds fresh worlds and answers home-centre questions.
#[derive(Debug, Clone)]
pub struct WorldFactory {
    centres: Vec<Centre>,
    units: Vec<(RegionId, Nation, UnitType)>,
}

impl WorldFactory {
    pub const START_TIMELINE: i32 = 1;
    pub const START_YEAR: i32 = 1901;

    /// Loads the standard starting position for `map`.
    pub fn standard(map: &RegionMap) -> Result<Self, WorldError> {
        Self::from_json(map, STANDARD_CENTRES, STANDARD_UNITS)
    }

    pub fn from_json(map: &RegionMap, centres: &str, units: &str) -> Result<Self, WorldError> {
        let centre_records: Vec<CentreRecord> = serde_json::from_str(centres)?;
        let unit_records: Vec<UnitRecord> = serde_json::from_str(units)?;
        let lookup = |code: &str| map.lookup(code).ok_or_else(|| WorldError::UnknownRegion(code.to_string()));

        let mut seen = HashSet::new();
        let mut centres = Vec::with_capacity(centre_records.len());
        for record in &centre_records {
            let region = lookup(&record.region_id)?;
            if !seen.insert(region) {
                return Err(WorldError::DuplicateCentre(record.region_id.clone()));
            }
            centres.push(Centre {
                region,
                owner: record.owner,
            });
        }

        let mut occupied = HashSet::new();
        let mut units = Vec::with_capacity(unit_records.len());
        for record in &unit_records {
            let region = lookup(&record.region_id)?;
            if !occupied.insert(map.parent_or_self(region)) {
                return Err(WorldError::DuplicateUnit(record.region_id.clone()));
            }
            if !seen.contains(&map.parent_or_self(region)) {
                return Err(WorldError::UnitOffCentre(record.region_id.clone()));
            }
            units.push((region, record.owner, record.unit_type));
        }

        Ok(WorldFactory { centres, units })
    }

    /// The key of the first board of a new game.
    pub const fn start_key() -> BoardKey {
        BoardKey::new(Self::START_TIMELINE, Self::START_YEAR, Phase::Spring)
    }

    /// A world holding the starting board with its centres but no units.
    pub fn empty_world(&self) -> World {
        let mut world = World::new();
        world.boards.push(Board::new(Self::start_key(), self.centres.clone()));
        world
    }

    /// The standard starting position.
    pub fn default_world(&self) -> World {
        let mut world = self.empty_world();
        let key = Self::start_key();
        for &(region, owner, unit_type) in &self.units {
            // The starting board exists, so placement always succeeds.
            let _ = world.place_unit(Unit::new(owner, unit_type, key.location(region)));
        }
        world
    }

    /// The nation that owns `region` at the start of the game.
    pub fn home_nation(&self, region: RegionId) -> Option<Nation> {
        self.centres.iter().find(|c| c.region == region).and_then(|c| c.owner)
    }

    pub fn is_home_centre(&self, nation: Nation, region: RegionId) -> bool {
        self.home_nation(region) == Some(nation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> (RegionMap, WorldFactory) {
        let map = RegionMap::standard().unwrap();
        let factory = WorldFactory::standard(&map).unwrap();
        (map, factory)
    }

    #[test]
    fn default_world_has_opening_position() {
        let (map, factory) = factory();
        let world = factory.default_world();
        assert_eq!(world.boards.len(), 1);
        assert_eq!(world.units.len(), 22);
        assert_eq!(world.boards[0].centres.len(), 34);

        let stp_s = WorldFactory::start_key().location(map.lookup("Stp_S").unwrap());
        let fleet = world.unit_at(stp_s).map(|id| *world.unit(id)).unwrap();
        assert_eq!(fleet.owner, Nation::Russia);
        assert!(fleet.is_fleet());
    }

    #[test]
    fn home_centres_follow_initial_owners() {
        let (map, factory) = factory();
        let lon = map.lookup("Lon").unwrap();
        let bel = map.lookup("Bel").unwrap();
        assert!(factory.is_home_centre(Nation::England, lon));
        assert!(!factory.is_home_centre(Nation::France, lon));
        assert_eq!(factory.home_nation(bel), None);
    }

    #[test]
    fn rejects_unit_off_centre() {
        let (map, _) = factory();
        let err = WorldFactory::from_json(
            &map,
            r#"[{"regionId": "Lon", "owner": "England"}]"#,
            r#"[{"regionId": "Yor", "owner": "England", "type": "Army"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::UnitOffCentre(code) if code == "Yor"));
    }

    #[test]
    fn rejects_duplicate_units() {
        let (map, _) = factory();
        let err = WorldFactory::from_json(
            &map,
            r#"[{"regionId": "Stp", "owner": "Russia"}]"#,
            r#"[{"regionId": "Stp_S", "owner": "Russia", "type": "Fleet"},
                {"regionId": "Stp", "owner": "Russia", "type": "Army"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, WorldError::DuplicateUnit(_)));
    }
}
