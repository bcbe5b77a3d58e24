//! The region graph shared by every board.
//!
//! Regions and connections are loaded once from JSON records and validated
//! before any game can start. Multi-coast provinces are modelled as a land
//! parent region with one coast child per coastline.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::location::RegionId;
use super::unit::UnitType;

const STANDARD_REGIONS: &str = include_str!("../../data/regions.json");
const STANDARD_CONNECTIONS: &str = include_str!("../../data/connections.json");

/// Errors raised while loading map data. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("malformed map data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("too many regions ({0})")]
    TooManyRegions(usize),
    #[error("duplicate region id {0}")]
    DuplicateRegionId(String),
    #[error("duplicate region name {0}")]
    DuplicateRegionName(String),
    #[error("region {region} has unknown parent {parent}")]
    UnknownParent { region: String, parent: String },
    #[error("region {region} has parent {parent} which itself has a parent")]
    NestedParent { region: String, parent: String },
    #[error("connection id {0} is not of the form A-B")]
    MalformedConnectionId(String),
    #[error("connection {connection} references unknown region {region}")]
    UnknownRegion { connection: String, region: String },
    #[error("duplicate connection {0}")]
    DuplicateConnection(String),
    #[error("connection {0} loops back to its own region")]
    LoopConnection(String),
    #[error("connection {0} mirrors an existing connection")]
    MirroredConnection(String),
    #[error("sea connection {0} touches neither a sea nor a coast")]
    SeaConnectionOnLand(String),
    #[error("connection {0} allows both unit types but joins a non-coastal region")]
    BothConnectionNotCoastal(String),
    #[error("land connection {0} touches a sea or a coast-only region")]
    LandConnectionAtSea(String),
    #[error("region {0} has no connections")]
    Unconnected(String),
    #[error("land region {0} has a non-land connection")]
    LandWithNonLandConnection(String),
    #[error("sea region {0} has a non-sea connection")]
    SeaWithNonSeaConnection(String),
    #[error("coast region {0} has no sea connection")]
    CoastWithoutSeaConnection(String),
}

/// What kind of terrain a region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum RegionType {
    Land,
    Sea,
    Coast,
}

/// Which unit types may cross a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ConnectionType {
    /// Armies only.
    Land,
    /// Fleets only.
    Sea,
    /// Coast to coast, usable by both armies and fleets.
    Both,
}

impl ConnectionType {
    /// Returns true if a unit of the given type may use this connection.
    pub const fn allows(self, unit_type: UnitType) -> bool {
        match unit_type {
            UnitType::Army => !matches!(self, ConnectionType::Sea),
            UnitType::Fleet => !matches!(self, ConnectionType::Land),
        }
    }
}

/// A node of the region graph.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub code: String,
    pub name: String,
    pub region_type: RegionType,
    pub parent: Option<RegionId>,
    pub children: Vec<RegionId>,
    pub connections: Vec<(RegionId, ConnectionType)>,
}

#[derive(Debug, Deserialize)]
struct RegionRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    region_type: RegionType,
    #[serde(rename = "parentId", default)]
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionRecord {
    id: String,
    #[serde(rename = "type")]
    connection_type: ConnectionType,
}

/// The immutable region graph.
#[derive(Debug, Clone)]
pub struct RegionMap {
    regions: Vec<Region>,
    by_code: HashMap<String, RegionId>,
}

impl RegionMap {
    /// Loads the standard 1901 map bundled with the crate.
    pub fn standard() -> Result<Self, MapError> {
        Self::from_json(STANDARD_REGIONS, STANDARD_CONNECTIONS)
    }

    /// Parses and validates region and connection records.
    pub fn from_json(regions: &str, connections: &str) -> Result<Self, MapError> {
        let regions: Vec<RegionRecord> = serde_json::from_str(regions)?;
        let connections: Vec<ConnectionRecord> = serde_json::from_str(connections)?;
        Self::build(regions, connections)
    }

    fn build(records: Vec<RegionRecord>, connections: Vec<ConnectionRecord>) -> Result<Self, MapError> {
        if records.len() > u16::MAX as usize {
            return Err(MapError::TooManyRegions(records.len()));
        }

        let mut by_code = HashMap::with_capacity(records.len());
        let mut names = HashSet::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if by_code.insert(record.id.clone(), RegionId(i as u16)).is_some() {
                return Err(MapError::DuplicateRegionId(record.id.clone()));
            }
            if !names.insert(record.name.as_str()) {
                return Err(MapError::DuplicateRegionName(record.name.clone()));
            }
        }

        let mut regions: Vec<Region> = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let parent = match &record.parent_id {
                Some(code) => match by_code.get(code) {
                    Some(&id) => Some(id),
                    None => {
                        return Err(MapError::UnknownParent {
                            region: record.id.clone(),
                            parent: code.clone(),
                        })
                    }
                },
                None => None,
            };
            regions.push(Region {
                id: RegionId(i as u16),
                code: record.id.clone(),
                name: record.name.clone(),
                region_type: record.region_type,
                parent,
                children: Vec::new(),
                connections: Vec::new(),
            });
        }

        for i in 0..regions.len() {
            if let Some(parent) = regions[i].parent {
                if regions[parent.index()].parent.is_some() {
                    return Err(MapError::NestedParent {
                        region: regions[i].code.clone(),
                        parent: regions[parent.index()].code.clone(),
                    });
                }
                let child = regions[i].id;
                regions[parent.index()].children.push(child);
            }
        }

        let mut seen_ids = HashSet::with_capacity(connections.len());
        let mut seen_pairs = HashSet::with_capacity(connections.len());
        for record in &connections {
            let (a, b) = record
                .id
                .split_once('-')
                .ok_or_else(|| MapError::MalformedConnectionId(record.id.clone()))?;
            let lookup = |code: &str| {
                by_code.get(code).copied().ok_or_else(|| MapError::UnknownRegion {
                    connection: record.id.clone(),
                    region: code.to_string(),
                })
            };
            let (a, b) = (lookup(a)?, lookup(b)?);

            if !seen_ids.insert(record.id.as_str()) {
                return Err(MapError::DuplicateConnection(record.id.clone()));
            }
            if a == b {
                return Err(MapError::LoopConnection(record.id.clone()));
            }
            if !seen_pairs.insert((a.min(b), a.max(b))) {
                return Err(MapError::MirroredConnection(record.id.clone()));
            }

            let (ra, rb) = (&regions[a.index()], &regions[b.index()]);
            let at_sea = |r: &Region| r.region_type == RegionType::Sea || r.parent.is_some();
            match record.connection_type {
                ConnectionType::Sea => {
                    let touches = |r: &Region| r.region_type != RegionType::Land;
                    if !touches(ra) && !touches(rb) {
                        return Err(MapError::SeaConnectionOnLand(record.id.clone()));
                    }
                }
                ConnectionType::Both => {
                    if ra.region_type != RegionType::Coast || rb.region_type != RegionType::Coast {
                        return Err(MapError::BothConnectionNotCoastal(record.id.clone()));
                    }
                }
                ConnectionType::Land => {
                    if at_sea(ra) || at_sea(rb) {
                        return Err(MapError::LandConnectionAtSea(record.id.clone()));
                    }
                }
            }

            regions[a.index()].connections.push((b, record.connection_type));
            regions[b.index()].connections.push((a, record.connection_type));
        }

        for region in &regions {
            if region.connections.is_empty() {
                return Err(MapError::Unconnected(region.code.clone()));
            }
            let kinds = region.connections.iter().map(|&(_, kind)| kind);
            match region.region_type {
                RegionType::Land => {
                    if kinds.clone().any(|k| k != ConnectionType::Land) {
                        return Err(MapError::LandWithNonLandConnection(region.code.clone()));
                    }
                }
                RegionType::Sea => {
                    if kinds.clone().any(|k| k != ConnectionType::Sea) {
                        return Err(MapError::SeaWithNonSeaConnection(region.code.clone()));
                    }
                }
                RegionType::Coast => {
                    if !kinds.clone().any(|k| k.allows(UnitType::Fleet)) {
                        return Err(MapError::CoastWithoutSeaConnection(region.code.clone()));
                    }
                }
            }
        }

        Ok(RegionMap { regions, by_code })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Looks a region up by its code, e.g. `"Lon"` or `"Spa_N"`.
    pub fn lookup(&self, code: &str) -> Option<RegionId> {
        self.by_code.get(code).copied()
    }

    pub fn code(&self, id: RegionId) -> &str {
        &self.regions[id.index()].code
    }

    pub fn parent_or_self(&self, id: RegionId) -> RegionId {
        self.regions[id.index()].parent.unwrap_or(id)
    }

    /// The connection type between two regions, if they touch.
    pub fn connection(&self, from: RegionId, to: RegionId) -> Option<ConnectionType> {
        self.regions[from.index()]
            .connections
            .iter()
            .find(|&&(other, _)| other == to)
            .map(|&(_, kind)| kind)
    }

    /// A region is coastal if it is a coast or owns a coast child.
    pub fn is_coastal(&self, id: RegionId) -> bool {
        let region = self.region(id);
        region.region_type == RegionType::Coast
            || region
                .children
                .iter()
                .any(|&c| self.region(c).region_type == RegionType::Coast)
    }

    pub fn is_sea(&self, id: RegionId) -> bool {
        self.region(id).region_type == RegionType::Sea
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(regions: &str, connections: &str) -> Result<RegionMap, MapError> {
        RegionMap::from_json(regions, connections)
    }

    const TWO_COASTS: &str = r#"[
        {"id": "A", "name": "Alpha", "type": "Coast"},
        {"id": "B", "name": "Beta", "type": "Coast"},
        {"id": "S", "name": "Sea", "type": "Sea"}
    ]"#;

    #[test]
    fn standard_map_loads() {
        let map = RegionMap::standard().unwrap();
        assert_eq!(map.len(), 81);
        let spa = map.lookup("Spa").unwrap();
        let spa_n = map.lookup("Spa_N").unwrap();
        assert_eq!(map.parent_or_self(spa_n), spa);
        assert!(map.is_coastal(spa));
        assert!(map.is_sea(map.lookup("NTH").unwrap()));
        assert_eq!(map.region(spa).children.len(), 2);
    }

    #[test]
    fn standard_connections_are_symmetric() {
        let map = RegionMap::standard().unwrap();
        let lon = map.lookup("Lon").unwrap();
        let nth = map.lookup("NTH").unwrap();
        assert_eq!(map.connection(lon, nth), Some(ConnectionType::Sea));
        assert_eq!(map.connection(nth, lon), Some(ConnectionType::Sea));
        let bre = map.lookup("Bre").unwrap();
        let pic = map.lookup("Pic").unwrap();
        assert_eq!(map.connection(bre, pic), Some(ConnectionType::Both));
        assert_eq!(map.connection(lon, pic), None);
    }

    #[test]
    fn rejects_mirrored_connection() {
        let err = map(
            TWO_COASTS,
            r#"[{"id":"A-S","type":"Sea"},{"id":"B-S","type":"Sea"},{"id":"S-A","type":"Sea"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::MirroredConnection(id) if id == "S-A"));
    }

    #[test]
    fn rejects_loops_and_unknown_regions() {
        let err = map(TWO_COASTS, r#"[{"id":"A-A","type":"Sea"}]"#).unwrap_err();
        assert!(matches!(err, MapError::LoopConnection(_)));
        let err = map(TWO_COASTS, r#"[{"id":"A-Z","type":"Sea"}]"#).unwrap_err();
        assert!(matches!(err, MapError::UnknownRegion { .. }));
        let err = map(TWO_COASTS, r#"[{"id":"AS","type":"Sea"}]"#).unwrap_err();
        assert!(matches!(err, MapError::MalformedConnectionId(_)));
    }

    #[test]
    fn rejects_unconnected_region() {
        let err = map(TWO_COASTS, r#"[{"id":"A-S","type":"Sea"}]"#).unwrap_err();
        assert!(matches!(err, MapError::Unconnected(code) if code == "B"));
    }

    #[test]
    fn rejects_land_connection_into_sea() {
        let err = map(
            TWO_COASTS,
            r#"[{"id":"A-S","type":"Land"},{"id":"B-S","type":"Sea"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::LandConnectionAtSea(_)));
    }

    #[test]
    fn rejects_coast_without_sea_access() {
        let err = map(
            TWO_COASTS,
            r#"[{"id":"A-B","type":"Land"},{"id":"B-S","type":"Sea"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::CoastWithoutSeaConnection(code) if code == "A"));
    }

    #[test]
    fn rejects_duplicates_and_bad_parents() {
        let err = map(
            r#"[{"id":"A","name":"Alpha","type":"Coast"},{"id":"A","name":"Other","type":"Sea"}]"#,
            "[]",
        )
        .unwrap_err();
        assert!(matches!(err, MapError::DuplicateRegionId(_)));

        let err = map(
            r#"[{"id":"A","name":"Alpha","type":"Land"},{"id":"A_N","name":"Alpha (North)","type":"Coast","parentId":"Q"}]"#,
            "[]",
        )
        .unwrap_err();
        assert!(matches!(err, MapError::UnknownParent { .. }));
    }
}
