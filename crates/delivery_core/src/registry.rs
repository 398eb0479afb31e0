//! Location registry: the read-only catalog of addressable sites.
//!
//! The registry is the sole owner of [`Location`] records. Everything else
//! (selections, routes) refers to locations by [`LocationId`] and looks them
//! up here. Engines hold the registry behind an `Arc` so one catalog can be
//! shared by any number of simulation instances without locking.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationCategory {
    #[serde(rename = "Distribution Center")]
    DistributionCenter,
    Store,
}

impl LocationCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::DistributionCenter => "Distribution Center",
            Self::Store => "Store",
        }
    }
}

/// One addressable site. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: LocationCategory,
    /// Units on hand; informational only, never read by the engine.
    #[serde(default)]
    pub inventory_level: u32,
}

impl Location {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        category: LocationCategory,
        inventory_level: u32,
    ) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
            latitude,
            longitude,
            category,
            inventory_level,
        }
    }
}

/// Catalog of locations with id lookup.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
    index: HashMap<LocationId, usize>,
}

impl LocationRegistry {
    /// Build a registry, rejecting duplicate ids and non-finite coordinates.
    pub fn new(locations: Vec<Location>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(locations.len());
        for (position, location) in locations.iter().enumerate() {
            if !location.latitude.is_finite() || !location.longitude.is_finite() {
                return Err(ConfigError::InvalidCoordinates(location.id));
            }
            if index.insert(location.id, position).is_some() {
                return Err(ConfigError::DuplicateLocation(location.id));
            }
        }
        Ok(Self { locations, index })
    }

    /// Parse a JSON array of locations.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Self::new(locations)
    }

    /// Load a JSON catalog from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            locations = registry.len(),
            "loaded location registry"
        );
        Ok(registry)
    }

    /// The eight North Texas sites the dispatch dashboard ships with.
    pub fn default_catalog() -> Self {
        use LocationCategory::{DistributionCenter, Store};

        let locations = vec![
            Location::new(
                1,
                "Dallas Distribution Center",
                32.7767,
                -96.797,
                DistributionCenter,
                2100,
            ),
            Location::new(
                2,
                "Houston Distribution Center",
                29.7604,
                -95.3698,
                DistributionCenter,
                1890,
            ),
            Location::new(
                3,
                "Austin Distribution Center",
                30.2672,
                -97.7431,
                DistributionCenter,
                1650,
            ),
            Location::new(4, "Fort Worth Store", 32.7555, -97.3308, Store, 450),
            Location::new(5, "San Antonio Store", 29.4241, -98.4936, Store, 380),
            Location::new(6, "Plano Store", 33.0198, -96.6989, Store, 290),
            Location::new(7, "Arlington Store", 32.7357, -97.1081, Store, 320),
            Location::new(8, "McKinney Store", 33.1972, -96.6397, Store, 280),
        ];
        let index = locations
            .iter()
            .enumerate()
            .map(|(position, location)| (location.id, position))
            .collect();
        Self { locations, index }
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.index.get(&id).map(|&position| &self.locations[position])
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.index.contains_key(&id)
    }

    /// All locations in catalog order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// ECS resource sharing one registry across engines.
#[derive(Debug, Clone, Resource)]
pub struct RegistryResource(pub Arc<LocationRegistry>);
