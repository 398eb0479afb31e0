//! Operator selection: which registry location fills each route role.
//!
//! A [`Selection`] only stores [`LocationId`]s; locations are resolved
//! through the [`LocationRegistry`] on demand. Every mutation bumps the
//! selection revision, which the engine uses to invalidate routes and to key
//! single-flight synthesis.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::registry::{Location, LocationId, LocationRegistry};

/// Ordinal slot a location occupies in the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Origin,
    Stop2,
    /// Optional third stop.
    Stop3,
}

impl Role {
    /// All roles in route order.
    pub const ALL: [Role; 3] = [Role::Origin, Role::Stop2, Role::Stop3];

    fn slot(self) -> usize {
        match self {
            Self::Origin => 0,
            Self::Stop2 => 1,
            Self::Stop3 => 2,
        }
    }

    /// 1-based position shown on map markers.
    pub fn ordinal(self) -> u8 {
        self.slot() as u8 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Origin => "Start Location",
            Self::Stop2 => "Second Location",
            Self::Stop3 => "Third Location (Optional)",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => f.write_str("origin"),
            Self::Stop2 => f.write_str("stop 2"),
            Self::Stop3 => f.write_str("stop 3"),
        }
    }
}

/// Role -> location binding with a no-duplicates invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Resource)]
pub struct Selection {
    slots: [Option<LocationId>; 3],
    revision: u64,
}

impl Selection {
    pub fn get(&self, role: Role) -> Option<LocationId> {
        self.slots[role.slot()]
    }

    /// Role currently holding `id`, if any.
    pub fn role_of(&self, id: LocationId) -> Option<Role> {
        Role::ALL.into_iter().find(|role| self.get(*role) == Some(id))
    }

    /// Bumped on every mutation, including [`Selection::clear_all`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bind `role` to `id`.
    ///
    /// Fails without touching the selection when `id` is unknown or already
    /// bound to a different role. Rebinding a role to the id it already holds
    /// still counts as a mutation.
    pub fn select(
        &mut self,
        role: Role,
        id: LocationId,
        registry: &LocationRegistry,
    ) -> Result<(), EngineError> {
        if !registry.contains(id) {
            return Err(EngineError::UnknownLocation(id));
        }
        if let Some(bound_to) = self.role_of(id) {
            if bound_to != role {
                return Err(EngineError::InvalidSelection {
                    location: id,
                    bound_to,
                });
            }
        }
        self.slots[role.slot()] = Some(id);
        self.revision += 1;
        Ok(())
    }

    pub fn clear(&mut self, role: Role) {
        self.slots[role.slot()] = None;
        self.revision += 1;
    }

    pub fn clear_all(&mut self) {
        self.slots = [None; 3];
        self.revision += 1;
    }

    /// True when `id` could be bound to `role` without a conflict.
    pub fn is_available(&self, role: Role, id: LocationId) -> bool {
        match self.role_of(id) {
            None => true,
            Some(bound_to) => bound_to == role,
        }
    }

    /// Bound ids in role order, skipping empty roles.
    pub fn active_ids(&self) -> Vec<LocationId> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Bound locations in role order, skipping empty roles.
    pub fn active_locations<'r>(&self, registry: &'r LocationRegistry) -> Vec<&'r Location> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|id| registry.get(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(role, id)` pairs for bound roles.
    pub fn bindings(&self) -> impl Iterator<Item = (Role, LocationId)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|id| (role, id)))
    }
}
