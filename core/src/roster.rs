//! Representative roster.
//!
//! RULE: Roster order is the tie-break order. The allocator scans reps
//! in this order and only replaces the leader on a strictly better score,
//! so the first rep in the roster wins every tie.

use crate::{
    error::{TerritoryError, TerritoryResult},
    types::{Location, RepId},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rep {
    pub id:            RepId,
    /// Home location for geo matching. A rep without one never geo-matches.
    #[serde(default)]
    pub home_location: Option<Location>,
}

impl Rep {
    pub fn new(id: impl Into<RepId>, home_location: impl Into<Location>) -> Self {
        Self {
            id:            id.into(),
            home_location: Some(home_location.into()),
        }
    }

    pub fn without_location(id: impl Into<RepId>) -> Self {
        Self { id: id.into(), home_location: None }
    }

    pub fn is_home(&self, location: &str) -> bool {
        self.home_location.as_deref() == Some(location)
    }
}

/// An ordered, duplicate-free list of reps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    reps: Vec<Rep>,
}

impl Roster {
    pub fn new(reps: Vec<Rep>) -> TerritoryResult<Self> {
        if let Some(rep) = first_duplicate(&reps) {
            return Err(TerritoryError::DuplicateRep { rep });
        }
        Ok(Self { reps })
    }

    /// Build a roster from bare ids plus a static rep → home location lookup.
    pub fn from_ids<I, S>(ids: I, locations: &HashMap<RepId, Location>) -> TerritoryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<RepId>,
    {
        let reps = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                let home_location = locations.get(&id).cloned();
                Rep { id, home_location }
            })
            .collect();
        Self::new(reps)
    }

    pub fn len(&self) -> usize { self.reps.len() }
    pub fn is_empty(&self) -> bool { self.reps.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, Rep> { self.reps.iter() }

    pub fn get(&self, index: usize) -> Option<&Rep> { self.reps.get(index) }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.reps.iter().map(|r| r.id.as_str())
    }
}

fn first_duplicate(reps: &[Rep]) -> Option<RepId> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(reps.len());
    for rep in reps {
        if !seen.insert(rep.id.as_str()) {
            return Some(rep.id.clone());
        }
    }
    None
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let reps = Vec::<Rep>::deserialize(deserializer)?;
        Roster::new(reps).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Rep;
    type IntoIter = std::slice::Iter<'a, Rep>;

    fn into_iter(self) -> Self::IntoIter { self.reps.iter() }
}
