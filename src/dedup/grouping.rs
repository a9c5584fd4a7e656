// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::Fingerprint;
use crate::config::Tolerances;
use crate::flatten::LeafId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a group in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Leaves sharing one representative fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub representative: Fingerprint,
    pub members: Vec<LeafId>,
}

/// Equivalence groups of one extraction pass.
///
/// Assignment is a linear scan over representatives and the first match
/// wins, so membership depends on traversal order. Not `Sync`-shared:
/// callers feed leaves in emission order from a single thread.
#[derive(Debug, Clone)]
pub struct GroupSet {
    tolerances: Tolerances,
    groups: Vec<Group>,
}

impl GroupSet {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            groups: Vec::new(),
        }
    }

    pub fn assign_group(&mut self, fingerprint: Fingerprint, leaf: LeafId) -> GroupId {
        let tolerances = &self.tolerances;
        if let Some(group) = self
            .groups
            .iter_mut()
            .find(|g| g.representative.matches(&fingerprint, tolerances))
        {
            group.members.push(leaf);
            return group.id;
        }

        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            id,
            representative: fingerprint,
            members: vec![leaf],
        });
        id
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
