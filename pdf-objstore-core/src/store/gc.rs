//! Reachability analysis, garbage collection and renumbering

use super::ObjectStore;
use crate::error::{PdfError, Result};
use crate::objects::{Name, ObjectId, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// The value a reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefHolder {
    /// The root value passed in by the caller, usually the trailer.
    Root,
    /// The value of the object with this id.
    Object(ObjectId),
}

/// One step from a container to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Index(usize),
    Key(Name),
}

/// Where a reference lives, relative to its holder, and what it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefLocation {
    pub holder: RefHolder,
    pub path: Vec<PathStep>,
    pub target: ObjectId,
}

impl ObjectStore {
    /// Ids of every object transitively referenced from `root`, sorted.
    ///
    /// References to ids that are not in the store are still reported, but
    /// cannot be followed.
    pub fn get_object_dependencies(&self, root: &Value) -> Vec<ObjectId> {
        let mut visited = BTreeSet::new();
        self.mark_reachable(root, &mut visited);
        visited.into_iter().collect()
    }

    fn mark_reachable(&self, root: &Value, visited: &mut BTreeSet<ObjectId>) {
        let mut pending = vec![root];
        while let Some(value) = pending.pop() {
            match value {
                Value::Reference(id) => {
                    if !visited.insert(*id) {
                        continue;
                    }
                    match self.get_object(*id) {
                        Some(object) => pending.push(object.value()),
                        None => warn!("Dangling reference to {id}"),
                    }
                }
                Value::Array(array) => pending.extend(array.iter()),
                Value::Dictionary(dict) => pending.extend(dict.values()),
                _ => {}
            }
        }
    }

    /// Removes every object that is neither reachable from `root` nor
    /// listed in `not_delete`, returning how many were removed.
    ///
    /// Objects in `not_delete` also keep everything they reference alive.
    /// The ids of removed objects go back to the free pool with their next
    /// generation.
    pub fn collect_garbage(&mut self, root: &Value, not_delete: &BTreeSet<ObjectId>) -> usize {
        let mut reachable = BTreeSet::new();
        self.mark_reachable(root, &mut reachable);
        for id in not_delete {
            self.mark_reachable(&Value::Reference(*id), &mut reachable);
        }

        let unreachable: Vec<ObjectId> = self
            .objects
            .keys()
            .filter(|id| !reachable.contains(id))
            .copied()
            .collect();

        for id in &unreachable {
            self.objects.remove(id);
            self.allocator.release(*id);
        }
        // Survivors, pinned ones included, never leave their number pooled
        let live: BTreeSet<u32> = self.objects.keys().map(|id| id.number()).collect();
        self.allocator.claim_numbers(&live);

        debug!("Garbage collection removed {} objects", unreachable.len());
        unreachable.len()
    }

    /// Every reference held by `root` or by a stored object, in holder
    /// order (root first, then ascending object id).
    pub fn reference_locations(&self, root: &Value) -> Vec<RefLocation> {
        let mut locations = Vec::new();
        collect_locations(root, RefHolder::Root, &mut locations);
        for object in self.objects.values() {
            collect_locations(object.value(), RefHolder::Object(object.id()), &mut locations);
        }
        locations
    }

    /// Renumbers all objects into the dense range `1 0 R ..= N 0 R`,
    /// keeping their relative order, and rewrites every reference in
    /// `root` and in the stored objects to match.
    ///
    /// With `do_gc` set, unreachable objects are collected first. The
    /// free pool and retired numbers are forgotten afterwards, since no
    /// id below the new count is vacant any more. Returns the old to new
    /// id mapping.
    pub fn renumber_objects(
        &mut self,
        root: &mut Value,
        not_delete: &BTreeSet<ObjectId>,
        do_gc: bool,
    ) -> Result<BTreeMap<ObjectId, ObjectId>> {
        if do_gc {
            self.collect_garbage(root, not_delete);
        }

        let locations = self.reference_locations(root);

        let mut mapping = BTreeMap::new();
        let objects = std::mem::take(&mut self.objects);
        for (index, (old_id, mut object)) in objects.into_iter().enumerate() {
            let number = u32::try_from(index + 1).map_err(|_| {
                PdfError::ValueOutOfRange("Too many objects to renumber".to_string())
            })?;
            let new_id = ObjectId::new(number, 0);
            if new_id != old_id {
                object.set_id(new_id);
                object.set_dirty();
            }
            mapping.insert(old_id, new_id);
            self.objects.insert(new_id, object);
        }

        for location in &locations {
            let Some(&new_id) = mapping.get(&location.target) else {
                warn!("Leaving dangling reference to {} unchanged", location.target);
                continue;
            };
            if new_id == location.target {
                continue;
            }

            let holder = match location.holder {
                RefHolder::Root => Some(&mut *root),
                RefHolder::Object(old_id) => mapping
                    .get(&old_id)
                    .and_then(|id| self.objects.get_mut(id))
                    .map(|object| {
                        object.set_dirty();
                        object.value_mut_untracked()
                    }),
            };

            if let Some(slot) = holder.and_then(|value| resolve_path_mut(value, &location.path)) {
                slot.set_reference(new_id)?;
            }
        }

        let count = u32::try_from(self.objects.len()).unwrap_or(u32::MAX);
        self.allocator.reset(count);
        debug!("Renumbered {count} objects");
        Ok(mapping)
    }
}

fn collect_locations(value: &Value, holder: RefHolder, out: &mut Vec<RefLocation>) {
    let mut pending = vec![(value, Vec::new())];
    while let Some((value, path)) = pending.pop() {
        match value {
            Value::Reference(target) => out.push(RefLocation {
                holder,
                path,
                target: *target,
            }),
            Value::Array(array) => {
                // Reverse so that pops visit children in order
                let children: Vec<_> = array.iter().enumerate().collect();
                for (index, child) in children.into_iter().rev() {
                    let mut child_path = path.clone();
                    child_path.push(PathStep::Index(index));
                    pending.push((child, child_path));
                }
            }
            Value::Dictionary(dict) => {
                let children: Vec<_> = dict.iter().collect();
                for (key, child) in children.into_iter().rev() {
                    let mut child_path = path.clone();
                    child_path.push(PathStep::Key(key.clone()));
                    pending.push((child, child_path));
                }
            }
            _ => {}
        }
    }
}

fn resolve_path_mut<'v>(value: &'v mut Value, path: &[PathStep]) -> Option<&'v mut Value> {
    let mut current = value;
    for step in path {
        current = match (current, step) {
            (Value::Array(array), PathStep::Index(index)) => array.get_mut(*index)?,
            (Value::Dictionary(dict), PathStep::Key(key)) => dict.get_mut(key.as_str())?,
            _ => return None,
        };
    }
    Some(current)
}
