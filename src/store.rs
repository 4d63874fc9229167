// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! ComponentStore: entity to component association
//!
//! Each entity owns an insertion-ordered list of boxed components. Lookups
//! probe that list linearly by `TypeId`; `find` is a full scan in entity
//! insertion order.

use ahash::AHashMap;
use smallvec::SmallVec;
use std::any::TypeId;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::component::{Component, ComponentSet, MAX_QUERY_COMPONENTS};
use crate::entity::Entity;
use crate::query::{Query, RawQuery};

/// Authoritative owner of all entity to component associations
#[derive(Default)]
pub struct ComponentStore {
    /// Component lists keyed by entity. A key exists iff its list is non-empty.
    records: AHashMap<Entity, Vec<Box<dyn Component>>>,

    /// Entities in first-insertion order, drives `find` iteration
    order: Vec<Entity>,
}

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one component to the entity, creating its record if absent
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) {
        self.add_boxed(entity, Box::new(component));
    }

    /// Append an already boxed component
    pub fn add_boxed(&mut self, entity: Entity, component: Box<dyn Component>) {
        self.record_mut(entity).push(component);
    }

    /// Append a batch after the entity's existing components
    ///
    /// An empty batch on an unknown entity leaves the store unchanged.
    pub fn add_all(&mut self, entity: Entity, components: Vec<Box<dyn Component>>) {
        if components.is_empty() {
            return;
        }
        self.record_mut(entity).extend(components);
    }

    fn record_mut(&mut self, entity: Entity) -> &mut Vec<Box<dyn Component>> {
        let order = &mut self.order;
        self.records.entry(entity).or_insert_with(|| {
            order.push(entity);
            Vec::new()
        })
    }

    /// True iff the entity has at least one component
    pub fn exists(&self, entity: Entity) -> bool {
        self.records.contains_key(&entity)
    }

    /// True if the entity holds a `T`. False for unknown entities.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_type(entity, TypeId::of::<T>())
    }

    pub fn has_type(&self, entity: Entity, type_id: TypeId) -> bool {
        self.records
            .get(&entity)
            .is_some_and(|components| position_of(components, type_id).is_some())
    }

    /// True if the entity holds every type of the set
    pub fn has_all<Q: ComponentSet>(&self, entity: Entity) -> bool {
        self.has_all_types(entity, &Q::type_ids())
    }

    pub fn has_all_types(&self, entity: Entity, type_ids: &[TypeId]) -> bool {
        match self.records.get(&entity) {
            Some(components) => type_ids
                .iter()
                .all(|&type_id| position_of(components, type_id).is_some()),
            None => false,
        }
    }

    /// First component of type `T` on the entity
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let components = self.records.get(&entity)?;
        let index = position_of(components, TypeId::of::<T>())?;
        (*components[index]).downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let components = self.records.get_mut(&entity)?;
        let index = position_of(components, TypeId::of::<T>())?;
        (*components[index]).downcast_mut::<T>()
    }

    /// Full ordered component list of the entity
    pub fn get_all(&self, entity: Entity) -> Option<&[Box<dyn Component>]> {
        self.records.get(&entity).map(Vec::as_slice)
    }

    pub fn get_all_mut(&mut self, entity: Entity) -> Option<&mut [Box<dyn Component>]> {
        self.records.get_mut(&entity).map(Vec::as_mut_slice)
    }

    /// Join over every entity holding all types of `Q`
    ///
    /// Result order is entity insertion order; each tuple follows the
    /// requested type order.
    pub fn find<Q: ComponentSet>(&self) -> Vec<Query<Q>> {
        self.find_raw(&Q::type_ids())
            .into_iter()
            .map(Query::from_raw)
            .collect()
    }

    /// Untyped join used by `find`
    pub fn find_raw(&self, type_ids: &[TypeId]) -> Vec<RawQuery> {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "store.find",
            requested = type_ids.len(),
            entity_count = self.order.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let mut matches = Vec::new();
        for &entity in &self.order {
            let Some(components) = self.records.get(&entity) else {
                continue;
            };
            let slots: Option<SmallVec<[usize; MAX_QUERY_COMPONENTS]>> = type_ids
                .iter()
                .map(|&type_id| position_of(components, type_id))
                .collect();
            if let Some(slots) = slots {
                matches.push(RawQuery::new(entity, slots, SmallVec::from_slice(type_ids)));
            }
        }
        matches
    }

    /// Remove the entity and all its components. No-op if absent.
    pub fn delete(&mut self, entity: Entity) {
        if self.records.remove(&entity).is_some() {
            self.order.retain(|&e| e != entity);
        }
    }

    /// Number of entities with at least one component
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for entity in &self.order {
            if let Some(components) = self.records.get(entity) {
                let names: Vec<&'static str> = components
                    .iter()
                    .map(|component| (**component).component_name())
                    .collect();
                map.entry(entity, &names);
            }
        }
        map.finish()
    }
}

/// Index of the first component whose concrete type is `type_id`
fn position_of(components: &[Box<dyn Component>], type_id: TypeId) -> Option<usize> {
    components
        .iter()
        .position(|component| (**component).component_type_id() == type_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health(u32);

    fn e(id: u64) -> Entity {
        Entity::new(id)
    }

    #[test]
    fn test_exists_after_add() {
        let mut store = ComponentStore::new();
        assert!(!store.exists(e(1)));
        store.add(e(1), Health(3));
        assert!(store.exists(e(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_all_appends_new_batch() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        store.add_all(
            e(1),
            vec![
                Box::new(Position { x: 0.0, y: 0.0 }),
                Box::new(Velocity { x: 1.0, y: 1.0 }),
            ],
        );

        let components = store.get_all(e(1)).unwrap();
        assert_eq!(components.len(), 3);
        assert!((*components[0]).is::<Health>());
        assert!((*components[1]).is::<Position>());
        assert!((*components[2]).is::<Velocity>());
    }

    #[test]
    fn test_add_all_empty_batch_does_not_create_entity() {
        let mut store = ComponentStore::new();
        store.add_all(e(7), Vec::new());
        assert!(!store.exists(e(7)));
        assert!(store.get_all(e(7)).is_none());
    }

    #[test]
    fn test_get_returns_first_match() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        store.add(e(1), Health(2));
        assert_eq!(store.get::<Health>(e(1)), Some(&Health(1)));
        assert_eq!(store.get_all(e(1)).map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_missing_lookups_are_absent() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        assert!(store.get::<Position>(e(1)).is_none());
        assert!(store.get::<Health>(e(2)).is_none());
        assert!(!store.has::<Health>(e(2)));
        assert!(!store.has_all::<(Health, Position)>(e(1)));
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        if let Some(health) = store.get_mut::<Health>(e(1)) {
            health.0 = 9;
        }
        assert_eq!(store.get::<Health>(e(1)), Some(&Health(9)));
    }

    #[test]
    fn test_find_matches_requested_order() {
        let mut store = ComponentStore::new();
        store.add(e(1), Velocity { x: 1.0, y: 1.0 });
        store.add(e(1), Position { x: 0.0, y: 0.0 });
        store.add(e(2), Position { x: 5.0, y: 5.0 });
        store.add(e(3), Health(4));
        store.add(e(3), Velocity { x: 2.0, y: 0.0 });
        store.add(e(3), Position { x: 1.0, y: 1.0 });

        let results = store.find::<(Position, Velocity)>();
        let entities: Vec<Entity> = results.iter().map(Query::entity).collect();
        assert_eq!(entities, vec![e(1), e(3)]);

        let (position, velocity) = results[1].components(&store).unwrap();
        assert_eq!(position, &Position { x: 1.0, y: 1.0 });
        assert_eq!(velocity, &Velocity { x: 2.0, y: 0.0 });
    }

    #[test]
    fn test_find_agrees_with_has_all() {
        let mut store = ComponentStore::new();
        for id in 0..12u64 {
            if id % 2 == 0 {
                store.add(e(id), Position { x: 0.0, y: 0.0 });
            }
            if id % 3 == 0 {
                store.add(e(id), Velocity { x: 0.0, y: 0.0 });
            }
            store.add(e(id), Health(id as u32));
        }

        let found: Vec<Entity> = store
            .find::<(Velocity, Position)>()
            .iter()
            .map(Query::entity)
            .collect();
        let expected: Vec<Entity> = store
            .entities()
            .filter(|&entity| store.has_all::<(Velocity, Position)>(entity))
            .collect();
        assert_eq!(found, expected);
        assert_eq!(found, vec![e(0), e(6)]);
    }

    #[test]
    fn test_find_empty_store() {
        let store = ComponentStore::new();
        assert!(store.find::<(Health,)>().is_empty());
    }

    #[test]
    fn test_delete_removes_everything() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        store.add(e(1), Position { x: 0.0, y: 0.0 });
        store.add(e(2), Health(2));

        store.delete(e(1));
        assert!(!store.exists(e(1)));
        assert!(store.get_all(e(1)).is_none());
        assert!(store.find::<(Health,)>().iter().all(|q| q.entity() != e(1)));
        assert_eq!(store.entities().collect::<Vec<_>>(), vec![e(2)]);

        // Absent entity
        store.delete(e(42));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_readd_after_delete_goes_to_back() {
        let mut store = ComponentStore::new();
        store.add(e(1), Health(1));
        store.add(e(2), Health(2));
        store.delete(e(1));
        store.add(e(1), Health(3));
        assert_eq!(store.entities().collect::<Vec<_>>(), vec![e(2), e(1)]);
    }
}
