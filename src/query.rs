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

//! Query snapshots produced by a join over the store
//!
//! A query records which entity matched and where each requested component
//! sits in that entity's list. It holds no borrow into the store: components
//! are re-resolved on every access, so writes made by earlier systems or
//! hooks are always visible, and a query whose entity changed underneath it
//! resolves to `None` instead of dangling.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::component::{Component, ComponentSet, MAX_QUERY_COMPONENTS};
use crate::entity::Entity;
use crate::store::ComponentStore;

/// Type-erased query, as seen by hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuery {
    entity: Entity,
    slots: SmallVec<[usize; MAX_QUERY_COMPONENTS]>,
    type_ids: SmallVec<[TypeId; MAX_QUERY_COMPONENTS]>,
}

impl RawQuery {
    pub(crate) fn new(
        entity: Entity,
        slots: SmallVec<[usize; MAX_QUERY_COMPONENTS]>,
        type_ids: SmallVec<[TypeId; MAX_QUERY_COMPONENTS]>,
    ) -> Self {
        Self {
            entity,
            slots,
            type_ids,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Positions of the matched components in the entity's component list
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Component types the query was matched on, in requested order
    pub fn type_ids(&self) -> &[TypeId] {
        &self.type_ids
    }

    /// Matched components in requested order.
    ///
    /// Returns `None` if the entity is gone or any slot no longer holds the
    /// type it was matched on.
    pub fn components<'s>(
        &self,
        store: &'s ComponentStore,
    ) -> Option<SmallVec<[&'s (dyn Component + 'static); MAX_QUERY_COMPONENTS]>> {
        let components = store.get_all(self.entity)?;
        self.slots
            .iter()
            .zip(&self.type_ids)
            .map(|(&slot, &type_id)| {
                let component: &(dyn Component + 'static) = &**components.get(slot)?;
                (component.component_type_id() == type_id).then_some(component)
            })
            .collect()
    }

    /// Resolve the `index`-th matched component as a `T`
    pub fn get<'s, T: Component>(&self, store: &'s ComponentStore, index: usize) -> Option<&'s T> {
        let slot = *self.slots.get(index)?;
        let components = store.get_all(self.entity)?;
        (*components.get(slot)?).downcast_ref::<T>()
    }

    pub fn get_mut<'s, T: Component>(
        &self,
        store: &'s mut ComponentStore,
        index: usize,
    ) -> Option<&'s mut T> {
        let slot = *self.slots.get(index)?;
        let components = store.get_all_mut(self.entity)?;
        (*components.get_mut(slot)?).downcast_mut::<T>()
    }
}

/// Immutable (entity, matched components) snapshot for the component set `Q`
pub struct Query<Q: ComponentSet> {
    raw: RawQuery,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q: ComponentSet> Query<Q> {
    pub(crate) fn from_raw(raw: RawQuery) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn entity(&self) -> Entity {
        self.raw.entity
    }

    /// Type-erased view of this query
    pub fn raw(&self) -> &RawQuery {
        &self.raw
    }

    /// Borrow the matched components in requested order
    ///
    /// Returns `None` if the entity was deleted or its list no longer holds
    /// the requested types at the recorded positions.
    pub fn components<'s>(&self, store: &'s ComponentStore) -> Option<Q::Refs<'s>> {
        Q::fetch(store.get_all(self.raw.entity)?, &self.raw.slots)
    }

    /// Mutably borrow the matched components in requested order
    ///
    /// Also returns `None` when two requested types share a slot.
    pub fn components_mut<'s>(&self, store: &'s mut ComponentStore) -> Option<Q::Muts<'s>> {
        Q::fetch_mut(store.get_all_mut(self.raw.entity)?, &self.raw.slots)
    }

    /// True if the query no longer resolves against `store`
    pub fn is_stale(&self, store: &ComponentStore) -> bool {
        self.components(store).is_none()
    }
}

impl<Q: ComponentSet> Clone for Query<Q> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<Q: ComponentSet> fmt::Debug for Query<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity", &self.raw.entity)
            .field("types", &Q::type_names())
            .field("slots", &self.raw.slots)
            .finish()
    }
}
