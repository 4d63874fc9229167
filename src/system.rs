//! System trait and its type-erased adapter

use smallvec::SmallVec;

use crate::component::{ComponentSet, MAX_QUERY_COMPONENTS};
use crate::error::Result;
use crate::query::{Query, RawQuery};
use crate::store::ComponentStore;

/// System ID (registration index inside an [`App`](crate::app::App))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub u32);

/// System trait
///
/// A system names the component tuple it wants through `Data`, picks the
/// matching entities in `select`, and mutates one match per `update` call.
/// The store is owned by the runner and lent to every call; `update` may use
/// any store operation, including `delete`.
pub trait System: 'static {
    /// Component tuple this system operates on
    type Data: ComponentSet;

    /// Get system name
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Queries to run this step. Must not mutate anything.
    fn select(&self, store: &ComponentStore) -> Vec<Query<Self::Data>> {
        store.find::<Self::Data>()
    }

    /// Apply this system to one matched entity
    fn update(&mut self, store: &mut ComponentStore, query: &Query<Self::Data>) -> Result<()>;
}

/// Object-safe view of a [`System`] held by the runner
pub trait AnySystem {
    fn name(&self) -> &str;

    /// Requested component type names, in order
    fn data_types(&self) -> SmallVec<[&'static str; MAX_QUERY_COMPONENTS]>;

    fn select_raw(&self, store: &ComponentStore) -> Vec<RawQuery>;

    fn update_raw(&mut self, store: &mut ComponentStore, query: &RawQuery) -> Result<()>;
}

impl<S: System> AnySystem for S {
    fn name(&self) -> &str {
        System::name(self)
    }

    fn data_types(&self) -> SmallVec<[&'static str; MAX_QUERY_COMPONENTS]> {
        S::Data::type_names()
    }

    fn select_raw(&self, store: &ComponentStore) -> Vec<RawQuery> {
        self.select(store)
            .into_iter()
            .map(|query| query.raw().clone())
            .collect()
    }

    fn update_raw(&mut self, store: &mut ComponentStore, query: &RawQuery) -> Result<()> {
        let query = Query::<S::Data>::from_raw(query.clone());
        self.update(store, &query)
    }
}

/// Boxed system
pub type BoxedSystem = Box<dyn AnySystem>;
