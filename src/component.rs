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

//! Component, Bundle and ComponentSet traits
//!
//! Components are data attached to entities, matched by run-time type identity.
//! Bundles group multiple components for spawning.
//! Component sets name the statically-typed tuple a query asks for.

use std::any::{Any, TypeId};

use smallvec::{smallvec, SmallVec};

/// Maximum number of component types in a bundle or a query
pub const MAX_QUERY_COMPONENTS: usize = 8;

/// Marker trait for components
///
/// Components must be 'static (no borrowed data). Implemented for every
/// eligible type. Always call these methods on `&dyn Component`, never on
/// `&Box<dyn Component>`, or the box itself answers.
pub trait Component: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Concrete type id of the stored value
    fn component_type_id(&self) -> TypeId;

    /// Concrete type name, for diagnostics
    fn component_name(&self) -> &'static str;
}

/// Automatically implement Component for all valid types
impl<T: Any + Send + Sync> Component for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn component_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Component {
    /// True if the stored value is a `T`
    pub fn is<T: Component>(&self) -> bool {
        self.component_type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Bundle of components
///
/// Allows spawning entities with multiple components at once.
pub trait Bundle: 'static {
    /// Box every component, keeping tuple order
    fn into_components(self) -> Vec<Box<dyn Component>>;
}

// Macro for tuple Bundle implementations
macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            #[allow(non_snake_case)]
            fn into_components(self) -> Vec<Box<dyn Component>> {
                let ($($T,)*) = self;
                vec![$(Box::new($T) as Box<dyn Component>),*]
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

/// A statically-typed tuple of component types requested by a query
///
/// `slots[i]` is the position, inside one entity's component list, of the
/// component matched for the i-th requested type.
pub trait ComponentSet: 'static {
    /// Shared borrows in requested order
    type Refs<'a>;

    /// Exclusive borrows in requested order
    type Muts<'a>;

    /// Requested type ids in requested order
    fn type_ids() -> SmallVec<[TypeId; MAX_QUERY_COMPONENTS]>;

    /// Requested type names in requested order
    fn type_names() -> SmallVec<[&'static str; MAX_QUERY_COMPONENTS]>;

    /// Resolve slots to typed borrows. `None` if a slot is missing or holds another type.
    fn fetch<'a>(components: &'a [Box<dyn Component>], slots: &[usize]) -> Option<Self::Refs<'a>>;

    /// Resolve slots to typed exclusive borrows. Also `None` if two requested
    /// types resolve to the same slot.
    fn fetch_mut<'a>(
        components: &'a mut [Box<dyn Component>],
        slots: &[usize],
    ) -> Option<Self::Muts<'a>>;
}

fn slot_ref<'a>(
    components: &'a [Box<dyn Component>],
    slot: Option<&usize>,
) -> Option<&'a (dyn Component + 'static)> {
    let boxed = components.get(*slot?)?;
    Some(&**boxed)
}

type SlotCells<'a> = SmallVec<[Option<&'a mut Box<dyn Component>>; 16]>;

fn take_slot<'a>(
    cells: &mut SlotCells<'a>,
    slot: Option<&usize>,
) -> Option<&'a mut (dyn Component + 'static)> {
    let boxed = cells.get_mut(*slot?)?.take()?;
    Some(&mut **boxed)
}

macro_rules! impl_component_set {
    ($($T:ident : $idx:tt),*) => {
        impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            type Refs<'a> = ($(&'a $T,)*);
            type Muts<'a> = ($(&'a mut $T,)*);

            fn type_ids() -> SmallVec<[TypeId; MAX_QUERY_COMPONENTS]> {
                smallvec![$(TypeId::of::<$T>()),*]
            }

            fn type_names() -> SmallVec<[&'static str; MAX_QUERY_COMPONENTS]> {
                smallvec![$(std::any::type_name::<$T>()),*]
            }

            fn fetch<'a>(
                components: &'a [Box<dyn Component>],
                slots: &[usize],
            ) -> Option<Self::Refs<'a>> {
                Some(($(
                    slot_ref(components, slots.get($idx))?.downcast_ref::<$T>()?,
                )*))
            }

            fn fetch_mut<'a>(
                components: &'a mut [Box<dyn Component>],
                slots: &[usize],
            ) -> Option<Self::Muts<'a>> {
                // Each slot can be taken once, so duplicates resolve to None
                let mut cells: SlotCells<'a> = components.iter_mut().map(Some).collect();
                Some(($(
                    take_slot(&mut cells, slots.get($idx))?.downcast_mut::<$T>()?,
                )*))
            }
        }
    };
}

impl_component_set!(A: 0);
impl_component_set!(A: 0, B: 1);
impl_component_set!(A: 0, B: 1, C: 2);
impl_component_set!(A: 0, B: 1, C: 2, D: 3);
impl_component_set!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_component_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_component_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_component_set!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
