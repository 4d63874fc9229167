//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use phase_ecs::prelude::*;
//! ```

pub use crate::app::{App, RunState};
pub use crate::builtin::{Movement, Position, Velocity};
pub use crate::component::{Bundle, Component, ComponentSet};
pub use crate::config::AppConfig;
pub use crate::entity::Entity;
pub use crate::error::{EcsError, Result};
pub use crate::hook::{Hook, LoggingHook, StatisticsHook};
pub use crate::query::{Query, RawQuery};
pub use crate::schedule::{Repeat, Schedule, ScheduleRef, Startup, Update};
pub use crate::store::ComponentStore;
pub use crate::system::System;
