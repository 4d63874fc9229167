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

//! Phase ECS - minimal Entity Component System runtime
//!
//! A component store with type-based joins, and a runner that drives
//! systems through ordered schedules with hooks around every system run.

pub mod app;
pub mod builtin;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod hook;
pub mod prelude;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod query;
pub mod schedule;
pub mod store;
pub mod system;


pub use app::*;
pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use hook::*;
pub use query::*;
pub use schedule::*;
pub use store::*;
pub use system::*;
