//! 2D position/velocity components and the system that integrates them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::Query;
use crate::store::ComponentStore;
use crate::system::System;

/// World-space position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Displacement applied once per movement step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Adds each entity's velocity to its position
#[derive(Debug, Default, Clone, Copy)]
pub struct Movement;

impl System for Movement {
    type Data = (Position, Velocity);

    fn name(&self) -> &str {
        "Movement"
    }

    fn update(
        &mut self,
        store: &mut ComponentStore,
        query: &Query<(Position, Velocity)>,
    ) -> Result<()> {
        if let Some((position, velocity)) = query.components_mut(store) {
            position.0 += velocity.0;
        }
        Ok(())
    }
}
