// Built-in systems and components

pub mod motion;

pub use motion::{Movement, Position, Velocity};
