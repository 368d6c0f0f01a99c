//! Simulation and rendering of a planar double pendulum.
//!
//! The physics core (`dynamics`, `trajectory`, `kinematics`) is pure and does no I/O;
//! `validation` runs before it and `animation` consumes its output.

pub mod animation;
pub mod common;
pub mod dynamics;
pub mod kinematics;
pub mod parameters;
pub mod trajectory;
pub mod validation;
