//! Double pendulum simulation: a pure RK4 physics core (`pendulum::dynamics`,
//! `pendulum::trajectory`, `pendulum::kinematics`) plus the validation,
//! rendering, and command-line layers built around it.

pub mod cli;
pub mod core;
pub mod pendulum;
