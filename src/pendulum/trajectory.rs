use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ode_solvers::{rk4_simulate_with_observer, uniform_grid_time};

use super::{
    dynamics::{system_dynamics, total_energy},
    parameters::{PendulumParameters, State},
};

/**
 * Time-ordered record of the pendulum state on a uniform grid over `[0, t_max]`.
 * Entry `i` is at time `t_max * i / step_count`, so the last entry lands exactly
 * on `t_max`.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trajectory {
    t_max: f64,
    states: Vec<State>,
}

/// A state that left the real numbers during integration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("integration produced a non-finite state at step {index} (t = {time} s)")]
pub struct NumericDegenerate {
    pub index: usize,
    pub time: f64,
}

/// Number of RK4 steps used to cover `[0, t_max]` with a nominal step of `dt`.
/// Rounds, so a ratio a hair below an integer keeps its last step.
pub fn step_count(t_max: f64, dt: f64) -> usize {
    let ratio = (t_max / dt).round();
    if ratio.is_finite() && ratio > 0.0 {
        ratio as usize
    } else {
        0
    }
}

/**
 * Integrates the double pendulum from `initial_state` with classical RK4.
 * Takes `round(t_max / dt)` equal steps, adjusting the step slightly when `t_max`
 * is not a multiple of `dt`, and records every state including both end points.
 * Inputs are assumed to be validated (see `validation`); this never fails.
 */
pub fn integrate(
    initial_state: &State,
    params: &PendulumParameters,
    t_max: f64,
    dt: f64,
) -> Trajectory {
    let n_steps = step_count(t_max, dt);
    let mut states = Vec::with_capacity(n_steps + 1);
    rk4_simulate_with_observer(
        0.0,
        t_max,
        n_steps,
        initial_state.to_vector(),
        &system_dynamics(params),
        |_, x| states.push(State::from_vector(x)),
    );
    Trajectory { t_max, states }
}

/// One independent run for [`integrate_batch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRun {
    pub initial_state: State,
    pub params: PendulumParameters,
    pub t_max: f64,
    pub dt: f64,
}

/// Integrates independent runs in parallel. Output order matches input order.
pub fn integrate_batch(runs: &[SimulationRun]) -> Vec<Trajectory> {
    runs.par_iter()
        .map(|run| integrate(&run.initial_state, &run.params, run.t_max, run.dt))
        .collect()
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn step_count(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// Effective step between consecutive entries.
    pub fn dt(&self) -> f64 {
        match self.step_count() {
            0 => 0.0,
            n => self.t_max / (n as f64),
        }
    }

    pub fn time(&self, index: usize) -> f64 {
        uniform_grid_time(0.0, self.t_max, self.step_count(), index)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn final_state(&self) -> Option<&State> {
        self.states.last()
    }

    /// `(time, state)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(move |(i, state)| (self.time(i), state))
    }

    pub fn first_non_finite(&self) -> Option<NumericDegenerate> {
        self.states
            .iter()
            .position(|state| !state.is_finite())
            .map(|index| NumericDegenerate {
                index,
                time: self.time(index),
            })
    }

    pub fn check_finite(&self) -> Result<(), NumericDegenerate> {
        match self.first_non_finite() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Largest `|E(t) - E(0)| / |E(0)|` over the trajectory. Falls back to the
    /// absolute drift when the initial energy is zero.
    pub fn max_relative_energy_drift(&self, params: &PendulumParameters) -> f64 {
        let initial_energy = match self.initial_state() {
            Some(state) => total_energy(state, params),
            None => return 0.0,
        };
        let scale = if initial_energy == 0.0 {
            1.0
        } else {
            initial_energy.abs()
        };
        self.states
            .iter()
            .map(|state| (total_energy(state, params) - initial_energy).abs() / scale)
            .fold(0.0, f64::max)
    }
}
