//! Equations of motion for the planar double pendulum, derived from the
//! Euler-Lagrange equations with both angles measured from the downward vertical.

use nalgebra::Vector4;

use super::parameters::{PendulumParameters, State};

/// Time derivative of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateDerivative {
    pub theta_1_dot: f64,
    pub theta_2_dot: f64,
    pub omega_1_dot: f64,
    pub omega_2_dot: f64,
}

impl StateDerivative {
    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(
            self.theta_1_dot,
            self.theta_2_dot,
            self.omega_1_dot,
            self.omega_2_dot,
        )
    }
}

/**
 * Angular accelerations of both links. Total over finite inputs: when
 * `m1 + m2 * sin^2(theta_2 - theta_1)` collapses toward zero the result follows
 * IEEE division and grows without bound instead of panicking.
 */
pub fn angular_accelerations(state: &State, params: &PendulumParameters) -> (f64, f64) {
    let State {
        theta_1,
        theta_2,
        omega_1,
        omega_2,
    } = *state;
    let PendulumParameters {
        length_1: l1,
        length_2: l2,
        mass_2: m2,
        gravity: g,
        ..
    } = *params;
    let m = params.total_mass();

    let (s, c) = (theta_2 - theta_1).sin_cos();
    let w1_sq = omega_1 * omega_1;
    let w2_sq = omega_2 * omega_2;

    // Both denominators share the factor `m - m2 * cos^2`.
    let inertia = m - m2 * c * c;

    let numerator_1 = m2 * l1 * s * c * w1_sq + m2 * g * theta_2.sin() * c + m2 * l2 * s * w2_sq
        - m * g * theta_1.sin();
    let numerator_2 = -m2 * l2 * s * c * w2_sq
        + m * (g * theta_1.sin() * c - l1 * s * w1_sq - g * theta_2.sin());

    (numerator_1 / (l1 * inertia), numerator_2 / (l2 * inertia))
}

/// Full state derivative: `(omega_1, omega_2, alpha_1, alpha_2)`.
pub fn derivative(state: &State, params: &PendulumParameters) -> StateDerivative {
    let (omega_1_dot, omega_2_dot) = angular_accelerations(state, params);
    StateDerivative {
        theta_1_dot: state.omega_1,
        theta_2_dot: state.omega_2,
        omega_1_dot,
        omega_2_dot,
    }
}

/// Adapts [`derivative`] to the vector signature used by `core::ode_solvers`.
/// The system is autonomous, so time is ignored.
pub fn system_dynamics(params: &PendulumParameters) -> impl Fn(f64, Vector4<f64>) -> Vector4<f64> {
    let params = *params;
    move |_, x: Vector4<f64>| derivative(&State::from_vector(&x), &params).to_vector()
}

/// Kinetic energy [J].
pub fn kinetic_energy(state: &State, params: &PendulumParameters) -> f64 {
    let v1 = params.length_1 * state.omega_1;
    let v2 = params.length_2 * state.omega_2;
    let coupling = 2.0 * v1 * v2 * (state.theta_1 - state.theta_2).cos();
    0.5 * params.mass_1 * v1 * v1 + 0.5 * params.mass_2 * (v1 * v1 + v2 * v2 + coupling)
}

/// Gravitational potential energy [J], zero when both rods are horizontal.
pub fn potential_energy(state: &State, params: &PendulumParameters) -> f64 {
    let g = params.gravity;
    -params.total_mass() * params.length_1 * g * state.theta_1.cos()
        - params.mass_2 * params.length_2 * g * state.theta_2.cos()
}

/// Total mechanical energy [J]. Conserved by the exact dynamics.
pub fn total_energy(state: &State, params: &PendulumParameters) -> f64 {
    kinetic_energy(state, params) + potential_energy(state, params)
}
