use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// Standard acceleration of gravity at the surface of the earth [m/s^2].
pub const STANDARD_GRAVITY: f64 = 9.80665;

fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

/**
 * Physical description of the double pendulum. Built once from user input and then
 * shared (read-only) by the dynamics, the kinematics, and the renderer.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PendulumParameters {
    pub length_1: f64, // [m] pivot to bob 1
    pub length_2: f64, // [m] bob 1 to bob 2
    pub mass_1: f64,   // [kg]
    pub mass_2: f64,   // [kg]
    #[serde(default = "default_gravity")]
    pub gravity: f64, // [m/s^2]
}

impl PendulumParameters {
    pub fn new(length_1: f64, length_2: f64, mass_1: f64, mass_2: f64) -> PendulumParameters {
        PendulumParameters {
            length_1,
            length_2,
            mass_1,
            mass_2,
            gravity: STANDARD_GRAVITY,
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.mass_1 + self.mass_2
    }

    /// Radius of the disc that bob 2 can reach.
    pub fn reach(&self) -> f64 {
        self.length_1 + self.length_2
    }
}

impl Default for PendulumParameters {
    fn default() -> Self {
        PendulumParameters::new(1.0, 1.0, 1.0, 1.0)
    }
}

/**
 * Configuration of the pendulum at a single instant. Angles are measured from the
 * downward vertical and are not wrapped.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub theta_1: f64, // [rad]
    pub theta_2: f64, // [rad]
    pub omega_1: f64, // [rad/s]
    pub omega_2: f64, // [rad/s]
}

impl State {
    pub fn new(theta_1: f64, theta_2: f64, omega_1: f64, omega_2: f64) -> State {
        State {
            theta_1,
            theta_2,
            omega_1,
            omega_2,
        }
    }

    /// Builds a state from angles in degrees and rates in degrees per second.
    pub fn from_degrees(theta_1: f64, theta_2: f64, omega_1: f64, omega_2: f64) -> State {
        State::new(
            theta_1.to_radians(),
            theta_2.to_radians(),
            omega_1.to_radians(),
            omega_2.to_radians(),
        )
    }

    /// Packs the state as `[theta_1, theta_2, omega_1, omega_2]` for the ODE solvers.
    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.theta_1, self.theta_2, self.omega_1, self.omega_2)
    }

    pub fn from_vector(x: &Vector4<f64>) -> State {
        State::new(x[0], x[1], x[2], x[3])
    }

    pub fn is_finite(&self) -> bool {
        self.theta_1.is_finite()
            && self.theta_2.is_finite()
            && self.omega_1.is_finite()
            && self.omega_2.is_finite()
    }
}

/// Initial conditions as a user writes them: degrees and degrees per second.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct InitialConditionsDegrees {
    pub theta_1: f64,
    pub theta_2: f64,
    #[serde(default)]
    pub omega_1: f64,
    #[serde(default)]
    pub omega_2: f64,
}

impl InitialConditionsDegrees {
    pub fn to_state(&self) -> State {
        State::from_degrees(self.theta_1, self.theta_2, self.omega_1, self.omega_2)
    }
}
