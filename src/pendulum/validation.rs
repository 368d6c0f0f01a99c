//! Input checks that run before any integration. The integrator itself assumes
//! these have passed and never fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parameters::{PendulumParameters, State};

/// Shortest simulation accepted by the strict policy [s] (exclusive).
pub const MIN_DURATION: f64 = 1.0;

/// Largest time step accepted by the strict policy [s] (inclusive).
pub const MAX_TIME_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParameterError {
    #[error("`{name}` must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("rod length `{name}` must be positive, got {value} m")]
    NonPositiveLength { name: &'static str, value: f64 },
    #[error("mass `{name}` must be positive, got {value} kg")]
    NonPositiveMass { name: &'static str, value: f64 },
    #[error("gravity must be positive, got {0} m/s^2")]
    NonPositiveGravity(f64),
    #[error("t_max must be greater than 1 s, got {0} s")]
    DurationTooShort(f64),
    #[error("dt must be positive, got {0} s")]
    NonPositiveTimeStep(f64),
    #[error("dt must be no larger than 0.01 s, got {0} s")]
    TimeStepTooLarge(f64),
    #[error("frames_per_second must be positive, got {0}")]
    NonPositiveFrameRate(f64),
    #[error("resolution must be at least 2x2 pixels, got {width}x{height}")]
    ResolutionTooSmall { width: u32, height: u32 },
    #[error("padding_scale must be positive, got {0}")]
    NonPositivePaddingScale(f64),
    #[error("`{name}` must not be negative, got {value} pixels")]
    NegativeDrawSize { name: &'static str, value: f64 },
}

/**
 * How to treat the duration and time-step limits. These limits keep the animation
 * meaningful and the RK4 truncation error small, but they are policy rather than a
 * property of the integrator, so `Lenient` only logs a warning for them. Physical
 * parameters are always checked.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    #[default]
    Strict,
    Lenient,
}

/// Time span and nominal step of a simulation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SimulationWindow {
    pub t_max: f64, // [s]
    pub dt: f64,    // [s]
}

impl Default for SimulationWindow {
    fn default() -> Self {
        SimulationWindow {
            t_max: 60.0,
            dt: 0.01,
        }
    }
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::NotFinite { name, value })
    }
}

fn check_length(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if check_finite(name, value)? > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositiveLength { name, value })
    }
}

fn check_mass(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if check_finite(name, value)? > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositiveMass { name, value })
    }
}

pub fn validate_parameters(params: &PendulumParameters) -> Result<(), ParameterError> {
    check_length("length_1", params.length_1)?;
    check_length("length_2", params.length_2)?;
    check_mass("mass_1", params.mass_1)?;
    check_mass("mass_2", params.mass_2)?;
    if check_finite("gravity", params.gravity)? <= 0.0 {
        return Err(ParameterError::NonPositiveGravity(params.gravity));
    }
    Ok(())
}

pub fn validate_initial_state(state: &State) -> Result<(), ParameterError> {
    check_finite("theta_1", state.theta_1)?;
    check_finite("theta_2", state.theta_2)?;
    check_finite("omega_1", state.omega_1)?;
    check_finite("omega_2", state.omega_2)?;
    Ok(())
}

/// Duration limit on its own, shared with the command-line parser.
pub fn validate_duration(t_max: f64) -> Result<f64, ParameterError> {
    if check_finite("t_max", t_max)? > MIN_DURATION {
        Ok(t_max)
    } else {
        Err(ParameterError::DurationTooShort(t_max))
    }
}

/// Time-step limit on its own, shared with the command-line parser.
pub fn validate_time_step(dt: f64) -> Result<f64, ParameterError> {
    if check_finite("dt", dt)? <= 0.0 {
        Err(ParameterError::NonPositiveTimeStep(dt))
    } else if dt > MAX_TIME_STEP {
        Err(ParameterError::TimeStepTooLarge(dt))
    } else {
        Ok(dt)
    }
}

impl SimulationWindow {
    pub fn validate(&self, policy: ValidationPolicy) -> Result<(), ParameterError> {
        // A non-positive step would never reach t_max, whatever the policy.
        if check_finite("dt", self.dt)? <= 0.0 {
            return Err(ParameterError::NonPositiveTimeStep(self.dt));
        }
        if check_finite("t_max", self.t_max)? < 0.0 {
            return Err(ParameterError::DurationTooShort(self.t_max));
        }

        for check in [
            validate_duration(self.t_max).map(|_| ()),
            validate_time_step(self.dt).map(|_| ()),
        ] {
            match (check, policy) {
                (Ok(()), _) => {}
                (Err(err), ValidationPolicy::Strict) => return Err(err),
                (Err(err), ValidationPolicy::Lenient) => {
                    tracing::warn!("accepting out-of-policy simulation window: {}", err);
                }
            }
        }
        Ok(())
    }
}

/// Runs every check needed before a simulation is started.
pub fn validate_simulation(
    params: &PendulumParameters,
    initial_state: &State,
    window: &SimulationWindow,
    policy: ValidationPolicy,
) -> Result<(), ParameterError> {
    validate_parameters(params)?;
    validate_initial_state(initial_state)?;
    window.validate(policy)
}
