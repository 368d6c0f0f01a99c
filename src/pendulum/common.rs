use serde::{Deserialize, Serialize};

use super::{
    animation::AnimationParams,
    parameters::{InitialConditionsDegrees, PendulumParameters, State},
    validation::{validate_simulation, ParameterError, SimulationWindow, ValidationPolicy},
};

/**
 * Complete set of parameters read from a JSON parameter file for rendering one
 * double pendulum animation.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DoublePendulumParams {
    pub pendulum: PendulumParameters,
    pub initial_conditions: InitialConditionsDegrees,
    #[serde(default)]
    pub simulation: SimulationWindow,
    #[serde(default)]
    pub validation: ValidationPolicy,
    pub animation: AnimationParams,
}

impl DoublePendulumParams {
    pub fn initial_state(&self) -> State {
        self.initial_conditions.to_state()
    }

    /// Checks the physics, the simulation window, and the animation settings.
    pub fn validate(&self) -> Result<(), ParameterError> {
        validate_simulation(
            &self.pendulum,
            &self.initial_state(),
            &self.simulation,
            self.validation,
        )?;
        self.animation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_params() {
        let params: DoublePendulumParams = serde_json::from_str(
            r#"{
                "pendulum": { "length_1": 1.0, "length_2": 1.0, "mass_1": 1.0, "mass_2": 1.0 },
                "initial_conditions": { "theta_1": 175.0, "theta_2": 175.0 },
                "animation": {
                    "fit_image": { "resolution": [200, 200], "padding_scale": 1.1 },
                    "frames_per_second": 25.0,
                    "background_color_rgb": [255, 255, 255],
                    "rod_color_rgb": [0, 0, 0],
                    "bob_color_rgb": [200, 30, 30],
                    "rod_thickness": 2.0,
                    "bob_radius": 5.0
                }
            }"#,
        )
        .unwrap();

        assert_eq!(params.simulation, SimulationWindow::default());
        assert_eq!(params.validation, ValidationPolicy::Strict);
        assert!(params.animation.outputs.gif);
        assert!(!params.animation.outputs.mp4);
        assert_eq!(params.initial_state().omega_1, 0.0);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_validate_covers_animation() {
        let mut params: DoublePendulumParams =
            serde_json::from_str(include_str!("../../tests/param_files/tiny_render.json"))
                .unwrap();
        assert_eq!(params.validate(), Ok(()));

        params.animation.frames_per_second = 0.0;
        assert_eq!(
            params.validate(),
            Err(ParameterError::NonPositiveFrameRate(0.0))
        );

        params.animation.frames_per_second = 10.0;
        params.animation.fit_image.resolution = nalgebra::Vector2::new(1, 1);
        assert_eq!(
            params.validate(),
            Err(ParameterError::ResolutionTooSmall {
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_lenient_policy_from_json() {
        let policy: ValidationPolicy = serde_json::from_str(r#""Lenient""#).unwrap();
        assert_eq!(policy, ValidationPolicy::Lenient);
    }
}
