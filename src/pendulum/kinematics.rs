use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::{
    parameters::{PendulumParameters, State},
    trajectory::Trajectory,
};

/**
 * Cartesian positions of both bobs at one instant, relative to the pivot at the
 * origin. The y-axis points up, so a rod at zero angle hangs along negative y.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PositionFrame {
    pub time: f64,
    pub bob_1: Vector2<f64>,
    pub bob_2: Vector2<f64>,
}

impl PositionFrame {
    pub fn pivot() -> Vector2<f64> {
        Vector2::zeros()
    }

    /// Polyline pivot -> bob 1 -> bob 2, for drawing the rods.
    pub fn segments(&self) -> [(Vector2<f64>, Vector2<f64>); 2] {
        [(Self::pivot(), self.bob_1), (self.bob_1, self.bob_2)]
    }
}

/// Offset of a rod's free end from its anchor.
fn rod_offset(length: f64, angle: f64) -> Vector2<f64> {
    let (s, c) = angle.sin_cos();
    Vector2::new(length * s, -length * c)
}

pub fn project_state(time: f64, state: &State, params: &PendulumParameters) -> PositionFrame {
    let bob_1 = rod_offset(params.length_1, state.theta_1);
    let bob_2 = bob_1 + rod_offset(params.length_2, state.theta_2);
    PositionFrame { time, bob_1, bob_2 }
}

/// Lazily maps every state of `trajectory` to its bob positions. Nothing is
/// cached; calling this again recomputes from the trajectory.
pub fn project<'a>(
    trajectory: &'a Trajectory,
    params: &'a PendulumParameters,
) -> impl Iterator<Item = PositionFrame> + 'a {
    trajectory
        .iter()
        .map(move |(time, state)| project_state(time, state, params))
}
