use std::io::Write;

use serde::Serialize;

use crate::core::{
    file_io::{build_output_path_with_date_time, maybe_date_time_string, serialize_to_json, FilePrefix},
    stopwatch::Stopwatch,
};
use crate::pendulum::{
    animation::{frame_file_name, render_animation, AnimationOutputs, AnimationParams},
    kinematics::{project, PositionFrame},
    parameters::{PendulumParameters, State},
    trajectory::{integrate, Trajectory},
    validation::{validate_simulation, SimulationWindow, ValidationPolicy},
};

use super::args::SimulateArgs;

/// Everything a downstream renderer needs from one run.
#[derive(Serialize, Debug)]
pub struct SimulationRecord<'a> {
    pub pendulum: &'a PendulumParameters,
    pub trajectory: &'a Trajectory,
    pub frames: Vec<PositionFrame>,
}

impl SimulateArgs {
    pub fn pendulum(&self) -> PendulumParameters {
        PendulumParameters::new(self.l1, self.l2, self.m1, self.m2)
    }

    pub fn initial_state(&self) -> State {
        State::from_degrees(self.o1, self.o2, self.w1, self.w2)
    }

    pub fn window(&self) -> SimulationWindow {
        SimulationWindow {
            t_max: self.t_max,
            dt: self.dt,
        }
    }

    /// Default animation settings, or `None` when no rendering was requested.
    pub fn animation(&self) -> Option<AnimationParams> {
        if !(self.render || self.mp4) {
            return None;
        }
        Some(AnimationParams {
            outputs: AnimationOutputs {
                png_frames: false,
                gif: true,
                mp4: self.mp4,
            },
            ..AnimationParams::default()
        })
    }
}

/// Validates and integrates one run, without touching the file system.
pub fn run_simulation(args: &SimulateArgs) -> Result<Trajectory, Box<dyn std::error::Error>> {
    let pendulum = args.pendulum();
    let initial_state = args.initial_state();
    let window = args.window();
    validate_simulation(&pendulum, &initial_state, &window, ValidationPolicy::Strict)?;

    let trajectory = integrate(&initial_state, &pendulum, window.t_max, window.dt);
    trajectory.check_finite()?;
    Ok(trajectory)
}

/// Runs the `simulate` command: integrates and writes the trajectory, bob
/// positions, optional animation, and diagnostics into `out/simulate/trajectory/`.
pub fn simulate(args: &SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Simulate Stopwatch");
    let pendulum = args.pendulum();
    let trajectory = run_simulation(args)?;
    stopwatch.record_split("integrate");

    let energy_drift = trajectory.max_relative_energy_drift(&pendulum);
    tracing::info!(
        "integrated {} states over {} s; max relative energy drift: {:.3e}",
        trajectory.len(),
        trajectory.t_max(),
        energy_drift
    );

    let file_prefix = FilePrefix {
        directory_path: build_output_path_with_date_time(
            "trajectory",
            "simulate",
            &maybe_date_time_string(args.date_time_out),
        )?,
        file_base: "trajectory".to_owned(),
    };
    let record = SimulationRecord {
        pendulum: &pendulum,
        trajectory: &trajectory,
        frames: project(&trajectory, &pendulum).collect(),
    };
    let path = file_prefix.full_path_with_suffix(".json");
    serialize_to_json(&path, &record)?;
    tracing::info!("wrote trajectory to: {}", path.display());
    stopwatch.record_split("write_json");

    let rendered_frames = match args.animation() {
        Some(animation) => Some(render_animation(
            &trajectory,
            &pendulum,
            &animation,
            &file_prefix,
            &mut stopwatch,
        )?),
        None => None,
    };

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;
    writeln!(diagnostics_file, "Arguments: {:?}", args)?;
    if let Some(state) = trajectory.final_state() {
        writeln!(diagnostics_file, "Final state: {:?}", state)?;
    }
    writeln!(diagnostics_file, "Max relative energy drift: {:e}", energy_drift)?;
    if let Some(frames) = rendered_frames {
        writeln!(diagnostics_file, "Frame times [s]:")?;
        for (index, frame) in frames.iter().enumerate() {
            writeln!(diagnostics_file, "  {}: {:.4}", frame_file_name(index), frame.time)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_args() -> SimulateArgs {
        SimulateArgs {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
            o1: 175.0,
            o2: 175.0,
            w1: 0.0,
            w2: 0.0,
            t_max: 2.0,
            ..SimulateArgs::default()
        }
    }

    #[test]
    fn test_run_simulation_uses_degrees() {
        let trajectory = run_simulation(&default_args()).unwrap();
        assert_eq!(trajectory.len(), 201);
        let first = trajectory.initial_state().unwrap();
        assert_relative_eq!(first.theta_1, 175.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_animation_only_when_requested() {
        assert_eq!(default_args().animation(), None);

        let mut args = default_args();
        args.render = true;
        let animation = args.animation().unwrap();
        assert!(animation.outputs.gif);
        assert!(!animation.outputs.mp4);
        assert!(!animation.outputs.png_frames);

        args.render = false;
        args.mp4 = true;
        assert!(args.animation().unwrap().outputs.mp4);
    }

    #[test]
    fn test_run_simulation_rejects_bad_pendulum() {
        let mut args = default_args();
        args.m2 = 0.0;
        let err = run_simulation(&args).unwrap_err();
        assert!(err.to_string().contains("mass_2"));
    }
}
