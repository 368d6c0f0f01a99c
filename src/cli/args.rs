use clap::{Args, Parser, Subcommand};

use crate::pendulum::validation::{validate_duration, validate_time_step};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct DoublePendulumArgs {
    #[command(subcommand)]
    pub command: Option<CommandsEnum>,
}

#[derive(Debug, Subcommand)]
pub enum CommandsEnum {
    /// Render an animation from a JSON parameter file.
    Render(ParameterFilePath),
    /// Integrate a single run from command-line values and save the trajectory.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
pub struct ParameterFilePath {
    pub params_path: String,

    #[clap(long, short)]
    pub date_time_out: bool,
}

fn parse_duration(text: &str) -> Result<f64, String> {
    let value: f64 = text.parse().map_err(|err| format!("{}", err))?;
    validate_duration(value).map_err(|err| err.to_string())
}

fn parse_time_step(text: &str) -> Result<f64, String> {
    let value: f64 = text.parse().map_err(|err| format!("{}", err))?;
    validate_time_step(value).map_err(|err| err.to_string())
}

/// Angles in degrees, rates in degrees per second.
#[derive(Debug, Args, Clone, PartialEq)]
pub struct SimulateArgs {
    /// Rod length of the first pendulum [m].
    #[clap(long, default_value_t = 1.0)]
    pub l1: f64,
    /// Rod length of the second pendulum [m].
    #[clap(long, default_value_t = 1.0)]
    pub l2: f64,
    /// Mass of the first bob [kg].
    #[clap(long, default_value_t = 1.0)]
    pub m1: f64,
    /// Mass of the second bob [kg].
    #[clap(long, default_value_t = 1.0)]
    pub m2: f64,
    /// Initial angle of the first rod [deg].
    #[clap(long, default_value_t = 175.0, allow_negative_numbers = true)]
    pub o1: f64,
    /// Initial angle of the second rod [deg].
    #[clap(long, default_value_t = 175.0, allow_negative_numbers = true)]
    pub o2: f64,
    /// Initial angular velocity of the first rod [deg/s].
    #[clap(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub w1: f64,
    /// Initial angular velocity of the second rod [deg/s].
    #[clap(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub w2: f64,
    /// Simulated duration [s], must exceed 1 s.
    #[clap(long, alias = "t_max", default_value_t = 60.0, value_parser = parse_duration)]
    pub t_max: f64,
    /// Integration step [s], at most 0.01 s.
    #[clap(long, default_value_t = 0.01, value_parser = parse_time_step)]
    pub dt: f64,
    /// Write the outputs into a date-time stamped sub-directory.
    #[clap(long, short)]
    pub date_time_out: bool,
    /// Also render the run as a looping GIF with the default animation settings.
    #[clap(long)]
    pub render: bool,
    /// Also encode an MP4 (requires `ffmpeg`). Implies `--render`.
    #[clap(long)]
    pub mp4: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        SimulateArgs {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
            o1: 175.0,
            o2: 175.0,
            w1: 0.0,
            w2: 0.0,
            t_max: 60.0,
            dt: 0.01,
            date_time_out: false,
            render: false,
            mp4: false,
        }
    }
}

impl DoublePendulumArgs {
    /// The requested command. With none given, simulates and renders the
    /// default pendulum.
    pub fn command_or_default(self) -> CommandsEnum {
        self.command.unwrap_or_else(|| {
            CommandsEnum::Simulate(SimulateArgs {
                render: true,
                ..SimulateArgs::default()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_simulate(extra: &[&str]) -> Result<SimulateArgs, clap::Error> {
        let argv = ["double-pendulum", "simulate"].iter().chain(extra.iter());
        DoublePendulumArgs::try_parse_from(argv).map(|args| match args.command {
            Some(CommandsEnum::Simulate(inner)) => inner,
            other => panic!("unexpected command: {:?}", other),
        })
    }

    #[test]
    fn test_simulate_defaults() {
        let args = parse_simulate(&[]).unwrap();
        assert_eq!(
            (args.l1, args.l2, args.m1, args.m2),
            (1.0, 1.0, 1.0, 1.0)
        );
        assert_eq!((args.o1, args.o2, args.w1, args.w2), (175.0, 175.0, 0.0, 0.0));
        assert_eq!((args.t_max, args.dt), (60.0, 0.01));
        assert!(!args.date_time_out);
    }

    #[test]
    fn test_simulate_defaults_match_default_impl() {
        assert_eq!(parse_simulate(&[]).unwrap(), SimulateArgs::default());
        let args = parse_simulate(&["--render", "--mp4"]).unwrap();
        assert!(args.render && args.mp4);
    }

    #[test]
    fn test_no_command_renders_default_pendulum() {
        let args = DoublePendulumArgs::try_parse_from(["double-pendulum"]).unwrap();
        match args.command_or_default() {
            CommandsEnum::Simulate(inner) => {
                assert!(inner.render);
                assert!(!inner.mp4);
                assert_eq!(
                    inner,
                    SimulateArgs {
                        render: true,
                        ..SimulateArgs::default()
                    }
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_simulate_explicit_values() {
        let args = parse_simulate(&[
            "--l1", "2.", "--l2", "2.0000000", "--m1", "2", "--m2", "2.00", "--o1", "-2.", "--o2",
            "2", "--w1", "2.0", "--w2", "2.0", "--t_max", "2", "--dt", "0.00999999",
        ])
        .unwrap();
        assert_eq!((args.l1, args.l2, args.m1, args.m2), (2.0, 2.0, 2.0, 2.0));
        assert_eq!((args.o1, args.o2, args.w1, args.w2), (-2.0, 2.0, 2.0, 2.0));
        assert_eq!((args.t_max, args.dt), (2.0, 0.00999999));
    }

    #[test]
    fn test_simulate_rejects_bad_input() {
        assert!(parse_simulate(&["--t-max", "This_will_cause_an_error."]).is_err());
        assert!(parse_simulate(&["--t-max", "1.000"]).is_err());
        assert!(parse_simulate(&["--dt", "0.010001"]).is_err());
        assert!(parse_simulate(&["--dt", "0"]).is_err());
    }

    #[test]
    fn test_render_args() {
        let args =
            DoublePendulumArgs::try_parse_from(["double-pendulum", "render", "demos/default.json", "-d"])
                .unwrap();
        match args.command {
            Some(CommandsEnum::Render(inner)) => {
                assert_eq!(inner.params_path, "demos/default.json");
                assert!(inner.date_time_out);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
