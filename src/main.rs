use clap::Parser;
use double_pendulum::cli::{
    args::{CommandsEnum, DoublePendulumArgs},
    render::render_from_params_file,
    simulate::simulate,
};
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: DoublePendulumArgs = DoublePendulumArgs::parse();

    let result = match &args.command_or_default() {
        CommandsEnum::Render(params) => render_from_params_file(params),
        CommandsEnum::Simulate(params) => simulate(params),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::ExitCode::FAILURE
        }
    }
}
