use crate::core::file_io::{
    build_output_path_with_date_time, extract_base_name, maybe_date_time_string, FilePrefix,
};
use crate::pendulum::{animation::render_double_pendulum, common::DoublePendulumParams};

use super::args::ParameterFilePath;

pub fn load_params(params_path: &str) -> Result<DoublePendulumParams, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(params_path)
        .map_err(|err| format!("unable to read param file `{}`: {}", params_path, err))?;
    let params = serde_json::from_str(&text)
        .map_err(|err| format!("unable to parse param file `{}`: {}", params_path, err))?;
    Ok(params)
}

/// Loads a parameter file and renders it into `out/render/<base name>/`.
pub fn render_from_params_file(args: &ParameterFilePath) -> Result<(), Box<dyn std::error::Error>> {
    let params = load_params(&args.params_path)?;
    let file_prefix = FilePrefix {
        directory_path: build_output_path_with_date_time(
            &args.params_path,
            "render",
            &maybe_date_time_string(args.date_time_out),
        )?,
        file_base: extract_base_name(&args.params_path).to_owned(),
    };
    tracing::info!(
        "rendering `{}` into {}",
        args.params_path,
        file_prefix.directory_path.display()
    );
    render_double_pendulum(&params, file_prefix)
}
