use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus};

use image::codecs::gif::{GifEncoder, Repeat};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    file_io::{serialize_to_json, FilePrefix},
    image_utils::{write_image_to_file, FitImage, ImageSpecification, PixelMapper, ViewRectangle},
    stopwatch::Stopwatch,
};

use super::{
    common::DoublePendulumParams,
    kinematics::{project, PositionFrame},
    parameters::PendulumParameters,
    trajectory::{integrate, Trajectory},
    validation::{check_finite, ParameterError},
};

fn default_true() -> bool {
    true
}

/// Which files the renderer produces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationOutputs {
    #[serde(default)]
    pub png_frames: bool,
    #[serde(default = "default_true")]
    pub gif: bool,
    #[serde(default)]
    pub mp4: bool,
}

impl Default for AnimationOutputs {
    fn default() -> Self {
        AnimationOutputs {
            png_frames: false,
            gif: true,
            mp4: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnimationParams {
    pub fit_image: FitImage,
    pub frames_per_second: f64,
    pub background_color_rgb: [u8; 3],
    pub rod_color_rgb: [u8; 3],
    pub bob_color_rgb: [u8; 3],
    pub rod_thickness: f64, // [pixels]
    pub bob_radius: f64,    // [pixels]
    #[serde(default)]
    pub outputs: AnimationOutputs,
}

impl Default for AnimationParams {
    fn default() -> Self {
        AnimationParams {
            fit_image: FitImage {
                resolution: nalgebra::Vector2::new(600, 600),
                padding_scale: 1.1,
            },
            frames_per_second: 25.0,
            background_color_rgb: [255, 255, 255],
            rod_color_rgb: [20, 20, 20],
            bob_color_rgb: [200, 30, 30],
            rod_thickness: 2.5,
            bob_radius: 9.0,
            outputs: AnimationOutputs::default(),
        }
    }
}

impl AnimationParams {
    /// Rejects settings that cannot be drawn: no frame rate, a degenerate image,
    /// or negative stroke sizes.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if check_finite("frames_per_second", self.frames_per_second)? <= 0.0 {
            return Err(ParameterError::NonPositiveFrameRate(self.frames_per_second));
        }
        let resolution = self.fit_image.resolution;
        if resolution[0] < 2 || resolution[1] < 2 {
            return Err(ParameterError::ResolutionTooSmall {
                width: resolution[0],
                height: resolution[1],
            });
        }
        if check_finite("padding_scale", self.fit_image.padding_scale)? <= 0.0 {
            return Err(ParameterError::NonPositivePaddingScale(
                self.fit_image.padding_scale,
            ));
        }
        for (name, value) in [
            ("rod_thickness", self.rod_thickness),
            ("bob_radius", self.bob_radius),
        ] {
            if check_finite(name, value)? < 0.0 {
                return Err(ParameterError::NegativeDrawSize { name, value });
            }
        }
        Ok(())
    }
}

/// Number of trajectory entries between consecutive frames so that playback at
/// `frames_per_second` runs in real time.
pub fn frame_stride(frames_per_second: f64, dt: f64) -> usize {
    let stride = (1.0 / (frames_per_second * dt)).round();
    if stride.is_finite() && stride >= 1.0 {
        stride as usize
    } else {
        1
    }
}

/// Distance from `p` to the closed segment `a`-`b`.
fn distance_to_segment(
    p: &nalgebra::Vector2<f64>,
    a: &nalgebra::Vector2<f64>,
    b: &nalgebra::Vector2<f64>,
) -> f64 {
    let ab = b - a;
    let length_sq = ab.norm_squared();
    if length_sq == 0.0 {
        return (p - a).norm();
    }
    let alpha = ((p - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    (p - (a + alpha * ab)).norm()
}

/**
 * Draws a single animation frame: both rods as thick segments and both bobs as
 * filled discs, in pixel space of a view fitted around the reachable disc.
 */
pub struct FrameRenderer {
    image_specification: ImageSpecification,
    pixel_mapper: PixelMapper,
    background: image::Rgb<u8>,
    rod_color: image::Rgb<u8>,
    bob_color: image::Rgb<u8>,
    rod_half_thickness: f64,
    bob_radius: f64,
}

impl FrameRenderer {
    pub fn new(animation: &AnimationParams, pendulum: &PendulumParameters) -> FrameRenderer {
        let view = ViewRectangle::around_disc(nalgebra::Vector2::zeros(), pendulum.reach());
        let image_specification = animation.fit_image.image_specification(&view);
        FrameRenderer {
            pixel_mapper: PixelMapper::new(&image_specification),
            image_specification,
            background: image::Rgb(animation.background_color_rgb),
            rod_color: image::Rgb(animation.rod_color_rgb),
            bob_color: image::Rgb(animation.bob_color_rgb),
            rod_half_thickness: 0.5 * animation.rod_thickness,
            bob_radius: animation.bob_radius,
        }
    }

    pub fn image_specification(&self) -> &ImageSpecification {
        &self.image_specification
    }

    /// Colors every pixel within `radius` of the segment `a`-`b` (all in pixel units).
    fn fill_near_segment(
        &self,
        image: &mut image::RgbImage,
        a: &nalgebra::Vector2<f64>,
        b: &nalgebra::Vector2<f64>,
        radius: f64,
        color: image::Rgb<u8>,
    ) {
        let (width, height) = image.dimensions();
        let clamp_x = |v: f64| v.max(0.0).min((width - 1) as f64) as u32;
        let clamp_y = |v: f64| v.max(0.0).min((height - 1) as f64) as u32;
        let x_low = clamp_x((a[0].min(b[0]) - radius).floor());
        let x_upp = clamp_x((a[0].max(b[0]) + radius).ceil());
        let y_low = clamp_y((a[1].min(b[1]) - radius).floor());
        let y_upp = clamp_y((a[1].max(b[1]) + radius).ceil());

        for x in x_low..=x_upp {
            for y in y_low..=y_upp {
                let p = nalgebra::Vector2::new(x as f64, y as f64);
                if distance_to_segment(&p, a, b) <= radius {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }

    pub fn draw(&self, frame: &PositionFrame) -> image::RgbImage {
        let resolution = self.image_specification.resolution;
        let mut image =
            image::RgbImage::from_pixel(resolution[0], resolution[1], self.background);

        for (start, end) in frame.segments() {
            let a = self.pixel_mapper.inverse_map(&start);
            let b = self.pixel_mapper.inverse_map(&end);
            self.fill_near_segment(&mut image, &a, &b, self.rod_half_thickness, self.rod_color);
        }

        let pivot = self.pixel_mapper.inverse_map(&PositionFrame::pivot());
        self.fill_near_segment(&mut image, &pivot, &pivot, self.rod_half_thickness, self.rod_color);

        for bob in [frame.bob_1, frame.bob_2] {
            let center = self.pixel_mapper.inverse_map(&bob);
            self.fill_near_segment(&mut image, &center, &center, self.bob_radius, self.bob_color);
        }
        image
    }

    /// Draws every frame in parallel, preserving order.
    pub fn draw_all(&self, frames: &[PositionFrame]) -> Vec<image::RgbImage> {
        frames.par_iter().map(|frame| self.draw(frame)).collect()
    }
}

#[derive(Debug, Error)]
pub enum VideoEncoderError {
    #[error("unable to launch `{command}` (is it installed?): {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:05}.png", index)
}

pub fn write_png_frames(images: &[image::RgbImage], directory: &Path) -> image::ImageResult<()> {
    for (index, image) in images.iter().enumerate() {
        write_image_to_file(image, &directory.join(frame_file_name(index)))?;
    }
    Ok(())
}

/// Writes a looping GIF with one frame per image.
pub fn write_gif(
    images: &[image::RgbImage],
    frames_per_second: f64,
    path: &Path,
) -> image::ImageResult<()> {
    let file = std::fs::File::create(path)?;
    let mut encoder = GifEncoder::new(std::io::BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = image::Delay::from_saturating_duration(std::time::Duration::from_secs_f64(
        1.0 / frames_per_second,
    ));
    encoder.encode_frames(images.iter().map(|rgb| {
        let rgba = image::DynamicImage::ImageRgb8(rgb.clone()).to_rgba8();
        image::Frame::from_parts(rgba, 0, 0, delay)
    }))?;
    tracing::debug!("wrote gif file to: {}", path.display());
    Ok(())
}

/// Encodes the numbered PNG frames in `frame_directory` into an MP4 with `ffmpeg`.
pub fn encode_mp4(
    frame_directory: &Path,
    frames_per_second: f64,
    path: &Path,
) -> Result<(), VideoEncoderError> {
    let command = "ffmpeg";
    let status = Command::new(command)
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-framerate")
        .arg(frames_per_second.to_string())
        .arg("-i")
        .arg(frame_directory.join("frame_%05d.png"))
        // yuv420p needs even dimensions.
        .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
        .args(["-pix_fmt", "yuv420p"])
        .arg(path)
        .status()
        .map_err(|source| VideoEncoderError::Launch {
            command: command.to_owned(),
            source,
        })?;
    if !status.success() {
        return Err(VideoEncoderError::Failed {
            command: command.to_owned(),
            status,
        });
    }
    tracing::debug!("wrote mp4 file to: {}", path.display());
    Ok(())
}

/// Frames picked from a trajectory for playback.
pub fn select_frames(
    trajectory: &Trajectory,
    pendulum: &PendulumParameters,
    frames_per_second: f64,
) -> Vec<PositionFrame> {
    project(trajectory, pendulum)
        .step_by(frame_stride(frames_per_second, trajectory.dt()))
        .collect()
}

/**
 * Draws the animation for `trajectory` and writes every requested output under
 * `file_prefix`. Returns the frames that were drawn.
 */
pub fn render_animation(
    trajectory: &Trajectory,
    pendulum: &PendulumParameters,
    animation: &AnimationParams,
    file_prefix: &FilePrefix,
    stopwatch: &mut Stopwatch,
) -> Result<Vec<PositionFrame>, Box<dyn std::error::Error>> {
    animation.validate()?;
    let frames = select_frames(trajectory, pendulum, animation.frames_per_second);
    let renderer = FrameRenderer::new(animation, pendulum);
    let images = renderer.draw_all(&frames);
    tracing::info!(
        "drew {} frames at {}x{}",
        images.len(),
        renderer.image_specification().resolution[0],
        renderer.image_specification().resolution[1]
    );
    stopwatch.record_split("draw_frames");

    let outputs = animation.outputs;
    if outputs.png_frames || outputs.mp4 {
        let frame_directory = file_prefix.create_sub_directory("frames")?;
        write_png_frames(&images, &frame_directory)?;
        stopwatch.record_split("write_png_frames");

        let mut encoded = Ok(());
        if outputs.mp4 {
            let path = file_prefix.full_path_with_suffix(".mp4");
            encoded = encode_mp4(&frame_directory, animation.frames_per_second, &path);
            if encoded.is_ok() {
                tracing::info!("wrote video to: {}", path.display());
                stopwatch.record_split("encode_mp4");
            }
        }
        // The frames only exist for the encoder unless they were requested.
        if !outputs.png_frames {
            std::fs::remove_dir_all(&frame_directory)?;
        }
        encoded?;
    }

    if outputs.gif {
        let path = file_prefix.full_path_with_suffix(".gif");
        write_gif(&images, animation.frames_per_second, &path)?;
        tracing::info!("wrote animation to: {}", path.display());
        stopwatch.record_split("write_gif");
    }

    Ok(frames)
}

/**
 * Full pipeline for one parameter file: validate, integrate, render, and write
 * the parameters and diagnostics next to the outputs.
 */
pub fn render_double_pendulum(
    params: &DoublePendulumParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Double Pendulum Stopwatch");
    params.validate()?;
    serialize_to_json(&file_prefix.full_path_with_suffix(".json"), params)?;
    stopwatch.record_split("setup");

    let initial_state = params.initial_state();
    let trajectory = integrate(
        &initial_state,
        &params.pendulum,
        params.simulation.t_max,
        params.simulation.dt,
    );
    stopwatch.record_split("integrate");
    if let Err(err) = trajectory.check_finite() {
        tracing::error!("{}", err);
        return Err(err.into());
    }
    let energy_drift = trajectory.max_relative_energy_drift(&params.pendulum);
    tracing::info!(
        "integrated {} steps; max relative energy drift: {:.3e}",
        trajectory.step_count(),
        energy_drift
    );

    let frames = render_animation(
        &trajectory,
        &params.pendulum,
        &params.animation,
        &file_prefix,
        &mut stopwatch,
    )?;

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;
    writeln!(diagnostics_file, "Integration steps: {}", trajectory.step_count())?;
    writeln!(diagnostics_file, "Effective dt: {} s", trajectory.dt())?;
    writeln!(diagnostics_file, "Max relative energy drift: {:e}", energy_drift)?;
    writeln!(diagnostics_file, "Frame times [s]:")?;
    for (index, frame) in frames.iter().enumerate() {
        writeln!(diagnostics_file, "  {}: {:.4}", frame_file_name(index), frame.time)?;
    }
    Ok(())
}
