use serde::{Deserialize, Serialize};
use std::path::Path;

/**
 * Fully specifies an image resolution and how it is anchored in the "real" space
 * of the scene being drawn. The height in real space follows from the aspect ratio
 * of the image and the specified width.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageSpecification {
    pub resolution: nalgebra::Vector2<u32>,
    pub center: nalgebra::Vector2<f64>,
    pub width: f64,
}

impl ImageSpecification {
    pub fn height(&self) -> f64 {
        self.width * (self.resolution[1] as f64) / (self.resolution[0] as f64)
    }
}

/**
 * Describes a rectangular region in space.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ViewRectangle {
    pub center: nalgebra::Vector2<f64>,
    pub dimensions: nalgebra::Vector2<f64>,
}

impl ViewRectangle {
    /// Smallest square that contains a disc of `radius` around `center`.
    pub fn around_disc(center: nalgebra::Vector2<f64>, radius: f64) -> ViewRectangle {
        assert!(radius > 0.0);
        ViewRectangle {
            center,
            dimensions: nalgebra::Vector2::new(2.0 * radius, 2.0 * radius),
        }
    }
}

/**
 * Lets the user specify only the resolution of the image and how much extra space
 * to leave around the subject. Real-space coordinates are derived from the view.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FitImage {
    pub resolution: nalgebra::Vector2<u32>,
    pub padding_scale: f64,
}

impl FitImage {
    pub fn image_specification(&self, view_rectangle: &ViewRectangle) -> ImageSpecification {
        let pixel_height = self.resolution[1] as f64;
        let pixel_width = self.resolution[0] as f64;
        let dims_height = view_rectangle.dimensions[1];
        let dims_width = view_rectangle.dimensions[0];

        let aspect_ratio = pixel_height / pixel_width; // of the rendered image
        let selected_width = if aspect_ratio > (dims_height / dims_width) {
            dims_width
        } else {
            dims_height / aspect_ratio
        };

        ImageSpecification {
            resolution: self.resolution,
            center: view_rectangle.center,
            width: self.padding_scale * selected_width,
        }
    }
}

/**
 * Affine map between a pixel index and a real-space coordinate along one axis.
 */
#[derive(Clone, Debug)]
pub struct LinearPixelMap {
    offset: f64,
    slope: f64,
}

impl LinearPixelMap {
    /**
     * @param n: number of pixels spanned by [x0,x1]
     * @param x0: output of the map at 0
     * @param x1: output of the map at n-1
     */
    pub fn new(n: u32, x0: f64, x1: f64) -> LinearPixelMap {
        assert!(n > 1);
        let offset = x0;
        let slope = (x1 - x0) / ((n - 1) as f64);
        LinearPixelMap { offset, slope }
    }

    pub fn new_from_center_and_width(n: u32, center: f64, width: f64) -> LinearPixelMap {
        LinearPixelMap::new(n, center - 0.5 * width, center + 0.5 * width)
    }

    // Map from pixel (integer) to point (float)
    pub fn map(&self, index: u32) -> f64 {
        self.offset + self.slope * (index as f64)
    }

    // Map from point to fractional pixel coordinate
    pub fn inverse_map(&self, point: f64) -> f64 {
        (point - self.offset) / self.slope
    }
}

/**
 * Maps between real space and image space. Image rows grow downward, so the
 * vertical axis is flipped.
 */
#[derive(Clone, Debug)]
pub struct PixelMapper {
    width: LinearPixelMap,
    height: LinearPixelMap,
}

impl PixelMapper {
    pub fn new(image_specification: &ImageSpecification) -> PixelMapper {
        PixelMapper {
            width: LinearPixelMap::new_from_center_and_width(
                image_specification.resolution[0],
                image_specification.center[0],
                image_specification.width,
            ),
            height: LinearPixelMap::new_from_center_and_width(
                image_specification.resolution[1],
                image_specification.center[1],
                -image_specification.height(),
            ),
        }
    }

    /// Fractional pixel coordinate of a real-space point.
    pub fn inverse_map(&self, point: &nalgebra::Vector2<f64>) -> nalgebra::Vector2<f64> {
        nalgebra::Vector2::new(
            self.width.inverse_map(point[0]),
            self.height.inverse_map(point[1]),
        )
    }

    pub fn map(&self, pixel: &(u32, u32)) -> nalgebra::Vector2<f64> {
        let (x, y) = pixel;
        nalgebra::Vector2::new(self.width.map(*x), self.height.map(*y))
    }
}

/// Saves an image, logging where it went. The format follows the file extension.
pub fn write_image_to_file(image: &image::RgbImage, path: &Path) -> image::ImageResult<()> {
    image.save(path)?;
    tracing::debug!("wrote image file to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_image_specification_height() {
        let image_specification = ImageSpecification {
            resolution: nalgebra::Vector2::new(5, 23),
            center: nalgebra::Vector2::new(2.6, 3.4),
            width: 8.5,
        };

        // The `height` is defined S.T. that aspect ratio is identical in both the image and the regular space.
        let aspect_ratio = image_specification.width / image_specification.height();
        let pixel_aspect_ratio =
            (image_specification.resolution[0] as f64) / (image_specification.resolution[1] as f64);
        assert_relative_eq!(aspect_ratio, pixel_aspect_ratio, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_image_wide_frame() {
        // A square subject in a wide image is limited by its height.
        let fit = FitImage {
            resolution: nalgebra::Vector2::new(400, 200),
            padding_scale: 1.1,
        };
        let view = ViewRectangle::around_disc(nalgebra::Vector2::new(0.0, 0.0), 2.0);
        let spec = fit.image_specification(&view);
        assert_relative_eq!(spec.height(), 4.4, epsilon = 1e-12);
        assert_relative_eq!(spec.width, 8.8, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_pixel_map_round_trip() {
        let pixel_map = LinearPixelMap::new(11, 1.23, -0.05);
        let tol = 1e-9;
        assert_relative_eq!(pixel_map.map(0), 1.23, epsilon = tol);
        assert_relative_eq!(pixel_map.map(10), -0.05, epsilon = tol);
        assert_relative_eq!(pixel_map.inverse_map(pixel_map.map(7)), 7.0, epsilon = tol);
    }

    #[test]
    fn test_pixel_mapper_flips_vertical_axis() {
        let spec = ImageSpecification {
            resolution: nalgebra::Vector2::new(101, 101),
            center: nalgebra::Vector2::new(0.0, 0.0),
            width: 2.0,
        };
        let mapper = PixelMapper::new(&spec);
        let top_left = mapper.map(&(0, 0));
        assert_relative_eq!(top_left[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(top_left[1], 1.0, epsilon = 1e-12);

        let center = mapper.inverse_map(&nalgebra::Vector2::new(0.0, 0.0));
        assert_relative_eq!(center[0], 50.0, epsilon = 1e-9);
        assert_relative_eq!(center[1], 50.0, epsilon = 1e-9);

        // Points below the origin land in rows below the center.
        let below = mapper.inverse_map(&nalgebra::Vector2::new(0.0, -0.5));
        assert!(below[1] > center[1]);
    }
}
