use image::{imageops::FilterType, DynamicImage, ImageFormat};
use ndarray::Array4;

use super::error::ClassifierError;

/// Square input resolution used when the model leaves its spatial size dynamic.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Memory layout of the model's image input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[batch, height, width, channels]`, as exported from Keras
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

impl InputLayout {
    /// Infers the layout from a 4-D input shape by locating the 3-channel axis.
    /// Dynamic dimensions are reported as negative values by ONNX Runtime.
    pub fn infer(dims: &[i64]) -> Result<Self, ClassifierError> {
        if dims.len() != 4 {
            return Err(ClassifierError::ModelError(format!(
                "Model input must be 4-D (batch, image), found shape {:?}",
                dims
            )));
        }
        match (dims[1], dims[3]) {
            (_, 3) => Ok(InputLayout::Nhwc),
            (3, _) => Ok(InputLayout::Nchw),
            _ => Err(ClassifierError::ModelError(format!(
                "Cannot find a 3-channel axis in model input shape {:?}",
                dims
            ))),
        }
    }

    /// Returns the static spatial size for this layout, if the model declares one.
    pub fn spatial_size(self, dims: &[i64]) -> Option<u32> {
        let height = match self {
            InputLayout::Nhwc => dims.get(1),
            InputLayout::Nchw => dims.get(2),
        };
        height
            .copied()
            .filter(|&h| h > 0)
            .and_then(|h| u32::try_from(h).ok())
    }

    pub fn shape(self, size: u32) -> [usize; 4] {
        let s = size as usize;
        match self {
            InputLayout::Nhwc => [1, s, s, 3],
            InputLayout::Nchw => [1, 3, s, s],
        }
    }
}

/// Decodes uploaded bytes. Only PNG and JPEG are accepted.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ClassifierError> {
    if bytes.is_empty() {
        return Err(ClassifierError::ValidationError("Uploaded image is empty".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|_| ClassifierError::ImageError("Unrecognized image format".into()))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(ClassifierError::ImageError(format!(
            "Unsupported image format {:?}, expected PNG or JPEG",
            format
        )));
    }
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ClassifierError::ImageError(format!("Failed to decode image: {}", e)))
}

/// Resizes to `size` x `size`, drops any alpha channel, scales intensities to
/// `[0, 1]` and adds a batch dimension of one.
pub fn preprocess(image: &DynamicImage, size: u32, layout: InputLayout) -> Array4<f32> {
    let rgb = image.resize_exact(size, size, FilterType::CatmullRom).to_rgb8();
    let mut input = Array4::<f32>::zeros(layout.shape(size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            match layout {
                InputLayout::Nhwc => input[[0, y, x, c]] = value,
                InputLayout::Nchw => input[[0, c, y, x]] = value,
            }
        }
    }
    input
}

/// Index of the largest value. Ties go to the lowest index.
pub(crate) fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_layout_inference() {
        assert_eq!(InputLayout::infer(&[-1, 224, 224, 3]).unwrap(), InputLayout::Nhwc);
        assert_eq!(InputLayout::infer(&[1, 3, 224, 224]).unwrap(), InputLayout::Nchw);
        assert!(InputLayout::infer(&[1, 224, 224]).is_err());
        assert!(InputLayout::infer(&[1, 4, 224, 224]).is_err());
    }

    #[test]
    fn test_spatial_size() {
        assert_eq!(InputLayout::Nhwc.spatial_size(&[-1, 224, 224, 3]), Some(224));
        assert_eq!(InputLayout::Nchw.spatial_size(&[1, 3, 160, 160]), Some(160));
        assert_eq!(InputLayout::Nhwc.spatial_size(&[-1, -1, -1, 3]), None);
    }

    #[test]
    fn test_preprocess_scales_to_unit_range() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([255, 0, 51])));
        let input = preprocess(&image, 8, InputLayout::Nhwc);
        assert_eq!(input.shape(), &[1, 8, 8, 3]);
        assert!((input[[0, 3, 5, 0]] - 1.0).abs() < 1e-6);
        assert!(input[[0, 3, 5, 1]].abs() < 1e-6);
        assert!((input[[0, 3, 5, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_channels_first() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 255, 0])));
        let input = preprocess(&image, 4, InputLayout::Nchw);
        assert_eq!(input.shape(), &[1, 3, 4, 4]);
        assert!((input[[0, 1, 2, 2]] - 1.0).abs() < 1e-6);
        assert!(input[[0, 0, 2, 2]].abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_drops_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 0])));
        let input = preprocess(&image, 4, InputLayout::Nhwc);
        assert_eq!(input.shape()[3], 3);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_image(&[]), Err(ClassifierError::ValidationError(_))));
        assert!(matches!(decode_image(b"not an image"), Err(ClassifierError::ImageError(_))));
        // GIF magic is recognised but not accepted
        assert!(matches!(decode_image(b"GIF89a\x01\x00\x01\x00"), Err(ClassifierError::ImageError(_))));
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.9]), Some(0));
    }
}
