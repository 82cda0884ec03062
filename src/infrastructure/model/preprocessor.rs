//! Image preprocessing driven by `preprocessor_config.json`
//!
//! Understands the subset of the Hugging Face image-processor settings used by
//! classification checkpoints: resize, center crop, rescale and per-channel
//! normalization. Produces a channels-first `[1, 3, H, W]` float tensor.
//!
//! A `crop_pct` next to a `shortest_edge` size selects the ConvNeXt-style
//! pipeline used by ResNet and ConvNeXt checkpoints: below 384 pixels the image
//! is resized to `shortest_edge / crop_pct` and center-cropped back to a
//! `shortest_edge` square; from 384 up it is warped straight to that square.

use std::path::Path;

use image::{imageops::FilterType, RgbImage};
use serde::Deserialize;

use crate::domain::DomainError;

pub const PREPROCESSOR_CONFIG_FILE: &str = "preprocessor_config.json";

const CONVNEXT_PROCESSOR: &str = "ConvNextImageProcessor";
const CONVNEXT_DEFAULT_CROP_PCT: f64 = 224.0 / 256.0;
const CONVNEXT_CROP_LIMIT: u32 = 384;

/// Target size as written by image-processor configs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Exact { height: u32, width: u32 },
    ShortestEdge { shortest_edge: u32 },
    Square(u32),
}

/// Mean/std given either per channel or as one value for all channels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChannelValues {
    Scalar(f32),
    PerChannel(Vec<f32>),
}

impl ChannelValues {
    fn resolve(&self, name: &str) -> Result<[f32; 3], DomainError> {
        match self {
            Self::Scalar(v) => Ok([*v; 3]),
            Self::PerChannel(values) => match values.as_slice() {
                [v] => Ok([*v; 3]),
                [r, g, b] => Ok([*r, *g, *b]),
                other => Err(DomainError::model_load(format!(
                    "{} must have 1 or 3 values, got {}",
                    name,
                    other.len()
                ))),
            },
        }
    }
}

/// Raw `preprocessor_config.json` contents
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessorConfig {
    #[serde(default)]
    pub image_processor_type: Option<String>,
    #[serde(default = "default_true")]
    pub do_resize: bool,
    #[serde(default = "default_size")]
    pub size: SizeSpec,
    #[serde(default = "default_resample")]
    pub resample: u8,
    #[serde(default)]
    pub do_center_crop: bool,
    #[serde(default)]
    pub crop_size: Option<SizeSpec>,
    #[serde(default)]
    pub crop_pct: Option<f64>,
    #[serde(default = "default_true")]
    pub do_rescale: bool,
    #[serde(default = "default_rescale_factor")]
    pub rescale_factor: f32,
    #[serde(default = "default_true")]
    pub do_normalize: bool,
    #[serde(default = "default_channel_values")]
    pub image_mean: ChannelValues,
    #[serde(default = "default_channel_values")]
    pub image_std: ChannelValues,
}

fn default_true() -> bool {
    true
}

fn default_size() -> SizeSpec {
    SizeSpec::Exact {
        height: 224,
        width: 224,
    }
}

fn default_resample() -> u8 {
    2
}

fn default_rescale_factor() -> f32 {
    1.0 / 255.0
}

fn default_channel_values() -> ChannelValues {
    ChannelValues::PerChannel(vec![0.5, 0.5, 0.5])
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            image_processor_type: None,
            do_resize: true,
            size: default_size(),
            resample: default_resample(),
            do_center_crop: false,
            crop_size: None,
            crop_pct: None,
            do_rescale: true,
            rescale_factor: default_rescale_factor(),
            do_normalize: true,
            image_mean: default_channel_values(),
            image_std: default_channel_values(),
        }
    }
}

impl PreprocessorConfig {
    /// `crop_pct` as written, or the ConvNeXt processor's built-in default
    fn effective_crop_pct(&self) -> Option<f64> {
        self.crop_pct.or_else(|| {
            (self.image_processor_type.as_deref() == Some(CONVNEXT_PROCESSOR))
                .then_some(CONVNEXT_DEFAULT_CROP_PCT)
        })
    }
}

/// Channels-first pixel tensor for a single image
#[derive(Debug, Clone, PartialEq)]
pub struct PixelValues {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
}

impl PixelValues {
    /// `[batch, channels, height, width]`
    pub fn shape(&self) -> [usize; 4] {
        [1, 3, self.height, self.width]
    }
}

/// Validated preprocessing pipeline
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    resize: Option<SizeSpec>,
    filter: FilterType,
    crop: Option<(u32, u32)>,
    rescale: Option<f32>,
    mean: [f32; 3],
    std: [f32; 3],
    normalize: bool,
}

impl ImagePreprocessor {
    /// Read `preprocessor_config.json` from a model directory
    pub fn from_dir(dir: &Path) -> Result<Self, DomainError> {
        let path = dir.join(PREPROCESSOR_CONFIG_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::model_load(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: PreprocessorConfig = serde_json::from_str(&contents).map_err(|e| {
            DomainError::model_load(format!("invalid {}: {}", path.display(), e))
        })?;

        Self::from_config(&config)
    }

    pub fn from_config(config: &PreprocessorConfig) -> Result<Self, DomainError> {
        let mean = config.image_mean.resolve("image_mean")?;
        let std = config.image_std.resolve("image_std")?;

        if config.do_normalize && std.iter().any(|s| *s == 0.0) {
            return Err(DomainError::model_load("image_std must not contain zero"));
        }

        let (resize, crop) = match (config.do_resize, config.size, config.effective_crop_pct()) {
            (true, SizeSpec::ShortestEdge { shortest_edge }, Some(crop_pct)) => {
                crop_pct_pipeline(shortest_edge, crop_pct)?
            }
            _ => {
                let crop = if config.do_center_crop {
                    let spec = config.crop_size.unwrap_or(config.size);
                    Some(fixed_dimensions(spec).ok_or_else(|| {
                        DomainError::model_load("crop_size must give both height and width")
                    })?)
                } else {
                    None
                };

                (config.do_resize.then_some(config.size), crop)
            }
        };

        Ok(Self {
            resize,
            filter: filter_for(config.resample),
            crop,
            rescale: config.do_rescale.then_some(config.rescale_factor),
            mean,
            std,
            normalize: config.do_normalize,
        })
    }

    /// `(height, width)` of every output, when it does not depend on the input
    pub fn output_size(&self) -> Option<(usize, usize)> {
        let (height, width) = match (self.crop, self.resize) {
            (Some(crop), _) => crop,
            (None, Some(spec)) => fixed_dimensions(spec)?,
            (None, None) => return None,
        };

        Some((height as usize, width as usize))
    }

    pub fn preprocess(&self, image: &RgbImage) -> PixelValues {
        let resized;
        let mut current = image;

        if let Some(spec) = self.resize {
            let (height, width) = resize_target(spec, current.height(), current.width());
            if (height, width) != (current.height(), current.width()) {
                resized = image::imageops::resize(current, width, height, self.filter);
                current = &resized;
            }
        }

        let cropped;
        if let Some((height, width)) = self.crop {
            cropped = center_crop(current, height, width);
            current = &cropped;
        }

        self.to_tensor(current)
    }

    fn to_tensor(&self, image: &RgbImage) -> PixelValues {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let plane = width * height;
        let mut data = vec![0.0f32; 3 * plane];

        for (x, y, pixel) in image.enumerate_pixels() {
            let offset = y as usize * width + x as usize;

            for channel in 0..3 {
                let mut value = f32::from(pixel.0[channel]);

                if let Some(factor) = self.rescale {
                    value *= factor;
                }

                if self.normalize {
                    value = (value - self.mean[channel]) / self.std[channel];
                }

                data[channel * plane + offset] = value;
            }
        }

        PixelValues {
            data,
            height,
            width,
        }
    }
}

/// PIL resample codes
fn filter_for(resample: u8) -> FilterType {
    match resample {
        0 => FilterType::Nearest,
        1 => FilterType::Lanczos3,
        3 => FilterType::CatmullRom,
        _ => FilterType::Triangle,
    }
}

/// Resize and crop steps for a `shortest_edge` size with `crop_pct`
fn crop_pct_pipeline(
    shortest_edge: u32,
    crop_pct: f64,
) -> Result<(Option<SizeSpec>, Option<(u32, u32)>), DomainError> {
    if !(crop_pct > 0.0 && crop_pct <= 1.0) {
        return Err(DomainError::model_load(format!(
            "crop_pct must be in (0, 1], got {}",
            crop_pct
        )));
    }

    if shortest_edge < CONVNEXT_CROP_LIMIT {
        let resize_edge = (f64::from(shortest_edge) / crop_pct) as u32;
        Ok((
            Some(SizeSpec::ShortestEdge {
                shortest_edge: resize_edge,
            }),
            Some((shortest_edge, shortest_edge)),
        ))
    } else {
        Ok((Some(SizeSpec::Square(shortest_edge)), None))
    }
}

fn fixed_dimensions(spec: SizeSpec) -> Option<(u32, u32)> {
    match spec {
        SizeSpec::Exact { height, width } => Some((height, width)),
        SizeSpec::Square(side) => Some((side, side)),
        SizeSpec::ShortestEdge { .. } => None,
    }
}

/// `(height, width)` after resizing an image of the given size
fn resize_target(spec: SizeSpec, height: u32, width: u32) -> (u32, u32) {
    match spec {
        SizeSpec::Exact { height, width } => (height, width),
        SizeSpec::Square(side) => (side, side),
        SizeSpec::ShortestEdge { shortest_edge } => {
            let (short, long) = if width <= height {
                (width, height)
            } else {
                (height, width)
            };
            let scaled_long =
                ((u64::from(shortest_edge) * u64::from(long)) / u64::from(short.max(1))) as u32;

            if width <= height {
                (scaled_long.max(1), shortest_edge)
            } else {
                (shortest_edge, scaled_long.max(1))
            }
        }
    }
}

/// Crop around the center; areas outside the source are zero-padded
fn center_crop(image: &RgbImage, height: u32, width: u32) -> RgbImage {
    let top = (i64::from(image.height()) - i64::from(height)).div_euclid(2);
    let left = (i64::from(image.width()) - i64::from(width)).div_euclid(2);
    let mut out = RgbImage::new(width, height);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let src_x = i64::from(x) + left;
        let src_y = i64::from(y) + top;

        if src_x >= 0
            && src_y >= 0
            && src_x < i64::from(image.width())
            && src_y < i64::from(image.height())
        {
            *pixel = *image.get_pixel(src_x as u32, src_y as u32);
        }
    }

    out
}
