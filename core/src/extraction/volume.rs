use crate::error::{Result, RtError};
use crate::import::VolumeLoader;
use crate::types::{LoadedVolume, PixelSpacing, Point3, RawSamples, Vector3};
use dicom_object::{open_file, DefaultDicomObject, InMemDicomObject};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use log::debug;
use std::path::PathBuf;

use super::structure_set::lps_to_ras;
use super::tags::{
    get_f64_values, get_pixel_spacing, get_u16_value, BITS_ALLOCATED, GRID_FRAME_OFFSET_VECTOR,
    IMAGE_POSITION_PATIENT, PIXEL_REPRESENTATION,
};

/// Loads multi-frame pixel data into a scalar volume
///
/// Several files are stacked along the frame axis in the order given;
/// geometry is taken from the first file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomVolumeLoader;

impl VolumeLoader for DicomVolumeLoader {
    fn load(&self, files: &[PathBuf]) -> Result<LoadedVolume> {
        let mut volume: Option<LoadedVolume> = None;
        for file in files {
            let dcm = open_file(file).map_err(|e| {
                RtError::VolumeLoad(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let part = load_object(&dcm)?;
            debug!(
                "Loaded {}x{}x{} samples from {}",
                part.dims[0],
                part.dims[1],
                part.dims[2],
                file.display()
            );
            volume = Some(match volume {
                None => part,
                Some(stack) => append_frames(stack, part)?,
            });
        }
        volume.ok_or_else(|| RtError::VolumeLoad("No files to load".to_string()))
    }
}

/// Decodes the pixel data and geometry of a single DICOM file object
///
/// Pixel data goes through the transfer syntax decoders, so encapsulated
/// (RLE, JPEG) doses load like native ones. Samples keep their stored type;
/// no rescale is applied here.
pub fn load_object(dcm: &DefaultDicomObject) -> Result<LoadedVolume> {
    let decoded = dcm
        .decode_pixel_data()
        .map_err(|e| RtError::VolumeLoad(format!("Failed to decode PixelData: {}", e)))?;
    let cols = decoded.columns() as usize;
    let rows = decoded.rows() as usize;
    let frames = (decoded.number_of_frames() as usize).max(1);

    let bits = get_u16_value(dcm, BITS_ALLOCATED).unwrap_or(16);
    let signed = get_u16_value(dcm, PIXEL_REPRESENTATION).unwrap_or(0) == 1;
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let convert_error = |e: dicom_pixeldata::Error| {
        RtError::VolumeLoad(format!("Failed to convert PixelData: {}", e))
    };
    let samples = match (bits, signed) {
        (8, _) => RawSamples::U8(decoded.to_vec_with_options(&options).map_err(convert_error)?),
        (16, false) => RawSamples::U16(decoded.to_vec_with_options(&options).map_err(convert_error)?),
        (16, true) => RawSamples::I16(decoded.to_vec_with_options(&options).map_err(convert_error)?),
        (32, false) => RawSamples::U32(decoded.to_vec_with_options(&options).map_err(convert_error)?),
        (32, true) => RawSamples::I32(decoded.to_vec_with_options(&options).map_err(convert_error)?),
        _ => {
            return Err(RtError::VolumeLoad(format!(
                "Unsupported BitsAllocated: {}",
                bits
            )))
        }
    };

    let expected = rows * cols * frames;
    if samples.len() != expected {
        return Err(RtError::VolumeLoad(format!(
            "PixelData holds {} samples, {} expected",
            samples.len(),
            expected
        )));
    }

    let in_plane = get_pixel_spacing(dcm)
        .transpose()
        .map_err(RtError::VolumeLoad)?
        .unwrap_or(PixelSpacing::new(1.0, 1.0));

    let origin = match get_f64_values(dcm, IMAGE_POSITION_PATIENT).as_deref() {
        Some([x, y, z, ..]) => lps_to_ras(*x, *y, *z),
        _ => Point3::origin(),
    };

    Ok(LoadedVolume {
        dims: [cols, rows, frames],
        samples,
        spacing: Vector3::new(in_plane.x(), in_plane.y(), frame_spacing(dcm)),
        origin,
    })
}

/// Distance between the first two frames, 1 mm when it cannot be derived
fn frame_spacing(dcm: &InMemDicomObject) -> f64 {
    match get_f64_values(dcm, GRID_FRAME_OFFSET_VECTOR).as_deref() {
        Some([first, second, ..]) if (second - first).abs() > 0.0 => (second - first).abs(),
        _ => 1.0,
    }
}

/// Stacks the frames of `part` after those of `stack`
fn append_frames(mut stack: LoadedVolume, part: LoadedVolume) -> Result<LoadedVolume> {
    if stack.dims[0] != part.dims[0] || stack.dims[1] != part.dims[1] {
        return Err(RtError::VolumeLoad(format!(
            "Frame size mismatch: {}x{} vs {}x{}",
            stack.dims[0], stack.dims[1], part.dims[0], part.dims[1]
        )));
    }
    stack.samples = match (stack.samples, part.samples) {
        (RawSamples::U8(mut a), RawSamples::U8(b)) => {
            a.extend(b);
            RawSamples::U8(a)
        }
        (RawSamples::U16(mut a), RawSamples::U16(b)) => {
            a.extend(b);
            RawSamples::U16(a)
        }
        (RawSamples::I16(mut a), RawSamples::I16(b)) => {
            a.extend(b);
            RawSamples::I16(a)
        }
        (RawSamples::U32(mut a), RawSamples::U32(b)) => {
            a.extend(b);
            RawSamples::U32(a)
        }
        (RawSamples::I32(mut a), RawSamples::I32(b)) => {
            a.extend(b);
            RawSamples::I32(a)
        }
        (RawSamples::F32(mut a), RawSamples::F32(b)) => {
            a.extend(b);
            RawSamples::F32(a)
        }
        _ => {
            return Err(RtError::VolumeLoad(
                "Sample type differs between files".to_string(),
            ))
        }
    };
    stack.dims[2] += part.dims[2];
    Ok(stack)
}
