use crate::error::{CcdError, Result};
use crate::frame::Frame;

fn check_shapes(frame: &Frame, reference: &Frame) -> Result<()> {
    let (h, w) = frame.data.dim();
    let (rh, rw) = reference.data.dim();
    if (h, w) != (rh, rw) {
        return Err(CcdError::ShapeMismatch {
            expected_height: h,
            expected_width: w,
            height: rh,
            width: rw,
        });
    }
    Ok(())
}

/// Subtract the master bias from a raw frame.
///
/// The raw frame's header is carried onto the output.
pub fn bias_correct(raw: &Frame, master_bias: &Frame) -> Result<Frame> {
    check_shapes(raw, master_bias)?;
    let data = &raw.data - &master_bias.data;
    Ok(Frame::with_header(data, raw.header.clone()))
}

/// Divide a bias-corrected frame by a normalized flat field.
///
/// Fails with `DivisionByZero` if the flat contains any exact-zero
/// pixel: dividing through would silently produce non-finite values in
/// the output, which points at a defective flat rather than a science
/// problem. The input frame's header is carried onto the output.
pub fn flat_correct(frame: &Frame, flat: &Frame) -> Result<Frame> {
    check_shapes(frame, flat)?;

    if let Some(((row, col), _)) = flat.data.indexed_iter().find(|(_, &v)| v == 0.0) {
        return Err(CcdError::DivisionByZero(format!(
            "flat field has zero pixel at ({row}, {col})"
        )));
    }

    let data = &frame.data / &flat.data;
    Ok(Frame::with_header(data, frame.header.clone()))
}
