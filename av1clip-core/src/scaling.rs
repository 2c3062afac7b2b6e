//! Output dimension calculation.
//!
//! Anamorphic sources are first normalized to square pixels by upscaling
//! the smaller axis, then the user's width/height target is applied with a
//! single scale factor so aspect ratio is preserved. Dimensions are rounded
//! to even values, which the AV1 encoder expects for 4:2:0 input.

/// A scale decision for the encode input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePlan {
    pub width: u32,
    pub height: u32,
    /// False when the plan matches the source exactly and no scale filter
    /// is needed.
    pub needs_scale: bool,
}

fn round_even(value: f64) -> u32 {
    ((value / 2.0).round() as u32) * 2
}

/// Computes the output dimensions for a source of `width`x`height` with the
/// given sample aspect ratio and optional user scale target.
pub fn plan_scale(
    width: u32,
    height: u32,
    sample_aspect_ratio: f64,
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> ScalePlan {
    let mut out_width = f64::from(width);
    let mut out_height = f64::from(height);
    let mut needs_scale = false;

    // Normalize anamorphic sources to 1:1 SAR, always upscaling.
    if sample_aspect_ratio > 0.0 && (sample_aspect_ratio - 1.0).abs() > f64::EPSILON {
        needs_scale = true;
        if sample_aspect_ratio < 1.0 {
            out_height /= sample_aspect_ratio;
        } else {
            out_width *= sample_aspect_ratio;
        }
    }

    if target_width.is_some() || target_height.is_some() {
        needs_scale = true;
        let factor = f64::min(
            target_width.map_or(1.0, |w| f64::from(w) / out_width),
            target_height.map_or(1.0, |h| f64::from(h) / out_height),
        );
        out_width *= factor;
        out_height *= factor;
    }

    ScalePlan {
        width: round_even(out_width).max(2),
        height: round_even(out_height).max(2),
        needs_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_pixel_source_unchanged() {
        let plan = plan_scale(1920, 1080, 1.0, None, None);
        assert_eq!(
            plan,
            ScalePlan {
                width: 1920,
                height: 1080,
                needs_scale: false,
            }
        );
    }

    #[test]
    fn height_target_preserves_aspect_ratio() {
        let plan = plan_scale(1920, 1080, 1.0, None, Some(480));
        assert_eq!(plan.width, 854);
        assert_eq!(plan.height, 480);
        assert!(plan.needs_scale);
    }

    #[test]
    fn width_target_preserves_aspect_ratio() {
        let plan = plan_scale(1920, 1080, 1.0, Some(1280), None);
        assert_eq!(plan.width, 1280);
        assert_eq!(plan.height, 720);
    }

    #[test]
    fn anamorphic_source_normalized_before_user_scale() {
        // 1440x1080 with 4:3 sample aspect ratio displays as 1920x1080.
        let plan = plan_scale(1440, 1080, 4.0 / 3.0, None, None);
        assert_eq!(plan.width, 1920);
        assert_eq!(plan.height, 1080);
        assert!(plan.needs_scale);

        let plan = plan_scale(1440, 1080, 4.0 / 3.0, None, Some(540));
        assert_eq!(plan.width, 960);
        assert_eq!(plan.height, 540);
    }

    #[test]
    fn narrow_sample_aspect_ratio_upscales_height() {
        let plan = plan_scale(720, 480, 0.5, None, None);
        assert_eq!(plan.width, 720);
        assert_eq!(plan.height, 960);
    }

    #[test]
    fn single_axis_target_never_upscales() {
        // The unset axis contributes a factor of 1.0, so a target larger
        // than the source leaves the dimensions alone.
        let plan = plan_scale(854, 480, 1.0, Some(1708), None);
        assert_eq!(plan.width, 854);
        assert_eq!(plan.height, 480);
    }
}
