mod common;

use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use ndarray::Array2;

use ccdred_core::error::CcdError;
use ccdred_core::io::fits::read_fits;
use ccdred_core::pipeline::config::ReductionConfig;
use ccdred_core::pipeline::run_reduction;
use ccdred_core::post::{CosmicRayCleaner, CosmicRayParams};

use common::{constant_frame, write_frame};

/// Lay out a small observing night: three biases (levels 1/3/2), one
/// constant flat in v, two science frames of m31 (v and r).
fn setup_night(data_dir: &Path) {
    write_frame(data_dir, "bias_001.fits", &constant_frame(2, 2, 1.0));
    write_frame(data_dir, "bias_002.fits", &constant_frame(2, 2, 3.0));
    write_frame(data_dir, "bias_003.fits", &constant_frame(2, 2, 2.0));
    write_frame(data_dir, "flat_v_2s_001.fits", &constant_frame(2, 2, 10.0));
    write_frame(data_dir, "m31_v_10s_001.fits", &constant_frame(2, 2, 5.0));
    write_frame(data_dir, "m31_r_10s_001.fits", &constant_frame(2, 2, 7.0));
}

fn night_config(data_dir: &Path) -> ReductionConfig {
    ReductionConfig {
        data_dir: data_dir.to_path_buf(),
        output_dir: data_dir.join("processed"),
        object: "m31".into(),
        filters: vec!["v".into(), "r".into()],
        reshape: None,
        cosmic_ray: CosmicRayParams::default(),
    }
}

#[test]
fn test_full_reduction() {
    let dir = tempfile::tempdir().unwrap();
    setup_night(dir.path());

    let summary = run_reduction(&night_config(dir.path()), None).unwrap();
    let out = dir.path().join("processed");

    // Master bias is the elementwise median of 1/3/2.
    let bias = read_fits(&out.join("master_bias.fits")).unwrap();
    assert_relative_eq!(bias.data[[0, 0]], 2.0);
    assert_relative_eq!(bias.data[[1, 1]], 2.0);

    // Constant flat normalizes to ones.
    let flat = read_fits(&out.join("normalised_flat_v.fits")).unwrap();
    assert_relative_eq!(flat.data[[0, 0]], 1.0);

    // No flats for r: filter skipped, not fatal.
    assert_eq!(summary.flats.len(), 1);
    assert!(!out.join("normalised_flat_r.fits").exists());

    // Both science frames are bias-corrected.
    assert_eq!(summary.bias_corrected.len(), 2);
    let v_corr = read_fits(&out.join("biascorr_m31_v_10s_001.fits")).unwrap();
    assert_relative_eq!(v_corr.data[[0, 0]], 3.0);

    // Only the v frame is flat-corrected; dividing by ones keeps 3.
    assert_eq!(summary.flat_corrected.len(), 1);
    let v_flat = read_fits(&out.join("flatcorr_biascorr_m31_v_10s_001.fits")).unwrap();
    assert_relative_eq!(v_flat.data[[1, 0]], 3.0);

    // No reshape and no cosmic-ray capability were configured.
    assert!(summary.reshaped.is_empty());
    assert!(summary.cosmic_cleaned.is_empty());
    assert_eq!(summary.final_products(), &summary.flat_corrected[..]);
}

#[test]
fn test_reduction_with_reshape() {
    let dir = tempfile::tempdir().unwrap();
    setup_night(dir.path());

    let mut config = night_config(dir.path());
    config.reshape = Some([1, 4]);

    let summary = run_reduction(&config, None).unwrap();
    assert_eq!(summary.reshaped.len(), 1);

    let reshaped = read_fits(&summary.reshaped[0]).unwrap();
    assert_eq!(reshaped.data.dim(), (1, 4));
    assert_relative_eq!(reshaped.data[[0, 3]], 3.0);
}

#[test]
fn test_reshape_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    setup_night(dir.path());

    let mut config = night_config(dir.path());
    config.reshape = Some([3, 3]);

    let err = run_reduction(&config, None).unwrap_err();
    assert!(matches!(err, CcdError::Reshape { .. }));
}

struct NoOpCleaner;

impl CosmicRayCleaner for NoOpCleaner {
    fn clean(
        &self,
        data: &Array2<f64>,
        _params: &CosmicRayParams,
    ) -> (Array2<bool>, Array2<f64>) {
        (Array2::from_elem(data.dim(), false), data.clone())
    }
}

#[test]
fn test_reduction_with_cosmic_ray_capability() {
    let dir = tempfile::tempdir().unwrap();
    setup_night(dir.path());

    let summary = run_reduction(&night_config(dir.path()), Some(Arc::new(NoOpCleaner))).unwrap();

    assert_eq!(summary.cosmic_cleaned.len(), 1);
    let cleaned = read_fits(
        &dir.path()
            .join("processed")
            .join("crcorr_flatcorr_biascorr_m31_v_10s_001.fits"),
    )
    .unwrap();
    assert_relative_eq!(cleaned.data[[0, 0]], 3.0);
    assert_eq!(summary.final_products(), &summary.cosmic_cleaned[..]);
}

#[test]
fn test_no_bias_frames_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "m31_v_10s_001.fits", &constant_frame(2, 2, 5.0));

    let err = run_reduction(&night_config(dir.path()), None).unwrap_err();
    assert!(matches!(err, CcdError::EmptyInput));
}

#[test]
fn test_missing_data_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReductionConfig::new(
        "/nonexistent/night1".into(),
        dir.path().join("processed"),
        "m31".into(),
    );
    let err = run_reduction(&config, None).unwrap_err();
    assert!(matches!(err, CcdError::NotFound(_)));
}

#[test]
fn test_shape_mismatch_across_biases_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "bias_001.fits", &constant_frame(2, 2, 1.0));
    write_frame(dir.path(), "bias_002.fits", &constant_frame(4, 4, 1.0));
    write_frame(dir.path(), "m31_v_10s_001.fits", &constant_frame(2, 2, 5.0));

    let err = run_reduction(&night_config(dir.path()), None).unwrap_err();
    assert!(matches!(err, CcdError::ShapeMismatch { .. }));
}
