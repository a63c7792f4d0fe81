mod common;

use std::path::Path;

use approx::assert_relative_eq;
use ndarray::Array2;

use ccdred_core::error::CcdError;
use ccdred_core::frame::{CardValue, Frame, Header};
use ccdred_core::io::fits::{read_fits, write_fits, FitsReader};

use common::{build_i16_fits, write_test_fits};

#[test]
fn test_round_trip_f64() {
    let mut header = Header::new();
    header.set("OBJECT", CardValue::Text("m31".into()));
    header.set("EXPTIME", CardValue::Real(10.0));
    header.set("AIRMASS", CardValue::Real(1.23));
    header.set("CCDTEMP", CardValue::Integer(-40));
    header.set("SHUTTER", CardValue::Logical(true));

    let data = Array2::from_shape_vec(
        (2, 3),
        vec![0.0, 1.5, -2.25, 1e6, 1e-6, 42.0],
    )
    .unwrap();
    let frame = Frame::with_header(data, header);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.fits");
    write_fits(&path, &frame).unwrap();

    let loaded = read_fits(&path).unwrap();
    assert_eq!(loaded.data, frame.data);
    assert_eq!(loaded.header.get_text("OBJECT"), Some("m31"));
    assert_eq!(loaded.header.get_real("EXPTIME"), Some(10.0));
    assert_eq!(loaded.header.get_real("AIRMASS"), Some(1.23));
    assert_eq!(loaded.header.get_integer("CCDTEMP"), Some(-40));
    assert_eq!(
        loaded.header.get("SHUTTER"),
        Some(&CardValue::Logical(true))
    );
}

#[test]
fn test_structural_keys_not_carried() {
    let frame = common::constant_frame(2, 2, 1.0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.fits");
    write_fits(&path, &frame).unwrap();

    let loaded = read_fits(&path).unwrap();
    assert!(loaded.header.is_empty());
}

#[test]
fn test_read_i16_with_scaling() {
    let raw = build_i16_fits(
        3,
        2,
        &[0, 1, 2, 3, 4, 5],
        Some(2.0),
        Some(100.0),
        &[],
    );
    let f = write_test_fits(&raw);

    let reader = FitsReader::open(f.path()).unwrap();
    assert_eq!(reader.info.bitpix, 16);
    assert_eq!(reader.info.width, 3);
    assert_eq!(reader.info.height, 2);

    let frame = reader.read_frame().unwrap();
    // value = BZERO + BSCALE * raw, row-major with NAXIS1 fastest
    assert_relative_eq!(frame.data[[0, 0]], 100.0);
    assert_relative_eq!(frame.data[[0, 2]], 104.0);
    assert_relative_eq!(frame.data[[1, 0]], 106.0);
    assert_relative_eq!(frame.data[[1, 2]], 110.0);
}

#[test]
fn test_read_i16_negative_values() {
    let raw = build_i16_fits(2, 1, &[-5, 300], None, None, &[]);
    let f = write_test_fits(&raw);

    let frame = read_fits(f.path()).unwrap();
    assert_relative_eq!(frame.data[[0, 0]], -5.0);
    assert_relative_eq!(frame.data[[0, 1]], 300.0);
}

#[test]
fn test_header_cards_parsed() {
    let raw = build_i16_fits(
        1,
        1,
        &[7],
        None,
        None,
        &[
            "OBJECT  = 'ngc 891'            / target",
            "FILTER  = 'v       '",
            "EXPTIME =                 30.0",
            "COMMENT this card carries no value",
        ],
    );
    let f = write_test_fits(&raw);

    let frame = read_fits(f.path()).unwrap();
    assert_eq!(frame.header.get_text("OBJECT"), Some("ngc 891"));
    assert_eq!(frame.header.get_text("FILTER"), Some("v"));
    assert_eq!(frame.header.get_real("EXPTIME"), Some(30.0));
    assert_eq!(frame.header.get("COMMENT"), None);
}

#[test]
fn test_missing_simple_rejected() {
    let mut raw = build_i16_fits(1, 1, &[0], None, None, &[]);
    raw[0..6].copy_from_slice(b"BROKEN");
    let f = write_test_fits(&raw);

    let err = FitsReader::open(f.path()).unwrap_err();
    assert!(matches!(err, CcdError::InvalidFits(_)));
}

#[test]
fn test_truncated_data_rejected() {
    let raw = build_i16_fits(64, 64, &[1i16; 4096], None, None, &[]);
    let f = write_test_fits(&raw[..raw.len() - 2880]);

    let err = FitsReader::open(f.path()).unwrap_err();
    assert!(matches!(err, CcdError::InvalidFits(_)));
}

#[test]
fn test_file_too_small_rejected() {
    let f = write_test_fits(b"SIMPLE");
    let err = FitsReader::open(f.path()).unwrap_err();
    assert!(matches!(err, CcdError::InvalidFits(_)));
}

#[test]
fn test_missing_file_is_not_found() {
    let err = read_fits(Path::new("/nonexistent/m31_v_10s_001.fits")).unwrap_err();
    assert!(matches!(err, CcdError::NotFound(_)));
}

#[test]
fn test_overwrite_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.fits");

    write_fits(&path, &common::constant_frame(2, 2, 1.0)).unwrap();
    write_fits(&path, &common::constant_frame(2, 2, 9.0)).unwrap();

    let loaded = read_fits(&path).unwrap();
    assert_relative_eq!(loaded.data[[1, 1]], 9.0);
}

#[test]
fn test_multi_block_header() {
    // More than 36 cards forces a second header block.
    let cards: Vec<String> = (0..40)
        .map(|i| format!("CARD{i:<4}= {i:>20}"))
        .collect();
    let refs: Vec<&str> = cards.iter().map(String::as_str).collect();
    let raw = build_i16_fits(1, 1, &[3], None, None, &refs);
    let f = write_test_fits(&raw);

    let frame = read_fits(f.path()).unwrap();
    assert_eq!(frame.header.len(), 40);
    assert_relative_eq!(frame.data[[0, 0]], 3.0);
}
