#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;

use ccdred_core::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use ccdred_core::frame::Frame;
use ccdred_core::io::fits::write_fits;

/// Frame with every pixel set to `value`.
pub fn constant_frame(height: usize, width: usize, value: f64) -> Frame {
    Frame::new(Array2::from_elem((height, width), value))
}

/// Frame from row-major values.
pub fn frame_from(height: usize, width: usize, values: &[f64]) -> Frame {
    let data = Array2::from_shape_vec((height, width), values.to_vec())
        .expect("value count matches dimensions");
    Frame::new(data)
}

/// Write a frame into `dir` under `name` and return its path.
pub fn write_frame(dir: &Path, name: &str, frame: &Frame) -> PathBuf {
    let path = dir.join(name);
    write_fits(&path, frame).expect("write test FITS");
    path
}

fn raw_card(text: &str) -> [u8; FITS_CARD_SIZE] {
    let mut card = [b' '; FITS_CARD_SIZE];
    let bytes = text.as_bytes();
    assert!(bytes.len() <= FITS_CARD_SIZE);
    card[..bytes.len()].copy_from_slice(bytes);
    card
}

fn pad_block(buf: &mut Vec<u8>, fill: u8) {
    let rem = buf.len() % FITS_BLOCK_SIZE;
    if rem != 0 {
        buf.resize(buf.len() + FITS_BLOCK_SIZE - rem, fill);
    }
}

/// Build a raw 16-bit integer FITS buffer, values big-endian, with
/// optional BSCALE/BZERO and extra header cards.
pub fn build_i16_fits(
    width: usize,
    height: usize,
    values: &[i16],
    bscale: Option<f64>,
    bzero: Option<f64>,
    extra_cards: &[&str],
) -> Vec<u8> {
    assert_eq!(values.len(), width * height);

    let mut buf = Vec::new();
    buf.extend_from_slice(&raw_card("SIMPLE  =                    T"));
    buf.extend_from_slice(&raw_card("BITPIX  =                   16"));
    buf.extend_from_slice(&raw_card("NAXIS   =                    2"));
    buf.extend_from_slice(&raw_card(&format!("NAXIS1  = {width:>20}")));
    buf.extend_from_slice(&raw_card(&format!("NAXIS2  = {height:>20}")));
    if let Some(bscale) = bscale {
        buf.extend_from_slice(&raw_card(&format!("BSCALE  = {bscale:>20}")));
    }
    if let Some(bzero) = bzero {
        buf.extend_from_slice(&raw_card(&format!("BZERO   = {bzero:>20}")));
    }
    for card in extra_cards {
        buf.extend_from_slice(&raw_card(card));
    }
    buf.extend_from_slice(&raw_card("END"));
    pad_block(&mut buf, b' ');

    for v in values {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    pad_block(&mut buf, 0);
    buf
}

/// Write a raw FITS buffer to a temporary file.
///
/// The file stays alive as long as the returned `NamedTempFile` is not
/// dropped.
pub fn write_test_fits(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write FITS data");
    f.flush().expect("flush");
    f
}
