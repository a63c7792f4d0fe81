use std::fs::File;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::error::{CcdError, Result};
use crate::frame::{CardValue, Frame, Header};

/// Keywords that describe the array layout rather than the observation.
/// They are regenerated on write and never carried in `Frame::header`.
const STRUCTURAL_KEYS: &[&str] = &[
    "SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "NAXIS3", "BSCALE", "BZERO", "EXTEND", "END",
];

/// Parsed mandatory keywords of a primary HDU.
#[derive(Clone, Copy, Debug)]
pub struct FitsInfo {
    pub bitpix: i32,
    pub width: usize,
    pub height: usize,
    pub bscale: f64,
    pub bzero: f64,
}

impl FitsInfo {
    /// Bytes per pixel sample.
    pub fn bytes_per_pixel(&self) -> usize {
        (self.bitpix.unsigned_abs() / 8) as usize
    }

    /// Total bytes of the data unit (before block padding).
    pub fn data_byte_size(&self) -> usize {
        self.width * self.height * self.bytes_per_pixel()
    }
}

/// Memory-mapped FITS primary-HDU reader.
///
/// Only single-image files are handled (NAXIS = 2); extensions beyond
/// the primary HDU are ignored. Pixel values are upcast to f64 with
/// BSCALE/BZERO applied, so integer inputs never truncate downstream
/// arithmetic.
#[derive(Debug)]
pub struct FitsReader {
    mmap: Mmap,
    pub info: FitsInfo,
    pub header: Header,
    data_offset: usize,
}

impl FitsReader {
    /// Open a FITS file and parse its primary header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CcdError::NotFound(path.to_path_buf())
            } else {
                CcdError::Io(e)
            }
        })?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < FITS_BLOCK_SIZE {
            return Err(CcdError::InvalidFits(
                "File too small for FITS header".into(),
            ));
        }
        if &mmap[0..6] != b"SIMPLE" {
            return Err(CcdError::InvalidFits("Missing SIMPLE keyword".into()));
        }

        let (info, header, data_offset) = parse_header(&mmap)?;

        let expected = data_offset + info.data_byte_size();
        if mmap.len() < expected {
            return Err(CcdError::InvalidFits(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            info,
            header,
            data_offset,
        })
    }

    /// Decode the data unit into a frame, shape = (NAXIS2, NAXIS1).
    pub fn read_frame(&self) -> Result<Frame> {
        let h = self.info.height;
        let w = self.info.width;
        let bpp = self.info.bytes_per_pixel();
        let raw = &self.mmap[self.data_offset..self.data_offset + self.info.data_byte_size()];

        let mut data = Array2::<f64>::zeros((h, w));
        for row in 0..h {
            for col in 0..w {
                let idx = (row * w + col) * bpp;
                let raw_val = match self.info.bitpix {
                    8 => raw[idx] as f64,
                    16 => BigEndian::read_i16(&raw[idx..idx + 2]) as f64,
                    32 => BigEndian::read_i32(&raw[idx..idx + 4]) as f64,
                    64 => BigEndian::read_i64(&raw[idx..idx + 8]) as f64,
                    -32 => BigEndian::read_f32(&raw[idx..idx + 4]) as f64,
                    -64 => BigEndian::read_f64(&raw[idx..idx + 8]),
                    other => {
                        return Err(CcdError::InvalidFits(format!(
                            "Unsupported BITPIX {other}"
                        )))
                    }
                };
                data[[row, col]] = self.info.bzero + self.info.bscale * raw_val;
            }
        }

        Ok(Frame::with_header(data, self.header.clone()))
    }
}

/// Read a FITS file into a frame.
pub fn read_fits(path: &Path) -> Result<Frame> {
    FitsReader::open(path)?.read_frame()
}

/// Write a frame to a FITS file as 64-bit floats, overwriting any
/// existing file. Header cards from the frame follow the mandatory
/// keywords.
pub fn write_fits(path: &Path, frame: &Frame) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let mut cards: Vec<[u8; FITS_CARD_SIZE]> = Vec::new();
    cards.push(format_card("SIMPLE", &CardValue::Logical(true)));
    cards.push(format_card("BITPIX", &CardValue::Integer(-64)));
    cards.push(format_card("NAXIS", &CardValue::Integer(2)));
    cards.push(format_card("NAXIS1", &CardValue::Integer(w as i64)));
    cards.push(format_card("NAXIS2", &CardValue::Integer(h as i64)));
    for (key, value) in frame.header.iter() {
        if STRUCTURAL_KEYS.contains(&key) {
            continue;
        }
        cards.push(format_card(key, value));
    }
    cards.push(end_card());

    let mut buf: Vec<u8> = Vec::with_capacity(FITS_BLOCK_SIZE);
    for card in &cards {
        buf.extend_from_slice(card);
    }
    pad_to_block(&mut buf, b' ');

    let mut pixel = [0u8; 8];
    for row in 0..h {
        for col in 0..w {
            BigEndian::write_f64(&mut pixel, frame.data[[row, col]]);
            buf.extend_from_slice(&pixel);
        }
    }
    pad_to_block(&mut buf, 0);

    let mut file = File::create(path)?;
    file.write_all(&buf)?;
    Ok(())
}

fn pad_to_block(buf: &mut Vec<u8>, fill: u8) {
    let rem = buf.len() % FITS_BLOCK_SIZE;
    if rem != 0 {
        buf.resize(buf.len() + FITS_BLOCK_SIZE - rem, fill);
    }
}

fn parse_header(buf: &[u8]) -> Result<(FitsInfo, Header, usize)> {
    let mut header = Header::new();
    let mut bitpix: Option<i64> = None;
    let mut naxis: Option<i64> = None;
    let mut naxis1: Option<i64> = None;
    let mut naxis2: Option<i64> = None;
    let mut bscale = 1.0;
    let mut bzero = 0.0;

    let mut offset = 0;
    let mut found_end = false;
    while offset + FITS_CARD_SIZE <= buf.len() {
        let card = &buf[offset..offset + FITS_CARD_SIZE];
        offset += FITS_CARD_SIZE;

        let key = String::from_utf8_lossy(&card[0..8]).trim_end().to_string();
        if key == "END" {
            found_end = true;
            break;
        }
        // COMMENT/HISTORY and blank cards carry no value indicator.
        if key.is_empty() || key == "COMMENT" || key == "HISTORY" || &card[8..10] != b"= " {
            continue;
        }

        let value = parse_card_value(&String::from_utf8_lossy(&card[10..]));
        match key.as_str() {
            "BITPIX" => bitpix = value_as_integer(&value),
            "NAXIS" => naxis = value_as_integer(&value),
            "NAXIS1" => naxis1 = value_as_integer(&value),
            "NAXIS2" => naxis2 = value_as_integer(&value),
            "BSCALE" => bscale = value_as_real(&value).unwrap_or(1.0),
            "BZERO" => bzero = value_as_real(&value).unwrap_or(0.0),
            "SIMPLE" | "EXTEND" => {}
            _ => header.set(&key, value),
        }
    }

    if !found_end {
        return Err(CcdError::InvalidFits("Header has no END card".into()));
    }

    let bitpix =
        bitpix.ok_or_else(|| CcdError::InvalidFits("Missing BITPIX keyword".into()))? as i32;
    let naxis = naxis.ok_or_else(|| CcdError::InvalidFits("Missing NAXIS keyword".into()))?;
    if naxis != 2 {
        return Err(CcdError::InvalidFits(format!(
            "Expected a 2D image (NAXIS = 2), got NAXIS = {naxis}"
        )));
    }
    let width = naxis1.ok_or_else(|| CcdError::InvalidFits("Missing NAXIS1 keyword".into()))?;
    let height = naxis2.ok_or_else(|| CcdError::InvalidFits("Missing NAXIS2 keyword".into()))?;
    if width <= 0 || height <= 0 {
        return Err(CcdError::InvalidFits(format!(
            "Invalid image dimensions {width}x{height}"
        )));
    }

    // Data unit starts at the next 2880-byte boundary after END.
    let data_offset = offset.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;

    Ok((
        FitsInfo {
            bitpix,
            width: width as usize,
            height: height as usize,
            bscale,
            bzero,
        },
        header,
        data_offset,
    ))
}

fn value_as_integer(value: &CardValue) -> Option<i64> {
    match value {
        CardValue::Integer(v) => Some(*v),
        _ => None,
    }
}

fn value_as_real(value: &CardValue) -> Option<f64> {
    match value {
        CardValue::Real(v) => Some(*v),
        CardValue::Integer(v) => Some(*v as f64),
        _ => None,
    }
}

/// Parse the value field of a card (everything after `= `).
fn parse_card_value(raw: &str) -> CardValue {
    let value_part = strip_comment(raw);
    let v = value_part.trim();

    if v.is_empty() {
        return CardValue::None;
    }
    if let Some(stripped) = v.strip_prefix('\'') {
        // FITS strings end at the closing quote; '' escapes a quote.
        let inner = stripped.strip_suffix('\'').unwrap_or(stripped);
        return CardValue::Text(inner.replace("''", "'").trim_end().to_string());
    }
    match v {
        "T" => return CardValue::Logical(true),
        "F" => return CardValue::Logical(false),
        _ => {}
    }
    if let Ok(i) = v.parse::<i64>() {
        return CardValue::Integer(i);
    }
    // Fortran-style exponents use D instead of E.
    if let Ok(f) = v.replace(['D', 'd'], "E").parse::<f64>() {
        return CardValue::Real(f);
    }
    CardValue::Text(v.to_string())
}

/// Cut an inline comment, honoring quotes around the value.
fn strip_comment(raw: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in raw.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '/' if !in_quotes => return &raw[..i],
            _ => {}
        }
    }
    raw
}

fn format_card(key: &str, value: &CardValue) -> [u8; FITS_CARD_SIZE] {
    let body = match value {
        CardValue::Logical(b) => {
            format!("{:<8}= {:>20}", key, if *b { "T" } else { "F" })
        }
        CardValue::Integer(v) => format!("{key:<8}= {v:>20}"),
        CardValue::Real(v) => format!("{:<8}= {:>20}", key, format_real(*v)),
        CardValue::Text(s) => {
            format!("{:<8}= '{:<8}'", key, s.replace('\'', "''"))
        }
        CardValue::None => format!("{key:<8}"),
    };

    let mut card = [b' '; FITS_CARD_SIZE];
    let bytes = body.as_bytes();
    let len = bytes.len().min(FITS_CARD_SIZE);
    card[..len].copy_from_slice(&bytes[..len]);
    card
}

fn end_card() -> [u8; FITS_CARD_SIZE] {
    let mut card = [b' '; FITS_CARD_SIZE];
    card[..3].copy_from_slice(b"END");
    card
}

/// Render a real so it re-parses as a real (never as an integer).
fn format_real(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
