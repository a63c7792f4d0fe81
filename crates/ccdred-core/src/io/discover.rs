use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::{CcdError, Result};
use crate::frame::FrameKind;

/// Parsed filename following the observing convention:
/// `bias_<frame>.fits`, `flat_<filter>_<exptime>_<frame>.fits`,
/// `<object>_<filter>_<exptime>_<frame>.fits`, all lowercase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameName {
    pub kind: FrameKind,
    pub object: Option<String>,
    pub filter: Option<String>,
}

/// Parse a file stem against the naming convention.
///
/// Object names may themselves contain underscores; the trailing three
/// components are always filter, exposure time and frame number.
pub fn parse_name(stem: &str) -> Option<FrameName> {
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.as_slice() {
        ["bias", _frame] => Some(FrameName {
            kind: FrameKind::Bias,
            object: None,
            filter: None,
        }),
        ["flat", filter, _exptime, _frame] => Some(FrameName {
            kind: FrameKind::Flat,
            object: None,
            filter: Some((*filter).to_string()),
        }),
        [object @ .., filter, _exptime, _frame] if !object.is_empty() => Some(FrameName {
            kind: FrameKind::Science,
            object: Some(object.join("_")),
            filter: Some((*filter).to_string()),
        }),
        _ => None,
    }
}

fn is_fits(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("fits" | "fit")
    )
}

/// List FITS files in a directory whose names satisfy `keep`, in
/// natural filename order.
fn scan(dir: &Path, keep: impl Fn(&FrameName) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CcdError::NotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_fits(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if parse_name(stem).is_some_and(|name| keep(&name)) {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(paths)
}

/// All bias frames in a directory.
pub fn find_bias(dir: &Path) -> Result<Vec<PathBuf>> {
    scan(dir, |name| name.kind == FrameKind::Bias)
}

/// All flat frames for one filter.
pub fn find_flats(dir: &Path, filter: &str) -> Result<Vec<PathBuf>> {
    scan(dir, |name| {
        name.kind == FrameKind::Flat && name.filter.as_deref() == Some(filter)
    })
}

/// All science frames for an object, across filters.
pub fn find_science(dir: &Path, object: &str) -> Result<Vec<PathBuf>> {
    scan(dir, |name| {
        name.kind == FrameKind::Science && name.object.as_deref() == Some(object)
    })
}

/// Compare strings with digit runs ordered numerically, so frame_10
/// sorts after frame_2 regardless of zero padding.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_number(&mut ai);
                    let nb = take_number(&mut bi);
                    match na.cmp(&nb) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    match ca.cmp(&cb) {
                        Ordering::Equal => {
                            ai.next();
                            bi.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(iter: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = iter.peek().copied() {
        let Some(d) = c.to_digit(10) else { break };
        n = n.saturating_mul(10).saturating_add(d as u64);
        iter.next();
    }
    n
}
