//! Folder discovery, raw export loading and curve persistence.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};

use crate::columns;
use crate::curve::Curve;
use crate::error::{DqdvError, Result};
use crate::record::{RawRecord, RawRow, SegmentKind};

const FOLDER_PREFIX: &str = "Cycle ";
const DATA_EXTENSION: &str = "csv";

/// Kind of a persisted curve; the first part of its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Preprocessed,
    Smoothed,
    PreForIntegrate,
}

impl CurveKind {
    pub const ALL: [CurveKind; 3] = [
        CurveKind::Preprocessed,
        CurveKind::Smoothed,
        CurveKind::PreForIntegrate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Preprocessed => "preprocessed",
            CurveKind::Smoothed => "smoothed",
            CurveKind::PreForIntegrate => "pre_for_integrate",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveKind {
    type Err = DqdvError;

    fn from_str(s: &str) -> Result<Self> {
        CurveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DqdvError::InvalidParameter {
                what: "curve kind",
                value: s.to_string(),
            })
    }
}

/// `{kind}_folder_{folder:04}_cycle_{cycle:04}_{charge|discharge}.csv`
pub fn curve_file_name(kind: CurveKind, folder: u32, cycle: u32, segment: SegmentKind) -> String {
    format!("{kind}_folder_{folder:04}_cycle_{cycle:04}_{segment}.csv")
}

/// Maps folder numbers to the data file of each `Cycle N` directory under `base`.
///
/// Directories without a data file are skipped with a warning; when a directory
/// holds several, the first by name is used.
pub fn build_cycle_file_map<P: AsRef<Path>>(base: P) -> Result<BTreeMap<u32, PathBuf>> {
    let base = base.as_ref();
    if !base.is_dir() {
        return Err(DqdvError::FileNotFound(base.to_path_buf()));
    }

    let mut map = BTreeMap::new();
    for entry in fs::read_dir(base)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(folder) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(FOLDER_PREFIX))
            .and_then(|number| number.trim().parse::<u32>().ok())
        else {
            continue;
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == DATA_EXTENSION))
            .collect();
        files.sort();

        match files.len() {
            0 => {
                warn!("no .{DATA_EXTENSION} file found in {}", path.display());
                continue;
            }
            1 => {}
            n => warn!(
                "{n} data files found in {}, using {}",
                path.display(),
                files[0].display()
            ),
        }
        map.insert(folder, files.swap_remove(0));
    }

    Ok(map)
}

/// Loads a raw cycling export with the standard column headers.
pub fn read_raw_record<P: AsRef<Path>>(path: P) -> Result<RawRecord> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DqdvError::FileNotFound(path.to_path_buf()));
    }
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr
        .deserialize::<RawRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RawRecord::new(rows))
}

/// Loads the raw record of `folder` from a map built by [`build_cycle_file_map`].
pub fn read_folder(folder: u32, map: &BTreeMap<u32, PathBuf>) -> Result<RawRecord> {
    let path = map.get(&folder).ok_or(DqdvError::FolderNotFound(folder))?;
    read_raw_record(path)
}

/// Column headers of a curve, in file order.
fn curve_headers(curve: &Curve) -> Vec<&'static str> {
    let mut headers = vec![
        columns::TEST_TIME,
        columns::CURRENT,
        curve.kind.capacity_column(),
    ];
    if curve.interpolated_voltage.is_some() {
        headers.push(columns::INTERPOLATED_VOLTAGE);
    }
    headers.extend([columns::DV_DQ, columns::DQ_DV, columns::SMOOTHED_VOLTAGE]);
    headers
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Writes a curve as CSV; `NaN` becomes an empty cell.
pub fn write_curve<P: AsRef<Path>>(path: P, curve: &Curve) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(curve_headers(curve))?;

    for i in 0..curve.len() {
        let mut record = vec![curve.time[i], curve.current[i], curve.capacity[i]];
        if let Some(interpolated) = &curve.interpolated_voltage {
            record.push(interpolated[i]);
        }
        record.extend([curve.dv_dq[i], curve.dq_dv[i], curve.voltage[i]]);
        wtr.write_record(record.into_iter().map(format_value))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Reads a curve written by [`write_curve`]. The capacity header decides the
/// curve's kind; empty cells read back as `NaN`.
pub fn read_curve<P: AsRef<Path>>(path: P) -> Result<Curve> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DqdvError::FileNotFound(path.to_path_buf()));
    }
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let kind = SegmentKind::ALL
        .into_iter()
        .find(|kind| index_of(kind.capacity_column()).is_some())
        .ok_or_else(|| DqdvError::MissingColumn(columns::CHARGE_CAPACITY.to_string()))?;

    let required =
        |name: &str| index_of(name).ok_or_else(|| DqdvError::MissingColumn(name.to_string()));
    let wanted = [
        required(columns::TEST_TIME)?,
        required(columns::CURRENT)?,
        required(kind.capacity_column())?,
        required(columns::DV_DQ)?,
        required(columns::DQ_DV)?,
        required(columns::SMOOTHED_VOLTAGE)?,
    ];
    let interpolated_index = index_of(columns::INTERPOLATED_VOLTAGE);

    let mut values: [Vec<f64>; 6] = Default::default();
    let mut interpolated = interpolated_index.map(|_| Vec::new());

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let parse = |index: usize| -> Result<f64> {
            let field = record.get(index).unwrap_or("").trim();
            if field.is_empty() {
                return Ok(f64::NAN);
            }
            field.parse::<f64>().map_err(|_| DqdvError::InvalidValue {
                column: headers.get(index).unwrap_or_default().to_string(),
                row,
                value: field.to_string(),
            })
        };

        for (column, &index) in values.iter_mut().zip(&wanted) {
            column.push(parse(index)?);
        }
        if let (Some(column), Some(index)) = (interpolated.as_mut(), interpolated_index) {
            column.push(parse(index)?);
        }
    }

    let [time, current, capacity, dv_dq, dq_dv, voltage] = values;
    Ok(Curve {
        kind,
        time,
        current,
        capacity,
        interpolated_voltage: interpolated,
        dv_dq,
        dq_dv,
        voltage,
    })
}

/// Saves `curve` under the standard file name in `dir` and returns its path.
pub fn save_curve<P: AsRef<Path>>(
    dir: P,
    kind: CurveKind,
    folder: u32,
    cycle: u32,
    curve: &Curve,
) -> Result<PathBuf> {
    let path = dir
        .as_ref()
        .join(curve_file_name(kind, folder, cycle, curve.kind));
    write_curve(&path, curve)?;
    info!("saved {kind} curve to {}", path.display());
    Ok(path)
}

/// Loads a curve saved by [`save_curve`].
pub fn load_curve<P: AsRef<Path>>(
    dir: P,
    kind: CurveKind,
    folder: u32,
    cycle: u32,
    segment: SegmentKind,
) -> Result<Curve> {
    read_curve(dir.as_ref().join(curve_file_name(kind, folder, cycle, segment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_convention() {
        assert_eq!(
            curve_file_name(CurveKind::Preprocessed, 3, 12, SegmentKind::Discharge),
            "preprocessed_folder_0003_cycle_0012_discharge.csv"
        );
        assert_eq!(
            curve_file_name(CurveKind::PreForIntegrate, 12345, 0, SegmentKind::Charge),
            "pre_for_integrate_folder_12345_cycle_0000_charge.csv"
        );
    }

    #[test]
    fn test_curve_kind_parsing() {
        assert_eq!("smoothed".parse::<CurveKind>().unwrap(), CurveKind::Smoothed);
        let err = "raw".parse::<CurveKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid curve kind: 'raw'");
    }

    #[test]
    fn test_headers_follow_kind() {
        let curve = Curve {
            kind: SegmentKind::Discharge,
            time: vec![],
            current: vec![],
            capacity: vec![],
            interpolated_voltage: None,
            dv_dq: vec![],
            dq_dv: vec![],
            voltage: vec![],
        };
        let headers = curve_headers(&curve);
        assert_eq!(headers[2], columns::DISCHARGE_CAPACITY);
        assert!(!headers.contains(&columns::INTERPOLATED_VOLTAGE));
        assert_eq!(headers.last(), Some(&columns::SMOOTHED_VOLTAGE));
    }

    #[test]
    fn test_missing_folder_is_lookup_failure() {
        let map = BTreeMap::new();
        assert!(matches!(read_folder(4, &map), Err(DqdvError::FolderNotFound(4))));
    }

    #[test]
    fn test_missing_curve_file() {
        let dir = std::env::temp_dir().join("battery-dqdv-io-missing");
        let result = load_curve(&dir, CurveKind::Smoothed, 1, 1, SegmentKind::Charge);
        assert!(matches!(result, Err(DqdvError::FileNotFound(_))));
    }
}
