//! Bundled element sets for offline runs and tests.
//!
//! Epoch 2024-08-13 12:00 UTC except the 2008 ISS reference record, which
//! is only used by tests.

use chrono::{DateTime, Utc};

#[cfg(test)]
use crate::orbital::propagation::OrbitalRecord;
use crate::tle::parser::parse_tle_epoch_to_utc;
#[cfg(test)]
use crate::tle::parser::parse_element_set;

pub const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   24226.50000000  .00010000  00000-0  18000-3 0  9994
2 25544  51.6400 260.0000 0006000 120.0000 240.0000 15.50000000470003
";

#[cfg(test)]
pub const ISS_2008_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

pub const HST_TLE: &str = "HST
1 20580U 90037B   24226.50000000  .00001000  00000-0  50000-4 0  9995
2 20580  28.4700 100.0000 0002500  80.0000 280.0000 15.14000000170003
";

pub const STARLINK_TLE: &str = "STARLINK-1007
1 44713U 19074A   24226.50000000  .00001000  00000-0  70000-4 0  9993
2 44713  53.0500 200.0000 0001500  90.0000 270.0000 15.06000000250009
";

pub const GPS_TLE: &str = "GPS BIIR-2 (PRN 13)
1 24876U 97035A   24226.50000000  .00000012  00000-0  00000-0 0  9995
2 24876  55.5000 120.0000 0050000  50.0000 310.0000  2.00563000197004
";

pub const TIANGONG_TLE: &str = "CSS (TIANHE)
1 48274U 21035A   24226.50000000  .00020000  00000-0  25000-3 0  9999
2 48274  41.4700 300.0000 0005000  20.0000 340.0000 15.60000000180001
";

pub const SENTINEL_TLE: &str = "SENTINEL-2A
1 40697U 15028A   24226.50000000  .00000100  00000-0  40000-4 0  9992
2 40697  98.5700  30.0000 0001200  95.0000 265.0000 14.30810000470008
";

/// Record with corrupted checksums on both lines.
pub const CORRUPT_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   24226.56250000  .00007211  00000-0  13379-3 0  9993
2 25544  51.6422 266.4643 0007888 121.4429 238.6624 15.49494792423455
";

/// Every well-formed bundled record, keyed by catalog number.
pub const BUNDLED: &[(u32, &str)] = &[
    (20580, HST_TLE),
    (24876, GPS_TLE),
    (25544, ISS_TLE),
    (40697, SENTINEL_TLE),
    (44713, STARLINK_TLE),
    (48274, TIANGONG_TLE),
];

/// Split a bundled block into its name line and both element lines.
pub fn mock_block(block: &str) -> (Option<String>, String, String) {
    let mut name = None;
    let mut line1 = String::new();
    let mut line2 = String::new();
    for line in block.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        if line.starts_with("1 ") {
            line1 = line.to_string();
        } else if line.starts_with("2 ") {
            line2 = line.to_string();
        } else {
            name = Some(line.trim().to_string());
        }
    }
    (name, line1, line2)
}

/// Newest epoch among the bundled records.
pub fn bundled_epoch() -> Option<DateTime<Utc>> {
    BUNDLED
        .iter()
        .filter_map(|(_, block)| parse_tle_epoch_to_utc(&mock_block(block).1))
        .max()
}

#[cfg(test)]
pub fn mock_lines(block: &str) -> (String, String) {
    let (_, line1, line2) = mock_block(block);
    (line1, line2)
}

#[cfg(test)]
pub fn parse_mock(block: &str) -> OrbitalRecord {
    let (name, line1, line2) = mock_block(block);
    parse_element_set(name.as_deref(), &line1, &line2).unwrap()
}
