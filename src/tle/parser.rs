//! TLE parsing utilities
//!
//! Structural validation (length, line numbers, catalog number, checksum) is
//! done here so a bad record is reported with a precise reason. Field decoding
//! and model initialisation are delegated to the `sgp4` crate.

use chrono::{DateTime, Utc};

use crate::error::{OrbitError, OrbitResult};
use crate::orbital::propagation::OrbitalRecord;

pub const TLE_LINE_LEN: usize = 69;

/// Parse TLE epoch from line 1 to UTC DateTime
pub fn parse_tle_epoch_to_utc(line1: &str) -> Option<DateTime<Utc>> {
    // TLE line1 epoch fields (columns 19–32, 1-based; 18..32 0-based)
    let s = line1.get(18..32)?;
    let mut parts = s.trim().split('.');
    let yyddd = parts.next()?;
    let frac = parts.next().unwrap_or("0");
    if yyddd.len() < 3 {
        return None;
    }
    let (yy_str, ddd_str) = yyddd.split_at(2);
    let yy: i32 = yy_str.parse().ok()?;
    let ddd: i64 = ddd_str.parse().ok()?;
    if ddd < 1 {
        return None;
    }
    let year = if yy >= 57 { 1900 + yy } else { 2000 + yy };
    let jan1 = chrono::NaiveDate::from_ymd_opt(year, 1, 1)?;
    let date = jan1.checked_add_signed(chrono::Duration::days(ddd - 1))?;
    let frac_sec: f64 = format!("0.{}", frac).parse::<f64>().ok()? * 86400.0;
    let secs = frac_sec.trunc() as i64;
    let nanos = ((frac_sec - (secs as f64)) * 1e9).round() as i64;
    let ndt = date.and_hms_opt(0, 0, 0)?
        + chrono::Duration::seconds(secs)
        + chrono::Duration::nanoseconds(nanos);
    Some(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
}

/// Modulo-10 checksum over the first 68 columns.
///
/// Digits count their face value, a minus sign counts 1, everything else 0.
pub fn tle_checksum(line: &str) -> u32 {
    line.chars()
        .take(TLE_LINE_LEN - 1)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Strip BOM, CR and surrounding spaces the way fetched bodies arrive.
pub fn clean_line(raw: &str) -> &str {
    raw.trim_matches(|c| c == '\u{feff}' || c == '\r' || c == '\n' || c == ' ')
}

fn validate_line(line: &str, number: char) -> OrbitResult<u32> {
    if !line.is_ascii() {
        return Err(OrbitError::MalformedElementSet(format!(
            "line {} contains non-ASCII characters",
            number
        )));
    }
    if line.len() != TLE_LINE_LEN {
        return Err(OrbitError::MalformedElementSet(format!(
            "line {} has {} characters, expected {}",
            number,
            line.len(),
            TLE_LINE_LEN
        )));
    }
    let bytes = line.as_bytes();
    if bytes[0] as char != number || bytes[1] != b' ' {
        return Err(OrbitError::MalformedElementSet(format!(
            "line {} does not start with '{} '",
            number, number
        )));
    }
    let expected = (bytes[TLE_LINE_LEN - 1] as char).to_digit(10).ok_or_else(|| {
        OrbitError::MalformedElementSet(format!("line {} checksum is not a digit", number))
    })?;
    let actual = tle_checksum(line);
    if expected != actual {
        return Err(OrbitError::MalformedElementSet(format!(
            "line {} checksum mismatch: expected {}, computed {}",
            number, expected, actual
        )));
    }
    line[2..7].trim().parse::<u32>().map_err(|_| {
        OrbitError::MalformedElementSet(format!("line {} has an invalid catalog number", number))
    })
}

/// Parse a two-line element set into a propagatable record.
pub fn parse_element_set(
    name: Option<&str>,
    line1: &str,
    line2: &str,
) -> OrbitResult<OrbitalRecord> {
    let line1 = clean_line(line1);
    let line2 = clean_line(line2);

    let norad1 = validate_line(line1, '1')?;
    let norad2 = validate_line(line2, '2')?;
    if norad1 != norad2 {
        return Err(OrbitError::MalformedElementSet(format!(
            "catalog numbers differ between lines ({} vs {})",
            norad1, norad2
        )));
    }

    let epoch_utc = parse_tle_epoch_to_utc(line1).ok_or_else(|| {
        OrbitError::MalformedElementSet(format!("unreadable epoch field {:?}", &line1[18..32]))
    })?;

    let elements = sgp4::Elements::from_tle(
        name.map(str::to_string),
        line1.as_bytes(),
        line2.as_bytes(),
    )
    .map_err(|e| OrbitError::MalformedElementSet(e.to_string()))?;

    OrbitalRecord::new(norad1, elements, epoch_utc, line1, line2)
}

/// Scan an arbitrary response body for the TLE pair of `requested_sat`.
///
/// Returns the optional name line preceding the pair and both element lines.
pub fn extract_tle_block(
    body: &str,
    requested_sat: u32,
) -> anyhow::Result<(Option<String>, String, String)> {
    let lines: Vec<&str> = body
        .lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect();

    let sat_fmt = format!("{:05}", requested_sat);
    for i in 0..lines.len().saturating_sub(1) {
        let (l1, l2) = (lines[i], lines[i + 1]);
        if !(l1.starts_with('1') && l2.starts_with('2')) {
            continue;
        }
        let sat_ok = l1.get(2..7) == Some(sat_fmt.as_str()) && l2.get(2..7) == Some(sat_fmt.as_str());
        if sat_ok {
            // Prefer a text name line immediately before l1 if it is not a TLE line
            let name = i
                .checked_sub(1)
                .map(|p| lines[p])
                .filter(|p| !p.starts_with('1') && !p.starts_with('2'))
                .map(str::to_string);
            return Ok((name, l1.to_string(), l2.to_string()));
        }
    }
    let sample: String = body.lines().take(6).collect::<Vec<_>>().join("\\n");
    anyhow::bail!(
        "No valid TLE pair found for {}. Sample: {}",
        requested_sat,
        sample
    );
}
