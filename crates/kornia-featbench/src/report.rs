use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{error::FeatBenchError, stats::CombinationStats};

/// Field separator of the report.
pub const DELIMITER: &str = ", ";

/// Column names in output order.
pub const COLUMNS: [&str; 10] = [
    "COMBINATION ID.",
    "IMAGE NO.",
    "DETECTOR TYPE",
    "DESCRIPTOR TYPE",
    "TOTAL KEYPOINTS",
    "KEYPOINTS ON VEHICLE",
    "DETECTOR ELAPSED TIME",
    "DESCRIPTOR ELAPSED TIME",
    "MATCHED KEYPOINTS",
    "MATCHER ELAPSED TIME",
];

/// Significant digits of the elapsed time columns.
const ELAPSED_DIGITS: usize = 6;

/// An elapsed time printed in the `%g` style of a default C++ output stream.
///
/// Values keep [`ELAPSED_DIGITS`] significant digits without trailing zeros
/// and switch to scientific notation below `1e-4` or from `1e6` on.
struct Elapsed(f64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value == 0.0 {
            return f.write_str("0");
        }
        if !value.is_finite() {
            return write!(f, "{}", value);
        }

        // the exponent after rounding decides the notation
        let scientific = format!("{:.*e}", ELAPSED_DIGITS - 1, value);
        let (mantissa, exponent) = scientific.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if exponent < -4 || exponent >= ELAPSED_DIGITS as i32 {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{}{:02}",
                trim_fraction(mantissa),
                sign,
                exponent.abs()
            )
        } else {
            let decimals = (ELAPSED_DIGITS as i32 - 1 - exponent) as usize;
            f.write_str(trim_fraction(&format!("{:.*}", decimals, value)))
        }
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Metadata written at the top of the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
    /// Name of the person running the benchmark.
    pub author: String,
    /// Date of the run, free form.
    pub date: String,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            author: "kornia".to_string(),
            date: "unknown".to_string(),
        }
    }
}

/// Write the report to any writer.
///
/// The report starts with the author and date lines and a blank line, then
/// the column header. Every combination contributes one row per image followed
/// by a blank line. Combination identifiers start at 1 and follow the order of
/// `stats`.
pub fn write_report_to<W: Write>(
    writer: &mut W,
    metadata: &ReportMetadata,
    stats: &[CombinationStats],
) -> Result<(), FeatBenchError> {
    writeln!(writer, "Name: {}", metadata.author)?;
    writeln!(writer, "Date: {}", metadata.date)?;
    writeln!(writer)?;
    writeln!(writer, "{}", COLUMNS.join(DELIMITER))?;

    for (id, combination_stats) in (1..).zip(stats.iter()) {
        let combination = combination_stats.combination();
        for (image_index, frame) in combination_stats.frames().iter().enumerate() {
            writeln!(
                writer,
                "{id}{d}{image_index}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                combination.detector,
                combination.descriptor,
                frame.total_keypoints,
                frame.keypoints_in_region,
                Elapsed(frame.detect_ms),
                Elapsed(frame.describe_ms),
                frame.matched_keypoints,
                Elapsed(frame.match_ms),
                d = DELIMITER,
            )?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write the report to a file, creating the parent directory if needed.
///
/// # Errors
///
/// If the directory cannot be created or the file cannot be written.
pub fn write_report(
    path: impl AsRef<Path>,
    metadata: &ReportMetadata,
    stats: &[CombinationStats],
) -> Result<(), FeatBenchError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    log::info!("Writing output file: {}", path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    write_report_to(&mut writer, metadata, stats)?;
    writer.flush()?;

    Ok(())
}
