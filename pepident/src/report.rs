use std::sync::LazyLock;

use context_error::*;
use pepcore::{NormalizeError, error::NormalizeErrorKind};
use regex::Regex;

use crate::table::ReportTable;

/// The column that marks the start of the table in a spectrum report
static SPECTRUM_NAME_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)spectrum[ _]name").unwrap());

/// The line that marks the end of the table in a spectrum report
pub const END_OF_FILE: &str = "END OF FILE";

/// Normalise a spectrum report column name: lowercase with spaces replaced by underscores
pub fn spectrum_report_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Extract the table from a Scaffold spectrum report. The report starts with some free text
/// lines, the table starts at the line containing the 'Spectrum name' column and runs until the
/// 'END OF FILE' line (or the end of the text). All column names are normalised with
/// [`spectrum_report_header`].
/// # Errors
/// If the 'Spectrum name' column could not be found, or if the table is malformed.
pub fn parse_spectrum_report(text: &str) -> Result<ReportTable, NormalizeError> {
    let header = SPECTRUM_NAME_HEADER.find(text).ok_or_else(|| {
        BoxedError::new(
            NormalizeErrorKind::MalformedReport,
            "Invalid spectrum report",
            "Could not find the 'Spectrum name' column, this does not look like a spectrum report",
            Context::none(),
        )
    })?;
    let start = text[..header.start()].rfind('\n').map_or(0, |i| i + 1);
    let block = &text[start..];
    let block = &block[..block.find(END_OF_FILE).unwrap_or(block.len())];
    let first_line_index = text[..start].matches('\n').count();
    log::debug!(
        "Found the spectrum report table at line {}",
        first_line_index + 1
    );
    ReportTable::parse(block, b'\t', first_line_index, spectrum_report_header)
}
