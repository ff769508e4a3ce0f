use std::{path::Path, str::FromStr};

use context_error::*;
use itertools::Itertools;
use pepcore::{
    NormalizeError,
    error::NormalizeErrorKind,
    ontology::ModificationTable,
    sequence::{AnnotatedSequence, ModificationCheck, ModificationParser, ModificationToken},
};

use crate::{
    accession::{AccessionResolver, BadAccessionPolicy, extract_description},
    diagnostics::DiagnosticSummary,
    engine::{MS_MS_SAMPLE_NAME, SPECTRUM_NAME, SearchEngineProfile},
    options::NormalizeOptions,
    record::AnnotatedPeptideRecord,
    report::parse_spectrum_report,
    table::{Cell, TableRow},
};

/// The column with the peptide
pub const PEPTIDE_SEQUENCE: &str = "peptide_sequence";
/// The column with the sample name
pub const EXPERIMENT_NAME: &str = "experiment_name";
/// The column with the fixed modifications
pub const FIXED_MODIFICATIONS: &str = "fixed_modifications";
/// The column with the variable modifications
pub const VARIABLE_MODIFICATIONS: &str = "variable_modifications";
/// The column with the protein description
pub const PROTEIN_NAME: &str = "protein_name";
/// The column with the protein accession
pub const PROTEIN_ACCESSION_NUMBERS: &str = "protein_accession_numbers";
/// The column with the precursor m/z
pub const OBSERVED_M_Z: &str = "observed_m/z";
/// The column with the uniqueness flag
pub const EXCLUSIVE: &str = "exclusive";
/// The column with the precursor charge
pub const SPECTRUM_CHARGE: &str = "spectrum_charge";

/// The columns that have to be present in a spectrum report
pub const REQUIRED_COLUMNS: [&str; 5] = [
    PEPTIDE_SEQUENCE,
    SPECTRUM_NAME,
    EXPERIMENT_NAME,
    FIXED_MODIFICATIONS,
    VARIABLE_MODIFICATIONS,
];

/// The columns that are used if present in a spectrum report
pub const OPTIONAL_COLUMNS: [&str; 6] = [
    MS_MS_SAMPLE_NAME,
    PROTEIN_NAME,
    PROTEIN_ACCESSION_NUMBERS,
    OBSERVED_M_Z,
    EXCLUSIVE,
    SPECTRUM_CHARGE,
];

pub(crate) static NUMBER_ERROR: (&str, &str) = (
    "Invalid number",
    "This column is not a number but it is required to be a number, the value is left empty",
);
static BOOL_ERROR: (&str, &str) = (
    "Invalid boolean",
    "This column is not a boolean ('true'/'false', 'yes'/'no', or '1'/'0'), the value is left empty",
);

/// The result of normalising a report
#[derive(Clone, Debug, Default)]
pub struct NormalizedReport {
    /// All normalised records, in the order of the report
    pub records: Vec<AnnotatedPeptideRecord>,
    /// Everything that went wrong without stopping the normalisation
    pub diagnostics: DiagnosticSummary,
    /// The search engine detected for a spectrum report
    pub engine: Option<SearchEngineProfile>,
}

/// Normalise a Scaffold spectrum report. Problems with single rows are collected in the
/// diagnostics of the result, those rows are left out.
/// # Errors
/// * If the report does not contain a table or misses any of the [`REQUIRED_COLUMNS`].
/// * If the search engine could not be recognised.
/// * If `require_known_modifications` is set and not all modifications are in the table (only
///   checked when calculating formulas).
pub fn normalize_scaffold_report(
    text: &str,
    table: &ModificationTable,
    options: &NormalizeOptions,
) -> Result<NormalizedReport, NormalizeError> {
    let report = parse_spectrum_report(text)?;
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !report.has_column(column))
        .join(", ");
    if !missing.is_empty() {
        return Err(BoxedError::new(
            NormalizeErrorKind::MalformedReport,
            "Missing required columns",
            format!("The spectrum report does not contain the required column(s): {missing}"),
            Context::show(report.header().join(", ")),
        ));
    }
    for column in OPTIONAL_COLUMNS {
        if !report.has_column(column) {
            log::warn!("Could not find optional column '{column}'");
        }
    }

    let mut diagnostics = DiagnosticSummary::default();
    if options.calc_formula {
        let check = ModificationCheck::new(table).add_descriptions(
            [FIXED_MODIFICATIONS, VARIABLE_MODIFICATIONS]
                .into_iter()
                .filter_map(|column| report.column_values(column))
                .flatten()
                .map(Some),
        );
        check.log();
        diagnostics.unknown_modifications = check
            .unknown()
            .map(|(name, target, _)| (name.to_string(), target))
            .collect();
        if options.require_known_modifications
            && let Some(error) = check.to_error()
        {
            return Err(error);
        }
    }

    let engine = SearchEngineProfile::detect(&report)?;
    log::info!("Detected search engine: {engine}");

    let parser = ModificationParser::new(table, options.calc_formula);
    let mut resolver = AccessionResolver::new();
    let mut records = Vec::with_capacity(report.len());
    for row in report.rows() {
        match normalize_row(
            row,
            engine,
            &parser,
            &mut resolver,
            options,
            &mut diagnostics,
        ) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => diagnostics.dropped_rows += 1,
            Err(error) => diagnostics.fail(row, SPECTRUM_NAME, PEPTIDE_SEQUENCE, error),
        }
    }
    diagnostics.unparsed_accessions = resolver.into_unparsed();
    log::info!(
        "Normalised {} of {} peptide(s)",
        records.len(),
        report.len()
    );

    Ok(NormalizedReport {
        records,
        diagnostics,
        engine: Some(engine),
    })
}

fn normalize_row(
    row: &TableRow,
    engine: SearchEngineProfile,
    parser: &ModificationParser<'_>,
    resolver: &mut AccessionResolver,
    options: &NormalizeOptions,
    diagnostics: &mut DiagnosticSummary,
) -> Result<Option<AnnotatedPeptideRecord>, NormalizeError> {
    let protein_name = row
        .cell(PROTEIN_NAME)
        .and_then(Cell::or_empty)
        .map(|c| c.as_str());
    let (parent_id, parent_protein, parent_description) =
        if let Some(cell) = row.cell(PROTEIN_ACCESSION_NUMBERS) {
            let accession = resolver.resolve(cell.as_str(), protein_name);
            if !accession.parsed {
                diagnostics.warn(BoxedError::new(
                    NormalizeErrorKind::UnparsableAccession,
                    "Unparsable protein accession",
                    "The protein accession does not follow the 'db|accession|name_SPECIES' pattern and is not a UniProt accession",
                    cell.context(),
                ));
                if options.bad_accession_policy == BadAccessionPolicy::Drop {
                    return Ok(None);
                }
            }
            (
                Some(accession.id),
                Some(accession.name),
                accession.description,
            )
        } else {
            (None, None, protein_name.and_then(extract_description))
        };

    let scan_number = engine.scan_number(row)?;
    let source_file = engine.source_file(row)?;
    let precursor_file = Path::new(&source_file)
        .with_extension(&options.file_extension)
        .to_string_lossy()
        .into_owned();

    let mut sequence = AnnotatedSequence::from_peptide(row.column(PEPTIDE_SEQUENCE)?.as_str())?;
    let mut formula = options.calc_formula.then(|| sequence.formula(true, true));
    for column in [FIXED_MODIFICATIONS, VARIABLE_MODIFICATIONS] {
        let description = row
            .cell(column)
            .and_then(Cell::or_empty)
            .map(|c| c.as_str());
        let (delta, warnings) = parser.apply(&mut sequence, description)?;
        if options.keep_offending_tokens
            && !warnings.is_empty()
            && let Some(description) = description
        {
            diagnostics.offending_tokens.extend(
                ModificationToken::unparsable_parts(description)
                    .into_iter()
                    .map(ToString::to_string),
            );
        }
        for warning in warnings {
            diagnostics.warn(warning);
        }
        if let Some(formula) = &mut formula {
            *formula += delta;
        }
    }
    let mass = formula
        .as_ref()
        .map(|f| f.mass(options.mass_mode))
        .transpose()?;

    Ok(Some(AnnotatedPeptideRecord {
        sample_name: row.column(EXPERIMENT_NAME)?.as_str().to_string(),
        precursor_file,
        parent_id,
        parent_protein,
        parent_description,
        sequence: sequence.render_with_marker(options.precision, options.marker.as_ref()),
        formula,
        mass,
        scan_number,
        unique: row
            .cell(EXCLUSIVE)
            .and_then(Cell::or_empty)
            .and_then(|cell| parse_flag(&cell).map_err(|w| diagnostics.warn(w)).ok()),
        precursor_mz: optional_cell(row, OBSERVED_M_Z, NUMBER_ERROR, diagnostics),
        charge: optional_cell(row, SPECTRUM_CHARGE, NUMBER_ERROR, diagnostics),
        score: None,
        line_index: row.line_index(),
    }))
}

/// Parse an optional cell, an unparsable value is recorded as warning and left empty
pub(crate) fn optional_cell<T: FromStr>(
    row: &TableRow,
    column: &'static str,
    base_error: (&'static str, &'static str),
    diagnostics: &mut DiagnosticSummary,
) -> Option<T> {
    row.cell(column)
        .and_then(Cell::or_empty)?
        .parse(base_error)
        .map_err(|w| diagnostics.warn(w))
        .ok()
}

fn parse_flag(cell: &Cell<'_>) -> Result<bool, NormalizeError> {
    match cell.as_str().trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(BoxedError::new(
            NormalizeErrorKind::InvalidCell,
            BOOL_ERROR.0,
            BOOL_ERROR.1,
            cell.context(),
        )),
    }
}
