//! Normalisation of MaxQuant `msms.txt` files

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use context_error::*;
use itertools::Itertools;
use pepcore::{
    NormalizeError,
    chemistry::MolecularFormula,
    error::NormalizeErrorKind,
    ontology::ModificationTable,
    sequence::{AminoAcid, AnnotatedSequence, ModificationCheck, ModificationTarget},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::DiagnosticSummary,
    normalize::{NUMBER_ERROR, NormalizedReport, optional_cell},
    options::{GroupMethod, NormalizeOptions},
    record::AnnotatedPeptideRecord,
    table::{Cell, ReportTable, TableRow},
};

/// The MS/MS scan number
pub const SCAN_NUMBER: &str = "scan_number";
/// The gene names of all proteins (`;` separated)
pub const GENE_NAMES: &str = "gene_names";
/// The leading proteins (`;` separated)
pub const LEADING_PROTEINS: &str = "leading_proteins";
/// The protein descriptions (`;` separated)
pub const PROTEIN_NAMES: &str = "protein_names";
/// All proteins that contain this peptide (`;` separated)
pub const PROTEINS: &str = "proteins";
/// The sequence with inline modifications, eg `_(Acetyl (Protein N-term))M(Oxidation (M))PEPK_`
pub const MODIFIED_SEQUENCE: &str = "modified_sequence";
/// The summary of the modifications
pub const MODIFICATIONS: &str = "modifications";
/// The experiment name
pub const EXPERIMENT: &str = "experiment";
/// The raw file name without extension
pub const RAW_FILE: &str = "raw_file";
/// The precursor m/z (`m/z` in the file)
pub const MZ: &str = "mz";
/// The precursor charge
pub const CHARGE: &str = "charge";
/// The Andromeda score
pub const SCORE: &str = "score";

const REQUIRED_COLUMNS: [&str; 3] = [SCAN_NUMBER, MODIFIED_SEQUENCE, RAW_FILE];
const OPTIONAL_COLUMNS: [&str; 7] = [
    LEADING_PROTEINS,
    PROTEIN_NAMES,
    PROTEINS,
    EXPERIMENT,
    MZ,
    CHARGE,
    SCORE,
];

static MODIFICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z_])\((.*?)(\(.*?\))?\)").unwrap());

/// Normalise a MaxQuant column name: lowercase, spaces replaced by `_` and `/` removed
pub fn maxquant_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_").replace('/', "")
}

/// A single inline modification of a MaxQuant modified sequence
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MaxQuantModification {
    /// The index into the [`AnnotatedSequence`], 0 is the N-terminus
    pub position: usize,
    /// The target in the modification table
    pub target: ModificationTarget,
    /// The lowercase name, without the specificity, eg `oxidation` for `Oxidation (M)`
    pub name: String,
}

/// Parse a MaxQuant modified sequence, eg `_(Acetyl (Protein N-term))M(Oxidation (M))PEPK_`.
/// # Errors
/// * If a modification on `_` is placed anywhere but the N-terminus.
/// * If the sequence contains an unknown amino acid.
pub fn parse_modified_sequence(
    text: &str,
) -> Result<(AnnotatedSequence, Vec<MaxQuantModification>), NormalizeError> {
    let mut peptide = String::with_capacity(text.len());
    let mut found = Vec::new();
    let mut last = 0;
    for captures in MODIFICATION.captures_iter(text) {
        let (Some(full), Some(residue), Some(name)) =
            (captures.get(0), captures.get(1), captures.get(2))
        else {
            continue;
        };
        peptide.extend(text[last..residue.end()].chars().filter(|c| *c != '_'));
        last = full.end();
        let position = peptide.len();
        if residue.as_str() == "_" && position != 0 {
            return Err(BoxedError::new(
                NormalizeErrorKind::MalformedReport,
                "Invalid modified sequence",
                "A modification on '_' can only be placed at the start of the sequence (the N-terminus)",
                Context::line(None, text, full.start(), full.len()).to_owned(),
            ));
        }
        found.push((position, name.as_str().trim().to_lowercase()));
    }
    peptide.extend(text[last..].chars().filter(|c| *c != '_'));
    let sequence = AnnotatedSequence::from_peptide(&peptide)?;
    let modifications = found
        .into_iter()
        .map(|(position, name)| MaxQuantModification {
            position,
            target: sequence
                .amino_acid(position)
                .map_or(ModificationTarget::NTerm, ModificationTarget::AminoAcid),
            name,
        })
        .collect();
    Ok((sequence, modifications))
}

/// A fixed modification with its composition and monoisotopic mass
type FixedModification<'a> = (AminoAcid, &'a MolecularFormula, f64);

/// Normalise a MaxQuant `msms.txt` file. The formula and mass are always calculated, so all
/// modifications have to be present in the modification table. Rows without scan number or
/// protein are left out, all remaining rows are grouped with the group method of the options.
/// # Errors
/// * If the file misses the scan number, modified sequence or raw file column.
/// * If the file has neither a gene names nor a leading proteins column.
/// * If the fixed modifications are invalid or not present in the table.
/// * If `require_known_modifications` is set and not all modifications are in the table.
pub fn normalize_maxquant_table(
    text: &str,
    table: &ModificationTable,
    options: &NormalizeOptions,
) -> Result<NormalizedReport, NormalizeError> {
    let report = ReportTable::parse(text, b'\t', 0, maxquant_header)?;
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !report.has_column(column))
        .join(", ");
    if !missing.is_empty() {
        return Err(BoxedError::new(
            NormalizeErrorKind::MalformedReport,
            "Missing required columns",
            format!("The MaxQuant file does not contain the required column(s): {missing}"),
            Context::show(report.header().join(", ")),
        ));
    }
    let protein_column = if report.has_column(GENE_NAMES) {
        GENE_NAMES
    } else if report.has_column(LEADING_PROTEINS) {
        LEADING_PROTEINS
    } else {
        return Err(BoxedError::new(
            NormalizeErrorKind::MalformedReport,
            "Missing protein columns",
            format!("The MaxQuant file contains neither a '{GENE_NAMES}' nor a '{LEADING_PROTEINS}' column"),
            Context::show(report.header().join(", ")),
        ));
    };
    for column in OPTIONAL_COLUMNS {
        if !report.has_column(column) {
            log::warn!("Could not find optional column '{column}'");
        }
    }

    let mut fixed: Vec<FixedModification> = Vec::new();
    for (aa, name) in options.parsed_fixed_modifications()? {
        let formula = table
            .get(&name, ModificationTarget::AminoAcid(aa))
            .ok_or_else(|| {
                BoxedError::new(
                    NormalizeErrorKind::UnknownModification,
                    "Unknown fixed modification",
                    format!("The fixed modification '{name}' on {aa} is not in the modification table"),
                    Context::show(options.fixed_modifications.clone()),
                )
            })?;
        fixed.push((aa, formula, formula.monoisotopic_mass()?));
    }

    let mut diagnostics = DiagnosticSummary::default();
    let mut check = ModificationCheck::new(table);
    for sequence in report.column_values(MODIFIED_SEQUENCE).into_iter().flatten() {
        if let Ok((_, modifications)) = parse_modified_sequence(sequence) {
            for modification in modifications {
                check.add_modification(&modification.name, modification.target);
            }
        }
    }
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

    let mut records = Vec::with_capacity(report.len());
    for row in report.rows() {
        if row.cell(SCAN_NUMBER).and_then(Cell::or_empty).is_none()
            || row.cell(protein_column).and_then(Cell::or_empty).is_none()
        {
            diagnostics.dropped_rows += 1;
            continue;
        }
        match normalize_row(row, table, &fixed, options, &mut diagnostics) {
            Ok(record) => records.push(record),
            Err(error) => diagnostics.fail(row, SCAN_NUMBER, MODIFIED_SEQUENCE, error),
        }
    }
    let found = records.len();
    let records = group_records(records, options.group_method);
    log::info!(
        "Normalised {found} of {} peptide(s), kept {} after grouping",
        report.len(),
        records.len()
    );

    Ok(NormalizedReport {
        records,
        diagnostics,
        engine: None,
    })
}

fn normalize_row(
    row: &TableRow,
    table: &ModificationTable,
    fixed: &[FixedModification<'_>],
    options: &NormalizeOptions,
    diagnostics: &mut DiagnosticSummary,
) -> Result<AnnotatedPeptideRecord, NormalizeError> {
    let cell = row.column(MODIFIED_SEQUENCE)?;
    let (mut sequence, modifications) = parse_modified_sequence(cell.as_str())?;
    let mut formula = sequence.formula(true, true);
    for modification in &modifications {
        let delta = table
            .get(&modification.name, modification.target)
            .ok_or_else(|| {
                BoxedError::new(
                    NormalizeErrorKind::UnknownModification,
                    "Unknown modification",
                    format!(
                        "The modification '{}' on {} is not in the modification table",
                        modification.name, modification.target
                    ),
                    cell.context(),
                )
            })?;
        sequence.add_mass_delta(modification.position, delta.monoisotopic_mass()?);
        formula += delta;
    }
    for (aa, delta, mass) in fixed {
        for position in 1..=sequence.len() {
            if sequence.amino_acid(position) == Some(*aa) {
                sequence.add_mass_delta(position, *mass);
                formula += *delta;
            }
        }
    }

    let raw_file = row.column(RAW_FILE)?.as_str();
    Ok(AnnotatedPeptideRecord {
        sample_name: row
            .cell(EXPERIMENT)
            .and_then(Cell::or_empty)
            .map_or(raw_file, |c| c.as_str())
            .to_string(),
        precursor_file: format!("{raw_file}.{}", options.file_extension),
        parent_id: first_entry(row, LEADING_PROTEINS),
        parent_protein: first_entry(row, GENE_NAMES),
        parent_description: first_entry(row, PROTEIN_NAMES),
        sequence: sequence.render_with_marker(options.precision, options.marker.as_ref()),
        mass: Some(formula.mass(options.mass_mode)?),
        formula: Some(formula),
        scan_number: row.column(SCAN_NUMBER)?.as_str().to_string(),
        unique: row
            .cell(PROTEINS)
            .and_then(Cell::or_empty)
            .map(|c| c.array(';').filter(|p| !p.is_empty()).count() == 1),
        precursor_mz: optional_cell(row, MZ, NUMBER_ERROR, diagnostics),
        charge: optional_cell(row, CHARGE, NUMBER_ERROR, diagnostics),
        score: optional_cell(row, SCORE, NUMBER_ERROR, diagnostics),
        line_index: row.line_index(),
    })
}

/// The first entry of a `;` separated column
fn first_entry(row: &TableRow, column: &'static str) -> Option<String> {
    row.cell(column)
        .and_then(Cell::or_empty)
        .and_then(|c| c.array(';').next())
        .and_then(Cell::or_empty)
        .map(|c| c.as_str().to_string())
}

/// Only keep the best scoring record per group, when multiple records share the highest score
/// the first one is kept. Records without score lose from any record with a score. The order of
/// the records is retained.
pub fn group_records(
    records: Vec<AnnotatedPeptideRecord>,
    method: GroupMethod,
) -> Vec<AnnotatedPeptideRecord> {
    if method == GroupMethod::AllScans {
        return records;
    }
    let by_charge = method == GroupMethod::BestPerSequenceFileAndCharge;
    let score = |record: &AnnotatedPeptideRecord| record.score.unwrap_or(f64::NEG_INFINITY);
    let mut best: HashMap<(&str, &str, Option<i32>), usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        best.entry((
            record.precursor_file.as_str(),
            record.sequence.as_str(),
            record.charge.filter(|_| by_charge),
        ))
        .and_modify(|current| {
            if score(&records[*current]) < score(record) {
                *current = index;
            }
        })
        .or_insert(index);
    }
    let keep: HashSet<usize> = best.into_values().collect();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| keep.contains(&index).then_some(record))
        .collect()
}
