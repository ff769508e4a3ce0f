//! Write normalised records as a tab separated table

use std::io::Write;

use itertools::Itertools;

use crate::record::AnnotatedPeptideRecord;

/// The columns of the output table, in order
pub const COLUMNS: [&str; 14] = [
    "sampleName",
    "precursorFile",
    "parentId",
    "parentProtein",
    "parentDescription",
    "fullSequence",
    "sequence",
    "formula",
    "mass",
    "scanNum",
    "unique",
    "precursorMZ",
    "charge",
    "score",
];

const SEPARATOR: char = '\t';

fn escape(value: String) -> String {
    if value.contains(SEPARATOR) || value.contains('\n') {
        format!("\"{}\"", value.replace('\"', "\'"))
    } else {
        value
    }
}

fn optional(value: Option<&impl ToString>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// The values of a record in the order of [`COLUMNS`], missing values are empty
pub fn record_values(record: &AnnotatedPeptideRecord) -> [String; 14] {
    [
        record.sample_name.clone(),
        record.precursor_file.clone(),
        optional(record.parent_id.as_ref()),
        optional(record.parent_protein.as_ref()),
        optional(record.parent_description.as_ref()),
        record.full_sequence().to_string(),
        record.sequence.clone(),
        optional(record.formula.as_ref()),
        record.mass.map(|m| format!("{m:.5}")).unwrap_or_default(),
        record.scan_number.clone(),
        optional(record.unique.as_ref()),
        optional(record.precursor_mz.as_ref()),
        optional(record.charge.as_ref()),
        optional(record.score.as_ref()),
    ]
}

/// Render all records as a tab separated table with a header line. Values containing a tab
/// are quoted, with any double quotes replaced by single quotes.
pub fn to_tsv(records: &[AnnotatedPeptideRecord]) -> String {
    let separator = SEPARATOR.to_string();
    let mut output = COLUMNS.join(&separator);
    output.push('\n');
    for record in records {
        output.push_str(
            &record_values(record)
                .into_iter()
                .map(escape)
                .join(&separator),
        );
        output.push('\n');
    }
    output
}

/// Write all records as a tab separated table, see [`to_tsv`]
/// # Errors
/// If writing to the writer failed.
pub fn write_tsv(
    mut f: impl Write,
    records: &[AnnotatedPeptideRecord],
) -> Result<(), std::io::Error> {
    f.write_all(to_tsv(records).as_bytes())?;
    f.flush()
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use pepcore::molecular_formula;

    use super::*;

    #[test]
    fn render() {
        let records = [
            AnnotatedPeptideRecord {
                sample_name: "exp1".to_string(),
                precursor_file: "run1.mzML".to_string(),
                parent_id: Some("P12345".to_string()),
                parent_protein: Some("ABC1".to_string()),
                parent_description: Some("Some\tDescription \"one\"".to_string()),
                sequence: "AC(+57.02)DR*K".to_string(),
                formula: Some(molecular_formula!(C 2 H 3 N 1 O 1)),
                mass: Some(57.021464),
                scan_number: "1234".to_string(),
                unique: Some(true),
                precursor_mz: Some(400.5),
                charge: Some(2),
                score: None,
                line_index: 4,
            },
            AnnotatedPeptideRecord {
                sample_name: "exp1".to_string(),
                precursor_file: "run2.mzML".to_string(),
                sequence: "PEPK".to_string(),
                scan_number: "12".to_string(),
                ..AnnotatedPeptideRecord::default()
            },
        ];
        let text = to_tsv(&records);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').collect::<Vec<_>>(), COLUMNS);
        assert!(lines[1].starts_with(
            "exp1\trun1.mzML\tP12345\tABC1\t\"Some\tDescription 'one'\"\tAC(+57.02)DR*K\tAC(+57.02)DR*K\t"
        ));
        assert!(lines[1].ends_with("\t57.02146\t1234\ttrue\t400.5\t2\t"));
        assert_eq!(
            lines[2],
            "exp1\trun2.mzML\t\t\t\tPEPK\tPEPK\t\t\t12\t\t\t\t"
        );

        let mut written = Vec::new();
        write_tsv(&mut written, &records).unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), text);
    }
}
