//! Character separated tables that keep track of the original lines to generate precise error messages

use std::{borrow::Cow, ops::Range, str::FromStr, sync::Arc};

use context_error::*;
use pepcore::{NormalizeError, error::NormalizeErrorKind};

/// A single row in a table
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TableRow {
    line_index: usize,
    line: String,
    fields: Vec<(Arc<String>, Range<usize>)>,
}

impl TableRow {
    /// Get the line index in the original text (0 based)
    pub const fn line_index(&self) -> usize {
        self.line_index
    }

    /// Get the full line
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Get the column headers
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.0.as_str())
    }

    /// Get the column values, together with their header
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.0.as_str(), &self.line[f.1.clone()]))
    }

    /// Get the number of columns
    pub fn number_of_columns(&self) -> usize {
        self.fields.len()
    }

    /// Get the text of the specified column, if this column exists
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| *f.0 == *name)
            .map(|f| &self.line[f.1.clone()])
    }

    /// Get the specified cell, if this column exists
    pub fn cell<'a>(&'a self, name: &'a str) -> Option<Cell<'a>> {
        self.fields
            .iter()
            .find(|f| *f.0 == *name)
            .map(|f| Cell {
                row: self,
                range: f.1.clone(),
                column: name,
            })
    }

    /// Get the specified cell
    /// # Errors
    /// If the given name is not a column header
    pub fn column<'a>(&'a self, name: &'a str) -> Result<Cell<'a>, NormalizeError> {
        self.cell(name).ok_or_else(|| {
            BoxedError::new(
                NormalizeErrorKind::MalformedReport,
                "Could not find given column",
                format!("This table does not contain the needed column '{name}'"),
                self.full_context().to_owned(),
            )
        })
    }

    /// Get the context for the whole line
    pub fn full_context(&self) -> Context<'_> {
        Context::full_line(self.line_index as u32, &self.line)
    }
}

impl std::ops::Index<usize> for TableRow {
    type Output = str;
    fn index(&self, index: usize) -> &str {
        &self.line[self.fields[index].1.clone()]
    }
}

/// A single cell of a [`TableRow`], it can be narrowed down to parts of the cell while keeping
/// the position in the original line.
#[derive(Clone, Debug)]
pub struct Cell<'a> {
    row: &'a TableRow,
    range: Range<usize>,
    column: &'a str,
}

impl<'a> Cell<'a> {
    /// The text of this cell
    pub fn as_str(&self) -> &'a str {
        &self.row.line[self.range.clone()]
    }

    /// The name of the column
    pub const fn column(&self) -> &'a str {
        self.column
    }

    /// The row this cell is part of
    pub const fn row(&self) -> &'a TableRow {
        self.row
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Get this cell, or `None` if it is empty or a lone dash
    pub fn or_empty(self) -> Option<Self> {
        let text = self.as_str();
        if text.trim().is_empty() || text == "-" {
            None
        } else {
            Some(self)
        }
    }

    /// Split this cell on the given separator, all parts are trimmed
    pub fn array(self, separator: char) -> std::vec::IntoIter<Self> {
        let mut offset = self.range.start;
        let mut output = Vec::new();
        for part in self.as_str().split(separator) {
            let start = offset + part.len() - part.trim_start().len();
            output.push(Cell {
                row: self.row,
                range: start..start + part.trim().len(),
                column: self.column,
            });
            offset += part.len() + separator.len_utf8();
        }
        output.into_iter()
    }

    /// The context highlighting this cell in its line
    pub fn context(&self) -> Context<'static> {
        Context::line_with_comment(
            Some(self.row.line_index as u32),
            self.row.line(),
            self.range.start,
            self.range.len(),
            Some(Cow::Borrowed(self.column)),
        )
        .to_owned()
    }

    /// Parse the (trimmed) text of this cell
    /// # Errors
    /// If the text could not be parsed an [`NormalizeErrorKind::InvalidCell`] error is returned
    /// with the given short and long descriptions.
    pub fn parse<T: FromStr>(
        &self,
        base_error: (&'static str, &'static str),
    ) -> Result<T, NormalizeError> {
        self.as_str().trim().parse().map_err(|_| {
            BoxedError::new(
                NormalizeErrorKind::InvalidCell,
                base_error.0,
                base_error.1,
                self.context(),
            )
        })
    }
}

/// A table with a header and rows that all have exactly one value per column
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReportTable {
    header: Vec<Arc<String>>,
    rows: Vec<TableRow>,
}

impl ReportTable {
    /// Parse a table, the first non blank line is the header and every column name is passed
    /// through `header_name` to normalise it. Blank lines are skipped. The line indices of all
    /// rows are counted from `first_line_index`, to point into the surrounding document.
    /// # Errors
    /// If there is no header line, or if any row does not have the same number of columns as the header.
    pub fn parse(
        text: &str,
        separator: u8,
        first_line_index: usize,
        header_name: impl Fn(&str) -> String,
    ) -> Result<Self, NormalizeError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + first_line_index, line))
            .filter(|(_, line)| !line.trim().is_empty());
        let (_, header_line) = lines.next().ok_or_else(|| {
            BoxedError::new(
                NormalizeErrorKind::MalformedReport,
                "Could not parse table",
                "The table does not have a header line",
                Context::none(),
            )
        })?;
        let header: Vec<Arc<String>> = separate_fields(header_line, separator)
            .into_iter()
            .map(|r| Arc::new(header_name(&header_line[r])))
            .collect();

        let rows = lines
            .map(|(line_index, line)| {
                let row = separate_fields(line, separator);
                if row.len() == header.len() {
                    Ok(TableRow {
                        line_index,
                        line: line.to_string(),
                        fields: header.iter().cloned().zip(row).collect(),
                    })
                } else {
                    Err(BoxedError::new(
                        NormalizeErrorKind::MalformedReport,
                        "Incorrect number of columns",
                        format!(
                            "It does not have the correct number of columns. {} columns were expected but {} were found.",
                            header.len(),
                            row.len()
                        ),
                        Context::full_line(line_index as u32, line).to_owned(),
                    ))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, rows })
    }

    /// The (normalised) column names
    pub fn header(&self) -> impl Iterator<Item = &str> {
        self.header.iter().map(|h| h.as_str())
    }

    /// Check if the table has a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|h| **h == *name)
    }

    /// All rows
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// The number of rows (the header not included)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All non empty cells of the given column, `None` if the column does not exist
    pub fn column_values<'a>(&'a self, name: &'a str) -> Option<impl Iterator<Item = &'a str>> {
        self.has_column(name).then(|| {
            self.rows
                .iter()
                .filter_map(move |row| row.cell(name).and_then(Cell::or_empty))
                .map(|cell| cell.as_str())
        })
    }
}

/// Split a line into the ranges of all fields. Surrounding whitespace is ignored. A field that
/// opens with a double quote runs until the closing quote, separators in between included. It is
/// unwrapped only when the closing quote ends the field, otherwise the quotes are kept as text.
pub(crate) fn separate_fields(line: &str, separator: u8) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut row = Vec::new();
    let mut field_start = 0;
    let mut quoted = false;
    let mut at_field_start = true;
    for (index, ch) in bytes.iter().copied().enumerate() {
        match ch {
            b'"' if quoted => quoted = false,
            b'"' if at_field_start => {
                quoted = true;
                at_field_start = false;
            }
            sep if sep == separator && !quoted => {
                row.push(trim_field(bytes, field_start..index));
                field_start = index + 1;
                at_field_start = true;
            }
            c if c.is_ascii_whitespace() => (),
            _ => at_field_start = false,
        }
    }
    row.push(trim_field(bytes, field_start..bytes.len()));
    row
}

/// Remove surrounding whitespace, and the quotes if the whole field is enclosed in them
fn trim_field(bytes: &[u8], mut range: Range<usize>) -> Range<usize> {
    while range.start < range.end && bytes[range.start].is_ascii_whitespace() {
        range.start += 1;
    }
    while range.start < range.end && bytes[range.end - 1].is_ascii_whitespace() {
        range.end -= 1;
    }
    let inner = range.start + 1..range.end.saturating_sub(1);
    if range.len() >= 2
        && bytes[range.start] == b'"'
        && bytes[range.end - 1] == b'"'
        && !bytes[inner.clone()].contains(&b'"')
    {
        inner
    } else {
        range
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use context_error::{FullErrorContent, StaticErrorContent};
    use pepcore::error::NormalizeErrorKind;

    use super::{ReportTable, separate_fields};

    fn fields(line: &str) -> Vec<&str> {
        separate_fields(line, b'\t')
            .into_iter()
            .map(|r| &line[r])
            .collect()
    }

    #[test]
    fn separate() {
        assert_eq!(fields("a\tb\tc"), vec!["a", "b", "c"]);
        assert_eq!(fields("a\t\tc"), vec!["a", "", "c"]);
        assert_eq!(fields("a\tb\t"), vec!["a", "b", ""]);
        assert_eq!(fields("\ta"), vec!["", "a"]);
        assert_eq!(fields(" a b \t c "), vec!["a b", "c"]);
        assert_eq!(fields("\"a\tb\"\tc"), vec!["a\tb", "c"]);
        assert_eq!(fields("\"a\"\t\"\"\tc"), vec!["a", "", "c"]);
        assert_eq!(
            fields("x\t\"Hypothetical\" protein OS=Homo sapiens\ty"),
            vec!["x", "\"Hypothetical\" protein OS=Homo sapiens", "y"]
        );
        assert_eq!(fields("a \"b\" c\td"), vec!["a \"b\" c", "d"]);
        assert_eq!(fields("5' end\tx"), vec!["5' end", "x"]);
        assert_eq!(fields(""), vec![""]);
    }

    #[test]
    fn parse_table() {
        let table = ReportTable::parse(
            "\nName\tSome Value\n\nA\t1\nB\t\n",
            b'\t',
            10,
            |name| name.to_lowercase().replace(' ', "_"),
        )
        .unwrap();
        assert_eq!(table.header().collect::<Vec<_>>(), vec!["name", "some_value"]);
        assert_eq!(table.len(), 2);
        assert!(table.has_column("some_value"));
        assert!(!table.has_column("Some Value"));
        let row = &table.rows()[0];
        assert_eq!(row.line_index(), 13);
        assert_eq!(row.get("name"), Some("A"));
        assert_eq!(&row[1], "1");
        assert_eq!(
            row.column("some_value")
                .unwrap()
                .parse::<u32>(("", ""))
                .unwrap(),
            1
        );
        assert_eq!(
            table.column_values("some_value").unwrap().collect::<Vec<_>>(),
            vec!["1"]
        );
        assert!(table.column_values("missing").is_none());
        assert_eq!(
            table.rows()[1].column("missing").unwrap_err().get_kind(),
            NormalizeErrorKind::MalformedReport
        );
        assert!(table.rows()[1].cell("some_value").unwrap().or_empty().is_none());
    }

    #[test]
    fn invalid_tables() {
        let error = ReportTable::parse("a\tb\n1\t2\t3", b'\t', 0, str::to_string).unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::MalformedReport);
        let error = ReportTable::parse(" \n\n", b'\t', 0, str::to_string).unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::MalformedReport);
        let table = ReportTable::parse("a\tb", b'\t', 0, str::to_string).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn cells() {
        let table = ReportTable::parse("a\tb\nx; y ;z\t12.5x", b'\t', 0, str::to_string).unwrap();
        let row = &table.rows()[0];
        let parts = row
            .cell("a")
            .unwrap()
            .array(';')
            .map(|c| c.as_str())
            .collect::<Vec<_>>();
        assert_eq!(parts, vec!["x", "y", "z"]);
        let error = row
            .cell("b")
            .unwrap()
            .parse::<f64>(("Invalid number", "Not a number"))
            .unwrap_err();
        assert_eq!(error.get_kind(), NormalizeErrorKind::InvalidCell);
        assert_eq!(error.get_short_description(), "Invalid number");
    }
}
