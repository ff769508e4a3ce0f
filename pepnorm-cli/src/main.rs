//! Convert Scaffold spectrum reports and MaxQuant msms.txt files into normalised peptide tables

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use context_error::*;
use flate2::bufread::GzDecoder;
use pepcore::{
    NormalizeError,
    error::NormalizeErrorKind,
    ontology::ModificationTable,
    sequence::{AminoAcid, Marker},
};
use pepident::{
    BadAccessionPolicy, GroupMethod, NormalizeOptions, normalize_maxquant_table,
    normalize_scaffold_report, output::write_tsv,
};

/// The kind of report to read
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum Format {
    /// A Scaffold spectrum report
    #[default]
    Scaffold,
    /// A MaxQuant msms.txt file
    Maxquant,
}

/// How many scans to keep per peptide for MaxQuant files
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum Grouping {
    /// Keep all scans
    All,
    /// The best scan per sequence and file
    Sequence,
    /// The best scan per sequence, file, and charge
    Charge,
}

impl From<Grouping> for GroupMethod {
    fn from(value: Grouping) -> Self {
        match value {
            Grouping::All => Self::AllScans,
            Grouping::Sequence => Self::BestPerSequenceAndFile,
            Grouping::Charge => Self::BestPerSequenceFileAndCharge,
        }
    }
}

/// The command line interface arguments
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// The report to read, gzipped if it ends in `.gz`
    input: PathBuf,
    /// The kind of report
    #[arg(long, value_enum, default_value_t)]
    format: Format,
    /// A JSON file with the normalisation options, the flags below take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// A JSON file with additional modifications
    #[arg(long)]
    modifications: Option<PathBuf>,
    /// The output path, defaults to `<input>_parsed.tsv` in the working directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Calculate the molecular formula and mass of all peptides
    #[arg(long)]
    calc_formula: bool,
    /// Keep peptides for which the protein accession could not be parsed
    #[arg(long)]
    keep_bad_ids: bool,
    /// The extension of the precursor files
    #[arg(long)]
    file_ext: Option<String>,
    /// The residue that is shown as `<residue>*` when it carries the marker mass
    #[arg(long)]
    mod_residue: Option<char>,
    /// The fixed modifications for MaxQuant files, eg `C:carbamidomethyl`
    #[arg(short, long)]
    fixed_mods: Option<String>,
    /// How many scans to keep per peptide for MaxQuant files
    #[arg(short, long, value_enum)]
    group_method: Option<Grouping>,
    /// Show debug output and all warnings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(
            env_logger::Env::default()
                .filter_or("PEPNORM_LOG", if args.verbose { "debug" } else { "info" }),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<(), NormalizeError> {
    let options = options(args)?;
    let mut table = ModificationTable::builtin().clone();
    if let Some(path) = &args.modifications {
        table.extend(ModificationTable::from_json(&read_file(path)?)?);
    }

    let text = read_file(&args.input)?;
    log::info!("Read {}", args.input.display());
    let report = match args.format {
        Format::Scaffold => normalize_scaffold_report(&text, &table, &options)?,
        Format::Maxquant => normalize_maxquant_table(&text, &table, &options)?,
    };

    for failure in &report.diagnostics.failures {
        eprintln!("{}", failure.error);
    }
    if args.verbose {
        for warning in &report.diagnostics.warnings {
            eprintln!("{warning}");
        }
    }
    report.diagnostics.log();

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    let file = File::create(&path)
        .map_err(|err| io_error("Could not create output file", &err, &path))?;
    write_tsv(BufWriter::new(file), &report.records)
        .map_err(|err| io_error("Could not write output file", &err, &path))?;
    log::info!(
        "Wrote {} peptide(s) to {}",
        report.records.len(),
        path.display()
    );
    Ok(())
}

/// The options from the config file (if any) with all overrides from the command line
fn options(args: &Cli) -> Result<NormalizeOptions, NormalizeError> {
    let mut options = match &args.config {
        Some(path) => NormalizeOptions::from_json(&read_file(path)?)?,
        None => NormalizeOptions::default(),
    };
    if args.calc_formula {
        options.calc_formula = true;
    }
    if args.keep_bad_ids {
        options.bad_accession_policy = BadAccessionPolicy::Keep;
    }
    if let Some(extension) = &args.file_ext {
        options.file_extension.clone_from(extension);
    }
    if let Some(fixed) = &args.fixed_mods {
        options.fixed_modifications.clone_from(fixed);
    }
    if let Some(method) = args.group_method {
        options.group_method = method.into();
    }
    if let Some(residue) = args.mod_residue {
        let residue = AminoAcid::try_from(residue).map_err(|()| {
            BoxedError::new(
                NormalizeErrorKind::InvalidConfiguration,
                "Invalid marker residue",
                format!("The character '{residue}' is not a known amino acid"),
                Context::none(),
            )
        })?;
        options.marker = Some(Marker {
            residue,
            mass: options.marker.map_or(Marker::default().mass, |m| m.mass),
        });
    }
    Ok(options)
}

/// `<input stem>_parsed.tsv`, a `.gz` extension is removed as well
fn default_output(input: &Path) -> PathBuf {
    let is_gz = input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let base = if is_gz {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };
    let stem = base
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    PathBuf::from(format!("{stem}_parsed.tsv"))
}

fn read_file(path: &Path) -> Result<String, NormalizeError> {
    let file = File::open(path).map_err(|err| io_error("Could not open file", &err, path))?;
    let mut text = String::new();
    let read = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
        GzDecoder::new(BufReader::new(file)).read_to_string(&mut text)
    } else {
        BufReader::new(file).read_to_string(&mut text)
    };
    read.map_err(|err| io_error("Could not read file", &err, path))?;
    Ok(text)
}

fn io_error(short: &str, err: &std::io::Error, path: &Path) -> NormalizeError {
    BoxedError::new(
        NormalizeErrorKind::InvalidConfiguration,
        short.to_string(),
        err.to_string(),
        Context::default()
            .source(path.to_string_lossy())
            .to_owned(),
    )
}
