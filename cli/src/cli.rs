//! Implements the command line behavior.

use codespan_reporting::{
    diagnostic::{Diagnostic as Report, Severity as ReportSeverity},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use ilgen_analyzer::{validate_with, Issue, Severity, ValidationContext};
use ilgen_dsl::diagnostic::{Diagnostic, ErrorSink, LogSink};
use ilgen_dsl::mnemonic::rows_from_path;
use ilgen_dsl::model::GenerationInput;
use ilgen_dsl::options::GenerationOptions;
use log::{debug, info};
use std::{
    fs::{self, metadata, read_dir},
    path::{Path, PathBuf},
};

/// Generates the mnemonic rows for the condition model in `model`.
///
/// The rows are written as JSON to `output`, or to stdout when there is no
/// output path. Diagnostics are written to stderr.
pub fn generate(
    model: &Path,
    options: Option<&Path>,
    output: Option<&Path>,
    suppress_output: bool,
) -> Result<(), String> {
    let input = GenerationInput::from_path(model).map_err(|e| e.to_string())?;
    let options = match options {
        Some(path) => GenerationOptions::from_path(path).map_err(|e| e.to_string())?,
        None => GenerationOptions::default(),
    };
    info!(
        "Generating {} cylinders from {}",
        input.cylinders.len(),
        model.display()
    );

    let mut diagnostics: Vec<Diagnostic> = vec![];
    let rows = ilgen_codegen::generate(&input, &options, &mut diagnostics);

    if suppress_output {
        let mut sink = LogSink;
        for diagnostic in &diagnostics {
            sink.report(diagnostic.clone());
        }
    } else {
        emit(diagnostics.iter().map(map_diagnostic))?;
    }

    if diagnostics.iter().any(|d| d.critical) {
        return Err(format!(
            "Generation aborted. Number of problems: {}",
            diagnostics.len()
        ));
    }

    let text = serde_json::to_string_pretty(&rows).map_err(|e| e.to_string())?;
    match output {
        Some(path) => fs::write(path, text)
            .map_err(|e| format!("Unable to write file {}. {}", path.display(), e))?,
        None => {
            if !suppress_output {
                println!("{}", text);
            }
        }
    }

    debug!(
        "Generated {} rows with {} problems",
        rows.len(),
        diagnostics.len()
    );
    Ok(())
}

/// Checks the mnemonic streams in the specified files (or directories of
/// files).
///
/// Returns an error if any stream has an error issue. Warnings are reported
/// but do not fail the check.
pub fn check(
    paths: Vec<PathBuf>,
    literal_prefix: &str,
    suppress_output: bool,
) -> Result<(), String> {
    let mut files: Vec<PathBuf> = vec![];
    for path in paths {
        files.append(&mut enumerate_files(path)?);
    }

    let context = ValidationContext {
        literal_prefix: literal_prefix.to_string(),
    };

    let mut errors = 0;
    for filename in files {
        let rows = rows_from_path(&filename).map_err(|e| e.to_string())?;
        let issues = validate_with(&rows, &context);
        debug!("Checked {} with {} issues", filename.display(), issues.len());

        errors += issues.iter().filter(|i| i.is_error()).count();
        if !suppress_output {
            emit(issues.iter().map(|issue| map_issue(issue, &filename)))?;
        }
    }

    if errors > 0 {
        return Err(format!("Number of errors: {}", errors));
    }

    println!("OK");
    Ok(())
}

fn enumerate_files(path: PathBuf) -> Result<Vec<PathBuf>, String> {
    let metadata =
        metadata(path.as_path()).map_err(|e| format!("Unable to read {}. {}", path.display(), e))?;
    if metadata.is_dir() {
        let paths = read_dir(path).map_err(|e| e.to_string())?;
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(_) => None,
            })
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        return Ok(paths);
    }
    if metadata.is_file() {
        return Ok(vec![path]);
    }
    Err(format!("Not a file or directory: {}", path.display()))
}

fn emit(reports: impl IntoIterator<Item = Report<usize>>) -> Result<(), String> {
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    // Rows and records have no source text to point into.
    let files: SimpleFiles<String, String> = SimpleFiles::new();

    for report in reports {
        term::emit(&mut writer.lock(), &config, &files, &report)
            .map_err(|_| "Failed writing to terminal")?;
    }
    Ok(())
}

fn map_diagnostic(diagnostic: &Diagnostic) -> Report<usize> {
    let severity = if diagnostic.critical {
        ReportSeverity::Error
    } else {
        ReportSeverity::Warning
    };

    Report::new(severity)
        .with_code(diagnostic.code.clone())
        .with_message(diagnostic.description())
        .with_notes(vec![format!(
            "in {} {} {}",
            diagnostic.owner.kind, diagnostic.owner.id, diagnostic.owner.name
        )
        .trim_end()
        .to_string()])
}

fn map_issue(issue: &Issue, filename: &Path) -> Report<usize> {
    let severity = match issue.severity {
        Severity::Error => ReportSeverity::Error,
        Severity::Warn => ReportSeverity::Warning,
    };

    Report::new(severity)
        .with_code(issue.code.clone())
        .with_message(issue.message.clone())
        .with_notes(vec![format!(
            "at {} row {} step {}: {} {}",
            filename.display(),
            issue.key,
            issue.step,
            issue.opcode,
            issue.operand
        )
        .trim_end()
        .to_string()])
}

#[cfg(test)]
mod tests {
    use ilgen_dsl::diagnostic::Owner;
    use ilgen_dsl::mnemonic::{InstructionRow, Opcode};
    use ilgen_problems::Problem;
    use ilgen_test::{cli_resource_path, shared_resource_path};
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn check_when_valid_rows_then_ok() {
        let paths = vec![shared_resource_path("valid_rows.json")];
        assert!(check(paths, "K", true).is_ok());
    }

    #[test]
    fn check_when_invalid_rows_then_err_counts_errors() {
        let paths = vec![shared_resource_path("invalid_rows.json")];
        assert_eq!(
            check(paths, "K", true),
            Err(String::from("Number of errors: 2"))
        );
    }

    #[test]
    fn check_when_only_warnings_then_ok() {
        let paths = vec![cli_resource_path("double_coil.json")];
        assert!(check(paths, "K", true).is_ok());
    }

    #[test]
    fn check_when_not_rows_then_err() {
        let paths = vec![cli_resource_path("not_rows.json")];
        assert!(check(paths, "K", true).is_err());
    }

    #[test]
    fn generate_when_output_path_then_writes_rows() {
        let output = NamedTempFile::new().unwrap();

        let result = generate(
            &shared_resource_path("single_condition.json"),
            None,
            Some(output.path()),
            true,
        );

        assert!(result.is_ok());
        let rows = rows_from_path(output.path()).unwrap();
        assert!(rows.iter().any(|r| r.opcode == "OUT" && r.operand == "M100"));
    }

    #[test]
    fn generate_when_options_file_then_options_applied() {
        let output = NamedTempFile::new().unwrap();

        generate(
            &shared_resource_path("single_condition.json"),
            Some(&cli_resource_path("options.json")),
            Some(output.path()),
            true,
        )
        .unwrap();

        let rows: Vec<InstructionRow> = rows_from_path(output.path()).unwrap();
        assert!(rows.iter().any(|r| r.operand == "M800"));
        assert!(rows.iter().any(|r| r.operand == "K1 D100"));
    }

    #[test]
    fn generate_when_empty_model_then_err() {
        let result = generate(&shared_resource_path("empty_model.json"), None, None, true);
        assert!(result.is_err());
    }

    #[test]
    fn map_diagnostic_when_not_critical_then_warning_with_owner_note() {
        let diagnostic = Diagnostic::problem(Problem::MissingDevice, Owner::run());

        let report = map_diagnostic(&diagnostic);

        assert_eq!(report.severity, ReportSeverity::Warning);
        assert_eq!(report.code, Some(String::from("G0101")));
        assert_eq!(report.notes, vec![String::from("in run 0")]);
    }

    #[test]
    fn map_issue_when_error_then_error_report() {
        let row = InstructionRow::instruction(2, "1", Opcode::Out, "Y0");
        let issue = Issue::error(&row, Problem::NoConditionExpression);

        let report = map_issue(&issue, Path::new("rows.json"));

        assert_eq!(report.severity, ReportSeverity::Error);
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(report.notes, vec![String::from("at rows.json row 2 step 1: OUT Y0")]);
    }
}
