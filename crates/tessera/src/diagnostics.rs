//! Compiler problems to diagnostic records.

use crate::error::{ExtractionError, Subject};
use crate::log::{BuildLog, LogLevel, emit};
use crate::position::PositionMapper;
use crate::types::{Diagnostic, Severity};
use crate::unit::CompilationUnit;

/// Diagnostics of one unit plus the problems that could not be positioned.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    /// Positioned, classified diagnostics in problem order
    pub diagnostics: Vec<Diagnostic>,
    /// Problems dropped because their offsets were out of range
    pub errors: Vec<ExtractionError>,
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Error,
            Severity::Warning => Self::Warning,
            Severity::Note => Self::Info,
        }
    }
}

/// Convert every reported problem of `unit` into a `Diagnostic`.
///
/// Each diagnostic is also written to `log` as `"{label} {line}:{column} {message}"`
/// at the matching level. Problems that cannot be positioned are logged as
/// warnings, like failed declarations. Log failures never affect the
/// returned report.
#[must_use]
pub fn collect(
    unit: &CompilationUnit,
    mapper: &PositionMapper<'_>,
    log: &dyn BuildLog,
) -> DiagnosticReport {
    let mut report = DiagnosticReport::default();

    for (index, problem) in unit.problems.iter().enumerate() {
        let range = match mapper.compute(problem.start, problem.end) {
            Ok(range) => range,
            Err(e) => {
                let error = ExtractionError::position(Subject::Problem(index), &e);
                emit(log, LogLevel::Warning, &format!("{} {error}", unit.label));
                report.errors.push(error);
                continue;
            }
        };

        let severity = Severity::classify(problem.is_error, problem.is_warning);
        emit(
            log,
            severity.into(),
            &format!(
                "{} {}:{} {}",
                unit.label, range.start_line, range.start_column, problem.message
            ),
        );

        report.diagnostics.push(Diagnostic {
            message: problem.message.clone(),
            severity,
            range,
        });
    }

    report
}
