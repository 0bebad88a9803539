//! JSON-lines report adapter: one object per input file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::error::StratsearchError;
use crate::domain::params::ParameterVector;
use crate::domain::search::FileReport;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct ResultLine<'a> {
    file: &'a str,
    strategy: Strategy,
    value: f64,
    params: &'a ParameterVector,
}

#[derive(Serialize)]
struct ErrorLine<'a> {
    file: &'a str,
    error: String,
}

/// Render one report as a single JSON line, without the trailing newline.
pub fn to_json_line(report: &FileReport) -> Result<String, StratsearchError> {
    let line = match &report.outcome {
        Ok(result) => serde_json::to_string(&ResultLine {
            file: &report.file,
            strategy: result.strategy,
            value: result.value,
            params: &result.params,
        }),
        Err(e) => serde_json::to_string(&ErrorLine {
            file: &report.file,
            error: e.to_string(),
        }),
    };
    line.map_err(|e| StratsearchError::Report {
        reason: format!("cannot serialize result for {}: {}", report.file, e),
    })
}

/// Writes to `path` when set, otherwise to stdout.
pub struct JsonReportAdapter {
    path: Option<PathBuf>,
}

impl JsonReportAdapter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn write_lines<W: Write>(out: W, reports: &[FileReport]) -> Result<(), StratsearchError> {
        let mut out = BufWriter::new(out);
        for report in reports {
            writeln!(out, "{}", to_json_line(report)?)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, reports: &[FileReport]) -> Result<(), StratsearchError> {
        match &self.path {
            Some(path) => {
                let file = File::create(path).map_err(|e| StratsearchError::Report {
                    reason: format!("cannot create {}: {}", path.display(), e),
                })?;
                Self::write_lines(file, reports)
            }
            None => Self::write_lines(io::stdout().lock(), reports),
        }
    }
}
