//! Aggregation, publishing and run-to-run comparison of results

pub mod aggregate;
pub mod display;
pub mod history;
pub mod sink;

pub use aggregate::{SuiteReport, Verdict};
pub use history::{CaseChange, CaseDelta, ReportComparison};
pub use sink::{
    load_report, load_report_with_fs, JsonReportSink, MemorySink, ReportError, ReportSink,
    DIFF_DIR_NAME, REPORT_FILE_NAME,
};
