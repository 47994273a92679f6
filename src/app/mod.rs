pub mod export_use_case;
pub mod report_use_case;

pub use export_use_case::ExportUseCase;
pub use report_use_case::{ReportRun, ReportUseCase};
