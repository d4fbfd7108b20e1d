pub mod readme;
pub mod report_generators;
pub mod table;

pub use readme::{publish, wrap_readme, write_readme};
pub use report_generators::ReportGenerator;
pub use table::{ComparisonRow, FileSize, ReportTable};
