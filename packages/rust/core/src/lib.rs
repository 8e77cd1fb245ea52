//! Export orchestration for docexport.
//!
//! Ties navigation loading, document assembly and pandoc conversion into the
//! three export pipelines (`export_inline`, `export_filtered`,
//! `export_chapters`).

pub mod assembler;
pub mod pipeline;
pub mod toc;

pub use pipeline::{
    ExportMode, ExportReport, FailedUnit, MKDOCS_FILE, OutputFile, ProgressReporter, Project,
    SilentProgress, export_chapters, export_filtered, export_inline, locate_project_root,
};
