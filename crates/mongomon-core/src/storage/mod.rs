pub mod writer;

pub use writer::{
    ExistingFileChoice, FileStrategy, LogError, LogWriter, ensure_reports_dir,
    resolve_file_strategy,
};
