mod batch;
mod work;

pub use batch::{BatchReport, ErrorReport, default_workers, log_summary, process_batch};
pub use work::{Pipeline, WorkItem, WorkOutcome, generate_thumbnails};
