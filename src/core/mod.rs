/*!
# Core Module

Core functionality for the report importer: the unified violation
model, import results, error handling and file reading helpers.
*/

pub mod errors;
pub mod fs_utils;
pub mod results;
pub mod violation;

pub use errors::{ImportError, ImportResult};
pub use fs_utils::read_text_file;
pub use results::{ImportMetadata, ImportResults, ToolStats};
pub use violation::{Severity, Violation};
