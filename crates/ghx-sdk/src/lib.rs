// ghx-sdk: Foundation layer for the ghx workflow executor.
// This crate has ZERO dependencies on other ghx crates and provides the
// file-system helpers and trace sink used throughout the workspace.

pub mod io_util;
pub mod string_util;
pub mod trace;

pub use io_util::IOUtil;
pub use string_util::StringUtil;
pub use trace::{CollectingTraceWriter, NullTraceWriter, TraceLevel, TraceWriter, TracingTraceWriter};
