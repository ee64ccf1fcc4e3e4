// InfoExtractor module - video metadata extraction through yt-dlp
//
// Provides two modes:
// - Python mode: Uses `python3 -m yt_dlp`
// - CLI mode: Uses native `yt-dlp` binary
//
// The Orchestrator picks between them per URL and falls back on failure.

mod cli;
mod command;
mod diagnostics;
mod orchestrator;
mod parse;
mod python;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use orchestrator::InfoExtractorOrchestrator;
pub use parse::parse_json;
pub use python::PythonInfoExtractor;
pub use traits::{ExtractorConfig, ExtractorMode, InfoExtractor, DEFAULT_USER_AGENT};
