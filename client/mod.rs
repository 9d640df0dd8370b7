pub mod cli_args;
pub mod formatter;
pub mod prompt;
pub mod regions;

pub use cli_args::CliArgs;
pub use formatter::OutputFormatter;
pub use prompt::QueryPrompt;
pub use regions::{lookup_region, parse_bbox};
