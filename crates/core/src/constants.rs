/// Constants used throughout the nickel-bridge codebase
// Evaluator executable
pub const DEFAULT_EXECUTABLE: &str = "nickel";
pub const EXPORT_SUBCOMMAND: &str = "export";
pub const FORMAT_FLAG: &str = "--format";

// Environment variable names
pub const EXECUTABLE_VAR: &str = "NICKEL_BRIDGE_EXECUTABLE";
pub const MAX_DEPTH_VAR: &str = "NICKEL_BRIDGE_MAX_DEPTH";
pub const TRAILING_BYTES_VAR: &str = "NICKEL_BRIDGE_TRAILING_BYTES";
pub const LOG_VAR: &str = "NICKEL_BRIDGE_LOG";

// Decoder limits
pub const DEFAULT_MAX_DEPTH: usize = 512;
// Highest configurable depth; the decoder recurses once per level
pub const MAX_DEPTH_LIMIT: usize = 4096;

// Temporary source files for expression mode
pub const SOURCE_FILE_PREFIX: &str = "nickel-bridge-";
pub const SOURCE_FILE_SUFFIX: &str = ".ncl";

// Fallback when the evaluator fails without printing anything
pub const GENERIC_EVALUATION_FAILURE: &str = "evaluator exited without a diagnostic";

pub const INSTALL_HINT: &str =
    "install the Nickel CLI (https://nickel-lang.org) or set NICKEL_BRIDGE_EXECUTABLE to its path";
