// src/constants.rs

/// Group name for the always-present global CLI options.
pub const GROUP_GLOBAL: &str = "global";

/// Group name used for runner-contributed options when the configuration
/// does not name the runner.
pub const DEFAULT_RUNNER_GROUP: &str = "runner";

/// Group name for options contributed by the context generator.
pub const GROUP_GENERATOR: &str = "generator";

/// Log file written when `-logLevel` is set without an explicit `-logFile`.
pub const DEFAULT_LOG_FILE: &str = "procrun.log";
