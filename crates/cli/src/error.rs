//! CLI errors and their exit codes.
//!
//! - 0:  success
//! - 2:  clap argument error (raised before `run`)
//! - 10: engine error (clustering failure, bad dimensions, cancellation)
//! - 11: I/O error (image decode/encode, file access)
//! - 12: input error (unparseable color, bad gradient, bad `--params`)
//! - 13: serialization error

use std::fmt;

use huelab_core::ColorError;

pub enum CliError {
    Engine(ColorError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl From<ColorError> for CliError {
    fn from(e: ColorError) -> Self {
        match e {
            ColorError::Io(msg) => CliError::Io(msg),
            ColorError::Parse(_) | ColorError::Range { .. } | ColorError::InvalidGradient(_) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
