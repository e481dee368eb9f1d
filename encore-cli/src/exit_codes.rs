//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (curated keywords missing under --strict).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Service unavailable (photo API unreachable or failing).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// I/O error (cannot write output).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Configuration error (missing API key, bad URL).
/// Maps to EX_CONFIG from sysexits.h.
pub const CONFIG_ERROR: i32 = 78;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("Configuration error")
            || message.contains("SMUGMUG_API_KEY")
        {
            CONFIG_ERROR
        } else if message.contains("curated keyword(s) missing") {
            VERIFICATION_FAILED
        } else if message.contains("Upstream returned")
            || message.contains("Network error")
            || message.contains("Invalid upstream response")
            || message.contains("Aggregation failed")
        {
            NETWORK_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
