//! Audit Policy Defaults
//!
//! Token-budget limits applied before a project is sent to the model.
//! Anything past these limits is silently dropped from the audit.

/// Files kept from one archive, in archive enumeration order
pub const DEFAULT_MAX_FILES: usize = 50;

/// Characters of each file body included in the prompt
pub const DEFAULT_MAX_FILE_CHARS: usize = 2000;

/// Extensions (after the last `.`, compared lowercase) considered source
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["js", "jsx", "ts", "tsx", "json", "css", "html", "md"];

/// Appended to a file body that was cut at `max_file_chars`
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Written into every exported report
pub const ORCHESTRATOR_VERSION: &str = "7.0.0";
