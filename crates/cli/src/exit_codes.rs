//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts that schedule `lawlist compare` rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                  |
//! |---------|------------|----------------------------------------------|
//! | 0       | Universal  | Success (discrepancies are not an error)     |
//! | 1       | Universal  | General error (unspecified)                  |
//! | 2       | Universal  | CLI usage error (bad args, missing file)     |
//! | 3-9     | compare    | Config, input and export failures            |
//! | 50-59   | fetch      | Wiki page / catalogue service retrieval      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Compare (3-9)
// =============================================================================

/// Run config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input payload unusable (markup yielded nothing, catalogue had no records).
pub const EXIT_INPUT_PARSE: u8 = 4;

/// Report tables could not be written.
pub const EXIT_EXPORT_IO: u8 = 5;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Transport failure (DNS, connect, timeout) after all retries.
pub const EXIT_FETCH_NETWORK: u8 = 50;

/// Upstream answered with a non-success HTTP status.
pub const EXIT_FETCH_UPSTREAM: u8 = 51;

/// Upstream answered 2xx with an empty body.
pub const EXIT_FETCH_EMPTY: u8 = 52;
