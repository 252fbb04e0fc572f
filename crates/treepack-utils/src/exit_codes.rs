//! Exit code constants for treepack.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CONFIG` | Invalid CLI arguments or configuration |
//! | 66 | `NOT_FOUND` | Split input does not exist |
//! | 74 | `IO_FAILURE` | Read/write failure while bundling or splitting |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for common exit codes, or [`as_i32()`](Self::as_i32)
/// to get the numeric value for `std::process::exit()`.
///
/// # Example
///
/// ```rust
/// use treepack_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::IO_FAILURE, ExitCode::from_i32(74));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Configuration error - bad start directory, config file or pattern
    pub const CONFIG: ExitCode = ExitCode(2);

    /// Not found - the bundle given to `split` does not exist (sysexits `EX_NOINPUT`)
    pub const NOT_FOUND: ExitCode = ExitCode(66);

    /// I/O failure - a file could not be read or written (sysexits `EX_IOERR`)
    pub const IO_FAILURE: ExitCode = ExitCode(74);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CONFIG.as_i32(), 2);
        assert_eq!(ExitCode::NOT_FOUND.as_i32(), 66);
        assert_eq!(ExitCode::IO_FAILURE.as_i32(), 74);
    }

    #[test]
    fn test_exit_code_conversion() {
        let raw: i32 = ExitCode::CONFIG.into();
        assert_eq!(raw, 2);
        assert_eq!(ExitCode::from_i32(raw), ExitCode::CONFIG);
    }
}
