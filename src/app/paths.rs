//! app::paths
//!
//! Sentinel paths for the standard streams and the null device.
//!
//! Matching is by exact string equality. No normalization is performed, so
//! `/dev/./stdin` is not considered standard input.

/// Path spelling of standard input.
pub const DEV_STDIN_FILE_PATH: &str = "/dev/stdin";

/// Path spelling of standard output.
pub const DEV_STDOUT_FILE_PATH: &str = "/dev/stdout";

/// Path spelling of standard error.
pub const DEV_STDERR_FILE_PATH: &str = "/dev/stderr";

/// Path spelling of the null device.
#[cfg(not(windows))]
pub const DEV_NULL_FILE_PATH: &str = "/dev/null";

/// Path spelling of the null device.
#[cfg(windows)]
pub const DEV_NULL_FILE_PATH: &str = "NUL";

/// Returns true if `path` is the equivalent of `/dev/stdin`.
pub fn is_dev_stdin(path: &str) -> bool {
    !path.is_empty() && path == DEV_STDIN_FILE_PATH
}

/// Returns true if `path` is the equivalent of `/dev/stdout`.
pub fn is_dev_stdout(path: &str) -> bool {
    !path.is_empty() && path == DEV_STDOUT_FILE_PATH
}

/// Returns true if `path` is the equivalent of `/dev/stderr`.
pub fn is_dev_stderr(path: &str) -> bool {
    !path.is_empty() && path == DEV_STDERR_FILE_PATH
}

/// Returns true if `path` is the equivalent of `/dev/null`.
pub fn is_dev_null(path: &str) -> bool {
    !path.is_empty() && path == DEV_NULL_FILE_PATH
}

/// Returns true if `path` is any of the four sentinel paths.
pub fn is_dev_path(path: &str) -> bool {
    is_dev_stdin(path) || is_dev_stdout(path) || is_dev_stderr(path) || is_dev_null(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREDICATES: [fn(&str) -> bool; 4] = [is_dev_stdin, is_dev_stdout, is_dev_stderr, is_dev_null];
    const SENTINELS: [&str; 4] = [
        DEV_STDIN_FILE_PATH,
        DEV_STDOUT_FILE_PATH,
        DEV_STDERR_FILE_PATH,
        DEV_NULL_FILE_PATH,
    ];

    #[test]
    fn predicates_are_mutually_exclusive() {
        for (i, sentinel) in SENTINELS.iter().enumerate() {
            for (j, predicate) in PREDICATES.iter().enumerate() {
                assert_eq!(predicate(sentinel), i == j, "{sentinel} vs predicate {j}");
            }
            assert!(is_dev_path(sentinel));
        }
    }

    #[test]
    fn unrelated_paths_never_match() {
        for path in ["", "/dev", "/dev/stdin/", "stdin", "/tmp/out.txt"] {
            assert!(!is_dev_path(path), "{path}");
        }
    }
}
