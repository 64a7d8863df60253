// Solver exit status interpretation

use serde::{Deserialize, Serialize};

/// Signal number conventionally reported for a segmentation fault
pub const SIGSEGV: i32 = 11;

/// Raw solver return code
///
/// Normal exits carry the process exit code. A process terminated by a
/// signal is encoded as the negated signal number, so a segfault is `-11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatusCode(i32);

impl ExitStatusCode {
    pub fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub fn from_signal(signal: i32) -> Self {
        Self(-signal)
    }

    pub fn raw(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Terminating signal, if the process did not exit on its own
    pub fn signal(&self) -> Option<i32> {
        (self.0 < 0).then(|| -self.0)
    }

    pub fn is_segfault(&self) -> bool {
        self.signal() == Some(SIGSEGV)
    }
}

impl std::fmt::Display for ExitStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the error message for a non-zero return code
///
/// The raw code is always included; a segfault gets an extra diagnosis.
pub fn abnormal_exit_message(code: ExitStatusCode) -> String {
    let mut message = format!("The planner failed with return code {}.", code);
    if code.is_segfault() {
        message.push_str(" - The error might be a segmentation fault (SIGSEGV).");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        let code = ExitStatusCode::from_code(0);
        assert!(code.is_success());
        assert_eq!(code.signal(), None);
        assert!(!code.is_segfault());
    }

    #[test]
    fn test_signal_encoding() {
        let code = ExitStatusCode::from_signal(9);
        assert_eq!(code.raw(), -9);
        assert_eq!(code.signal(), Some(9));
        assert!(!code.is_success());
    }

    #[test]
    fn test_segfault_message_has_diagnosis() {
        let message = abnormal_exit_message(ExitStatusCode::from_signal(SIGSEGV));
        assert!(message.contains("-11"));
        assert!(message.contains("segmentation fault (SIGSEGV)"));
    }

    #[test]
    fn test_non_zero_codes_are_reported_generically() {
        for raw in [1, 2, 11, 127, 255, -9, -15] {
            let message = abnormal_exit_message(ExitStatusCode::from_code(raw));
            assert!(message.contains(&raw.to_string()), "missing code in {message}");
            assert!(!message.contains("SIGSEGV"), "unexpected diagnosis for {raw}");
        }
    }
}
