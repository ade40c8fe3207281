//! Process-wide pending-code map, keyed by email.

use std::collections::HashMap;
use std::sync::Mutex;

/// Ephemeral OTP storage. Lives for the life of the server process; codes do
/// not survive a restart and have no expiry timer.
#[derive(Default)]
pub struct OtpStore {
    codes: Mutex<HashMap<String, String>>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pending code, unconditionally overwriting any prior code for
    /// the same email.
    pub fn insert(&self, email: &str, code: &str) {
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), code.to_string());
    }

    /// Check `code` against the pending code for `email`. A match removes
    /// the record; a mismatch or absent record leaves state untouched.
    pub fn verify(&self, email: &str, code: &str) -> bool {
        let mut codes = self.codes.lock().unwrap();
        if codes.get(email).is_some_and(|pending| pending == code) {
            codes.remove(email);
            true
        } else {
            false
        }
    }

    /// Pending code for `email`, if any.
    pub fn pending(&self, email: &str) -> Option<String> {
        self.codes.lock().unwrap().get(email).cloned()
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matching_code_removes_record() {
        let store = OtpStore::new();
        store.insert("a@b.com", "123456");

        assert!(store.verify("a@b.com", "123456"));
        assert!(store.pending("a@b.com").is_none());
        // Deleted record: a second attempt with the same code fails.
        assert!(!store.verify("a@b.com", "123456"));
    }

    #[test]
    fn verify_mismatch_keeps_record_and_stays_retryable() {
        let store = OtpStore::new();
        store.insert("a@b.com", "123456");

        assert!(!store.verify("a@b.com", "000000"));
        assert!(!store.verify("a@b.com", "999999"));
        // No lockout, no attempt counter.
        assert!(store.verify("a@b.com", "123456"));
    }

    #[test]
    fn verify_absent_record_fails() {
        let store = OtpStore::new();
        assert!(!store.verify("nobody@b.com", "123456"));
    }

    #[test]
    fn second_request_overwrites_first_leaving_one_pending_code() {
        let store = OtpStore::new();
        store.insert("a@b.com", "111111");
        store.insert("a@b.com", "222222");

        assert_eq!(store.len(), 1);
        assert_eq!(store.pending("a@b.com").as_deref(), Some("222222"));
        assert!(!store.verify("a@b.com", "111111"), "superseded code is dead");
        assert!(store.verify("a@b.com", "222222"));
    }

    #[test]
    fn codes_are_keyed_per_email() {
        let store = OtpStore::new();
        store.insert("a@b.com", "111111");
        store.insert("c@d.com", "222222");

        assert_eq!(store.len(), 2);
        assert!(!store.verify("a@b.com", "222222"));
        assert!(store.verify("c@d.com", "222222"));
        assert_eq!(store.len(), 1);
    }
}
