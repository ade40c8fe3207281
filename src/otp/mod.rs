//! Email-OTP backend and client.
//!
//! The backend is the small HTTP service the registration flow posts codes
//! to: it relays the code over SMTP and keeps a process-wide pending-code
//! map. Codes live until one verify attempt matches or a newer request for
//! the same email overwrites them; there is no expiry.

pub mod client;
pub mod mailer;
pub mod routes;
pub mod store;

pub use client::{OtpBackendClient, OtpDispatcher};
pub use mailer::{OtpMailer, SmtpMailer};
pub use routes::{OtpServerState, otp_routes};
pub use store::OtpStore;

use rand::Rng;

/// Uniformly random 6-digit code, 100000..=999999.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }
}
