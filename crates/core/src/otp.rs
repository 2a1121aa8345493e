//! One-time verification codes for two-factor authentication.

use rand::Rng;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Challenge lifetime in minutes.
pub const CHALLENGE_TTL_MINS: i64 = 10;

/// Maximum failed verify attempts before a challenge is invalidated.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;

/// Generate a 6-digit numeric verification code, uniform over
/// `100000..=999999`.
pub fn generate_code() -> String {
    rand::rng().random_range(100000..=999999u32).to_string()
}

/// Mask a destination phone number for user-facing responses, keeping only
/// the last four digits (e.g. `+15551234567` -> `***4567`).
pub fn mask_destination(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let tail: String = digits
        .iter()
        .skip(digits.len().saturating_sub(4))
        .collect();
    format!("***{tail}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn code_never_has_leading_zero() {
        // The range starts at 100000, so the first digit is always 1-9.
        for _ in 0..100 {
            assert_ne!(generate_code().chars().next(), Some('0'));
        }
    }

    #[test]
    fn codes_are_roughly_uniform() {
        // Bucket the leading digit over a large sample; each of 1-9 should
        // appear within a generous tolerance of the expected 1/9 share.
        let sample = 9_000;
        let mut buckets = [0u32; 10];
        for _ in 0..sample {
            let first = generate_code().chars().next().unwrap();
            buckets[first.to_digit(10).unwrap() as usize] += 1;
        }
        assert_eq!(buckets[0], 0);
        for digit in 1..=9 {
            let count = buckets[digit];
            assert!(
                (500..=1500).contains(&count),
                "digit {digit} appeared {count} times out of {sample}"
            );
        }
    }

    #[test]
    fn mask_keeps_last_four_digits() {
        assert_eq!(mask_destination("+15551234567"), "***4567");
        assert_eq!(mask_destination("555-123-4567"), "***4567");
    }

    #[test]
    fn mask_handles_short_numbers() {
        assert_eq!(mask_destination("911"), "***911");
    }
}
