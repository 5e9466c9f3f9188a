//! Access codes: generation, issuing, and redemption.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::store::{self, KeyValueStore, keys};

use super::{AccessError, Plan, Subscription, activate};

/// Characters used in codes (no 0/O, 1/I look-alikes).
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 12;
const GROUP_LEN: usize = 4;

/// Days an issued code stays redeemable.
pub const CODE_VALID_DAYS: i64 = 7;

/// A stored access code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    pub email: String,
    pub plan: Plan,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

type CodeBook = BTreeMap<String, AccessCode>;

/// Random code like `ABCD-EFGH-JKLM`.
pub fn generate_code() -> String {
    generate_code_with(&mut rand::rng())
}

fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_LEN + CODE_LEN / GROUP_LEN);
    for i in 0..CODE_LEN {
        if i > 0 && i % GROUP_LEN == 0 {
            code.push('-');
        }
        code.push(ALPHABET[rng.random_range(0..ALPHABET.len())] as char);
    }
    code
}

/// Canonical form of user input: trimmed and uppercased.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

fn load_book(store: &dyn KeyValueStore) -> Result<CodeBook, AccessError> {
    Ok(store::get_as::<CodeBook>(store, keys::ACCESS_CODES)?.unwrap_or_default())
}

/// Create and store a new unused code for `email` and `plan`.
pub fn issue_code(
    store: &dyn KeyValueStore,
    email: &str,
    plan: Plan,
    now: DateTime<Utc>,
) -> Result<AccessCode, AccessError> {
    let mut book = load_book(store)?;
    let code = loop {
        let candidate = generate_code();
        if !book.contains_key(&candidate) {
            break candidate;
        }
    };
    let entry = AccessCode {
        code: code.clone(),
        email: email.trim().to_string(),
        plan,
        is_used: false,
        created_at: now,
        expires_at: now + Duration::days(CODE_VALID_DAYS),
        used_at: None,
    };
    book.insert(code, entry.clone());
    store::set_as(store, keys::ACCESS_CODES, &book)?;
    log::info!("Issued {} access code for {}", entry.plan, entry.email);
    Ok(entry)
}

/// Redeem a code: mark it used and activate a subscription for its plan.
pub fn redeem_code(
    store: &dyn KeyValueStore,
    input: &str,
    now: DateTime<Utc>,
) -> Result<Subscription, AccessError> {
    let code = normalize_code(input);
    let mut book = load_book(store)?;
    let entry = book.get_mut(&code).ok_or(AccessError::InvalidCode)?;

    if entry.is_used {
        return Err(AccessError::AlreadyUsed);
    }
    if now > entry.expires_at {
        return Err(AccessError::Expired);
    }

    // Subscription first: a failed write must not leave the code spent.
    let subscription = activate(store, entry.plan, now)?;
    entry.is_used = true;
    entry.used_at = Some(now);
    store::set_as(store, keys::ACCESS_CODES, &book)?;
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_format() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 14);
            let groups: Vec<&str> = code.split('-').collect();
            assert_eq!(groups.len(), 3);
            for group in groups {
                assert_eq!(group.len(), 4);
                assert!(group.bytes().all(|b| ALPHABET.contains(&b)));
            }
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  abcd-efgh-jklm\n"), "ABCD-EFGH-JKLM");
    }
}
