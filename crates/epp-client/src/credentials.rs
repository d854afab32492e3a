//! Generated object identifiers and auth-info passwords.

use epp_core::Environment;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!=+-";

/// Length of generated contact ids.
pub const CONTACT_ID_LEN: usize = 16;

/// Length of generated auth-info passwords.
pub const AUTH_INFO_LEN: usize = 16;

/// Random contact id of upper-case letters and digits.
pub fn contact_id<E: Environment>(env: &E) -> String {
    (0..CONTACT_ID_LEN)
        .map(|_| {
            let i = env.random_index(UPPER.len() + DIGITS.len());
            char::from(if i < UPPER.len() { UPPER[i] } else { DIGITS[i - UPPER.len()] })
        })
        .collect()
}

/// Random auth-info password with at least one character of each class.
pub fn auth_info<E: Environment>(env: &E) -> String {
    let pool: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();

    let mut chars: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].iter().map(|class| pick(env, class)).collect();
    while chars.len() < AUTH_INFO_LEN {
        chars.push(pick(env, &pool));
    }

    // Fisher-Yates, so the mandatory classes are not always in front
    for i in (1..chars.len()).rev() {
        chars.swap(i, env.random_index(i + 1));
    }

    chars.into_iter().map(char::from).collect()
}

fn pick<E: Environment>(env: &E, class: &[u8]) -> u8 {
    class.get(env.random_index(class.len())).copied().unwrap_or(b'0')
}
