//! Identifier generation for boards, rules and capture records.

use rand::{distributions::Alphanumeric, Rng};
use ulid::Ulid;

/// Lowercased ULID, sortable by creation time.
pub fn generate_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

/// Opaque alphanumeric secret of the requested length.
pub fn generate_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Board ids start from the random tail of a ULID with letter casing
/// shuffled, padded with random alphanumerics up to `length`. The mixed case
/// keeps the id URL-safe while widening the effective alphabet.
pub fn generate_board_id(length: usize) -> String {
    let ulid = generate_id();
    let tail_start = ulid.len().saturating_sub(10);
    let mut rng = rand::thread_rng();

    let mut id: String = ulid[tail_start..]
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() && rng.gen_bool(0.5) {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();

    while id.len() < length {
        id.push(char::from(rng.sample(Alphanumeric)));
    }
    id.truncate(length);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_lowercase() {
        let id = generate_id();
        assert_eq!(id, id.to_lowercase());
        assert_eq!(id.len(), 26);
    }

    #[test]
    fn test_board_id_length() {
        for len in [10, 16, 24] {
            assert_eq!(generate_board_id(len).len(), len);
        }
    }

    #[test]
    fn test_board_ids_unique() {
        let a = generate_board_id(16);
        let b = generate_board_id(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_is_alphanumeric() {
        let token = generate_token(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
