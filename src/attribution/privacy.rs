/// Anonymize a token for display/logging without leaking the full value.
/// Example: `abcd1234efgh5678` -> `abcd…5678`.
pub fn anonymize_token(token: &str) -> String {
    let s = token.trim();
    if s.is_empty() {
        return "<empty>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let start: String = chars.iter().take(4).collect();
    let end: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{start}…{end}")
}

/// Stable SHA-256 hex digest so two log lines about the same token can be
/// correlated.
pub fn stable_hash_hex(value: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymize_keeps_only_edges() {
        assert_eq!(anonymize_token("abcd1234efgh5678"), "abcd…5678");
        assert_eq!(anonymize_token("short"), "<redacted>");
        assert_eq!(anonymize_token("   "), "<empty>");
    }

    #[test]
    fn hash_is_stable_hex() {
        let a = stable_hash_hex("token");
        assert_eq!(a, stable_hash_hex("token"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, stable_hash_hex("other"));
    }
}
