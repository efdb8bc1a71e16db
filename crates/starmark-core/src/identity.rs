//! Canonical user identity keys.
//!
//! Raw identifiers arrive in many phone-number-like formats. Every store
//! lookup and write goes through the canonical digit key so that
//! `"+91 8864862270"`, `"8864862270"`, and `"+918864862270"` all resolve
//! to the same user.

/// Canonicalize a raw identifier: strip non-digits, keep the last 10.
///
/// Pure and total. Inputs with fewer than 10 digits (including the empty
/// string) return the full digit string.
pub fn canonical_key(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

/// Keys to try when reading stores that may hold legacy records.
///
/// The canonical key comes first and is the only key ever written; the
/// country-code variants cover records persisted before normalization
/// existed. Duplicates are removed, order preserved.
pub fn lookup_keys(raw: &str, country_code: &str) -> Vec<String> {
    let canonical = canonical_key(raw);
    if canonical.is_empty() {
        return Vec::new();
    }
    let candidates = [
        canonical.clone(),
        format!("+{country_code}{canonical}"),
        format!("+{country_code} {canonical}"),
        raw.trim().to_string(),
    ];
    let mut keys: Vec<String> = Vec::with_capacity(candidates.len());
    for key in candidates {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_unifies_formats() {
        assert_eq!(canonical_key("+91 8864862270"), "8864862270");
        assert_eq!(canonical_key("8864862270"), "8864862270");
        assert_eq!(canonical_key("+918864862270"), "8864862270");
        assert_eq!(canonical_key("(886) 486-2270"), "8864862270");
    }

    #[test]
    fn canonical_key_short_and_empty() {
        assert_eq!(canonical_key("12345"), "12345");
        assert_eq!(canonical_key(""), "");
        assert_eq!(canonical_key("no digits here"), "");
    }

    #[test]
    fn lookup_keys_canonical_first() {
        let keys = lookup_keys("+91 8864862270", "91");
        assert_eq!(keys[0], "8864862270");
        assert!(keys.contains(&"+918864862270".to_string()));
        assert!(keys.contains(&"+91 8864862270".to_string()));
    }

    #[test]
    fn lookup_keys_deduplicates() {
        let keys = lookup_keys("8864862270", "91");
        assert_eq!(
            keys.iter().filter(|k| k.as_str() == "8864862270").count(),
            1
        );
    }

    #[test]
    fn lookup_keys_empty_input() {
        assert!(lookup_keys("", "91").is_empty());
        assert!(lookup_keys("---", "91").is_empty());
    }
}
