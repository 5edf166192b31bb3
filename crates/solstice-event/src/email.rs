//! Email canonicalization for participant matching.

/// Canonicalizes an email address for equality comparison.
///
/// Lowercases the whole address, strips a `+suffix` from the local part, and
/// drops `.`, `-` and `_` from the local part. The domain is kept as-is
/// (beyond lowercasing) so `j.doe+cal@Example.com` and `jdoe@example.com`
/// compare equal.
#[must_use]
pub fn canonicalize_email(email: &str) -> String {
    let lowered = email.to_lowercase();
    let Some((local, domain)) = lowered.split_once('@') else {
        return lowered;
    };

    let local = local.split('+').next().unwrap_or(local);
    let local: String = local.chars().filter(|c| !matches!(c, '.' | '-' | '_')).collect();

    format!("{local}@{domain}")
}
