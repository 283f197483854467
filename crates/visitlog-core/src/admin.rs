/// Request header carrying the admin shared secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Decide whether a request may read the visit log.
///
/// Allowed only when an admin key is configured (non-empty), the request
/// supplied one, and the two are byte-for-byte equal.
pub fn is_authorized(supplied: Option<&str>, configured: Option<&str>) -> bool {
    match (supplied, configured) {
        (Some(supplied), Some(configured)) if !configured.is_empty() => supplied == configured,
        _ => false,
    }
}
