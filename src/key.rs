//! Request path to object key mapping

/// Map a raw request path to an object key.
///
/// Exactly one leading `/` is removed. Nothing else is touched: no case
/// folding, no `.`/`..` resolution, no percent-decoding.
pub fn normalize(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
