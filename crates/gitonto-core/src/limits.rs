//! Query and inference thresholds

/// Result limit used when a query names none (or an unparsable one)
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Upper bound for a requested result limit
pub const MAX_QUERY_LIMIT: usize = 10_000;

/// Branch count at which a repository is tagged multi-branch
pub const MULTI_BRANCH_THRESHOLD: usize = 5;

/// Clamp a requested result limit to [`MAX_QUERY_LIMIT`]
pub fn clamp_query_limit(requested: usize) -> usize {
    requested.min(MAX_QUERY_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_query_limit() {
        assert_eq!(clamp_query_limit(0), 0);
        assert_eq!(clamp_query_limit(25), 25);
        assert_eq!(clamp_query_limit(1_000_000), MAX_QUERY_LIMIT);
    }
}
