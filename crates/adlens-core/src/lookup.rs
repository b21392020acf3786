//! Normalization for analysis-run lookup keys.
//!
//! Run lookup is exact-match-after-normalization: both the stored value and
//! the query value pass through these functions before comparison. The
//! trailing-comma strip on product focus exists because legacy data entry
//! appended one to some stored rows; normalizing both sides keeps those rows
//! reachable without reproducing substring-match fallbacks.

/// Normalizes a client name for lookup: trimmed and case-folded.
#[must_use]
pub fn normalize_client_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes a product focus for lookup: trimmed, case-folded, and with at
/// most one trailing comma removed.
#[must_use]
pub fn normalize_product_focus(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    trimmed.trim_end().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_name_is_trimmed_and_case_folded() {
        assert_eq!(normalize_client_name("  Acme Corp  "), "acme corp");
    }

    #[test]
    fn product_focus_strips_one_trailing_comma() {
        assert_eq!(normalize_product_focus("CRM Software,"), "crm software");
        assert_eq!(normalize_product_focus("CRM Software, "), "crm software");
    }

    #[test]
    fn product_focus_keeps_interior_commas() {
        assert_eq!(
            normalize_product_focus("CRM, ERP and billing"),
            "crm, erp and billing"
        );
    }

    #[test]
    fn already_normalized_values_pass_through() {
        assert_eq!(normalize_product_focus("crm software"), "crm software");
    }
}
