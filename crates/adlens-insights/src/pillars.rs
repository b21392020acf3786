//! Creative-pillar frequency tallies.
//!
//! Pillar labels are free text entered (or generated) inconsistently:
//! sometimes a JSON array, sometimes a comma-joined string, with stray
//! braces and quotes. The tally merges case variants under the first-seen
//! casing and reports each pillar's share of the ads that carry any pillar.

use serde::Serialize;

/// One pillar's share of the examined ads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PillarShare {
    pub pillar: String,
    pub count: usize,
    /// `round(count / ads-with-any-pillar * 100)`.
    pub percentage: u32,
}

/// Tallies pillar frequency across ads.
///
/// Each element of `creative_pillars` is one ad's raw pillar value (`None`
/// for ads without one). A pillar counts once per ad regardless of how many
/// times the ad repeats it. Output is sorted by count descending; ties keep
/// first-seen order.
#[must_use]
pub fn tally_pillars(creative_pillars: &[Option<String>]) -> Vec<PillarShare> {
    // Canonical casing per lowercase key, in first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, (String, usize)> =
        std::collections::HashMap::new();
    let mut ads_with_pillars = 0usize;

    for raw in creative_pillars {
        let Some(raw) = raw.as_deref() else { continue };
        let pillars = parse_pillars(raw);
        if pillars.is_empty() {
            continue;
        }
        ads_with_pillars += 1;

        let mut seen_this_ad = std::collections::HashSet::new();
        for pillar in pillars {
            let key = pillar.to_lowercase();
            if !seen_this_ad.insert(key.clone()) {
                continue;
            }
            match counts.get_mut(&key) {
                Some((_, count)) => *count += 1,
                None => {
                    order.push(key.clone());
                    counts.insert(key, (pillar, 1));
                }
            }
        }
    }

    let mut shares: Vec<PillarShare> = order
        .into_iter()
        .filter_map(|key| counts.remove(&key))
        .map(|(pillar, count)| PillarShare {
            pillar,
            count,
            percentage: percentage_of(count, ads_with_pillars),
        })
        .collect();

    // Stable sort: ties keep insertion order.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Splits one ad's raw pillar value into clean labels.
///
/// Tries a JSON string array first; on failure falls back to comma
/// splitting. Either way, tokens are trimmed and stripped of brace, bracket
/// and quote characters.
fn parse_pillars(raw: &str) -> Vec<String> {
    let tokens: Vec<String> = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(ToOwned::to_owned))
            .collect(),
        Err(_) => raw.split(',').map(ToOwned::to_owned).collect(),
    };

    tokens
        .into_iter()
        .map(|token| {
            token
                .trim()
                .trim_matches(|c| matches!(c, '{' | '}' | '[' | ']' | '"' | '\''))
                .trim()
                .to_owned()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn percentage_of(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let ratio = count as f64 / total as f64 * 100.0;
    ratio.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ads(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some((*v).to_owned())).collect()
    }

    #[test]
    fn merges_case_variants_under_first_seen_casing() {
        let shares = tally_pillars(&ads(&[
            "{Educational}",
            "educational",
            "Educational, Promotional",
        ]));

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].pillar, "Educational");
        assert_eq!(shares[0].count, 3);
        assert_eq!(shares[0].percentage, 100);
        assert_eq!(shares[1].pillar, "Promotional");
        assert_eq!(shares[1].count, 1);
        assert_eq!(shares[1].percentage, 33);
    }

    #[test]
    fn parses_json_arrays_before_comma_splitting() {
        let shares = tally_pillars(&ads(&[r#"["Social Proof", "Educational"]"#]));
        let names: Vec<&str> = shares.iter().map(|s| s.pillar.as_str()).collect();
        assert_eq!(names, vec!["Social Proof", "Educational"]);
    }

    #[test]
    fn repeated_pillar_in_one_ad_counts_once() {
        let shares = tally_pillars(&ads(&["Educational, educational"]));
        assert_eq!(shares[0].count, 1);
    }

    #[test]
    fn ads_without_pillars_are_excluded_from_the_total() {
        let mut input = ads(&["Educational"]);
        input.push(None);
        input.push(Some("   ".to_owned()));

        let shares = tally_pillars(&input);
        assert_eq!(shares[0].count, 1);
        assert_eq!(shares[0].percentage, 100);
    }

    #[test]
    fn sorted_by_count_descending_with_stable_ties() {
        let shares = tally_pillars(&ads(&[
            "Promotional",
            "Educational, Promotional",
            "Testimonial",
        ]));

        let names: Vec<&str> = shares.iter().map(|s| s.pillar.as_str()).collect();
        assert_eq!(names, vec!["Promotional", "Educational", "Testimonial"]);
    }

    #[test]
    fn percentages_never_exceed_one_hundred() {
        let shares = tally_pillars(&ads(&["A", "A, B", "a, c"]));
        let total: usize = 3;
        for share in &shares {
            assert!(share.count <= total);
            assert!(share.percentage <= 100);
        }
    }
}
