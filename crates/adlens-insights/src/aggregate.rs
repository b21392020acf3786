//! Ad-set aggregation over flat ad exports.
//!
//! The upstream export carries one row per ad with metric values as strings.
//! Aggregation groups rows by ad-set id in first-seen order, sums additive
//! metrics, takes the max of rate-like metrics, and derives CTR/CPC from the
//! aggregated totals. A malformed numeric field counts as zero, never as an
//! error.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use adlens_core::UNCATEGORIZED_STAGE;

// ---------------------------------------------------------------------------
// Input and output shapes
// ---------------------------------------------------------------------------

/// One flat ad row, decoupled from storage.
#[derive(Debug, Clone, Default)]
pub struct AdRecord {
    pub ad_id: String,
    pub ad_name: String,
    pub ad_set_id: String,
    pub ad_set_name: String,
    pub impressions: String,
    pub reach: String,
    pub spend: String,
    pub clicks: String,
    pub frequency: String,
    pub roas: String,
    pub ctr: String,
    pub cpc: String,
    pub thumbnail_url: Option<String>,
    pub audience: Option<String>,
}

/// A derived-or-passthrough metric: derived values are computed from
/// aggregated totals; passthrough values repeat the first-seen row's stored
/// string when the totals cannot support a derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Derived(f64),
    Passthrough(String),
}

/// An ad entry attached to an aggregate for thumbnail display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdThumbnail {
    pub ad_id: String,
    pub ad_name: String,
    pub thumbnail_url: String,
}

/// Display-formatted copies of the additive metrics (en-US grouping).
#[derive(Debug, Clone, Serialize)]
pub struct DisplayMetrics {
    pub spend: String,
    pub impressions: String,
    pub reach: String,
}

/// One aggregated ad set. Built per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AdSetAggregate {
    pub id: String,
    pub name: String,
    pub total_ads: usize,
    pub impressions: f64,
    pub reach: f64,
    pub spend: f64,
    pub clicks: f64,
    /// Max across rows: frequency is a rate, not additive.
    pub frequency: f64,
    /// Max across rows: ROAS is a rate, not additive.
    pub roas: f64,
    pub ctr: Metric,
    pub cpc: Metric,
    pub stages: Vec<String>,
    pub ads: Vec<AdThumbnail>,
    /// Distinct targeting audiences observed across the group's ads, in
    /// first-seen order.
    pub audiences: Vec<String>,
    pub display: DisplayMetrics,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Groups ad rows by ad-set id and folds metrics per group.
///
/// Output order is the first-seen order of each `ad_set_id`. Stage lists come
/// from `mappings`; unmapped ad sets get the single
/// [`UNCATEGORIZED_STAGE`] entry.
#[must_use]
pub fn aggregate_ad_sets(
    ads: &[AdRecord],
    mappings: &HashMap<String, Vec<String>>,
) -> Vec<AdSetAggregate> {
    struct Group {
        id: String,
        name: String,
        total_ads: usize,
        impressions: f64,
        reach: f64,
        spend: f64,
        clicks: f64,
        frequency: f64,
        roas: f64,
        first_ctr: String,
        first_cpc: String,
        ads: Vec<AdThumbnail>,
        seen_ad_ids: HashSet<String>,
        audiences: Vec<String>,
        seen_audiences: HashSet<String>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for ad in ads {
        let group = groups.entry(ad.ad_set_id.clone()).or_insert_with(|| {
            order.push(ad.ad_set_id.clone());
            Group {
                id: ad.ad_set_id.clone(),
                name: ad.ad_set_name.clone(),
                total_ads: 0,
                impressions: 0.0,
                reach: 0.0,
                spend: 0.0,
                clicks: 0.0,
                frequency: 0.0,
                roas: 0.0,
                first_ctr: ad.ctr.clone(),
                first_cpc: ad.cpc.clone(),
                ads: Vec::new(),
                seen_ad_ids: HashSet::new(),
                audiences: Vec::new(),
                seen_audiences: HashSet::new(),
            }
        });

        group.total_ads += 1;
        group.impressions += parse_metric(&ad.impressions);
        group.reach += parse_metric(&ad.reach);
        group.spend += parse_metric(&ad.spend);
        group.clicks += parse_metric(&ad.clicks);
        group.frequency = group.frequency.max(parse_metric(&ad.frequency));
        group.roas = group.roas.max(parse_metric(&ad.roas));

        if let Some(audience) = ad.audience.as_deref() {
            let audience = audience.trim();
            if !audience.is_empty() && group.seen_audiences.insert(audience.to_owned()) {
                group.audiences.push(audience.to_owned());
            }
        }

        // Attach only ads with a usable thumbnail, once per ad id.
        if let Some(url) = ad.thumbnail_url.as_deref() {
            if !url.trim().is_empty() && group.seen_ad_ids.insert(ad.ad_id.clone()) {
                group.ads.push(AdThumbnail {
                    ad_id: ad.ad_id.clone(),
                    ad_name: ad.ad_name.clone(),
                    thumbnail_url: url.trim().to_owned(),
                });
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .map(|group| {
            let ctr = if group.clicks > 0.0 && group.impressions > 0.0 {
                Metric::Derived(round2(group.clicks / group.impressions * 100.0))
            } else {
                Metric::Passthrough(group.first_ctr)
            };
            let cpc = if group.clicks > 0.0 && group.spend > 0.0 {
                Metric::Derived(round2(group.spend / group.clicks))
            } else {
                Metric::Passthrough(group.first_cpc)
            };

            let stages = mappings
                .get(&group.id)
                .filter(|stages| !stages.is_empty())
                .cloned()
                .unwrap_or_else(|| vec![UNCATEGORIZED_STAGE.to_owned()]);

            AdSetAggregate {
                display: DisplayMetrics {
                    spend: format_amount(group.spend),
                    impressions: format_count(group.impressions),
                    reach: format_count(group.reach),
                },
                id: group.id,
                name: group.name,
                total_ads: group.total_ads,
                impressions: group.impressions,
                reach: group.reach,
                spend: group.spend,
                clicks: group.clicks,
                frequency: group.frequency,
                roas: group.roas,
                ctr,
                cpc,
                stages,
                ads: group.ads,
                audiences: group.audiences,
            }
        })
        .collect()
}

/// Parses a loosely-typed metric string, treating failures as zero.
///
/// Tolerates thousands separators and a leading currency sign, both present
/// in real exports.
#[must_use]
pub fn parse_metric(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a count with en-US thousands grouping, dropping the fraction.
fn format_count(value: f64) -> String {
    group_thousands(&format!("{:.0}", value.max(0.0)))
}

/// Formats a monetary amount with grouping and two decimals.
fn format_amount(value: f64) -> String {
    let formatted = format!("{value:.2}");
    match formatted.split_once('.') {
        Some((whole, frac)) => format!("{}.{frac}", group_thousands(whole)),
        None => group_thousands(&formatted),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(set: &str, id: &str, impressions: &str, clicks: &str, spend: &str) -> AdRecord {
        AdRecord {
            ad_id: id.to_owned(),
            ad_name: format!("ad-{id}"),
            ad_set_id: set.to_owned(),
            ad_set_name: format!("set-{set}"),
            impressions: impressions.to_owned(),
            clicks: clicks.to_owned(),
            spend: spend.to_owned(),
            ..AdRecord::default()
        }
    }

    #[test]
    fn sums_additive_metrics_and_derives_ctr_cpc() {
        let ads = vec![
            ad("1", "a", "100", "10", "5"),
            ad("1", "b", "50", "5", "2"),
        ];
        let aggregates = aggregate_ad_sets(&ads, &HashMap::new());

        assert_eq!(aggregates.len(), 1);
        let set = &aggregates[0];
        assert_eq!(set.total_ads, 2);
        assert!((set.impressions - 150.0).abs() < f64::EPSILON);
        assert!((set.clicks - 15.0).abs() < f64::EPSILON);
        assert!((set.spend - 7.0).abs() < f64::EPSILON);
        assert_eq!(set.ctr, Metric::Derived(10.0));
        assert_eq!(set.cpc, Metric::Derived(0.47));
    }

    #[test]
    fn grouping_merge_is_associative() {
        let all = vec![
            ad("1", "a", "100", "10", "5"),
            ad("1", "b", "50", "5", "2"),
            ad("1", "c", "25", "2", "1"),
        ];
        let direct = aggregate_ad_sets(&all, &HashMap::new());

        let first = aggregate_ad_sets(&all[..2], &HashMap::new());
        let second = aggregate_ad_sets(&all[2..], &HashMap::new());

        assert!(
            (direct[0].impressions - (first[0].impressions + second[0].impressions)).abs()
                < f64::EPSILON
        );
        assert!((direct[0].clicks - (first[0].clicks + second[0].clicks)).abs() < f64::EPSILON);
        assert!((direct[0].spend - (first[0].spend + second[0].spend)).abs() < f64::EPSILON);
        assert!((direct[0].reach - (first[0].reach + second[0].reach)).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_metrics_take_the_max() {
        let mut first = ad("1", "a", "10", "1", "1");
        first.frequency = "2.5".to_owned();
        first.roas = "1.2".to_owned();
        let mut second = ad("1", "b", "10", "1", "1");
        second.frequency = "1.9".to_owned();
        second.roas = "3.4".to_owned();

        let aggregates = aggregate_ad_sets(&[first, second], &HashMap::new());
        assert!((aggregates[0].frequency - 2.5).abs() < f64::EPSILON);
        assert!((aggregates[0].roas - 3.4).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_totals_keep_passthrough_metrics() {
        let mut row = ad("1", "a", "0", "0", "0");
        row.ctr = "1.25".to_owned();
        row.cpc = "0.80".to_owned();

        let aggregates = aggregate_ad_sets(&[row], &HashMap::new());
        assert_eq!(aggregates[0].ctr, Metric::Passthrough("1.25".to_owned()));
        assert_eq!(aggregates[0].cpc, Metric::Passthrough("0.80".to_owned()));
    }

    #[test]
    fn malformed_numbers_count_as_zero() {
        let ads = vec![
            ad("1", "a", "not-a-number", "3", "1.50"),
            ad("1", "b", "100", "", "$2.50"),
        ];
        let aggregates = aggregate_ad_sets(&ads, &HashMap::new());

        assert!((aggregates[0].impressions - 100.0).abs() < f64::EPSILON);
        assert!((aggregates[0].clicks - 3.0).abs() < f64::EPSILON);
        assert!((aggregates[0].spend - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn output_preserves_first_seen_order() {
        let ads = vec![
            ad("beta", "a", "1", "0", "0"),
            ad("alpha", "b", "1", "0", "0"),
            ad("beta", "c", "1", "0", "0"),
        ];
        let aggregates = aggregate_ad_sets(&ads, &HashMap::new());
        let ids: Vec<&str> = aggregates.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["beta", "alpha"]);
    }

    #[test]
    fn thumbnails_dedupe_by_ad_id_and_skip_empty_urls() {
        let mut with_thumb = ad("1", "a", "1", "0", "0");
        with_thumb.thumbnail_url = Some("https://cdn/img.png".to_owned());
        let duplicate = with_thumb.clone();
        let mut empty_thumb = ad("1", "b", "1", "0", "0");
        empty_thumb.thumbnail_url = Some("  ".to_owned());
        let no_thumb = ad("1", "c", "1", "0", "0");

        let aggregates =
            aggregate_ad_sets(&[with_thumb, duplicate, empty_thumb, no_thumb], &HashMap::new());

        assert_eq!(aggregates[0].ads.len(), 1);
        assert_eq!(aggregates[0].ads[0].ad_id, "a");
        assert_eq!(aggregates[0].total_ads, 4);
    }

    #[test]
    fn audiences_dedupe_preserving_first_seen_order() {
        let mut first = ad("1", "a", "1", "0", "0");
        first.audience = Some("Lookalike 1%".to_owned());
        let mut second = ad("1", "b", "1", "0", "0");
        second.audience = Some("Retargeting".to_owned());
        let mut third = ad("1", "c", "1", "0", "0");
        third.audience = Some(" Lookalike 1% ".to_owned());

        let aggregates = aggregate_ad_sets(&[first, second, third], &HashMap::new());
        assert_eq!(aggregates[0].audiences, vec!["Lookalike 1%", "Retargeting"]);
    }

    #[test]
    fn unmapped_ad_sets_are_uncategorized() {
        let mut mappings = HashMap::new();
        mappings.insert(
            "1".to_owned(),
            vec!["Evaluation".to_owned(), "Conversion".to_owned()],
        );

        let ads = vec![ad("1", "a", "1", "0", "0"), ad("9", "b", "1", "0", "0")];
        let aggregates = aggregate_ad_sets(&ads, &mappings);

        assert_eq!(aggregates[0].stages, vec!["Evaluation", "Conversion"]);
        assert_eq!(aggregates[1].stages, vec!["Uncategorized"]);
    }

    #[test]
    fn display_metrics_use_thousands_grouping() {
        let ads = vec![ad("1", "a", "1234567", "10", "1234.5")];
        let aggregates = aggregate_ad_sets(&ads, &HashMap::new());

        assert_eq!(aggregates[0].display.impressions, "1,234,567");
        assert_eq!(aggregates[0].display.spend, "1,234.50");
    }

    #[test]
    fn parse_metric_is_lenient() {
        assert!((parse_metric("1,234.5") - 1234.5).abs() < f64::EPSILON);
        assert!((parse_metric("$7.25") - 7.25).abs() < f64::EPSILON);
        assert!(parse_metric("n/a").abs() < f64::EPSILON);
        assert!(parse_metric("").abs() < f64::EPSILON);
    }
}
