//! Grouping of ad-set aggregates into funnel-stage buckets.

use serde::Serialize;

use adlens_core::UNCATEGORIZED_STAGE;

use crate::aggregate::AdSetAggregate;

/// One funnel-stage bucket with the ad sets mapped to it.
#[derive(Debug, Clone, Serialize)]
pub struct StageGroup {
    pub stage: String,
    pub ad_sets: Vec<AdSetAggregate>,
}

/// Buckets aggregates by stage, in the caller-supplied stage order.
///
/// Membership is not exclusive: an ad set mapped to multiple stages appears
/// in each of its stages' buckets. Ad sets carrying the
/// [`UNCATEGORIZED_STAGE`] sentinel get one trailing bucket, added only when
/// non-empty and only if the configured order does not already include it.
#[must_use]
pub fn group_by_stage(aggregates: &[AdSetAggregate], stages: &[String]) -> Vec<StageGroup> {
    let mut groups: Vec<StageGroup> = stages
        .iter()
        .map(|stage| StageGroup {
            stage: stage.clone(),
            ad_sets: aggregates
                .iter()
                .filter(|a| a.stages.iter().any(|s| s == stage))
                .cloned()
                .collect(),
        })
        .collect();

    if !stages.iter().any(|s| s == UNCATEGORIZED_STAGE) {
        let uncategorized: Vec<AdSetAggregate> = aggregates
            .iter()
            .filter(|a| a.stages.iter().any(|s| s == UNCATEGORIZED_STAGE))
            .cloned()
            .collect();
        if !uncategorized.is_empty() {
            groups.push(StageGroup {
                stage: UNCATEGORIZED_STAGE.to_owned(),
                ad_sets: uncategorized,
            });
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::aggregate::{aggregate_ad_sets, AdRecord};

    fn aggregates_with_stages(specs: &[(&str, &[&str])]) -> Vec<AdSetAggregate> {
        let ads: Vec<AdRecord> = specs
            .iter()
            .enumerate()
            .map(|(i, (set, _))| AdRecord {
                ad_id: format!("ad-{i}"),
                ad_set_id: (*set).to_owned(),
                ad_set_name: (*set).to_owned(),
                ..AdRecord::default()
            })
            .collect();

        let mappings: HashMap<String, Vec<String>> = specs
            .iter()
            .filter(|(_, stages)| !stages.is_empty())
            .map(|(set, stages)| {
                (
                    (*set).to_owned(),
                    stages.iter().map(|s| (*s).to_owned()).collect(),
                )
            })
            .collect();

        aggregate_ad_sets(&ads, &mappings)
    }

    fn stage_list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn buckets_follow_configured_order() {
        let aggregates = aggregates_with_stages(&[
            ("a", &["Conversion"]),
            ("b", &["Evaluation"]),
        ]);
        let stages = stage_list(&["Evaluation", "Consideration", "Conversion"]);
        let groups = group_by_stage(&aggregates, &stages);

        let names: Vec<&str> = groups.iter().map(|g| g.stage.as_str()).collect();
        assert_eq!(names, vec!["Evaluation", "Consideration", "Conversion"]);
        assert_eq!(groups[0].ad_sets[0].id, "b");
        assert!(groups[1].ad_sets.is_empty());
        assert_eq!(groups[2].ad_sets[0].id, "a");
    }

    #[test]
    fn multi_stage_ad_sets_appear_in_every_bucket() {
        let aggregates = aggregates_with_stages(&[("a", &["Evaluation", "Conversion"])]);
        let stages = stage_list(&["Evaluation", "Conversion"]);
        let groups = group_by_stage(&aggregates, &stages);

        assert_eq!(groups[0].ad_sets.len(), 1);
        assert_eq!(groups[1].ad_sets.len(), 1);
    }

    #[test]
    fn unmapped_ad_sets_get_one_trailing_uncategorized_bucket() {
        let aggregates = aggregates_with_stages(&[("a", &["Evaluation"]), ("9", &[])]);
        let stages = stage_list(&["Evaluation"]);
        let groups = group_by_stage(&aggregates, &stages);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].stage, "Uncategorized");
        assert_eq!(groups[1].ad_sets.len(), 1);
        assert_eq!(groups[1].ad_sets[0].id, "9");
    }

    #[test]
    fn uncategorized_bucket_is_omitted_when_empty() {
        let aggregates = aggregates_with_stages(&[("a", &["Evaluation"])]);
        let groups = group_by_stage(&aggregates, &stage_list(&["Evaluation"]));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn configured_uncategorized_stage_is_reused_not_duplicated() {
        let aggregates = aggregates_with_stages(&[("9", &[])]);
        let stages = stage_list(&["Evaluation", "Uncategorized"]);
        let groups = group_by_stage(&aggregates, &stages);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].stage, "Uncategorized");
        assert_eq!(groups[1].ad_sets.len(), 1);
    }
}
