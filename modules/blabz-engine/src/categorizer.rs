//! Grouping and ranking of processed posts by matched project.

use std::collections::{BTreeMap, HashSet};

use blabz_common::{PostSummary, ProcessedPost, Project};

/// Group posts under every project they matched, ordered by score.
///
/// Every configured project gets a group, empty or not. A post matching k
/// projects appears in all k groups with identical content. Within a group,
/// duplicates by post id keep the first occurrence — callers put fresh
/// results ahead of stored ones, so a re-processed post wins over its
/// stored copy. Sort is stable descending by score; ties keep encounter
/// order. Posts matched to projects no longer configured are dropped.
pub fn categorize<'a, I>(projects: &[Project], posts: I) -> BTreeMap<String, Vec<PostSummary>>
where
    I: IntoIterator<Item = &'a ProcessedPost>,
{
    let mut groups: BTreeMap<String, Vec<PostSummary>> = projects
        .iter()
        .map(|p| (p.name.clone(), Vec::new()))
        .collect();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for post in posts {
        for name in &post.projects {
            let Some(group) = groups.get_mut(name) else {
                continue;
            };
            if seen.insert((name.clone(), post.id.clone())) {
                group.push(PostSummary::from(post));
            }
        }
    }

    for group in groups.values_mut() {
        group.sort_by(|a, b| b.score.cmp(&a.score));
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn processed(id: &str, projects: &[&str], score: i32) -> ProcessedPost {
        ProcessedPost {
            id: id.to_string(),
            author_x_id: "u1".to_string(),
            text: format!("post {id}"),
            created_at: Utc::now(),
            likes: 0,
            reshares: 0,
            quote_shares: 0,
            replies: 0,
            projects: projects.iter().map(|s| s.to_string()).collect(),
            score,
            reward_per_project: score as f64 / 300.0,
            total_reward: score as f64 / 300.0 * projects.len() as f64,
            hashtags: vec![],
            processed_at: Utc::now(),
        }
    }

    fn configured(names: &[&str]) -> Vec<Project> {
        names.iter().map(|n| Project::new(n, vec![])).collect()
    }

    #[test]
    fn post_matching_two_projects_appears_in_both_groups() {
        let projects = configured(&["ALPHA", "BETA"]);
        let posts = vec![processed("p1", &["ALPHA", "BETA"], 40)];
        let groups = categorize(&projects, &posts);
        assert_eq!(groups["ALPHA"].len(), 1);
        assert_eq!(groups["BETA"].len(), 1);
        assert_eq!(groups["ALPHA"][0].text, groups["BETA"][0].text);
    }

    #[test]
    fn configured_project_with_no_matches_is_present_and_empty() {
        let projects = configured(&["ALPHA", "QUIET"]);
        let posts = vec![processed("p1", &["ALPHA"], 40)];
        let groups = categorize(&projects, &posts);
        assert!(groups["QUIET"].is_empty());
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn duplicate_post_id_keeps_first_occurrence() {
        let projects = configured(&["ALPHA"]);
        let fresh = processed("p1", &["ALPHA"], 55);
        let stale = processed("p1", &["ALPHA"], 12);
        let groups = categorize(&projects, [&fresh, &stale]);
        assert_eq!(groups["ALPHA"].len(), 1);
        assert_eq!(groups["ALPHA"][0].score, 55);
    }

    #[test]
    fn groups_sort_descending_by_score_ties_stable() {
        let projects = configured(&["ALPHA"]);
        let posts = vec![
            processed("low", &["ALPHA"], 10),
            processed("tie_a", &["ALPHA"], 30),
            processed("tie_b", &["ALPHA"], 30),
            processed("high", &["ALPHA"], 70),
        ];
        let groups = categorize(&projects, &posts);
        let ids: Vec<&str> = groups["ALPHA"].iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "tie_a", "tie_b", "low"]);
    }

    #[test]
    fn match_against_removed_project_is_dropped() {
        let projects = configured(&["ALPHA"]);
        let posts = vec![processed("p1", &["RETIRED"], 40)];
        let groups = categorize(&projects, &posts);
        assert_eq!(groups.len(), 1);
        assert!(groups["ALPHA"].is_empty());
    }
}
