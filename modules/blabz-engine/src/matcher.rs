//! Keyword matching of post text against configured projects.

use blabz_common::Project;

/// Names of every project mentioned by `text`.
///
/// A project matches when any of its terms (lowercased name or keywords) is
/// a literal substring of the lowercased text — no tokenization, so a
/// keyword that is a substring of another project's name multi-matches by
/// design. Returns names in project-configuration order.
pub fn matching_projects(text: &str, projects: &[Project]) -> Vec<String> {
    let lowered = text.to_lowercase();
    projects
        .iter()
        .filter(|p| p.terms().any(|term| !term.is_empty() && lowered.contains(&term)))
        .map(|p| p.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_project_name_case_insensitive() {
        let projects = vec![Project::new("Solana", vec![])];
        assert_eq!(
            matching_projects("Deployed my first program on SOLANA today", &projects),
            vec!["SOLANA"]
        );
    }

    #[test]
    fn matches_on_keyword_substring() {
        let projects = vec![Project::new("Base", vec!["onchain summer".to_string()])];
        assert_eq!(
            matching_projects("loving Onchain Summer so far", &projects),
            vec!["BASE"]
        );
    }

    #[test]
    fn shared_keyword_matches_both_projects() {
        let projects = vec![
            Project::new("LinkChain", vec!["chain".to_string()]),
            Project::new("ChainVault", vec!["chain".to_string()]),
        ];
        let matched = matching_projects("another day, another chain migration", &projects);
        assert_eq!(matched, vec!["LINKCHAIN", "CHAINVAULT"]);
    }

    #[test]
    fn uppercase_keyword_from_store_row_still_matches() {
        // Rows loaded from the project table bypass `Project::new`, so the
        // keyword arrives with whatever casing the config endpoint wrote.
        let stored = Project {
            id: uuid::Uuid::new_v4(),
            name: "SOLANA".to_string(),
            keywords: vec!["SOL".to_string()],
            metadata: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(
            matching_projects("just bridged some sol over today", &[stored]),
            vec!["SOLANA"]
        );
    }

    #[test]
    fn no_match_returns_empty() {
        let projects = vec![Project::new("Solana", vec!["anchor".to_string()])];
        assert!(matching_projects("just weather talk here", &projects).is_empty());
    }

    #[test]
    fn empty_keyword_never_matches_everything() {
        let projects = vec![Project::new("Ghost", vec![String::new()])];
        assert!(matching_projects("unrelated text", &projects).is_empty());
    }
}
