//! Names and identities for suites and scenarios
//!
//! Everything here is a pure function of a file path and a scenario index, so
//! discovery over an unchanged file set always yields the same identities.

use serde::Serialize;
use std::path::Path;

use crate::model::ScenarioEntry;
use crate::tree::UniqueId;

/// Default scenario file extension, without the leading dot
pub const SCESIM_EXTENSION: &str = "scesim";

/// Segment kind used for both suites and scenarios
pub const SEGMENT_KIND: &str = "testscenario";

/// Suite name used when a simulation has no originating file
pub const FALLBACK_SUITE_NAME: &str = "ScenarioRunner";

/// Strip the directory prefix (either separator) and the `.scesim` suffix
pub fn short_name(path: &str) -> &str {
    let file_name = match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    file_name
        .strip_suffix(SCESIM_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(file_name)
}

/// [`short_name`] for an optional path
pub fn short_name_opt(path: Option<&str>) -> Option<&str> {
    path.map(short_name)
}

/// [`short_name`] for a filesystem path
pub fn short_name_of(path: &Path) -> String {
    short_name(&path.to_string_lossy()).to_string()
}

/// `<root>/[testscenario:<short name>]`
pub fn suite_identity(root: &UniqueId, short_name: &str) -> UniqueId {
    root.append(SEGMENT_KIND, short_name)
}

/// `<suite>/[testscenario:<short name><index>]`
pub fn leaf_identity(suite: &UniqueId, short_name: &str, index: u32) -> UniqueId {
    suite.append(SEGMENT_KIND, &format!("{short_name}{index}"))
}

/// `#<index>: <description>`
pub fn display_name(index: u32, description: &str) -> String {
    format!("#{index}: {description}")
}

/// Human-facing description of a suite or a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Owning suite (class-like) name
    pub suite: String,
    /// Display name; equal to `suite` for a suite description
    pub name: String,
    pub children: Vec<Description>,
}

fn suite_name(path: Option<&str>) -> String {
    short_name_opt(path)
        .unwrap_or(FALLBACK_SUITE_NAME)
        .to_string()
}

/// Describe one scenario of the simulation at `path`
pub fn describe_scenario(path: Option<&str>, index: u32, description: &str) -> Description {
    Description {
        suite: suite_name(path),
        name: display_name(index, description),
        children: Vec::new(),
    }
}

/// Describe a whole simulation, one child per scenario
pub fn describe_simulation(path: Option<&str>, scenarios: &[ScenarioEntry]) -> Description {
    let suite = suite_name(path);
    Description {
        name: suite.clone(),
        suite,
        children: scenarios
            .iter()
            .map(|s| describe_scenario(path, s.index, &s.description))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_unix_path() {
        assert_eq!(short_name("/a/b/Loan.scesim"), "Loan");
    }

    #[test]
    fn test_short_name_windows_path() {
        assert_eq!(short_name("C:\\a\\b\\Loan.scesim"), "Loan");
    }

    #[test]
    fn test_short_name_none() {
        assert_eq!(short_name_opt(None), None);
    }

    #[test]
    fn test_short_name_without_extension() {
        assert_eq!(short_name("dir/Loan.txt"), "Loan.txt");
        assert_eq!(short_name("Loan"), "Loan");
        assert_eq!(short_name("Loanscesim"), "Loanscesim");
    }

    #[test]
    fn test_identities_nest_under_root() {
        let root = UniqueId::engine("scenario-simulation");
        let suite = suite_identity(&root, "Loan");
        let leaf = leaf_identity(&suite, "Loan", 2);
        assert_eq!(
            suite.to_string(),
            "[engine:scenario-simulation]/[testscenario:Loan]"
        );
        assert_eq!(
            leaf.to_string(),
            "[engine:scenario-simulation]/[testscenario:Loan]/[testscenario:Loan2]"
        );
        assert!(leaf.has_prefix(&suite));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(1, "approved loan"), "#1: approved loan");
    }

    #[test]
    fn test_describe_simulation_without_path_uses_fallback() {
        let scenarios = vec![ScenarioEntry {
            index: 1,
            description: "first".into(),
            given: Vec::new(),
            expect: Vec::new(),
        }];
        let desc = describe_simulation(None, &scenarios);
        assert_eq!(desc.suite, FALLBACK_SUITE_NAME);
        assert_eq!(desc.children.len(), 1);
        assert_eq!(desc.name, FALLBACK_SUITE_NAME);
        assert_eq!(desc.children[0].name, "#1: first");

        let desc = describe_simulation(Some("/x/Loan.scesim"), &scenarios);
        assert_eq!(desc.suite, "Loan");
        assert_eq!(desc.children[0].suite, "Loan");
    }
}
