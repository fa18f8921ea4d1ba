//! Canned analysis questions

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::RepoError;

/// Kind of repository analysis to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    Readme,
    Onboarding,
    Issues,
    BugFix,
    Troubleshooting,
    /// Free-text question supplied by the user
    Custom,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Summary,
        AnalysisKind::Readme,
        AnalysisKind::Onboarding,
        AnalysisKind::Issues,
        AnalysisKind::BugFix,
        AnalysisKind::Troubleshooting,
        AnalysisKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Readme => "readme",
            AnalysisKind::Onboarding => "onboarding",
            AnalysisKind::Issues => "issues",
            AnalysisKind::BugFix => "bug_fix",
            AnalysisKind::Troubleshooting => "troubleshooting",
            AnalysisKind::Custom => "custom",
        }
    }

    /// Text shown for the option
    pub fn description(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "Provide a comprehensive summary of the codebase, highlighting its architecture, main components, and top 3 key learnings for developers.",
            AnalysisKind::Readme => "Generate a detailed README for the application, including project overview, setup instructions, main features, and contribution guidelines.",
            AnalysisKind::Onboarding => "Create an in-depth getting started guide for new developers, covering setup process, code structure, development workflow, and best practices.",
            AnalysisKind::Issues => "Conduct a thorough code review to identify and explain the top 3 most critical issues or areas for improvement in the codebase.",
            AnalysisKind::BugFix => "Identify the most severe potential bug or vulnerability in the codebase, explain its impact, and provide a detailed fix with code examples.",
            AnalysisKind::Troubleshooting => "Develop a comprehensive troubleshooting guide for common issues, including potential error scenarios, diagnostics steps, and resolution procedures.",
            AnalysisKind::Custom => "Custom analysis (specify your own prompt)",
        }
    }

    /// Question sent to the backend
    ///
    /// `Custom` takes the user's text, which must not be blank.
    pub fn question(&self, custom: Option<&str>) -> Result<String, RepoError> {
        match self {
            AnalysisKind::Custom => custom
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .ok_or(RepoError::MissingQuestion),
            kind => Ok(kind.description().to_string()),
        }
    }

    /// Label used in the cost table, e.g. "Bug_fix"
    pub fn display_name(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RepoError::UnknownAnalysis(s.to_string()))
    }
}
