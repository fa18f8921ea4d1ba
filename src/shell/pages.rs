//! Page registry

use serde::Serialize;

/// How a page is initialized after its fragment loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "pipeline", rename_all = "snake_case")]
pub enum PageKind {
    Static,
    /// Step wizard over a built-in pipeline
    Wizard(&'static str),
    RepoInspection,
    RepoCacheAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    /// Fragment URL path
    pub url: &'static str,
    pub kind: PageKind,
}

pub const PAGES: &[Page] = &[
    Page {
        id: "home",
        title: "Home",
        category: "Navigation",
        url: "/static/home.html",
        kind: PageKind::Static,
    },
    Page {
        id: "story_to_data",
        title: "User Story to Data",
        category: "User Story Automation",
        url: "/story_to_data/",
        kind: PageKind::Wizard("story_to_data"),
    },
    Page {
        id: "story_to_code",
        title: "User Story to Code",
        category: "User Story Automation",
        url: "/story_to_code/",
        kind: PageKind::Wizard("story_to_code"),
    },
    Page {
        id: "story_to_api",
        title: "User Story to API",
        category: "User Story Automation",
        url: "/story_to_api/",
        kind: PageKind::Wizard("story_to_api"),
    },
    Page {
        id: "image_to_code",
        title: "Image to Code",
        category: "Code Intelligence",
        url: "/image_to_code/",
        kind: PageKind::Wizard("image_to_code"),
    },
    Page {
        id: "repo_inspection",
        title: "Repo Inspection",
        category: "Code Intelligence",
        url: "/repo_inspection/",
        kind: PageKind::RepoInspection,
    },
    Page {
        id: "repo_cache_analysis",
        title: "Repo Cache Analysis",
        category: "Code Intelligence",
        url: "/repo_cache_analysis/",
        kind: PageKind::RepoCacheAnalysis,
    },
    Page {
        id: "accessibility",
        title: "Accessibility",
        category: "UX/UI Design",
        url: "/accessibility/",
        kind: PageKind::Wizard("accessibility"),
    },
];

pub fn find(id: &str) -> Option<&'static Page> {
    PAGES.iter().find(|p| p.id == id)
}
