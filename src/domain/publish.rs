use serde::{Deserialize, Serialize};

/// A file to be committed, named relative to its target folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestOutcome {
    pub number: Option<u64>,
    pub url: Option<String>,
}

/// What a successful publish produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub branch: String,
    pub folder: String,
    pub files: Vec<String>,
    pub merge_request: MergeRequestOutcome,
}
