use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::domain::onboarding::DatasetNaming;
use crate::domain::publish::{ArtifactFile, MergeRequest, PublishReport};
use crate::domain::template::GeneratedScripts;
use crate::infrastructure::vcs::VersionControl;

/// Timestamp shared by the branch and folder names
pub const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const MERGE_REQUEST_BODY: &str = "This PR merges the feature branch to the dev branch.";

pub struct PublishUseCase {
    vcs: Arc<dyn VersionControl + Send + Sync>,
    target_branch: String,
}

impl PublishUseCase {
    pub fn new(vcs: Arc<dyn VersionControl + Send + Sync>, target_branch: impl Into<String>) -> Self {
        Self {
            vcs,
            target_branch: target_branch.into(),
        }
    }

    pub async fn execute(
        &self,
        naming: &DatasetNaming,
        scripts: &GeneratedScripts,
    ) -> Result<PublishReport> {
        self.execute_at(naming, scripts, Local::now().naive_local())
            .await
    }

    /// Branch, commit, push, then one merge request attempt.
    ///
    /// Nothing is rolled back when a later step fails.
    pub async fn execute_at(
        &self,
        naming: &DatasetNaming,
        scripts: &GeneratedScripts,
        now: NaiveDateTime,
    ) -> Result<PublishReport> {
        let files = artifact_files(naming, scripts);
        if files.is_empty() {
            return Err(AppError::EmptyMetadata);
        }

        let stamp = now.format(STAMP_FORMAT).to_string();
        let folder = naming.folder_name(&stamp);
        let branch = naming.branch_name(&stamp);

        info!(branch = %branch, folder = %folder, files = files.len(), "Publishing scripts");

        self.vcs.create_branch(&branch).await?;
        self.vcs
            .commit_files(
                &folder,
                &files,
                &format!("Added new files to {} in feature branch", folder),
            )
            .await?;
        self.vcs.push(&branch).await?;

        let request = MergeRequest {
            title: format!("Merge {} to {}", branch, self.target_branch),
            head: branch.clone(),
            base: self.target_branch.clone(),
            body: MERGE_REQUEST_BODY.to_string(),
        };
        let merge_request = self.vcs.open_merge_request(&request).await.map_err(|e| {
            error!(branch = %branch, "Merge request failed after push");
            let detail = match e {
                AppError::PublishError(msg) => msg,
                other => other.to_string(),
            };
            AppError::PublishError(format!(
                "Git push successful but merge request creation failed: {}",
                detail
            ))
        })?;

        Ok(PublishReport {
            branch,
            folder,
            files: files.into_iter().map(|f| f.file_name).collect(),
            merge_request,
        })
    }
}

/// Non-empty scripts under their `<source>_<dataset>_<kind>.sql` names
pub fn artifact_files(naming: &DatasetNaming, scripts: &GeneratedScripts) -> Vec<ArtifactFile> {
    scripts
        .iter()
        .filter(|(_, script)| !script.is_empty())
        .map(|(kind, script)| ArtifactFile {
            file_name: naming.script_file_name(kind),
            contents: script.to_string(),
        })
        .collect()
}
