pub mod git_cli;
pub mod merge_request;

use crate::domain::error::Result;
use crate::domain::publish::{ArtifactFile, MergeRequest, MergeRequestOutcome};
use crate::infrastructure::config::PublishConfig;
use async_trait::async_trait;
use git_cli::GitCli;
use merge_request::MergeRequestClient;

#[async_trait]
pub trait VersionControl {
    async fn create_branch(&self, branch: &str) -> Result<()>;
    async fn commit_files(&self, folder: &str, files: &[ArtifactFile], message: &str)
        -> Result<()>;
    async fn push(&self, branch: &str) -> Result<()>;
    async fn open_merge_request(&self, request: &MergeRequest) -> Result<MergeRequestOutcome>;
}

/// Local git clone plus the hosting service's pull request API
pub struct GitHubPublisher {
    git: GitCli,
    api: MergeRequestClient,
}

impl GitHubPublisher {
    /// Needs `owner`/`repo` configured and credentials in the environment
    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        config.ensure_remote()?;
        let credentials = config.credentials()?;

        let remote_url = format!(
            "https://{}:{}@{}/{}/{}.git",
            credentials.username,
            credentials.token,
            config.remote_host,
            config.owner,
            config.repo
        );
        let git = GitCli::new(&config.repo_dir, remote_url).with_secret(&credentials.token);
        let api = MergeRequestClient::new(
            &config.api_base_url,
            &config.owner,
            &config.repo,
            credentials,
        );

        Ok(Self { git, api })
    }
}

#[async_trait]
impl VersionControl for GitHubPublisher {
    async fn create_branch(&self, branch: &str) -> Result<()> {
        self.git.create_branch(branch).await
    }

    async fn commit_files(
        &self,
        folder: &str,
        files: &[ArtifactFile],
        message: &str,
    ) -> Result<()> {
        self.git.commit_files(folder, files, message).await
    }

    async fn push(&self, branch: &str) -> Result<()> {
        self.git.push(branch).await
    }

    async fn open_merge_request(&self, request: &MergeRequest) -> Result<MergeRequestOutcome> {
        self.api.open(request).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;

    #[test]
    fn test_publisher_requires_owner_and_repo() {
        let config = PublishConfig::default();
        let result = GitHubPublisher::from_config(&config);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_publisher_requires_credentials() {
        let config = PublishConfig {
            owner: "acme".to_string(),
            repo: "ingest".to_string(),
            username_env: "DATAONBOARD_TEST_UNSET_USER".to_string(),
            token_env: "DATAONBOARD_TEST_UNSET_TOKEN".to_string(),
            ..PublishConfig::default()
        };
        let result = GitHubPublisher::from_config(&config);
        match result {
            Err(AppError::ConfigError(msg)) => {
                assert!(msg.contains("DATAONBOARD_TEST_UNSET_USER"))
            }
            _ => panic!("expected missing credential error"),
        }
    }
}
