use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};
use crate::domain::publish::ArtifactFile;

/// Shells out to `git` inside a local clone
pub struct GitCli {
    repo_dir: PathBuf,
    remote_url: String,
    /// Stripped from any output surfaced in errors
    secret: Option<String>,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>, remote_url: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote_url: remote_url.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.secret = if secret.is_empty() { None } else { Some(secret) };
        self
    }

    fn new_git_command() -> Command {
        let git_cmd = std::env::var("GIT_CMD").unwrap_or_else(|_| "git".to_string());
        Command::new(git_cmd)
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(args = %self.redact(&args.join(" ")), "Running git");

        let output = Self::new_git_command()
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| AppError::PublishError(format!("Failed to start git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::PublishError(self.redact(&format!(
                "git {} failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            ))));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn redact(&self, text: &str) -> String {
        match &self.secret {
            Some(secret) => text.replace(secret.as_str(), "***"),
            None => text.to_string(),
        }
    }

    /// Initialise the clone from the remote when it has no `.git` yet
    async fn ensure_repository(&self) -> Result<()> {
        if self.repo_dir.join(".git").exists() {
            return Ok(());
        }

        info!(repo = %self.repo_dir.display(), "Initialising local repository");
        std::fs::create_dir_all(&self.repo_dir)?;
        self.run(&["init"]).await?;
        self.run(&["remote", "add", "origin", &self.remote_url]).await?;
        Ok(())
    }

    async fn main_branch(&self) -> Result<&'static str> {
        let listing = self.run(&["branch", "-a"]).await?;
        Ok(main_branch_from_listing(&listing))
    }

    /// Fetch the remote and switch to a feature branch cut from its main branch
    ///
    /// The base is always `origin/<main>`, never the branch left checked out
    /// by an earlier publish.
    pub async fn create_branch(&self, branch: &str) -> Result<()> {
        self.ensure_repository().await?;
        self.run(&["fetch", "origin"]).await?;
        let main = self.main_branch().await?;

        let base = format!("origin/{}", main);
        self.run(&["checkout", "--no-track", "-b", branch, &base]).await?;
        info!(branch, base = %base, "Created feature branch");
        Ok(())
    }

    /// Write `files` under `folder` and commit them
    pub async fn commit_files(
        &self,
        folder: &str,
        files: &[ArtifactFile],
        message: &str,
    ) -> Result<()> {
        let folder_path = self.repo_dir.join(folder);
        std::fs::create_dir_all(&folder_path)?;
        for file in files {
            std::fs::write(folder_path.join(&file.file_name), &file.contents)?;
        }

        self.run(&["add", folder]).await?;
        self.run(&["commit", "-m", message]).await?;
        info!(folder, files = files.len(), "Committed artifacts");
        Ok(())
    }

    pub async fn push(&self, branch: &str) -> Result<()> {
        self.run(&["push", "--set-upstream", "origin", branch]).await?;
        info!(branch, "Pushed feature branch");
        Ok(())
    }
}

/// `main` when the listing has a main branch, otherwise `master`
fn main_branch_from_listing(listing: &str) -> &'static str {
    let has_main = listing.lines().any(|line| {
        let name = line.trim_start_matches('*').trim();
        name == "main" || name.ends_with("/main")
    });
    if has_main {
        "main"
    } else {
        "master"
    }
}
