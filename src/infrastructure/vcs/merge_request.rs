use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde_json::json;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::publish::{MergeRequest, MergeRequestOutcome};
use crate::infrastructure::config::GitCredentials;

/// Opens pull requests through the hosting service's REST API
pub struct MergeRequestClient {
    client: reqwest::Client,
    api_base_url: String,
    owner: String,
    repo: String,
    credentials: GitCredentials,
}

impl MergeRequestClient {
    pub fn new(
        api_base_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        credentials: GitCredentials,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
            owner: owner.into(),
            repo: repo.into(),
            credentials,
        }
    }

    fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls",
            self.api_base_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Single attempt; any status other than 201 is an error carrying the body
    pub async fn open(&self, request: &MergeRequest) -> Result<MergeRequestOutcome> {
        let body = json!({
            "title": request.title,
            "head": request.head,
            "base": request.base,
            "body": request.body,
        });

        let response = self
            .client
            .post(self.pulls_url())
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .header(USER_AGENT, concat!("dataonboard/", env!("CARGO_PKG_VERSION")))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::PublishError(format!("Merge request failed: {}", e)))?;

        if response.status() != StatusCode::CREATED {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::PublishError(format!(
                "Merge request creation failed ({}): {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            AppError::PublishError(format!("Failed to parse merge request response: {}", e))
        })?;

        let outcome = MergeRequestOutcome {
            number: json["number"].as_u64(),
            url: json["html_url"].as_str().map(|s| s.to_string()),
        };
        info!(
            head = %request.head,
            base = %request.base,
            number = ?outcome.number,
            "Merge request opened"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};

    async fn create_pull(req: HttpRequest, body: web::Json<serde_json::Value>) -> HttpResponse {
        let authorized = req.headers().contains_key("authorization");
        if !authorized || body["base"] != "dev" {
            return HttpResponse::BadRequest().finish();
        }
        HttpResponse::Created().json(json!({
            "number": 7,
            "html_url": "https://example.test/acme/ingest/pull/7",
        }))
    }

    async fn reject_pull() -> HttpResponse {
        HttpResponse::UnprocessableEntity().json(json!({ "message": "Validation Failed" }))
    }

    fn credentials() -> GitCredentials {
        GitCredentials {
            username: "bot".to_string(),
            token: "token".to_string(),
        }
    }

    fn merge_request() -> MergeRequest {
        MergeRequest {
            title: "Merge feature/src_ds_1 to dev".to_string(),
            head: "feature/src_ds_1".to_string(),
            base: "dev".to_string(),
            body: "This PR merges the feature branch to the dev branch.".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_open_merge_request_against_local_api() {
        let server = HttpServer::new(|| {
            App::new()
                .route("/repos/acme/ingest/pulls", web::post().to(create_pull))
                .route("/repos/acme/locked/pulls", web::post().to(reject_pull))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let base_url = format!("http://{}/", addr);

        let client = MergeRequestClient::new(&base_url, "acme", "ingest", credentials());
        let outcome = client.open(&merge_request()).await.unwrap();
        assert_eq!(outcome.number, Some(7));
        assert_eq!(
            outcome.url.as_deref(),
            Some("https://example.test/acme/ingest/pull/7")
        );

        let locked = MergeRequestClient::new(&base_url, "acme", "locked", credentials());
        let err = locked.open(&merge_request()).await.unwrap_err();
        match err {
            AppError::PublishError(msg) => assert!(msg.contains("Validation Failed")),
            other => panic!("unexpected error: {}", other),
        }

        handle.stop(true).await;
    }
}
