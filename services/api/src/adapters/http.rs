//! services/api/src/adapters/http.rs
//!
//! An implementation of the `ProblemRepository` port that talks to the REST API
//! over HTTP. This is what the terminal quiz front end drives its controller with.

use async_trait::async_trait;
use fill_blank_core::domain::{Problem, ProblemInput};
use fill_blank_core::ports::{PortError, PortResult, ProblemRepository};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::web::rest::{
    CreatedProblemResponse, ErrorResponse, ProblemPayload, ProblemResponse, SuccessResponse,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A remote `ProblemRepository` reached through `/api/problems`.
#[derive(Clone)]
pub struct HttpProblemRepository {
    client: Client,
    base_url: String,
}

impl HttpProblemRepository {
    /// Creates a new adapter for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn problems_url(&self) -> String {
        format!("{}/api/problems", self.base_url)
    }

    fn problem_url(&self, id: Uuid) -> String {
        format!("{}/api/problems/{}", self.base_url, id)
    }
}

/// Turns a response into its JSON body, or into a `PortError::Network` carrying
/// the server's `{ error }` message when the status is not a success.
async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("request failed with status {}", status),
        };
        return Err(PortError::Network(message));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Network(format!("invalid response body: {}", e)))
}

fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Network(e.to_string())
}

//=========================================================================================
// `ProblemRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProblemRepository for HttpProblemRepository {
    async fn list_problems(&self) -> PortResult<Vec<Problem>> {
        let response = self
            .client
            .get(self.problems_url())
            .send()
            .await
            .map_err(transport_error)?;
        let problems: Vec<ProblemResponse> = read_json(response).await?;
        Ok(problems.into_iter().map(ProblemResponse::into_domain).collect())
    }

    async fn create_problem(&self, input: ProblemInput) -> PortResult<Problem> {
        let response = self
            .client
            .post(self.problems_url())
            .json(&ProblemPayload::from(input))
            .send()
            .await
            .map_err(transport_error)?;
        let created: CreatedProblemResponse = read_json(response).await?;
        Ok(created.into_domain())
    }

    async fn update_problem(&self, id: Uuid, input: ProblemInput) -> PortResult<()> {
        let response = self
            .client
            .put(self.problem_url(id))
            .json(&ProblemPayload::from(input))
            .send()
            .await
            .map_err(transport_error)?;
        read_json::<SuccessResponse>(response).await?;
        Ok(())
    }

    async fn delete_problem(&self, id: Uuid) -> PortResult<()> {
        let response = self
            .client
            .delete(self.problem_url(id))
            .send()
            .await
            .map_err(transport_error)?;
        read_json::<SuccessResponse>(response).await?;
        Ok(())
    }
}
