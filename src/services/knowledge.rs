// Knowledge base lookups via the QnA Maker runtime API

use super::{KnowledgeBase, http_client, send_json};
use crate::config::endpoint_url;
use crate::error::{ConfigError, Service, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome of a knowledge base query
#[derive(Debug, Clone, PartialEq)]
pub enum KbAnswer {
    Found(String),
    /// The service returned an empty answer list
    NoAnswer,
}

pub struct QnaClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    kb_id: String,
}

impl QnaClient {
    pub fn new(endpoint: &str, key: &str, kb_id: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
            kb_id: kb_id.to_string(),
        })
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    answers: Vec<QnaAnswer>,
}

#[derive(Deserialize)]
struct QnaAnswer {
    answer: String,
}

#[async_trait]
impl KnowledgeBase for QnaClient {
    async fn answer(&self, question: &str) -> Result<KbAnswer, ServiceError> {
        let route = format!("qnamaker/knowledgebases/{}/generateAnswer", self.kb_id);
        let request = self
            .client
            .post(endpoint_url(&self.endpoint, &route))
            .header("Authorization", format!("EndpointKey {}", self.key))
            .json(&QueryRequest { question });

        let response: QueryResponse = send_json(Service::KnowledgeBase, request).await?;
        match response.answers.into_iter().next() {
            Some(first) => Ok(KbAnswer::Found(first.answer)),
            None => {
                warn!(question, "knowledge base returned no answers");
                Ok(KbAnswer::NoAnswer)
            }
        }
    }
}
