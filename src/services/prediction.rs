// Intent and entity prediction via the LUIS v3 runtime API

use super::{IntentPredictor, http_client, send_json};
use crate::config::endpoint_url;
use crate::error::{ConfigError, Service, ServiceError};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Prediction for one utterance
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub top_intent: String,
    /// Entity type -> service-defined value, in the order the service listed them
    #[serde(default)]
    pub entities: IndexMap<String, Value>,
}

#[derive(Deserialize)]
struct PredictionResponse {
    prediction: Prediction,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    query: &'a str,
}

pub struct LuisClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    app_id: Uuid,
}

impl LuisClient {
    pub fn new(endpoint: &str, key: &str, app_id: Uuid) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
            app_id,
        })
    }
}

#[async_trait]
impl IntentPredictor for LuisClient {
    async fn predict(&self, text: &str, slot: &str) -> Result<Prediction, ServiceError> {
        let route = format!(
            "luis/prediction/v3.0/apps/{}/slots/{}/predict",
            self.app_id, slot
        );

        // log=true feeds the utterance into active learning on the service side
        let request = self
            .client
            .post(endpoint_url(&self.endpoint, &route))
            .query(&[("log", "true")])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&PredictionRequest { query: text });

        let response: PredictionResponse = send_json(Service::Prediction, request).await?;
        Ok(response.prediction)
    }
}

/// Result of fail-soft entity extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityExtraction {
    pub entities: IndexMap<String, Vec<String>>,
    /// Number of entity types parsed successfully
    pub parsed: usize,
    /// First entity type that failed to parse. Nothing after it was processed.
    pub skipped: Option<String>,
}

impl EntityExtraction {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_none()
    }
}

/// Flatten each entity value into an ordered list of strings.
///
/// Strings, numbers and booleans are taken as-is, one level of nested lists
/// is flattened. Stops at the first value that does not fit that shape and
/// returns what was collected up to that point.
pub fn extract_entities(raw: &IndexMap<String, Value>) -> EntityExtraction {
    let mut extraction = EntityExtraction::default();

    for (name, value) in raw {
        match flatten_values(value) {
            Some(values) => {
                extraction.entities.insert(name.clone(), values);
                extraction.parsed += 1;
            }
            None => {
                extraction.skipped = Some(name.clone());
                break;
            }
        }
    }

    extraction
}

fn flatten_values(value: &Value) -> Option<Vec<String>> {
    let mut values = Vec::new();
    for item in value.as_array()? {
        match item {
            Value::Array(nested) => {
                for inner in nested {
                    values.push(scalar_text(inner)?);
                }
            }
            other => values.push(scalar_text(other)?),
        }
    }
    Some(values)
}

/// Text form of a string, number or boolean
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::LUIS_ID;
    use mockito::Matcher;
    use serde_json::json;

    // Parsed from text so the written key order is kept
    fn raw(json: &str) -> IndexMap<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_predict_posts_query_with_logging() {
        let mut server = mockito::Server::new_async().await;
        let path = format!("/luis/prediction/v3.0/apps/{}/slots/Production/predict", LUIS_ID);
        let mock = server
            .mock("POST", path.as_str())
            .match_query(Matcher::UrlEncoded("log".into(), "true".into()))
            .match_header("Ocp-Apim-Subscription-Key", "luis-key")
            .match_body(Matcher::Json(json!({ "query": "how much is a bottle of wine?" })))
            .with_status(200)
            .with_body(
                json!({
                    "query": "how much is a bottle of wine?",
                    "prediction": {
                        "topIntent": "PriceQuery",
                        "intents": { "PriceQuery": { "score": 0.93 } },
                        "entities": { "Product": ["wine"], "Unit": ["bottle"] }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LuisClient::new(&server.url(), "luis-key", Uuid::parse_str(LUIS_ID).unwrap())
            .unwrap();
        let prediction = client
            .predict("how much is a bottle of wine?", "Production")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(prediction.top_intent, "PriceQuery");
        let keys: Vec<_> = prediction.entities.keys().cloned().collect();
        assert_eq!(keys, vec!["Product", "Unit"]);
    }

    #[test]
    fn test_no_entities_yields_empty_map() {
        let extraction = extract_entities(&IndexMap::new());
        assert!(extraction.entities.is_empty());
        assert_eq!(extraction.parsed, 0);
        assert!(extraction.is_complete());
    }

    #[test]
    fn test_entities_keep_service_order_and_flatten_lists() {
        let extraction = extract_entities(&raw(
            r#"{
                "Unit": ["bottle"],
                "Product": [["cider"], ["apple must", "must"]],
                "Size": []
            }"#,
        ));

        assert!(extraction.is_complete());
        assert_eq!(extraction.parsed, 3);
        let keys: Vec<_> = extraction.entities.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Unit", "Product", "Size"]);
        assert_eq!(
            extraction.entities["Product"],
            vec!["cider", "apple must", "must"]
        );
        assert!(extraction.entities["Size"].is_empty());
    }

    #[test]
    fn test_response_entities_keep_wire_order() {
        let response: PredictionResponse = serde_json::from_str(
            r#"{
                "query": "two bottles of cider",
                "prediction": {
                    "topIntent": "PriceQuery",
                    "entities": { "Unit": ["bottle"], "number": [2], "Product": ["cider"] }
                }
            }"#,
        )
        .unwrap();

        let extraction = extract_entities(&response.prediction.entities);
        let keys: Vec<_> = extraction.entities.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Unit", "number", "Product"]);
        assert!(extraction.is_complete());
    }

    #[test]
    fn test_numbers_and_booleans_become_text() {
        let extraction = extract_entities(&raw(
            r#"{
                "number": [2, 0.5],
                "ordinal": [[3]],
                "gift": [true]
            }"#,
        ));

        assert!(extraction.is_complete());
        assert_eq!(extraction.entities["number"], vec!["2", "0.5"]);
        assert_eq!(extraction.entities["ordinal"], vec!["3"]);
        assert_eq!(extraction.entities["gift"], vec!["true"]);
    }

    #[test]
    fn test_malformed_entity_truncates_without_error() {
        let extraction = extract_entities(&raw(
            r#"{
                "Product": ["wine"],
                "datetimeV2": [{ "type": "date", "values": [{ "timex": "2026-10-19" }] }],
                "Unit": ["bottle"]
            }"#,
        ));

        assert_eq!(extraction.parsed, 1);
        assert_eq!(extraction.skipped.as_deref(), Some("datetimeV2"));
        assert_eq!(extraction.entities.len(), 1);
        assert_eq!(extraction.entities["Product"], vec!["wine"]);
        assert!(!extraction.entities.contains_key("Unit"));
    }

    #[test]
    fn test_non_list_value_is_a_parse_failure() {
        let extraction = extract_entities(&raw(
            r#"{ "$instance": { "Product": [{ "text": "wine" }] } }"#,
        ));
        assert_eq!(extraction.parsed, 0);
        assert_eq!(extraction.skipped.as_deref(), Some("$instance"));
    }
}
