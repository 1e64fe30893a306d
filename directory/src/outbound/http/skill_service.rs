//! Reqwest-backed skill service adapter for `/api/skills/`.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use super::client::{RawResponse, RestClient, is_timeout_status, status_message};
use crate::domain::ports::{SkillService, SkillServiceError};
use crate::domain::{EmployeeId, SkillId, SkillRecord};

/// Skill service adapter speaking the `/api/skills/` REST API.
#[derive(Debug, Clone)]
pub struct HttpSkillService {
    client: RestClient,
}

impl HttpSkillService {
    /// Wrap a shared REST client.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RawResponse, SkillServiceError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(map_transport_error)?;
        if response.status.is_success() {
            Ok(response)
        } else {
            Err(map_status_error(response.status, &response.body))
        }
    }

    fn skill_url(&self, id: SkillId) -> reqwest::Url {
        self.client
            .endpoint(&["api", "skills", id.to_string().as_str()])
    }
}

#[async_trait]
impl SkillService for HttpSkillService {
    async fn list(&self) -> Result<Vec<SkillRecord>, SkillServiceError> {
        let url = self.client.endpoint(&["api", "skills"]);
        let response = self.send(self.client.request(Method::GET, url)).await?;
        parse_body(&response.body)
    }

    async fn create(
        &self,
        employee: &EmployeeId,
        skill: &SkillRecord,
    ) -> Result<SkillRecord, SkillServiceError> {
        let url = self.client.endpoint(&["api", "skills"]);
        let payload = skill.for_employee(employee);
        let response = self
            .send(self.client.request(Method::POST, url).json(&payload))
            .await?;
        parse_body(&response.body)
    }

    async fn update(&self, id: SkillId, skill: &SkillRecord) -> Result<(), SkillServiceError> {
        let request = self.client.request(Method::PUT, self.skill_url(id)).json(skill);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: SkillId) -> Result<(), SkillServiceError> {
        self.send(self.client.request(Method::DELETE, self.skill_url(id)))
            .await?;
        Ok(())
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, SkillServiceError> {
    serde_json::from_slice(body)
        .map_err(|error| SkillServiceError::decode(format!("invalid skill payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> SkillServiceError {
    if error.is_timeout() {
        SkillServiceError::timeout(error.to_string())
    } else {
        SkillServiceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SkillServiceError {
    let message = status_message(status, body);
    match status {
        StatusCode::NOT_FOUND => SkillServiceError::not_found(message),
        _ if is_timeout_status(status) => SkillServiceError::timeout(message),
        _ if status.is_client_error() => SkillServiceError::rejected(message),
        _ => SkillServiceError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::conflict(StatusCode::CONFLICT, "Rejected")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_http_statuses_to_expected_domain_errors(
        #[case] status: StatusCode,
        #[case] expected: &str,
    ) {
        let error = map_status_error(status, br#"{"yrs_exp": ["A valid integer is required."]}"#);
        let matched = match expected {
            "Rejected" => matches!(error, SkillServiceError::Rejected { .. }),
            "NotFound" => matches!(error, SkillServiceError::NotFound { .. }),
            "Timeout" => matches!(error, SkillServiceError::Timeout { .. }),
            "Transport" => matches!(error, SkillServiceError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[test]
    fn parses_skill_lists() {
        let body = br#"[{"id": 3, "name": "Rust", "yrs_exp": 4, "seniority": "Senior", "employee": "AB1234"}]"#;
        let skills: Vec<SkillRecord> = parse_body(body).expect("decode");
        assert_eq!(skills[0].id, Some(SkillId::new(3)));
        assert_eq!(skills[0].employee, Some(EmployeeId::new("AB1234")));
    }

    #[test]
    fn create_payload_names_the_owner() {
        let payload = SkillRecord::new("Rust", 4, "Senior").for_employee(&EmployeeId::new("AB1234"));
        let value = serde_json::to_value(&payload).expect("serialise");
        assert_eq!(value["employee"], "AB1234");
        assert!(value.get("id").is_none());
    }
}
