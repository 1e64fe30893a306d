//! Reqwest-backed employee directory adapter.
//!
//! This adapter owns transport details only: endpoint paths, filter query
//! parameters, HTTP error mapping and JSON decoding into domain records.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use super::client::{RawResponse, RestClient, is_timeout_status, status_message};
use super::dto::{EmailCheckDto, ErrorBodyDto};
use crate::domain::ports::{EmployeeDirectory, EmployeeDirectoryError};
use crate::domain::{EmployeeFilter, EmployeeId, EmployeeRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Employee directory adapter speaking the `/api/employees/` REST API.
#[derive(Debug, Clone)]
pub struct HttpEmployeeDirectory {
    client: RestClient,
}

impl HttpEmployeeDirectory {
    /// Wrap a shared REST client.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<RawResponse, EmployeeDirectoryError> {
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

    async fn list(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        let request = self
            .client
            .request(Method::GET, self.client.endpoint(&["api", "employees"]))
            .query(query);
        let response = self.send(request).await?;
        parse_body(&response.body)
    }
}

#[async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        self.list(&[]).await
    }

    async fn search(&self, term: &str) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        self.list(&[("search", term.to_owned())]).await
    }

    async fn filter(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        self.list(&filter_query(filter)).await
    }

    async fn create(
        &self,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, EmployeeDirectoryError> {
        let request = self
            .client
            .request(Method::POST, self.client.endpoint(&["api", "employees"]))
            .json(record);
        let response = self.send(request).await?;
        parse_body(&response.body)
    }

    async fn update(
        &self,
        id: &EmployeeId,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, EmployeeDirectoryError> {
        let url = self.client.endpoint(&["api", "employees", id.as_str()]);
        let request = self.client.request(Method::PUT, url).json(record);
        let response = self.send(request).await?;
        parse_body(&response.body)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<(), EmployeeDirectoryError> {
        let url = self.client.endpoint(&["api", "employees", id.as_str()]);
        self.send(self.client.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, EmployeeDirectoryError> {
        let url = self.client.endpoint(&["api", "check-email", email]);
        let response = self.send(self.client.request(Method::POST, url)).await?;
        let check: EmailCheckDto = parse_body(&response.body)?;
        Ok(check.exists)
    }
}

/// Query parameters for a structured filter. Unset criteria are omitted.
fn filter_query(filter: &EmployeeFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    let text = [
        ("first_name__icontains", &filter.first_name),
        ("last_name__icontains", &filter.last_name),
        ("email__icontains", &filter.email),
    ];
    for (name, value) in text {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            query.push((name, value.to_owned()));
        }
    }
    query.extend(filter.skills.iter().map(|skill| ("skills", skill.clone())));
    let dates = [
        ("date_of_birth", filter.date_of_birth),
        ("start_date_of_birth", filter.start_date_of_birth),
        ("end_date_of_birth", filter.end_date_of_birth),
    ];
    for (name, date) in dates {
        if let Some(date) = date {
            query.push((name, date.format(DATE_FORMAT).to_string()));
        }
    }
    query
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, EmployeeDirectoryError> {
    serde_json::from_slice(body).map_err(|error| {
        EmployeeDirectoryError::decode(format!("invalid employee directory payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> EmployeeDirectoryError {
    if error.is_timeout() {
        EmployeeDirectoryError::timeout(error.to_string())
    } else {
        EmployeeDirectoryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmployeeDirectoryError {
    if status == StatusCode::BAD_REQUEST {
        if let Ok(errors) = serde_json::from_slice::<ErrorBodyDto>(body) {
            return EmployeeDirectoryError::rejected(errors.into_field_messages());
        }
    }
    let message = status_message(status, body);
    match status {
        StatusCode::NOT_FOUND => EmployeeDirectoryError::not_found(message),
        _ if is_timeout_status(status) => EmployeeDirectoryError::timeout(message),
        _ => EmployeeDirectoryError::transport(message),
    }
}
