// ABOUTME: Google Sheets REST v4 client implementing SheetsApi over reqwest.
// ABOUTME: Authenticates every request with a service-account bearer token.

use async_trait::async_trait;
use serde::Deserialize;

use super::api::{SheetsApi, TabInfo};
use super::auth::{ServiceAccount, TokenSource};
use crate::error::SheetsApiError;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetBody {
    #[serde(default)]
    sheets: Vec<SheetBody>,
}

#[derive(Debug, Deserialize)]
struct SheetBody {
    properties: TabInfo,
}

#[derive(Debug, Deserialize)]
struct ValueRangeBody {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateBody {
    #[serde(default)]
    replies: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Client for the Google Sheets API.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    tokens: TokenSource,
    base_url: String,
}

impl GoogleSheetsClient {
    /// Create a client authenticated as the given service account.
    pub fn new(account: ServiceAccount) -> Result<Self, SheetsApiError> {
        let http = reqwest::Client::new();
        Ok(Self {
            tokens: TokenSource::new(account, http.clone())?,
            http,
            base_url: SHEETS_API_URL.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The service account the client acts as.
    pub fn client_email(&self) -> &str {
        self.tokens.client_email()
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(spreadsheet_id))
    }

    fn values_url(&self, spreadsheet_id: &str, tab: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(&a1_range(tab))
        )
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SheetsApiError> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleError>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);

        tracing::warn!(status = status.as_u16(), %message, "Google Sheets request failed");
        Err(match status.as_u16() {
            404 => SheetsApiError::NotFound(message),
            401 => SheetsApiError::Auth(message),
            code => SheetsApiError::Api {
                status: code,
                message,
            },
        })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: serde_json::Value,
    ) -> Result<BatchUpdateBody, SheetsApiError> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet_id));
        let body = serde_json::json!({ "requests": [request] });
        let response = self.send(self.http.post(url).json(&body)).await?;
        Ok(response.json().await?)
    }
}

/// A1 range covering a whole tab, quoting the title.
fn a1_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsApiError> {
        let request = self
            .http
            .get(self.spreadsheet_url(spreadsheet_id))
            .query(&[("fields", "sheets.properties(sheetId,title,index)")]);
        let body: SpreadsheetBody = self.send(request).await?.json().await?;
        Ok(body.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
    ) -> Result<Vec<Vec<serde_json::Value>>, SheetsApiError> {
        let request = self.http.get(self.values_url(spreadsheet_id, tab)).query(&[
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            ("dateTimeRenderOption", "FORMATTED_STRING"),
        ]);
        let body: ValueRangeBody = self.send(request).await?.json().await?;
        Ok(body.values)
    }

    async fn add_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        columns: usize,
    ) -> Result<TabInfo, SheetsApiError> {
        let request = serde_json::json!({
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": { "rowCount": rows, "columnCount": columns }
                }
            }
        });
        let body = self.batch_update(spreadsheet_id, request).await?;
        let properties = body
            .replies
            .into_iter()
            .next()
            .and_then(|mut reply| reply.pointer_mut("/addSheet/properties").map(serde_json::Value::take))
            .ok_or_else(|| SheetsApiError::Api {
                status: 200,
                message: "addSheet reply missing".into(),
            })?;
        Ok(serde_json::from_value(properties)?)
    }

    async fn delete_tab(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<(), SheetsApiError> {
        let request = serde_json::json!({ "deleteSheet": { "sheetId": sheet_id } });
        self.batch_update(spreadsheet_id, request).await?;
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        values: Vec<Vec<serde_json::Value>>,
    ) -> Result<(), SheetsApiError> {
        let body = serde_json::json!({
            "range": a1_range(tab),
            "majorDimension": "ROWS",
            "values": values,
        });
        let request = self
            .http
            .put(self.values_url(spreadsheet_id, tab))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_range_quotes_title() {
        assert_eq!(a1_range("Sheet1"), "'Sheet1'");
        assert_eq!(a1_range("Bob's tab"), "'Bob''s tab'");
    }

    #[test]
    fn test_spreadsheet_body_defaults_zero_ids() {
        let body: SpreadsheetBody = serde_json::from_str(
            r#"{"sheets": [
                {"properties": {"title": "Sheet1"}},
                {"properties": {"sheetId": 42, "title": "Adults", "index": 1}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(body.sheets[0].properties.sheet_id, 0);
        assert_eq!(body.sheets[0].properties.index, 0);
        assert_eq!(body.sheets[1].properties.sheet_id, 42);
    }

    #[test]
    fn test_value_range_without_values() {
        let body: ValueRangeBody = serde_json::from_str(r#"{"range": "'Empty'!A1:Z1000"}"#).unwrap();
        assert!(body.values.is_empty());
    }

    #[test]
    fn test_google_error_message() {
        let err: GoogleError = serde_json::from_str(
            r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.message, "Requested entity was not found.");
    }
}
