//! Thin async client for the Google Sheets API v4.
//!
//! Only the four calls the gate and the maintenance helpers need are
//! implemented: `values.get`, `values.append`, `spreadsheets.get` and
//! `spreadsheets.batchUpdate`.

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::{debug, error};
use url::Url;

use crate::error::{GateError, GateResult};
use crate::sheets::types::{Spreadsheet, ValueRange};
use crate::Config;

#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.sheets_api_base.clone(),
            config.spreadsheet_id.clone(),
            config.sheets_access_token.clone(),
        )
    }

    /// Build `{base}/v4/spreadsheets/{id}{suffix}/...` with each segment
    /// percent-encoded.
    fn endpoint(&self, id_suffix: &str, rest: &[&str]) -> GateResult<Url> {
        let mut url = Url::parse(&self.api_base)?;
        let spreadsheet = format!("{}{}", self.spreadsheet_id, id_suffix);
        url.path_segments_mut()
            .map_err(|_| GateError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet.as_str()])
            .extend(rest);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> GateResult<Response> {
        let response = request.bearer_auth(&self.access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status_code = status.as_u16(), body = %body, "sheets_request_rejected");
            return Err(GateError::Api {
                service: "Sheets",
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Read every cell of `range` (A1 notation or a named range).
    pub async fn get_values(&self, range: &str) -> GateResult<ValueRange> {
        let url = self.endpoint("", &["values", range])?;
        debug!(range = %range, "sheets_values_get");

        let response = self.send(self.client.get(url)).await?;
        Ok(response.json::<ValueRange>().await?)
    }

    /// Append rows after the last row of the table found in `range`.
    pub async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> GateResult<()> {
        let mut url = self.endpoint("", &["values", &format!("{}:append", range)])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        debug!(range = %range, rows = rows.len(), "sheets_values_append");

        self.send(self.client.post(url).json(&json!({ "values": rows })))
            .await?;
        Ok(())
    }

    /// Sheet properties and named ranges of the spreadsheet.
    pub async fn get_spreadsheet(&self) -> GateResult<Spreadsheet> {
        let mut url = self.endpoint("", &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties,namedRanges");

        let response = self.send(self.client.get(url)).await?;
        Ok(response.json::<Spreadsheet>().await?)
    }

    /// Apply a list of `Request` objects in one `batchUpdate` call.
    pub async fn batch_update(&self, requests: Vec<Value>) -> GateResult<Value> {
        let url = self.endpoint(":batchUpdate", &[])?;
        debug!(requests = requests.len(), "sheets_batch_update");

        let response = self
            .send(self.client.post(url).json(&json!({ "requests": requests })))
            .await?;
        Ok(response.json::<Value>().await?)
    }
}
