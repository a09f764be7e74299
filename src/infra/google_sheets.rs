use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::app::ports::{AppendSummary, SheetStorePort};
use crate::config::{GoogleCredentials, SpreadsheetSettings};
use crate::constants::SHEETS_SCOPE;
use crate::domain::{ColumnSchema, ParsedDataset};
use crate::error::{ClerkError, Result};

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
    #[serde(default)]
    grid_properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: Option<usize>,
}

/// Google Sheets v4 REST client authenticated as a service account
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    auth: CustomServiceAccount,
    base: Url,
    clear_threshold_rows: u64,
}

impl GoogleSheetsClient {
    pub fn new(settings: &SpreadsheetSettings) -> Result<Self> {
        let auth = match &settings.credentials {
            GoogleCredentials::File(path) => CustomServiceAccount::from_file(path),
            GoogleCredentials::Json(json) => CustomServiceAccount::from_json(json),
        }
        .map_err(|e| ClerkError::Auth(format!("invalid service account credentials: {}", e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            auth,
            base: spreadsheet_url(&settings.api_base, &settings.spreadsheet_id)?,
            clear_threshold_rows: settings.clear_threshold_rows,
        })
    }

    async fn bearer(&self) -> Result<String> {
        let token = self
            .auth
            .token(&[SHEETS_SCOPE])
            .await
            .map_err(|e| ClerkError::Auth(e.to_string()))?;
        Ok(format!("Bearer {}", token.as_str()))
    }

    async fn tab_row_count(&self, sheet: &str) -> Result<Option<u64>> {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        Ok(row_count_of(&meta, sheet))
    }

    async fn clear_data_rows(&self, sheet: &str) -> Result<()> {
        let url = values_url(&self.base, &format!("{}!A2:Z", sheet), ":clear")?;
        self.post_json::<serde_json::Value>(url, &json!({})).await?;
        Ok(())
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;
        read_json(response).await
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(&self, url: Url, body: &serde_json::Value) -> Result<T> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl SheetStorePort for GoogleSheetsClient {
    async fn fetch_columns(&self, sheet: &str) -> Result<ColumnSchema> {
        info!("Fetching column names for {}", sheet);
        let url = values_url(&self.base, &format!("{}!1:1", sheet), "")?;
        let range: ValueRange = self.get_json(url).await?;
        let columns = header_of(range);
        if columns.is_empty() {
            warn!("No header row found in {}", sheet);
            return Err(ClerkError::SchemaUnavailable {
                sheet: sheet.to_string(),
                message: "no header row found".to_string(),
            });
        }
        debug!("Columns for {}: {:?}", sheet, columns);
        Ok(ColumnSchema::new(columns))
    }

    async fn append_rows(&self, sheet: &str, rows: &ParsedDataset) -> Result<AppendSummary> {
        let mut cleared = false;
        match self.tab_row_count(sheet).await? {
            Some(count) if count > self.clear_threshold_rows => {
                warn!("{} has {} rows, above {}; clearing data rows", sheet, count, self.clear_threshold_rows);
                self.clear_data_rows(sheet).await?;
                cleared = true;
            }
            Some(count) => debug!("{} has {} rows", sheet, count),
            None => warn!("Tab {} not found in spreadsheet metadata", sheet),
        }

        let mut url = values_url(&self.base, &format!("{}!A1", sheet), ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = json!({ "values": rows.to_grid() });

        let response: AppendResponse = self.post_json(url, &body).await?;
        let updates = response.updates;
        Ok(AppendSummary {
            updated_range: updates.as_ref().and_then(|u| u.updated_range.clone()),
            updated_rows: updates.and_then(|u| u.updated_rows).unwrap_or(0),
            cleared,
        })
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        error!("Sheets API error {}: {}", status, text);
        return Err(ClerkError::Api { message: format!("Sheets API error {}: {}", status, text) });
    }
    Ok(serde_json::from_str(&text)?)
}

fn spreadsheet_url(api_base: &str, spreadsheet_id: &str) -> Result<Url> {
    let mut url = Url::parse(api_base)
        .map_err(|e| ClerkError::Config(format!("invalid spreadsheet api_base '{}': {}", api_base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClerkError::Config(format!("spreadsheet api_base '{}' cannot be a base", api_base)))?
        .pop_if_empty()
        .push(spreadsheet_id);
    Ok(url)
}

/// `<base>/values/<range><suffix>` with the range percent-encoded as one segment
fn values_url(base: &Url, range: &str, suffix: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClerkError::Config(format!("'{}' cannot be a base url", base)))?
        .push("values")
        .push(&format!("{}{}", range, suffix));
    Ok(url)
}

fn header_of(range: ValueRange) -> Vec<String> {
    range.values.into_iter().next().unwrap_or_default()
}

fn row_count_of(meta: &SpreadsheetMeta, sheet: &str) -> Option<u64> {
    meta.sheets
        .iter()
        .find(|s| s.properties.title == sheet)
        .map(|s| s.properties.grid_properties.as_ref().map_or(0, |g| g.row_count))
}
