use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::dataset::{employees, Employee, ExecMode, Table};
use crate::error::HandlerError;

const SUCCESS_MESSAGE: &str = "PySpark is working!";
const NO_FILTER: &str = "None";

#[derive(Deserialize)]
pub struct ApiEvent {
    #[serde(rename = "queryStringParameters", default)]
    query_string_parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Serialize)]
struct SuccessBody<'a> {
    message: &'static str,
    filter_applied: &'a str,
    employee_count: usize,
    average_salary: Option<f64>,
    data: &'a [&'a Employee],
}

impl ApiEvent {
    // Missing, null and empty dept all mean "no filter"
    fn dept_filter(&self) -> Result<Option<&str>, HandlerError> {
        let dept = self
            .query_string_parameters
            .as_ref()
            .and_then(|params| params.get("dept"));
        match dept {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(HandlerError::InvalidEvent(format!(
                "queryStringParameters.dept must be a string, got {other}"
            ))),
        }
    }
}

impl ApiResponse {
    fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        ApiResponse { status_code, headers, body }
    }

    fn from_error(err: &HandlerError) -> Self {
        let body = json!({
            "error": err.to_string(),
            "type": err.kind(),
        });
        ApiResponse::json(500, body.to_string())
    }
}

// Filter, aggregate and serialize; any failure aborts the whole response
fn process(event: Value, table: &Table, workers: usize) -> Result<String, HandlerError> {
    let event: ApiEvent =
        serde_json::from_value(event).map_err(|e| HandlerError::InvalidEvent(e.to_string()))?;
    let dept_filter = event.dept_filter()?;
    tracing::debug!(dept = ?dept_filter, "handling request");

    let selection = table.select(dept_filter, ExecMode::for_rows(table.len(), workers));
    let average_salary = selection.average_salary()?;

    let body = SuccessBody {
        message: SUCCESS_MESSAGE,
        filter_applied: dept_filter.unwrap_or(NO_FILTER),
        employee_count: selection.count(),
        average_salary,
        data: selection.rows(),
    };
    Ok(serde_json::to_string(&body)?)
}

// Main Lambda handler - always answers with a structured response, 200 or 500
// `workers` is the pool size fixed at cold start, so scan mode always matches the pool
pub async fn function_handler(
    event: Value,
    workers: usize,
) -> Result<ApiResponse, Box<dyn std::error::Error + Send + Sync>> {
    match process(event, employees(), workers) {
        Ok(body) => Ok(ApiResponse::json(200, body)),
        Err(err) => {
            tracing::error!(kind = err.kind(), error = %err, "request failed");
            Ok(ApiResponse::from_error(&err))
        }
    }
}
