use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::amount::amount_from_json;
use crate::config::NodeConfig;
use crate::error::XvgError;

pub(crate) const API_KEY_HEADER: &str = "api-key";

pub(crate) fn build_http_client(config: &NodeConfig) -> Result<reqwest::Client, XvgError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| XvgError::Config(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn transport_error(endpoint: &str, err: reqwest::Error) -> XvgError {
    XvgError::Network {
        endpoint: endpoint.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

pub(crate) fn status_error(endpoint: &str, status: StatusCode, detail: Option<&str>) -> XvgError {
    let reason = status.canonical_reason().unwrap_or("unexpected status");
    XvgError::Network {
        endpoint: endpoint.to_string(),
        status: Some(status.as_u16()),
        message: match detail {
            Some(detail) => format!("{reason}: {detail}"),
            None => reason.to_string(),
        },
    }
}

pub(crate) fn malformed(endpoint: &str, what: &str) -> XvgError {
    XvgError::Network {
        endpoint: endpoint.to_string(),
        status: None,
        message: format!("malformed response: {what}"),
    }
}

/// Status plus the body parsed as JSON; a non-JSON body yields `Value::Null`.
pub(crate) async fn read_json(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<(StatusCode, Value), XvgError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(endpoint, e))?;
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok((status, body))
}

/// Amount field that providers may omit; absence reads as zero.
pub(crate) fn optional_amount(value: &Value) -> Result<Decimal, XvgError> {
    if value.is_null() {
        Ok(Decimal::ZERO)
    } else {
        amount_from_json(value)
    }
}
