//! Read-only contract queries over the gateway's `vm-values/query` route.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use device_release_slots::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{QueryError, Result};

const QUERY_ROUTE: &str = "vm-values/query";

/// Runs a read-only contract function and hands back its raw return data.
#[async_trait]
pub trait ContractQueryExecutor: Send + Sync {
    async fn query(&self, function: &str, args: &[Vec<u8>]) -> Result<Vec<Vec<u8>>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VmQueryRequest<'a> {
    sc_address: String,
    func_name: &'a str,
    args: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VmQueryEnvelope {
    #[serde(default)]
    data: Option<VmQueryData>,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct VmQueryData {
    #[serde(default)]
    data: Option<VmOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmOutput {
    #[serde(default)]
    return_data: Option<Vec<Option<String>>>,
    #[serde(default)]
    return_code: String,
    #[serde(default)]
    return_message: String,
}

/// [`ContractQueryExecutor`] backed by a MultiversX gateway or proxy.
#[derive(Debug, Clone)]
pub struct GatewayQueryExecutor {
    client: reqwest::Client,
    endpoint: Url,
    contract: Address,
}

impl GatewayQueryExecutor {
    pub fn new(gateway_url: &str, contract: Address, timeout: Duration) -> Result<Self> {
        let invalid = |source| QueryError::InvalidUrl {
            url: gateway_url.to_string(),
            source,
        };
        let mut base = Url::parse(gateway_url).map_err(invalid)?;
        if base.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(QUERY_ROUTE).map_err(invalid)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(QueryError::Client)?;

        Ok(Self {
            client,
            endpoint,
            contract,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }
}

#[async_trait]
impl ContractQueryExecutor for GatewayQueryExecutor {
    async fn query(&self, function: &str, args: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
        let request = VmQueryRequest {
            sc_address: self.contract.to_bech32(),
            func_name: function,
            args: args.iter().map(hex::encode).collect(),
        };
        debug!(function, endpoint = %self.endpoint, "querying contract");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(QueryError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(function, status = status.as_u16(), "gateway rejected contract query");
            return Err(QueryError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: VmQueryEnvelope =
            response
                .json()
                .await
                .map_err(|e| QueryError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        let output = envelope
            .data
            .and_then(|data| data.data)
            .ok_or_else(|| QueryError::InvalidResponse {
                reason: if envelope.error.is_empty() {
                    "missing data.data".to_string()
                } else {
                    envelope.error
                },
            })?;

        if !output.return_code.eq_ignore_ascii_case("ok") {
            return Err(QueryError::ReturnCode {
                function: function.to_string(),
                code: output.return_code,
                message: output.return_message,
            });
        }

        let return_data = output
            .return_data
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                STANDARD
                    .decode(entry.unwrap_or_default())
                    .map_err(|e| QueryError::InvalidReturnData {
                        index,
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(function, entries = return_data.len(), "contract query returned");
        Ok(return_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contract() -> Address {
        Address::new([0; 32])
    }

    fn endpoint_for(base: &str) -> String {
        GatewayQueryExecutor::new(base, contract(), Duration::from_secs(1))
            .unwrap_or_else(|e| panic!("{e}"))
            .endpoint()
            .to_string()
    }

    #[test]
    fn query_route_is_appended_to_the_gateway_path() {
        assert_eq!(
            endpoint_for("https://devnet-gateway.multiversx.com"),
            "https://devnet-gateway.multiversx.com/vm-values/query"
        );
        assert_eq!(
            endpoint_for("http://127.0.0.1:7950/proxy"),
            "http://127.0.0.1:7950/proxy/vm-values/query"
        );
        assert_eq!(
            endpoint_for("http://127.0.0.1:7950/proxy/"),
            "http://127.0.0.1:7950/proxy/vm-values/query"
        );
    }

    #[test]
    fn rejects_unusable_gateway_urls() {
        for url in ["not a url", "mailto:ops@example.com"] {
            assert!(
                matches!(
                    GatewayQueryExecutor::new(url, contract(), Duration::from_secs(1)),
                    Err(QueryError::InvalidUrl { .. })
                ),
                "{url}"
            );
        }
    }

    #[test]
    fn request_body_uses_gateway_field_names() {
        let request = VmQueryRequest {
            sc_address: contract().to_bech32(),
            func_name: "getSlots",
            args: vec![hex::encode(b"1.0")],
        };
        let json = serde_json::to_value(&request).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json["funcName"], "getSlots");
        assert_eq!(json["args"][0], "312e30");
        assert!(json["scAddress"].as_str().is_some_and(|a| a.starts_with("erd1")));
    }
}
