//! JSON-RPC 2.0 transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::RpcError;
use crate::types::{JsonRpcRequest, JsonRpcResponse, RpcConfig};

/// Sends one JSON-RPC method call and returns its `result`.
pub trait JsonRpcTransport {
    /// Call `method` with `params`.
    fn call_method(
        &self,
        method: &str,
        params: Value,
    ) -> impl std::future::Future<Output = Result<Value, RpcError>> + Send;
}

/// reqwest-backed transport posting to `{base_url}{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: RpcConfig,
    client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: RpcConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The transport configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.config.api_key {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    async fn do_call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let url = self.config.url();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest { jsonrpc: "2.0", id, method, params };
        tracing::debug!(method, id, %url, "json-rpc request");

        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RpcError::ServerError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        let response: JsonRpcResponse = serde_json::from_str(&body)?;
        if let Some(err) = response.error {
            tracing::debug!(method, id, code = err.code, "json-rpc error");
            return Err(RpcError::Rpc { code: err.code, message: err.message });
        }
        tracing::debug!(method, id, "json-rpc response");
        response
            .result
            .ok_or_else(|| RpcError::MissingResult(method.to_string()))
    }
}

impl JsonRpcTransport for HttpTransport {
    fn call_method(
        &self,
        method: &str,
        params: Value,
    ) -> impl std::future::Future<Output = Result<Value, RpcError>> + Send {
        self.do_call(method, params)
    }
}
