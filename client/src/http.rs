use crate::{
    config::{ClientConfig, TransportOptions, RESPONSE_FORMAT},
    params::{encode_batch, ParamValue, Params},
    responses::{extract_response, ApiMessage, ApiResponse},
    ClientError, Result,
};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};
use url::Url;

/// Query keys set by the client itself. Extra parameters may not override them.
const RESERVED_PARAMS: [&str; 3] = ["api_key", "format", "method"];

/// Performs the single blocking GET behind every API call.
pub trait Transport: Send + Sync {
    /// Send `query` to `url` and return the raw response body.
    fn get(&self, url: &Url, query: &[(String, String)], timeout: Duration) -> Result<String>;
}

/// Default transport backed by a blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(proxy) = &options.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if !options.headers.is_empty() {
            let mut headers = HeaderMap::new();
            for (name, value) in &options.headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| ClientError::Transport(format!("header {}: {}", name, e)))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| ClientError::Transport(format!("header {}: {}", name, e)))?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url, query: &[(String, String)], timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .timeout(timeout)
            .send()?;
        debug!(status = %response.status(), "received DashaMail response");
        Ok(response.text()?)
    }
}

/// DashaMail API client.
///
/// Every method is a single blocking GET. The returned [`ApiResponse`] is the
/// `response` object of the envelope, untouched. When `raise_for_error` is off,
/// callers must check `msg.err_code` themselves (see [`ApiMessage`]).
pub struct Client {
    config: ClientConfig,
    base_url: Url,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Client with default settings: 10s timeout, API errors returned as data.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.transport)?;
        Self::with_transport(config, transport)
    }

    /// Use a custom transport instead of reqwest. `config.transport` is ignored.
    pub fn with_transport<T: Transport + 'static>(
        config: ClientConfig,
        transport: T,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        Ok(Self {
            config,
            base_url,
            transport: Box::new(transport),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Call any API method by name with extra parameters.
    pub fn request(&self, api_method: &str, params: &Params) -> Result<ApiResponse> {
        self.call(api_method, Vec::new(), params)
    }

    // Lists

    pub fn lists_get(&self, params: &Params) -> Result<ApiResponse> {
        self.call("lists.get", Vec::new(), params)
    }

    pub fn lists_add(&self, name: &str, params: &Params) -> Result<ApiResponse> {
        self.call("lists.add", vec![("name", name.into())], params)
    }

    pub fn lists_update(&self, list_id: i64, params: &Params) -> Result<ApiResponse> {
        self.call("lists.update", vec![("list_id", list_id.into())], params)
    }

    /// Deletes the list and all of its subscribers.
    pub fn lists_delete(&self, list_id: i64, params: &Params) -> Result<ApiResponse> {
        self.call("lists.delete", vec![("list_id", list_id.into())], params)
    }

    pub fn lists_get_unsubscribed(&self, params: &Params) -> Result<ApiResponse> {
        self.call("lists.get_unsubscribed", Vec::new(), params)
    }

    /// Spam complaints.
    pub fn lists_get_complaints(&self, params: &Params) -> Result<ApiResponse> {
        self.call("lists.get_complaints", Vec::new(), params)
    }

    pub fn lists_member_activity(&self, email: &str, params: &Params) -> Result<ApiResponse> {
        self.call("lists.member_activity", vec![("email", email.into())], params)
    }

    /// Import contacts from a file at `file_url`. `email_col_num` is the
    /// zero-based column holding the email address.
    pub fn lists_upload(
        &self,
        list_id: i64,
        file_url: &str,
        email_col_num: u32,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.upload",
            vec![
                ("list_id", list_id.into()),
                ("file", file_url.into()),
                ("email", email_col_num.into()),
            ],
            params,
        )
    }

    // Members

    pub fn lists_add_member(
        &self,
        list_id: i64,
        email: &str,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.add_member",
            vec![("list_id", list_id.into()), ("email", email.into())],
            params,
        )
    }

    /// Add contacts in bulk. Each record is `[email, col1, col2, ...]`.
    pub fn lists_add_member_batch<S: AsRef<str>>(
        &self,
        list_id: i64,
        batch: &[Vec<S>],
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.add_member_batch",
            vec![("list_id", list_id.into()), ("batch", encode_batch(batch).into())],
            params,
        )
    }

    pub fn lists_update_member(
        &self,
        member_id: i64,
        email: &str,
        list_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.update_member",
            vec![
                ("member_id", member_id.into()),
                ("email", email.into()),
                ("list_id", list_id.into()),
            ],
            params,
        )
    }

    pub fn lists_delete_member(&self, member_id: i64, params: &Params) -> Result<ApiResponse> {
        self.call("lists.delete_member", vec![("member_id", member_id.into())], params)
    }

    pub fn lists_unsubscribe_member(
        &self,
        member_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.unsubscribe_member",
            vec![("member_id", member_id.into())],
            params,
        )
    }

    /// Move a member to the list `list_id`.
    pub fn lists_move_member(
        &self,
        member_id: i64,
        list_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.move_member",
            vec![("member_id", member_id.into()), ("list_id", list_id.into())],
            params,
        )
    }

    /// Copy a member to the list `list_id`.
    pub fn lists_copy_member(
        &self,
        member_id: i64,
        list_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.copy_member",
            vec![("member_id", member_id.into()), ("list_id", list_id.into())],
            params,
        )
    }

    /// Status of the last email sent to `email` in the list.
    pub fn lists_last_status(
        &self,
        email: &str,
        list_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.last_status",
            vec![("email", email.into()), ("list_id", list_id.into())],
            params,
        )
    }

    pub fn lists_get_import_history(&self, list_id: i64, params: &Params) -> Result<ApiResponse> {
        self.call(
            "lists.get_import_history",
            vec![("list_id", list_id.into())],
            params,
        )
    }

    /// Validate the address and check it against the list's unsubscribe and stop lists.
    pub fn lists_check_email(
        &self,
        email: &str,
        list_id: i64,
        params: &Params,
    ) -> Result<ApiResponse> {
        self.call(
            "lists.check_email",
            vec![("email", email.into()), ("list_id", list_id.into())],
            params,
        )
    }

    // Merge fields are not supported yet; these never touch the network.

    pub fn lists_add_merge(&self, _params: &Params) -> Result<ApiResponse> {
        Err(ClientError::NotImplemented("lists.add_merge"))
    }

    pub fn lists_update_merge(&self, _params: &Params) -> Result<ApiResponse> {
        Err(ClientError::NotImplemented("lists.update_merge"))
    }

    pub fn lists_delete_merge(&self, _params: &Params) -> Result<ApiResponse> {
        Err(ClientError::NotImplemented("lists.delete_merge"))
    }

    fn call(
        &self,
        api_method: &str,
        required: Vec<(&'static str, ParamValue)>,
        extra: &Params,
    ) -> Result<ApiResponse> {
        let query = self.build_query(api_method, required, extra)?;
        debug!(
            method = api_method,
            params = ?query.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            "calling DashaMail API"
        );

        let body = self
            .transport
            .get(&self.base_url, &query, self.config.timeout())?;
        self.handle_response(api_method, &body)
    }

    fn build_query(
        &self,
        api_method: &str,
        required: Vec<(&'static str, ParamValue)>,
        extra: &Params,
    ) -> Result<Vec<(String, String)>> {
        for (key, _) in extra.iter() {
            let shadows_required = required.iter().any(|(name, _)| *name == key.as_str());
            if RESERVED_PARAMS.contains(&key.as_str()) || shadows_required {
                return Err(ClientError::ConflictingParam(key.clone()));
            }
        }

        let mut query = Vec::with_capacity(RESERVED_PARAMS.len() + required.len() + extra.len());
        query.push(("api_key".to_string(), self.config.api_key.clone()));
        query.push(("format".to_string(), RESPONSE_FORMAT.to_string()));
        query.push(("method".to_string(), api_method.to_string()));
        for (key, value) in required {
            query.push((key.to_string(), value.to_string()));
        }
        for (key, value) in extra.iter() {
            query.push((key.clone(), value.to_string()));
        }
        Ok(query)
    }

    fn handle_response(&self, api_method: &str, body: &str) -> Result<ApiResponse> {
        let envelope: serde_json::Value = serde_json::from_str(body)?;
        let response = extract_response(envelope);

        let msg = ApiMessage::from_response(&response);
        if msg.is_error() {
            let code = msg.code_text();
            if self.config.raise_for_error {
                return Err(ClientError::Api {
                    code,
                    error_type: msg.error_type,
                    message: msg.text,
                });
            }
            warn!(
                method = api_method,
                code = %code,
                error_type = %msg.error_type,
                "DashaMail API reported an error"
            );
        }

        Ok(response)
    }
}
