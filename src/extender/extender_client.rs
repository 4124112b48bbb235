use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::TaskInfo;
use crate::extender::extender_config::ExtenderConfig;
use crate::extender::extender_error::{ExtenderError, ExtenderResult};
use crate::extender::interest::InterestFilter;

/// Largest response body accepted from the extender (10 MiB).
pub const MAX_BODY_SIZE: usize = 10 << 20;

/// Stateless HTTP transport to one extender. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ExtenderClient {
    http: reqwest::Client,
    config: Arc<ExtenderConfig>,
    interest: Arc<InterestFilter>,
}

impl ExtenderClient {
    pub fn new(config: ExtenderConfig) -> ExtenderResult<Self> {
        let mut builder = reqwest::Client::builder();
        if !config.http_timeout.is_zero() {
            builder = builder.timeout(config.http_timeout);
        }
        let http = builder.build().map_err(ExtenderError::Client)?;

        Ok(Self {
            http,
            interest: Arc::new(InterestFilter::new(config.managed_resources.clone())),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ExtenderConfig {
        &self.config
    }

    pub fn is_interested(&self, task: &TaskInfo) -> bool {
        self.interest.is_interested(task)
    }

    /// `<url_prefix>/<verb>`, ignoring trailing slashes on the prefix.
    pub fn endpoint(&self, verb: &str) -> ExtenderResult<Url> {
        let raw = format!("{}/{}", self.config.url_prefix.trim_end_matches('/'), verb);
        Url::parse(&raw).map_err(|source| ExtenderError::InvalidUrl { url: raw, source })
    }

    /// POSTs `request` to `verb` and decodes the JSON response.
    pub async fn send<Req, Resp>(&self, verb: &str, request: &Req) -> ExtenderResult<Resp>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let (url, response) = self.post(verb, request).await?;
        let body = self.read_body(verb, &url, response).await?;

        serde_json::from_slice(&body).map_err(|source| ExtenderError::Decode {
            verb: verb.to_string(),
            source,
        })
    }

    /// POSTs `request` to `verb` and ignores the response body.
    pub async fn notify<Req>(&self, verb: &str, request: &Req) -> ExtenderResult<()>
    where
        Req: Serialize + Sync + ?Sized,
    {
        self.post(verb, request).await.map(drop)
    }

    async fn post<Req>(&self, verb: &str, request: &Req) -> ExtenderResult<(Url, reqwest::Response)>
    where
        Req: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(verb)?;
        let body = serde_json::to_vec(request).map_err(|source| ExtenderError::Encode {
            verb: verb.to_string(),
            source,
        })?;

        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| self.transport_error(verb, &url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtenderError::Status {
                verb: verb.to_string(),
                url: url.to_string(),
                status,
            });
        }

        Ok((url, response))
    }

    async fn read_body(
        &self,
        verb: &str,
        url: &Url,
        mut response: reqwest::Response,
    ) -> ExtenderResult<Vec<u8>> {
        let too_large = || ExtenderError::BodyTooLarge {
            verb: verb.to_string(),
            limit: MAX_BODY_SIZE,
        };

        if response
            .content_length()
            .is_some_and(|length| length > MAX_BODY_SIZE as u64)
        {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| self.transport_error(verb, url, source))?
        {
            if body.len() + chunk.len() > MAX_BODY_SIZE {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn transport_error(&self, verb: &str, url: &Url, source: reqwest::Error) -> ExtenderError {
        if source.is_timeout() {
            return ExtenderError::Timeout {
                verb: verb.to_string(),
                url: url.to_string(),
                timeout: self.config.http_timeout,
            };
        }

        ExtenderError::Transport {
            verb: verb.to_string(),
            url: url.to_string(),
            source,
        }
    }
}
