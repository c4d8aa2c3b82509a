use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::Token;
use crate::error::{GlciError, Result};
use crate::providers::gitlab::types::{Page, PageInfo};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
pub(super) const NO_QUERY: &[(&str, &str)] = &[];

/// Thin REST v4 transport: builds project URLs, attaches the token, turns
/// non-2xx responses into [`GlciError::Api`]. Nothing is retried.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("glci/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GlciError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut base = Url::parse(base_url)
            .map_err(|e| GlciError::Config(format!("Invalid base URL: {e}")))?;
        // Keep any sub-path the instance is served under
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let api_url = base
            .join("api/v4/")
            .map_err(|e| GlciError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request.header(TOKEN_HEADER, token.as_str())
        } else {
            request
        }
    }

    /// Builds `projects/:id/<segments...>`.
    ///
    /// The project may be a numeric id or a `group/project` path; it is
    /// encoded as a single segment.
    pub fn project_url(&self, project: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GlciError::Config(format!("Invalid project URL for {project}")))?
            .pop_if_empty()
            .push("projects")
            .push(project)
            .extend(segments);
        Ok(url)
    }

    pub(super) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.auth_request(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GlciError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    pub(super) async fn get_json<T, Q>(&self, url: Url, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("GET {url}");
        let response = self.send(self.client.get(url).query(query)).await?;
        Ok(response.json().await?)
    }

    /// Fetches one page of a list endpoint. `page` is what was asked for and
    /// stands in when the server omits `X-Page`.
    pub(super) async fn get_page<T, Q>(&self, url: Url, query: &Q, page: u32) -> Result<Page<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("GET {url} (page {page})");
        let response = self.send(self.client.get(url).query(query)).await?;
        let info = parse_page_info(response.headers(), page);
        let items = response.json().await?;
        Ok(Page { items, info })
    }

    pub(super) async fn post_json<T, B>(&self, url: Url, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("POST {url}");
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    pub(super) async fn delete(&self, url: Url) -> Result<()> {
        debug!("DELETE {url}");
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    pub(super) async fn get_raw(&self, url: Url) -> Result<Response> {
        debug!("GET {url}");
        self.send(self.client.get(url)).await
    }
}

fn parse_page_info(headers: &HeaderMap, requested_page: u32) -> PageInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
    };

    PageInfo {
        current_page: header("x-page").unwrap_or(requested_page),
        total_pages: header("x-total-pages"),
        next_page: header("x-next-page"),
    }
}
