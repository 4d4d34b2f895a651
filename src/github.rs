use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use url::Url;

use crate::config::Config;
use crate::errors::{ErrorKind, Result};
use crate::gist::{GistFetch, GistFiles, GistSource};
use crate::markdown::MarkdownRenderer;

#[derive(Deserialize)]
struct GistBody {
    #[serde(default)]
    files: GistFiles,
}

#[derive(Serialize)]
struct MarkdownBody<'a> {
    text: &'a str,
    mode: &'static str,
}

/// Talks to the GitHub REST API for gists and markdown.
#[derive(Clone)]
pub struct Client {
    pub client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
    user_agent: String,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(ErrorKind::InvalidApiUrl(config.api_url.clone()).into());
        }
        Ok(Client {
            client,
            api_url,
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Appends path segments to the API root. Each segment is escaped, so a
    /// segment can never climb out of its place in the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// GitHub cuts large files short in the gist payload; the whole text
    /// lives behind `raw_url`.
    async fn fetch_raw(&self, raw_url: &str) -> Result<String> {
        let response = self
            .client
            .get(raw_url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        if response.status().as_u16() > 399 {
            return Err(ErrorKind::Upstream(response.status().as_u16()).into());
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl GistSource for Client {
    async fn fetch_gist(&self, id: &str) -> Result<GistFetch> {
        let url = self.endpoint(&["gists", id]);
        let response = self.request(self.client.get(url)).send().await?;

        if response.status() != StatusCode::OK {
            debug!(status = response.status().as_u16(), "gist lookup did not succeed");
            return Ok(GistFetch::status(response.status().as_u16()));
        }

        let body: GistBody = serde_json::from_slice(&response.bytes().await?)?;
        let mut files = body.files;
        for (name, file) in files.iter_mut() {
            if file.truncated {
                if let Some(raw_url) = file.raw_url.as_ref() {
                    debug!(file = %name, "fetching truncated gist file");
                    file.content = Some(self.fetch_raw(raw_url).await?);
                    file.truncated = false;
                }
            }
        }

        Ok(GistFetch::found(files))
    }
}

#[async_trait]
impl MarkdownRenderer for Client {
    async fn render(&self, markdown: &str) -> Option<String> {
        let url = self.endpoint(&["markdown"]);
        let body = MarkdownBody {
            text: markdown,
            mode: "gfm",
        };
        let response = match self.request(self.client.post(url)).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "markdown API request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "markdown API refused to render");
            return None;
        }
        match response.text().await {
            Ok(html) => Some(html),
            Err(err) => {
                warn!(error = %err, "markdown API response could not be read");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        Client::new(&Config::with_api_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn fetches_gist_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/1234"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1234",
                "files": {
                    "file.ts": { "filename": "file.ts", "content": "const a = 123", "truncated": false }
                }
            })))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_gist("1234").await.unwrap();
        assert_eq!(fetch.status, 200);
        assert_eq!(fetch.files["file.ts"].text(), "const a = 123");
    }

    #[tokio::test]
    async fn passes_upstream_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_gist("missing").await.unwrap();
        assert_eq!(fetch, GistFetch::status(404));
    }

    #[tokio::test]
    async fn completes_truncated_files() {
        let server = MockServer::start().await;
        let raw_url = format!("{}/raw/big.ts", server.uri());
        Mock::given(method("GET"))
            .and(path("/gists/big"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": {
                    "big.ts": { "filename": "big.ts", "content": "const a", "truncated": true, "raw_url": raw_url }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/big.ts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("const a = 123456789"))
            .mount(&server)
            .await;

        let fetch = client_for(&server).fetch_gist("big").await.unwrap();
        assert_eq!(fetch.files["big.ts"].text(), "const a = 123456789");
        assert!(!fetch.files["big.ts"].truncated);
    }

    #[tokio::test]
    async fn sends_the_token_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/1"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Config::with_api_url(server.uri());
        config.token = Some("sekrit".to_string());
        let fetch = Client::new(&config).unwrap().fetch_gist("1").await.unwrap();
        assert_eq!(fetch, GistFetch::found(GistFiles::new()));
    }

    #[tokio::test]
    async fn gist_ids_stay_inside_the_gists_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "me" })))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = Config::with_api_url(server.uri());
        config.token = Some("sekrit".to_string());
        let fetch = Client::new(&config).unwrap().fetch_gist("../user").await.unwrap();
        assert_eq!(fetch, GistFetch::status(404));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/gists/..%2Fuser");
    }

    #[tokio::test]
    async fn api_roots_with_a_path_are_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/gists/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::with_api_url(format!("{}/api/v3/", server.uri()));
        let fetch = Client::new(&config).unwrap().fetch_gist("42").await.unwrap();
        assert_eq!(fetch.status, 200);
    }

    #[test]
    fn rejects_api_roots_that_cannot_hold_a_path() {
        assert!(Client::new(&Config::with_api_url("mailto:someone@example.com")).is_err());
        assert!(Client::new(&Config::with_api_url("not a url")).is_err());
    }

    #[tokio::test]
    async fn renders_markdown_through_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/markdown"))
            .and(body_json(json!({ "text": "## hi", "mode": "gfm" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h2>hi</h2>"))
            .mount(&server)
            .await;

        let html = client_for(&server).render("## hi").await;
        assert_eq!(html.as_deref(), Some("<h2>hi</h2>"));
    }

    #[tokio::test]
    async fn markdown_failures_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/markdown"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).render("## hi").await, None);
    }
}
