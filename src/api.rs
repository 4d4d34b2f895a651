//! Request handling shared by the Lambda and command-line front ends.

use std::fmt;

use crate::config::{Config, MarkdownMode};
use crate::directive::{is_code_extension, Directive};
use crate::errors::Result;
use crate::gist::GistSource;
use crate::github;
use crate::markdown::{LocalMarkdown, MarkdownRenderer};
use crate::options::CompilerOptions;
use crate::story::{build_story, StoryContent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Other(verb) => f.write_str(verb),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub gist_id: Option<String>,
}

impl Request {
    pub fn get(gist_id: impl Into<String>) -> Self {
        Request {
            method: Method::Get,
            gist_id: Some(gist_id.into()),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Success {
    Code { code: String, params: CompilerOptions },
    Story { files: Vec<StoryContent> },
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ApiResponse {
    Success(Success),
    Failure { error: bool, display: String },
}

/// Status code plus body, ready for whichever front end answers the request.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Envelope {
    pub code: u16,
    pub body: ApiResponse,
}

impl Envelope {
    fn ok(success: Success) -> Self {
        Envelope {
            code: 200,
            body: ApiResponse::Success(success),
        }
    }

    fn fail(code: u16, display: impl Into<String>) -> Self {
        Envelope {
            code,
            body: ApiResponse::Failure {
                error: true,
                display: display.into(),
            },
        }
    }
}

/// The gist source and markdown renderer a request runs against.
pub struct Playground {
    source: Box<dyn GistSource>,
    renderer: Box<dyn MarkdownRenderer>,
}

impl Playground {
    pub fn new(source: Box<dyn GistSource>, renderer: Box<dyn MarkdownRenderer>) -> Self {
        Playground { source, renderer }
    }

    /// Wires the GitHub client up according to `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = github::Client::new(config)?;
        let renderer: Box<dyn MarkdownRenderer> = match config.markdown {
            MarkdownMode::GitHub => Box::new(client.clone()),
            MarkdownMode::Local => Box::new(LocalMarkdown::new()),
        };
        Ok(Playground::new(Box::new(client), renderer))
    }

    pub async fn handle(&self, request: Request) -> Envelope {
        match request.method {
            Method::Get => self.get(request.gist_id.as_deref()).await,
            Method::Post => Envelope::fail(501, "Creating gists is not supported"),
            Method::Other(verb) => Envelope::fail(405, format!("Unsupported method {}", verb)),
        }
    }

    pub async fn get(&self, gist_id: Option<&str>) -> Envelope {
        let id = match gist_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => return Envelope::fail(401, "Request for gist did not include an ID "),
        };
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Envelope::fail(400, format!("The gist ID '{}' is not valid", id));
        }

        let fetch = match self.source.fetch_gist(id).await {
            Ok(fetch) => fetch,
            Err(err) => {
                error!(gist_id = %id, error = %err, "could not fetch gist");
                return Envelope::fail(502, format!("Could not reach GitHub to fetch gist {}", id));
            }
        };

        if fetch.status != 200 {
            return Envelope::fail(fetch.status, format!("Could not find gist with ID {}", id));
        }

        let files = fetch.files;
        if files.is_empty() {
            return Envelope::fail(404, format!("There are no files in gist: {}", id));
        }

        if files.len() == 1 {
            let (name, file) = match files.iter().next() {
                Some(entry) => entry,
                None => return Envelope::fail(404, format!("There are no files in gist: {}", id)),
            };
            let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
            if !is_code_extension(extension) {
                return Envelope::fail(
                    404,
                    format!("Cannot render {} in the playground as it's not code", name),
                );
            }
            if file.text().is_empty() {
                return Envelope::fail(400, format!("The file '{}' is empty", name));
            }

            let directive = Directive::parse_lenient(extension, file.text());
            return Envelope::ok(Success::Code {
                code: directive.code,
                params: directive.compiler_options,
            });
        }

        match build_story(&files, self.renderer.as_ref()).await {
            Ok(story) => {
                info!(gist_id = %id, blocks = story.len(), "built story");
                Envelope::ok(Success::Story { files: story })
            }
            Err(err) => {
                info!(gist_id = %id, reason = %err, "gist is not a valid story");
                Envelope::fail(400, err.display)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::gist::{files_from, GistFetch};
    use async_trait::async_trait;
    use serde_json::json;

    enum Canned {
        Fetch(GistFetch),
        Unreachable,
    }

    #[async_trait]
    impl GistSource for Canned {
        async fn fetch_gist(&self, _: &str) -> Result<GistFetch> {
            match self {
                Canned::Fetch(fetch) => Ok(fetch.clone()),
                Canned::Unreachable => Err(ErrorKind::Upstream(503).into()),
            }
        }
    }

    struct HtmlVersion;

    #[async_trait]
    impl MarkdownRenderer for HtmlVersion {
        async fn render(&self, markdown: &str) -> Option<String> {
            Some(format!("html version of {}", markdown))
        }
    }

    fn playground(source: Canned) -> Playground {
        Playground::new(Box::new(source), Box::new(HtmlVersion))
    }

    fn with_files(pairs: Vec<(&str, &str)>) -> Playground {
        playground(Canned::Fetch(GistFetch::found(files_from(pairs))))
    }

    fn as_json(envelope: &Envelope) -> serde_json::Value {
        serde_json::to_value(envelope).unwrap()
    }

    #[tokio::test]
    async fn noops_without_an_id() {
        let res = with_files(vec![]).get(None).await;
        assert_eq!(
            as_json(&res),
            json!({ "code": 401, "body": { "error": true, "display": "Request for gist did not include an ID " } })
        );
        assert_eq!(with_files(vec![]).get(Some("  ")).await.code, 401);
    }

    #[tokio::test]
    async fn refuses_ids_that_are_not_gist_ids() {
        for id in &["../user", "abc/def", "1234?per_page=1", "12 34"] {
            let res = playground(Canned::Unreachable).get(Some(id)).await;
            assert_eq!(res, Envelope::fail(400, format!("The gist ID '{}' is not valid", id)));
        }
        let res = playground(Canned::Unreachable).get(Some("aa5a315d61ae9438b18d")).await;
        assert_eq!(res.code, 502);
    }

    #[tokio::test]
    async fn passes_through_missing_gists() {
        let res = playground(Canned::Fetch(GistFetch::status(404))).get(Some("1234")).await;
        assert_eq!(
            as_json(&res),
            json!({ "code": 404, "body": { "error": true, "display": "Could not find gist with ID 1234" } })
        );
    }

    #[tokio::test]
    async fn reports_unreachable_upstream() {
        let res = playground(Canned::Unreachable).get(Some("1234")).await;
        assert_eq!(res, Envelope::fail(502, "Could not reach GitHub to fetch gist 1234"));
    }

    #[tokio::test]
    async fn noops_on_an_empty_gist() {
        let res = with_files(vec![]).get(Some("1234")).await;
        assert_eq!(
            as_json(&res),
            json!({ "code": 404, "body": { "error": true, "display": "There are no files in gist: 1234" } })
        );
    }

    #[tokio::test]
    async fn refuses_a_single_non_code_file() {
        let res = with_files(vec![("file.md", "OK")]).get(Some("1234")).await;
        assert_eq!(
            as_json(&res),
            json!({ "code": 404, "body": { "error": true, "display": "Cannot render file.md in the playground as it's not code" } })
        );

        let res = with_files(vec![("1~Intro.md", "## welcome")]).get(Some("1234")).await;
        assert_eq!(
            res,
            Envelope::fail(404, "Cannot render 1~Intro.md in the playground as it's not code")
        );
    }

    #[tokio::test]
    async fn answers_a_single_code_file() {
        let res = with_files(vec![("file.ts", "const a = 123")]).get(Some("1234")).await;
        assert_eq!(
            as_json(&res),
            json!({ "code": 200, "body": { "type": "code", "code": "const a = 123", "params": "" } })
        );
    }

    #[tokio::test]
    async fn single_files_keep_their_directive_params() {
        let res = with_files(vec![(
            "file.js",
            "//// { compiler: { strictFunctionTypes: false } }\nconst a = 123",
        )])
        .get(Some("1234"))
        .await;
        assert_eq!(
            as_json(&res)["body"],
            json!({ "type": "code", "code": "const a = 123", "params": "strictFunctionTypes=false&filetype=js" })
        );
    }

    #[tokio::test]
    async fn refuses_a_single_empty_file() {
        let res = with_files(vec![("file.ts", "")]).get(Some("1234")).await;
        assert_eq!(res, Envelope::fail(400, "The file 'file.ts' is empty"));
    }

    #[tokio::test]
    async fn answers_a_story() {
        let res = with_files(vec![
            ("0~abc.ts", "// code"),
            ("1~file.md", "/* md */"),
            ("3~abc2.ts", "// code"),
        ])
        .get(Some("1234"))
        .await;
        assert_eq!(
            as_json(&res),
            json!({
                "code": 200,
                "body": {
                    "type": "story",
                    "files": [
                        { "type": "code", "code": "// code", "params": "", "title": "abc.ts" },
                        { "type": "html", "html": "html version of /* md */", "title": "file.md" },
                        { "type": "hr" },
                        { "type": "code", "code": "// code", "params": "", "title": "abc2.ts" }
                    ]
                }
            })
        );
    }

    #[tokio::test]
    async fn story_validation_errors_are_client_errors() {
        let res = with_files(vec![("abc.ts", "x"), ("1~b.ts", "y")]).get(Some("1234")).await;
        assert_eq!(
            res,
            Envelope::fail(400, "The file 'abc.ts' does not start with an index and ~ - e.g. '1~'")
        );
    }

    #[tokio::test]
    async fn routes_by_method() {
        let pg = with_files(vec![("file.ts", "x")]);
        assert_eq!(pg.handle(Request::get("1")).await.code, 200);

        let post = Request {
            method: Method::Post,
            gist_id: None,
        };
        assert_eq!(pg.handle(post).await, Envelope::fail(501, "Creating gists is not supported"));

        let delete = Request {
            method: Method::parse("delete"),
            gist_id: Some("1".to_string()),
        };
        assert_eq!(pg.handle(delete).await, Envelope::fail(405, "Unsupported method DELETE"));
    }

    #[test]
    fn parses_methods() {
        assert_eq!(Method::parse("get"), Method::Get);
        assert_eq!(Method::parse("POST"), Method::Post);
        assert_eq!(Method::parse("put").to_string(), "PUT");
    }
}
