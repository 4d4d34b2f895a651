#[macro_use]
extern crate serde_derive;

use std::collections::HashMap;
use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{info_span, Instrument};

use playgist::api::{Method, Request};
use playgist::config::CONFIG;
use playgist::logging::{self, Target};
use playgist::Playground;

/// The parts of an API Gateway proxy event the playground reads.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Input {
    #[serde(default)]
    http_method: Option<String>,
    #[serde(default)]
    query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct Body {
    #[serde(rename = "gistID")]
    gist_id: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Output {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl Input {
    fn to_request(&self) -> Request {
        let from_query = self
            .query_string_parameters
            .as_ref()
            .and_then(|query| query.get("gistID").cloned());
        let from_body = || {
            let body = self.body.as_ref()?;
            serde_json::from_str::<Body>(body).ok()?.gist_id
        };

        Request {
            method: Method::parse(self.http_method.as_deref().unwrap_or("GET")),
            gist_id: from_query.or_else(from_body),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init(Target::Lambda);

    let playground =
        Arc::new(Playground::from_config(&CONFIG).map_err(|err| Error::from(err.to_string()))?);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Input>| {
        let playground = Arc::clone(&playground);
        async move { handler(&playground, event.payload).await }
    }))
    .await
}

async fn handler(playground: &Playground, input: Input) -> Result<Output, Error> {
    let request = input.to_request();
    let span = info_span!("request", method = %request.method, gist_id = ?request.gist_id);
    let envelope = playground.handle(request).instrument(span).await;

    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    headers.insert("access-control-allow-origin".to_string(), "*".to_string());

    Ok(Output {
        status_code: envelope.code,
        headers,
        body: serde_json::to_string(&envelope.body)?,
    })
}
