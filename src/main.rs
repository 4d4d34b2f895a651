use std::process;

use playgist::config::CONFIG;
use playgist::logging::{self, Target};
use playgist::{Playground, Request};

// Fetch a gist the way the playground would and print what the endpoint
// would answer:
//
//   playgist <gist-id>
//
// GITHUB_API_URL, GITHUB_TOKEN and PLAYGIST_MARKDOWN apply as they do for
// the lambda.

#[tokio::main]
async fn main() {
    logging::init(Target::Terminal);

    let gist_id = match std::env::args().nth(1) {
        Some(id) => id,
        None => {
            eprintln!("usage: playgist <gist-id>");
            process::exit(2);
        }
    };

    let playground = match Playground::from_config(&CONFIG) {
        Ok(playground) => playground,
        Err(err) => {
            eprintln!("failed to set up the GitHub client: {}", err);
            process::exit(1);
        }
    };

    let envelope = playground.handle(Request::get(gist_id)).await;
    match serde_json::to_string_pretty(&envelope) {
        Ok(serialized) => println!("{}", serialized),
        Err(err) => {
            eprintln!("failed to serialize: {}", err);
            process::exit(1);
        }
    }

    if envelope.code != 200 {
        process::exit(1);
    }
}
