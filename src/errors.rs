error_chain! {
    foreign_links {
        Http(::reqwest::Error);
        Json(::serde_json::Error);
        Url(::url::ParseError);
    }

    errors {
        MalformedDirective(offset: usize, reason: String) {
            description("malformed directive")
            display("malformed directive at byte {}: {}", offset, reason)
        }

        InvalidApiUrl(url: String) {
            description("invalid API url")
            display("'{}' cannot be used as an API root", url)
        }

        Upstream(status: u16) {
            description("unexpected upstream response")
            display("upstream answered with status {}", status)
        }
    }
}
