//! Turns GitHub gists into documents for a TypeScript playground: a single
//! code file, or a "story" of code blocks, rendered markdown and separators.

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate tracing;

pub mod api;
pub mod config;
pub mod directive;
pub mod errors;
pub mod gist;
pub mod github;
pub mod literal;
pub mod logging;
pub mod markdown;
pub mod options;
pub mod story;

pub use crate::api::{Envelope, Method, Playground, Request};
pub use crate::directive::{parse_directive, Directive};
pub use crate::story::{build_story, StoryContent, ValidationError};
