use tracing_subscriber::EnvFilter;

/// Where log lines end up, which decides how they are decorated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Terminal,
    /// CloudWatch stamps every line itself and shows escape codes verbatim.
    Lambda,
}

/// Installs the global subscriber, honouring `RUST_LOG` and defaulting to
/// `info`. A second call is a no-op.
pub fn init(target: Target) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match target {
        Target::Terminal => builder.try_init(),
        Target::Lambda => builder.with_ansi(false).without_time().with_target(false).try_init(),
    };
}
