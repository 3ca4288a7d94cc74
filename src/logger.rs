use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::Layer,
    prelude::*,
};

/// Install a stderr subscriber filtered by RCALC_LOG (default: warn).
/// `log` records from the library are forwarded through `LogTracer`.
pub(crate) fn init() {
    let (filter, invalid) = match EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("RCALC_LOG")
        .from_env()
    {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("warn"), Some(e)),
    };

    let subscriber = tracing_subscriber::registry().with(
        Layer::new()
            .without_time()
            .with_target(false)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .with_filter(filter),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return;
    }
    if tracing_log::LogTracer::init().is_err() {
        return;
    }

    if let Some(e) = invalid {
        log::warn!("invalid RCALC_LOG value ({}), using warn", e);
    }
}
