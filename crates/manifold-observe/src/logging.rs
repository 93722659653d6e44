use tracing_subscriber::EnvFilter;

/// Initializes a `tracing_subscriber` using `MANIFOLD_LOG` first, then
/// `RUST_LOG`, then a default of `info`.
///
/// For binaries only. The library crates emit events but never install a
/// subscriber themselves: the embedding execution framework owns logging.
pub fn init_tracing() {
    let filter = env_filter();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("MANIFOLD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
