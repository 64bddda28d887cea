use console::Term;
use tracing_subscriber::EnvFilter;

/// Install the stderr diagnostics subscriber.
///
/// Progress lines are plain `println!` output; this only carries warnings,
/// aborted page walks and retry/debug chatter. `RUST_LOG` overrides the
/// default `alertlink=info` filter.
pub fn init() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("alertlink=info"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(Term::stderr().is_term())
        .with_writer(std::io::stderr)
        .try_init();
}
