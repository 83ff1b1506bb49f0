use tracing_subscriber::EnvFilter;

/// stderr へのログ出力を初期化する
///
/// `RUST_LOG` があればそれに従い、無ければ `warn`（`--verbose` 時は `debug`）。
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,paw_scan=debug,paw_scan_common=debug"
    } else {
        "warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 二重初期化（テストなど）は無視する
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    tracing::debug!("logging initialized");
}
