use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Log to the browser console. Safe to call more than once.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use once_cell::sync::OnceCell;
        use std::ffi::OsStr;
        use std::io;
        use std::path::Path;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        /// Log file used when `RUST_LOG_FILE` is unset
        const DEFAULT_LOG_FILE: &str = "logs/app.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Log to stderr and a daily rolling file. Safe to call more than once.
        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let log_path = std::env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let log_path = Path::new(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
                log_path.parent().unwrap_or(Path::new(".")),
                log_path.file_name().unwrap_or(OsStr::new("app.log")),
            ));

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok();
            if !installed {
                return;
            }
            let _ = FILE_GUARD.set(guard);

            // Route panics through tracing with a backtrace
            std::panic::set_hook(Box::new(|info| {
                let location = info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                    .unwrap_or_else(|| "<unknown>".to_string());
                let payload = info.payload();
                let msg = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic>");
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("panic at {location}: {msg}\nBacktrace:\n{bt:?}");
            }));
        }
    }
}
