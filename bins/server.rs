use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

const WORKER_THREADS_ENV: &str = "SERVER_WORKER_THREADS";

/// 线程数：config.toml 中的 server.worker_threads，其次 SERVER_WORKER_THREADS
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => parse_worker_threads(std::env::var(WORKER_THREADS_ENV).ok().as_deref()),
    }
}

// 0 或无法解析时交给 tokio 默认值
fn parse_worker_threads(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok()).filter(|n| *n > 0)
}

fn install_panic_hook(instance_id: Uuid) {
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "org_portal",
            event = "panic",
            %instance_id,
            pid = std::process::id(),
            message = %info,
            "unhandled panic occurred"
        );
    }));
}

fn main() -> ExitCode {
    // .env 需在日志初始化前加载，RUST_LOG / LOG_FORMAT 才会生效
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let instance_id = Uuid::new_v4();
    install_panic_hook(instance_id);

    let threads = worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "org_portal", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "org_portal",
        event = "start",
        %instance_id,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = threads.unwrap_or_default(),
        "org portal server starting"
    );

    // Ctrl+C 由 server::run 内部的 with_graceful_shutdown 处理
    let res = rt.block_on(async move { tokio::spawn(server::run()).await });
    match res {
        Ok(Ok(())) => {
            info!(service = "org_portal", event = "stop", %instance_id, "server stopped normally");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(service = "org_portal", event = "run_failed", error = %e, "server::run returned error");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(service = "org_portal", event = "task_join_error", error = %e, "server task join error");
            ExitCode::FAILURE
        }
    }
}
