use async_workpool::{CancellationToken, Config, Store, WorkerPool};
use futures::FutureExt;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let pool = WorkerPool::with_config(Config::cpu_bound());
        let token = CancellationToken::new();
        let tasks: Vec<u64> = (0..1_000_000).collect();

        let report = pool.run_with_report(&token, tasks, |_token, task, store: &mut Store<&'static str, u64>| {
            async move {
                *store.entry("handled").or_insert(0) += 1;
                if task % 1_000 == 0 {
                    return Err(format!("task {task} rejected"));
                }
                Ok(())
            }
            .boxed()
        }).await;

        let metrics = &report.metrics;
        info!(
            tasks = metrics.tasks,
            workers = metrics.workers,
            succeeded = metrics.succeeded,
            failed = metrics.failed,
            elapsed = ?metrics.elapsed,
            "demo run finished"
        );
    });

    Ok(())
}
