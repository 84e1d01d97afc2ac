#[cfg(test)]
mod tests {
    use async_workpool::{
        errors::TaskError,
        model::JoinOrdering,
        pool::WorkerPool,
        result::Store,
        CancellationToken, Config,
    };
    use futures::FutureExt;
    use std::{
        future::Future,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    };

    async fn measure<F, Fut, T>(name: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let start = Instant::now();
        let result = f().await;
        let elapsed = start.elapsed();
        println!("✓ {}: {:?}", name, elapsed);
        result
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_1_small_fast_tasks() {
        println!("\n=== LOAD TEST 1: 10k быстрых задач (100μs каждая) ===");
        let pool = WorkerPool::with_config(Config::io_bound());
        let token = CancellationToken::new();
        let items: Vec<u64> = (0..10_000).collect();

        let report = measure("10k tasks @ 100μs", || async {
            pool.run_with_report(&token, items, |_token, x, store: &mut Store<&'static str, u64>| {
                async move {
                    tokio::time::sleep(Duration::from_micros(100)).await;
                    *store.entry("sum").or_insert(0) += x;
                    Ok::<(), String>(())
                }
                .boxed()
            })
            .await
        })
        .await;

        assert_eq!(report.outcomes.len(), 10_000);
        assert!(report.metrics.all_succeeded());
        println!("  Воркеров: {}", report.metrics.workers);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_2_errors_pass_through() {
        println!("\n=== LOAD TEST 2: 5k задач, каждая десятая с ошибкой ===");
        let pool = WorkerPool::with_config(Config::cpu_bound().with_ordering(JoinOrdering::UnOrdered));
        let token = CancellationToken::new();
        let items: Vec<u32> = (0..5_000).collect();

        let report = measure("5k tasks, 10% errors", || async {
            pool.run_with_report(&token, items, |_token, x, _store: &mut Store<String, u32>| {
                async move {
                    tokio::task::yield_now().await;
                    if x % 10 == 0 {
                        return Err(format!("result_{}", x));
                    }
                    Ok(())
                }
                .boxed()
            })
            .await
        })
        .await;

        let metrics = &report.metrics;
        println!("  Успешно: {}/{}", metrics.succeeded, metrics.tasks);
        println!("  Success rate: {:.1}%", metrics.success_rate() * 100.0);
        assert_eq!(metrics.tasks, 5_000);
        assert_eq!(metrics.failed, 500);
        assert_eq!(metrics.succeeded, 4_500);
        assert_eq!(metrics.not_started, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_3_extreme_batch() {
        println!("\n=== LOAD TEST 3: 50k задач на 16 воркерах ===");
        let pool = WorkerPool::new(16);
        let token = CancellationToken::new();
        let invoked = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..50_000).collect();

        let counter = invoked.clone();
        let start = Instant::now();
        let outcomes = pool
            .run(&token, items, move |_token, x, _store: &mut Store<usize, usize>| {
                counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if x % 1000 == 999 {
                        tokio::task::yield_now().await;
                    }
                    Ok::<(), ()>(())
                }
                .boxed()
            })
            .await;
        let elapsed = start.elapsed();

        println!("  Время: {:?}", elapsed);
        println!("  Пропускная способность: {:.0} задач/сек", 50_000.0 / elapsed.as_secs_f64());
        assert_eq!(outcomes.len(), 50_000);
        assert_eq!(invoked.load(Ordering::Relaxed), 50_000);
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_4_stress_with_panics() {
        println!("\n=== LOAD TEST 4: Стресс-тест с паниками ===");
        let pool = WorkerPool::new(8);
        let token = CancellationToken::new();
        let items: Vec<u32> = (0..1_000).collect();

        let outcomes = measure("1k tasks (10% panic)", || async {
            pool.run(&token, items, |_token, x, _store: &mut Store<String, u32>| {
                async move {
                    if x % 10 == 0 {
                        panic!("Intentional panic at {}", x);
                    }
                    tokio::time::sleep(Duration::from_micros(100)).await;
                    Ok::<(), String>(())
                }
                .boxed()
            })
            .await
        })
        .await;

        let successful = outcomes.iter().filter(|r| r.is_ok()).count();
        let panicked = outcomes.iter().filter(|r| matches!(r, Err(TaskError::Panic(_)))).count();
        println!("  Успешно: {}", successful);
        println!("  Паник перехвачено: {}", panicked);

        assert_eq!(outcomes.len(), 1_000);
        assert_eq!(successful, 900);
        assert_eq!(panicked, 100);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_5_parallel_runs() {
        println!("\n=== LOAD TEST 5: Параллельные запуски ===");
        let pool = WorkerPool::new(4);
        let token = CancellationToken::new();

        let run = |offset: u64| {
            let pool = pool.clone();
            let token = token.clone();
            async move {
                pool.run(&token, (offset..offset + 1_000).collect(), |_token, x, store: &mut Store<&'static str, u64>| {
                    async move {
                        *store.entry("seen").or_insert(0) += 1;
                        if x % 2 == 1 {
                            return Err(x);
                        }
                        Ok(())
                    }
                    .boxed()
                })
                .await
            }
        };

        let (a, b, c) = tokio::join!(run(0), run(1_000), run(2_000));
        for outcomes in [&a, &b, &c] {
            assert_eq!(outcomes.len(), 1_000);
            assert_eq!(outcomes.iter().filter(|o| o.is_err()).count(), 500);
        }
        println!("  ✓ Три запуска не мешают друг другу");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn load_test_6_cancel_large_batch() {
        println!("\n=== LOAD TEST 6: Отмена большого пакета ===");
        let pool = WorkerPool::new(8);
        let token = CancellationToken::new();
        let invoked = Arc::new(AtomicUsize::new(0));

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            canceller.cancel();
        });

        let counter = invoked.clone();
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            pool.run_with_report(&token, vec![(); 20_000], move |token, _task, _store: &mut Store<String, u32>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::select! {
                        _ = token.cancelled() => Err("cancelled"),
                        _ = tokio::time::sleep(Duration::from_millis(1)) => Ok(()),
                    }
                }
                .boxed()
            }),
        )
        .await
        .expect("пул завис после отмены");

        let metrics = &report.metrics;
        println!("  Вызовов: {}, не запущено: {}", invoked.load(Ordering::SeqCst), metrics.not_started);
        assert_eq!(report.outcomes.len(), 20_000);
        assert!(invoked.load(Ordering::SeqCst) < 20_000);
        assert_eq!(metrics.executed(), invoked.load(Ordering::SeqCst));
        assert!(metrics.not_started > 0);
    }
}
