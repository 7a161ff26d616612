use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

// Scan parallelism for the container: WORKER_COUNT, else detected CPUs, kept within 1..=6
pub fn get_worker_count() -> usize {
    worker_count_from(env::var("WORKER_COUNT").ok().as_deref())
}

fn worker_count_from(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or_else(num_cpus::get)
        .clamp(1, 6)
}

// Sizes the global pool backing ExecMode::Parallel. The built-in four-row table
// never reaches PARALLEL_THRESHOLD, so the pool only does work for larger tables.
pub fn init_thread_pool(workers: usize) {
    INIT.call_once(|| {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
        {
            tracing::warn!(error = %e, "rayon global pool already configured");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_count_is_clamped() {
        assert_eq!(worker_count_from(Some("0")), 1);
        assert_eq!(worker_count_from(Some("4")), 4);
        assert_eq!(worker_count_from(Some("64")), 6);
    }

    #[test]
    fn garbage_falls_back_to_detected_cpus() {
        let detected = num_cpus::get().clamp(1, 6);
        assert_eq!(worker_count_from(Some("many")), detected);
        assert_eq!(worker_count_from(None), detected);
    }
}
