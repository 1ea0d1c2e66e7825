use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

/// Background pool for work that must not stall the menu loop, such as
/// fetching the server-hosted default save.
pub struct JobSystem {
    pool: ThreadPool,
}

impl JobSystem {
    pub fn new(num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("wwwcraft-job-{index}"));
        if let Some(count) = num_threads {
            builder = builder.num_threads(count);
        }

        let pool = builder.build()?;
        debug!("Job system started with {} worker(s)", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// A single worker is enough for the occasional I/O job the client issues.
    pub fn io() -> Result<Self, ThreadPoolBuildError> {
        Self::new(Some(1))
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}
