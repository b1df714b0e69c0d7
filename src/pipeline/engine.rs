//! Initialization barrier and worker pool ownership.

use crate::pipeline::{Pipeline, PipelineConfig};
use crate::util::SieveResult;
#[cfg(feature = "rayon")]
use crate::util::SieveError;

/// Engine construction settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker count for the parallel pool; `None` uses rayon's default.
    pub threads: Option<usize>,
}

/// Initialized compute engine.
///
/// Holding an `Engine` is proof that initialization finished: pipelines can
/// only be created from one, and there is no process-wide readiness flag.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
    #[cfg(feature = "rayon")]
    serial: rayon::ThreadPool,
}

impl Engine {
    /// Builds the worker pools. Call once and share the engine across runs.
    pub fn initialize(config: EngineConfig) -> SieveResult<Self> {
        #[cfg(feature = "rayon")]
        {
            if config.threads == Some(0) {
                return Err(SieveError::InvalidParameter {
                    name: "threads",
                    reason: "must be at least 1",
                });
            }
            let mut builder =
                rayon::ThreadPoolBuilder::new().thread_name(|i| format!("glyphsieve-{i}"));
            if let Some(threads) = config.threads {
                builder = builder.num_threads(threads);
            }
            let pool = builder.build().map_err(|_| pool_error())?;
            let serial = rayon::ThreadPoolBuilder::new()
                .num_threads(1)
                .thread_name(|_| "glyphsieve-serial".to_string())
                .build()
                .map_err(|_| pool_error())?;
            Ok(Self {
                config,
                pool,
                serial,
            })
        }

        #[cfg(not(feature = "rayon"))]
        Ok(Self { config })
    }

    /// Returns the configuration the engine was built with.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Number of workers available to a parallel run.
    pub fn threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        {
            self.pool.current_num_threads()
        }
        #[cfg(not(feature = "rayon"))]
        {
            1
        }
    }

    /// Creates an idle pipeline bound to this engine.
    pub fn pipeline(&self, config: PipelineConfig) -> Pipeline<'_> {
        Pipeline::new(self, config)
    }

    /// Runs `f` on the parallel pool, or on a single worker when `parallel` is false.
    pub(crate) fn install<R, F>(&self, parallel: bool, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "rayon")]
        {
            if parallel {
                self.pool.install(f)
            } else {
                self.serial.install(f)
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            let _ = parallel;
            f()
        }
    }
}

#[cfg(feature = "rayon")]
fn pool_error() -> SieveError {
    SieveError::InvalidParameter {
        name: "threads",
        reason: "worker pool could not be built",
    }
}
