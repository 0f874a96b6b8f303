// THEORY:
// Rendering a batch of posters (a seed sweep, a contact sheet) is embarrassingly
// parallel: every poster is an independent render pass with its own seed and no
// session. The parallel pipeline spreads those passes across a pool of tokio
// workers. A dispatcher hands tasks round-robin to the workers; each worker runs
// the CPU-bound render + encode on the blocking pool and answers through a
// oneshot channel. Results come back in the order they were requested.
//
// The pool spawns its tasks on the current tokio runtime, so it must be created
// from within one.

use crate::error::{PosterError, Result};
use crate::pipeline::{OutputFormat, PosterConfig, PosterParams, PosterPipeline};
use futures::future::join_all;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// One encoded poster.
#[derive(Debug, Clone)]
pub struct RenderedPoster {
    pub params: PosterParams,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

pub struct RenderTask {
    pub params: PosterParams,
    pub format: OutputFormat,
    pub result_sender: oneshot::Sender<Result<RenderedPoster>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<RenderTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<PosterPipeline>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<RenderTask>();
        let mut workers = Vec::with_capacity(worker_count);

        // Create a single dispatcher that distributes tasks to workers
        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<RenderTask>())
            .unzip();

        tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        for (id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let worker_pipeline = Arc::clone(&pipeline);

            let worker = tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    debug!("worker {id} rendering seed {:?}", task.params.seed);
                    let result = Self::render_task(Arc::clone(&worker_pipeline), task.params, task.format).await;
                    let _ = task.result_sender.send(result);
                }
            });

            workers.push(worker);
        }

        Self { task_sender, workers }
    }

    async fn render_task(
        pipeline: Arc<PosterPipeline>,
        params: PosterParams,
        format: OutputFormat,
    ) -> Result<RenderedPoster> {
        tokio::task::spawn_blocking(move || -> Result<RenderedPoster> {
            let bytes = pipeline.render_bytes(&params, None, format)?;
            Ok(RenderedPoster { params, format, bytes })
        })
        .await
        .map_err(|_| PosterError::WorkerPool("render task panicked"))?
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub async fn submit(&self, params: PosterParams, format: OutputFormat) -> Result<RenderedPoster> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = RenderTask {
            params,
            format,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| PosterError::WorkerPool("failed to send task to worker pool"))?;

        result_receiver
            .await
            .map_err(|_| PosterError::WorkerPool("failed to receive result from worker"))?
    }
}

pub struct ParallelPosterRenderer {
    worker_pool: WorkerPool,
}

impl ParallelPosterRenderer {
    /// One worker per logical CPU.
    pub fn new(config: PosterConfig) -> Self {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: PosterConfig, worker_count: usize) -> Self {
        let worker_pool = WorkerPool::new(Arc::new(PosterPipeline::new(config)), worker_count);
        info!("poster worker pool started with {} workers", worker_pool.worker_count());
        Self { worker_pool }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_pool.worker_count()
    }

    pub async fn render(&self, params: PosterParams, format: OutputFormat) -> Result<RenderedPoster> {
        self.worker_pool.submit(params, format).await
    }

    /// Renders every entry concurrently. The output is in input order.
    pub async fn render_batch(
        &self,
        batch: Vec<PosterParams>,
        format: OutputFormat,
    ) -> Vec<Result<RenderedPoster>> {
        join_all(batch.into_iter().map(|params| self.render(params, format))).await
    }
}
