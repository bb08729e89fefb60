//! Concurrent face harvesting with a join barrier.
//!
//! Given a batch of picker results, the coordinator decodes every pick,
//! runs face extraction on every bitmap that decoded, turns each extracted
//! face into a finished [`FaceImage`], and fires a single completion once
//! all of that work has settled.
//!
//! ## Work accounting
//!
//! ```text
//! seed ─┬─ fork → decode(pick 0) ─ ok ─ fork → extract(0) ─ release
//!       │                          └─ release (after the fork above)
//!       ├─ fork → decode(pick 1) ─ none ─ release
//!       └─ …
//! seed released after dispatch  ──►  count hits 0  ──►  completion (once)
//! ```
//!
//! Every unit of pending work is a [`PendingUnit`]. Units can only be made
//! by forking a live unit, and they release on drop. A decode step forks
//! its extraction unit before its own unit goes away, so the count cannot
//! touch zero between the two steps, even when the [`Spawner`] runs jobs
//! inline on the same thread. Failure paths just return; drop does the
//! release.
//!
//! ## Accumulation
//!
//! Finished faces from all images land in one `Mutex<Vec<FaceImage>>`. An
//! extraction appends all of its faces under a single lock. The final order
//! is completion order, not pick order.

use crate::imaging::{
    ExtractionOutcome, FaceExtractor, ImageSource, SourceImage, ThumbnailSpec, process_face,
};
use crate::types::FaceImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("harvest ended without delivering its results")]
    Disconnected,
}

/// A unit of work handed to a [`Spawner`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Execution context for decode and extraction jobs.
pub trait Spawner: Send + Sync {
    fn spawn(&self, job: Job);
}

/// Runs jobs on the global rayon pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonSpawner;

impl Spawner for RayonSpawner {
    fn spawn(&self, job: Job) {
        rayon::spawn(job);
    }
}

/// Runs each job immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) {
        job();
    }
}

// ============================================================================
// Join barrier
// ============================================================================

type Completion = Box<dyn FnOnce() + Send + 'static>;

struct BarrierState {
    pending: AtomicUsize,
    on_zero: Mutex<Option<Completion>>,
}

/// One outstanding unit of work in a join barrier.
///
/// Dropping the last unit runs the barrier's completion exactly once.
pub struct PendingUnit {
    state: Arc<BarrierState>,
}

impl PendingUnit {
    /// Start a barrier holding a single seed unit.
    pub fn seed(on_zero: impl FnOnce() + Send + 'static) -> Self {
        Self {
            state: Arc::new(BarrierState {
                pending: AtomicUsize::new(1),
                on_zero: Mutex::new(Some(Box::new(on_zero))),
            }),
        }
    }

    /// Register another unit of work on the same barrier.
    pub fn fork(&self) -> Self {
        self.state.pending.fetch_add(1, Ordering::AcqRel);
        Self {
            state: Arc::clone(&self.state),
        }
    }

    /// Units currently outstanding on this barrier.
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }
}

impl Drop for PendingUnit {
    fn drop(&mut self) {
        if self.state.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            let completion = self
                .state
                .on_zero
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(completion) = completion {
                completion();
            }
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    /// The pick yielded no bitmap.
    DecodeFailed { index: usize },
    /// Extraction succeeded; `count` faces (at least one) were added to the batch.
    FacesFound { index: usize, count: usize },
    /// The bitmap decoded but contributed no faces, either because none were
    /// detected or because every detected face was dropped.
    NoFaces { index: usize },
    ExtractionFailed { index: usize, reason: String },
    /// A single extracted face could not be turned into a sticker.
    FaceDropped { index: usize, reason: String },
    /// Sent once, after every other event of the batch.
    Completed { total: usize },
}

/// Fan-out/join coordinator for one or more batches.
pub struct FaceHarvester<S, E> {
    source: Arc<S>,
    extractor: Arc<E>,
    spec: ThumbnailSpec,
    spawner: Arc<dyn Spawner>,
    events: Option<Sender<HarvestEvent>>,
}

impl<S, E> FaceHarvester<S, E>
where
    S: ImageSource + 'static,
    E: FaceExtractor + 'static,
{
    /// Coordinator running on the rayon pool.
    pub fn new(source: Arc<S>, extractor: Arc<E>, spec: ThumbnailSpec) -> Self {
        Self {
            source,
            extractor,
            spec,
            spawner: Arc::new(RayonSpawner),
            events: None,
        }
    }

    pub fn with_spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Arc::new(spawner);
        self
    }

    /// Report progress events on `events`.
    pub fn with_events(mut self, events: Sender<HarvestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Dispatch a batch and return immediately.
    ///
    /// `on_complete` runs exactly once, on whichever thread settles the last
    /// piece of work (the calling thread for an empty batch). Forward the
    /// result over a channel to deliver it to a specific thread.
    pub fn start<F>(&self, picks: Vec<S::Pick>, on_complete: F)
    where
        F: FnOnce(Vec<FaceImage>) + Send + 'static,
    {
        let batch = Arc::new(Batch {
            source: Arc::clone(&self.source),
            extractor: Arc::clone(&self.extractor),
            spec: self.spec,
            spawner: Arc::clone(&self.spawner),
            events: self.events.clone(),
            collected: Mutex::new(Vec::new()),
        });

        let seed = {
            let batch = Arc::clone(&batch);
            PendingUnit::seed(move || {
                let faces = std::mem::take(
                    &mut *batch
                        .collected
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner),
                );
                info!(total = faces.len(), "harvest complete");
                batch.emit(HarvestEvent::Completed { total: faces.len() });
                on_complete(faces);
            })
        };

        debug!(picks = picks.len(), "harvest started");
        for (index, pick) in picks.into_iter().enumerate() {
            let unit = seed.fork();
            let batch = Arc::clone(&batch);
            self.spawner
                .spawn(Box::new(move || batch.decode(index, pick, unit)));
        }
        drop(seed);
    }

    /// Run a batch and block the calling thread until it completes.
    ///
    /// Must not be called from a worker of the pool the spawner feeds, or a
    /// saturated pool can deadlock waiting on itself.
    pub fn run(&self, picks: Vec<S::Pick>) -> Result<Vec<FaceImage>, HarvestError> {
        let (tx, rx) = mpsc::channel();
        self.start(picks, move |faces| {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(faces);
        });
        rx.recv().map_err(|_| HarvestError::Disconnected)
    }
}

/// State shared by every job of one batch.
struct Batch<S, E> {
    source: Arc<S>,
    extractor: Arc<E>,
    spec: ThumbnailSpec,
    spawner: Arc<dyn Spawner>,
    events: Option<Sender<HarvestEvent>>,
    collected: Mutex<Vec<FaceImage>>,
}

impl<S, E> Batch<S, E>
where
    S: ImageSource + 'static,
    E: FaceExtractor + 'static,
{
    fn emit(&self, event: HarvestEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn decode(self: Arc<Self>, index: usize, pick: S::Pick, unit: PendingUnit) {
        let Some(source) = self.source.decode(&pick) else {
            debug!(index, "pick yielded no bitmap");
            self.emit(HarvestEvent::DecodeFailed { index });
            return;
        };

        let extraction = unit.fork();
        let batch = Arc::clone(&self);
        self.spawner
            .spawn(Box::new(move || batch.extract(index, source, extraction)));
        drop(unit);
    }

    fn extract(&self, index: usize, source: SourceImage, _unit: PendingUnit) {
        match self.extractor.extract(&source, index) {
            ExtractionOutcome::Found(faces) => {
                let mut finished = Vec::with_capacity(faces.len());
                for face in &faces {
                    match process_face(face, &self.spec).and_then(FaceImage::from_processed) {
                        Ok(face_image) => finished.push(face_image),
                        Err(e) => {
                            warn!(index, source = %source.label, error = %e, "dropping face");
                            self.emit(HarvestEvent::FaceDropped {
                                index,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                let count = finished.len();
                debug!(index, source = %source.label, count, "faces extracted");
                self.collected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(finished);
                if count == 0 {
                    self.emit(HarvestEvent::NoFaces { index });
                } else {
                    self.emit(HarvestEvent::FacesFound { index, count });
                }
            }
            ExtractionOutcome::NotFound => {
                debug!(index, source = %source.label, "no faces found");
                self.emit(HarvestEvent::NoFaces { index });
            }
            ExtractionOutcome::Failed(reason) => {
                warn!(index, source = %source.label, %reason, "face extraction failed");
                self.emit(HarvestEvent::ExtractionFailed { index, reason });
            }
        }
    }
}
