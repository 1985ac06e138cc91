use std::sync::{Mutex, MutexGuard};

use crate::config::LayoutConfig;
use crate::ir::WordList;
use crate::layout::{
    LayoutError, PreparedRandoms, RandomSource, TextRasterizer, Viewport, WordCloudLayout,
    compute_layout_with_random,
};

/// Everything one layout pass needs.
#[derive(Debug, Clone)]
pub struct CloudInput {
    pub words: WordList,
    pub viewport: Viewport,
    pub config: LayoutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// This call ran `passes` layout passes, the last one on the newest input.
    Rendered { passes: usize },
    /// A pass was already running; the input replaces any earlier queued
    /// input and is laid out once that pass's callback returns.
    Queued,
}

#[derive(Debug, Default)]
struct Schedule {
    updating: bool,
    incoming: Option<CloudInput>,
}

fn lock(schedule: &Mutex<Schedule>) -> MutexGuard<'_, Schedule> {
    schedule
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the in-flight flag if a pass unwinds out of `update`.
struct InFlight<'a> {
    schedule: &'a Mutex<Schedule>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.schedule).updating = false;
        }
    }
}

/// A word cloud instance that runs at most one layout pass at a time and
/// coalesces input arriving during a pass (last write wins).
pub struct WordCloud<R> {
    rasterizer: Mutex<R>,
    random: Box<dyn RandomSource>,
    schedule: Mutex<Schedule>,
}

impl<R: TextRasterizer> WordCloud<R> {
    pub fn new(rasterizer: R) -> Self {
        Self::with_random(rasterizer, PreparedRandoms)
    }

    pub fn with_random(rasterizer: R, random: impl RandomSource + 'static) -> Self {
        Self {
            rasterizer: Mutex::new(rasterizer),
            random: Box::new(random),
            schedule: Mutex::new(Schedule::default()),
        }
    }

    /// Whether a pass is currently running.
    pub fn is_updating(&self) -> bool {
        self.lock_schedule().updating
    }

    /// Submits new input. When no pass is running, lays it out and calls
    /// `on_rendered` with the result, repeating while the callback (or
    /// another thread) queues newer input.
    pub fn update(
        &self,
        input: CloudInput,
        mut on_rendered: impl FnMut(&WordCloudLayout),
    ) -> Result<UpdateStatus, LayoutError> {
        {
            let mut schedule = self.lock_schedule();
            schedule.incoming = Some(input);
            if schedule.updating {
                tracing::debug!("layout pass in flight, input queued");
                return Ok(UpdateStatus::Queued);
            }
            schedule.updating = true;
        }
        let mut in_flight = InFlight {
            schedule: &self.schedule,
            armed: true,
        };

        let mut passes = 0;
        loop {
            let input = {
                let mut schedule = self.lock_schedule();
                match schedule.incoming.take() {
                    Some(input) => input,
                    None => {
                        schedule.updating = false;
                        in_flight.armed = false;
                        break;
                    }
                }
            };

            let result = {
                let mut rasterizer = self
                    .rasterizer
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                compute_layout_with_random(
                    &input.words,
                    input.viewport,
                    &input.config,
                    &mut *rasterizer,
                    self.random.as_ref(),
                )
            };
            let layout = match result {
                Ok(layout) => layout,
                Err(err) => {
                    let mut schedule = self.lock_schedule();
                    schedule.updating = false;
                    schedule.incoming = None;
                    in_flight.armed = false;
                    return Err(err);
                }
            };
            passes += 1;
            on_rendered(&layout);
        }
        Ok(UpdateStatus::Rendered { passes })
    }

    fn lock_schedule(&self) -> MutexGuard<'_, Schedule> {
        lock(&self.schedule)
    }
}
