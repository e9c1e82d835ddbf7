//! Running a whole session: calibrate, fan the workers out over scoped
//! threads, and composite their buffers either once at the end (batch)
//! or over and over while they run (interactive).

use crate::accumulate::AccumulationBuffer;
use crate::calibrate::{self, Calibration};
use crate::composite::{composite, Frame};
use crate::config::Config;
use crate::error::RenderError;
use crate::planes::PlaneMapper;
use crate::worker::{CancelToken, Worker};
use crossbeam::thread::ScopedJoinHandle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp;
use std::thread;
use std::time::{Duration, Instant};

/// Longest single sleep while waiting out the cadence, so cancellation
/// is noticed promptly.
const NAP: Duration = Duration::from_millis(10);

/// Cancels the token if dropped while unwinding, so that a panic on
/// the watching thread doesn't leave unbounded workers running.
struct CancelOnPanic<'a>(&'a CancelToken);

impl<'a> Drop for CancelOnPanic<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// The knobs of a render that aren't part of the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Number of workers, each on its own thread.
    pub threads: usize,
    /// Iterations per worker in batch mode, fuse included.
    pub iterations: u64,
    /// Calibration uses this seed; worker `i` uses `seed + 1 + i`.
    pub seed: u64,
    /// Time between composites in interactive mode.
    pub cadence: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            width: 512,
            height: 512,
            threads: num_cpus::get(),
            iterations: 25_000_000,
            seed: 1,
            cadence: Duration::from_secs(1),
        }
    }
}

/// Somewhere to show the picture as it develops.  Receives row-major
/// BGRA bytes once per composite; a negative return asks the session to
/// shut down.
pub trait DisplaySink {
    /// Show one frame.
    fn present(&mut self, bgra: &[u8], width: usize, height: usize) -> i32;
}

impl<F> DisplaySink for F
where
    F: FnMut(&[u8], usize, usize) -> i32,
{
    fn present(&mut self, bgra: &[u8], width: usize, height: usize) -> i32 {
        self(bgra, width, height)
    }
}

/// A scene plus the settings to render it with.
pub struct Renderer<'a> {
    config: &'a Config,
    settings: RenderSettings,
}

impl<'a> Renderer<'a> {
    /// Fails if the image would be empty or there are no workers.
    pub fn new(config: &'a Config, settings: RenderSettings) -> Result<Self, RenderError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RenderError::Settings(format!(
                "image size {}x{} is empty",
                settings.width, settings.height
            )));
        }
        if settings.threads == 0 {
            return Err(RenderError::Settings("at least one thread is needed".to_string()));
        }
        Ok(Renderer { config, settings })
    }

    /// The settings this renderer was built with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Find the window onto the attractor.
    pub fn calibrate(&self) -> Result<Calibration, RenderError> {
        let calibration =
            calibrate::calibrate(self.config, &mut StdRng::seed_from_u64(self.settings.seed))?;
        info!("strict bounds: {}", calibration.strict);
        info!("percentile bounds: {}", calibration.percentile);
        Ok(calibration)
    }

    fn plane(&self) -> Result<PlaneMapper, RenderError> {
        Ok(PlaneMapper::new(
            self.settings.width,
            self.settings.height,
            self.calibrate()?.percentile,
        ))
    }

    fn buffers(&self) -> Vec<AccumulationBuffer> {
        (0..self.settings.threads)
            .map(|_| AccumulationBuffer::new(self.settings.width, self.settings.height))
            .collect()
    }

    /// Run one worker per buffer.  `watch` runs on the calling thread
    /// while they do; the workers are joined once it returns.
    fn accumulate<W>(
        &self,
        plane: &PlaneMapper,
        buffers: &[AccumulationBuffer],
        limit: Option<u64>,
        cancel: &CancelToken,
        watch: W,
    ) -> Result<(), RenderError>
    where
        W: FnOnce(&[AccumulationBuffer]),
    {
        let config = self.config;
        let seed = self.settings.seed;
        info!("starting {} workers", buffers.len());

        let iterations = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<u64>> = buffers
                .iter()
                .enumerate()
                .map(|(index, buffer)| {
                    let seed = seed.wrapping_add(1 + index as u64);
                    spawner.spawn(move |_| {
                        debug!("worker {} starting with seed {}", index, seed);
                        let done = Worker::new(config, plane, buffer, seed).run(limit, cancel);
                        debug!("worker {} stopped after {} iterations", index, done);
                        done
                    })
                })
                .collect();
            {
                let _guard = CancelOnPanic(cancel);
                watch(buffers);
            }
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<thread::Result<Vec<u64>>>()
        })
        .map_err(|_| RenderError::Panicked)?
        .map_err(|_| RenderError::Panicked)?;

        info!(
            "workers finished, {} iterations in all",
            iterations.iter().sum::<u64>()
        );
        Ok(())
    }

    /// Render to completion: every worker runs its full iteration count,
    /// then the buffers are composited once.
    pub fn render(&self) -> Result<Frame, RenderError> {
        let plane = self.plane()?;
        let buffers = self.buffers();
        self.accumulate(
            &plane,
            &buffers,
            Some(self.settings.iterations),
            &CancelToken::new(),
            |_| (),
        )?;
        Ok(composite(&buffers))
    }

    fn wait(&self, cancel: &CancelToken) {
        let deadline = Instant::now() + self.settings.cadence;
        while !cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(cmp::min(deadline - now, NAP));
        }
    }

    /// Render until `cancel` is cancelled, presenting a fresh composite
    /// to `sink` every cadence.  If the sink returns a negative status
    /// the token is cancelled.  Returns the composite of everything
    /// accumulated.
    pub fn render_interactive<S: DisplaySink + ?Sized>(
        &self,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<Frame, RenderError> {
        let plane = self.plane()?;
        let buffers = self.buffers();
        self.accumulate(&plane, &buffers, None, cancel, |buffers| {
            let mut frames = 0;
            loop {
                self.wait(cancel);
                if cancel.is_cancelled() {
                    break;
                }
                let frame = composite(buffers);
                frames += 1;
                if sink.present(&frame.to_bgra(), frame.width, frame.height) < 0 {
                    info!("display asked to stop after {} frames", frames);
                    cancel.cancel();
                }
            }
        })?;
        Ok(composite(&buffers))
    }
}
