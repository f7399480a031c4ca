use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::bitmap::Bitmap;
use crate::draw::context::DrawContext;
use crate::draw::pixels::PixelBuffer;
use crate::foundation::core::Point;
use crate::foundation::error::{PlugframeError, PlugframeResult};
use crate::view::{View, ViewCx, ViewData};

/// Produces frames on the worker thread.
pub trait SurfaceRenderer: Send + 'static {
    /// Render frame number `frame` into `target`, which keeps the previous frame's content.
    fn render(&mut self, frame: u64, target: &mut PixelBuffer);
}

impl<F> SurfaceRenderer for F
where
    F: FnMut(u64, &mut PixelBuffer) + Send + 'static,
{
    fn render(&mut self, frame: u64, target: &mut PixelBuffer) {
        self(frame, target)
    }
}

/// Worker-private render state, shared with the UI thread only through
/// [`WorkerSurfaceView::lock_context`].
#[derive(Debug)]
pub struct SurfaceContext {
    /// Buffer the renderer draws into.
    pub buffer: PixelBuffer,
    /// Frames completed so far.
    pub frames_rendered: u64,
}

/// Worker settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceOpts {
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Pause between frames.
    pub interval_ms: u64,
    /// Stop after this many frames; `None` renders until the view is dropped.
    pub max_frames: Option<u64>,
    /// Finished frames that may wait for the UI thread before new ones are dropped.
    pub queue_depth: usize,
}

impl SurfaceOpts {
    /// `width` x `height` at about 60 frames per second, unbounded.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            interval_ms: 16,
            max_frames: None,
            queue_depth: 2,
        }
    }

    /// Override the frame interval.
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = ms;
        self
    }

    /// Limit the number of frames rendered.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }
}

enum SurfaceMsg {
    FrameReady(PixelBuffer),
}

/// View showing frames rendered by a dedicated worker thread.
///
/// The worker never touches the view tree: it renders into its own [`SurfaceContext`] and
/// posts finished buffers over a channel. The UI thread picks up the newest one during idle,
/// marks the view dirty, and blits it when painted.
pub struct WorkerSurfaceView {
    current: Option<Bitmap>,
    frames: Receiver<SurfaceMsg>,
    frames_received: u64,
    context: Arc<Mutex<SurfaceContext>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl WorkerSurfaceView {
    /// Start the worker thread.
    pub fn spawn(opts: SurfaceOpts, renderer: impl SurfaceRenderer) -> PlugframeResult<Self> {
        if opts.width == 0 || opts.height == 0 {
            return Err(PlugframeError::validation(format!(
                "surface size must be non-zero, got {}x{}",
                opts.width, opts.height
            )));
        }
        let context = Arc::new(Mutex::new(SurfaceContext {
            buffer: PixelBuffer::new(opts.width, opts.height),
            frames_rendered: 0,
        }));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::sync_channel(opts.queue_depth.max(1));

        let worker = {
            let context = Arc::clone(&context);
            let stop = Arc::clone(&stop);
            std::thread::Builder::new()
                .name("plugframe-surface".into())
                .spawn(move || run_worker(renderer, &context, &tx, &stop, opts))
                .map_err(|e| PlugframeError::resource(format!("failed to start surface worker: {e}")))?
        };
        tracing::debug!(width = opts.width, height = opts.height, "surface worker started");

        Ok(Self {
            current: None,
            frames: rx,
            frames_received: 0,
            context,
            stop,
            worker: Some(worker),
        })
    }

    /// Take every pending frame and keep the newest. Returns `true` if one arrived.
    pub fn poll_frames(&mut self) -> bool {
        let mut newest = None;
        while let Ok(SurfaceMsg::FrameReady(buffer)) = self.frames.try_recv() {
            self.frames_received += 1;
            newest = Some(buffer);
        }
        match newest {
            Some(buffer) => {
                self.current = Some(Bitmap::from_premul(buffer));
                true
            }
            None => false,
        }
    }

    /// Frames picked up by the UI thread so far, including skipped intermediate ones.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Frame currently shown.
    pub fn current_frame(&self) -> Option<&Bitmap> {
        self.current.as_ref()
    }

    /// Lock the worker's private context. Blocks while a frame is being rendered.
    pub fn lock_context(&self) -> MutexGuard<'_, SurfaceContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

fn run_worker(
    mut renderer: impl SurfaceRenderer,
    context: &Mutex<SurfaceContext>,
    tx: &SyncSender<SurfaceMsg>,
    stop: &AtomicBool,
    opts: SurfaceOpts,
) {
    let interval = Duration::from_millis(opts.interval_ms);
    let mut frame = 0u64;
    while !stop.load(Ordering::Acquire) {
        if opts.max_frames.is_some_and(|max| frame >= max) {
            break;
        }
        let buffer = {
            let mut ctx = context.lock().unwrap_or_else(PoisonError::into_inner);
            renderer.render(frame, &mut ctx.buffer);
            ctx.frames_rendered += 1;
            ctx.buffer.clone()
        };
        match tx.try_send(SurfaceMsg::FrameReady(buffer)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::trace!(frame, "surface frame dropped"),
            Err(TrySendError::Disconnected(_)) => break,
        }
        frame += 1;
        std::thread::park_timeout(interval);
    }
    tracing::debug!(frames = frame, "surface worker stopped");
}

impl View for WorkerSurfaceView {
    fn configure(&self, data: &mut ViewData) {
        data.wants_idle = true;
    }

    fn draw(&mut self, cx: &mut ViewCx<'_>, dc: &mut dyn DrawContext) {
        match self.current.as_ref() {
            Some(frame) => frame.draw(dc, cx.view_size(), Point::ZERO),
            None => cx.draw_background(dc),
        }
    }

    fn on_idle(&mut self, cx: &mut ViewCx<'_>) {
        if self.poll_frames() {
            cx.invalid();
        }
    }
}

impl Drop for WorkerSurfaceView {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                tracing::warn!("surface worker panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/worker.rs"]
mod tests;
