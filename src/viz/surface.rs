//! Measured drawing surface and resize observation.
//!
//! The UI measures the container once per frame; observers pick up a change
//! on their next poll. Each [`ResizeObserver`] is a scoped handle: dropping or
//! disconnecting it removes it from the surface.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug)]
struct SurfaceState {
    size: SurfaceSize,
    generation: u64,
    observers: usize,
}

/// The container the scene is bound to.
#[derive(Clone, Debug)]
pub struct Surface {
    state: Arc<Mutex<SurfaceState>>,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                size,
                generation: 0,
                observers: 0,
            })),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.state.lock().size
    }

    /// Record the current container size. Returns `true` if it changed.
    pub fn measure(&self, width: u32, height: u32) -> bool {
        let size = SurfaceSize::new(width, height);
        let mut state = self.state.lock();
        if state.size == size {
            return false;
        }
        state.size = size;
        state.generation += 1;
        true
    }

    pub fn observe(&self) -> ResizeObserver {
        let mut state = self.state.lock();
        state.observers += 1;
        ResizeObserver {
            surface: Some(Arc::downgrade(&self.state)),
            seen: state.generation,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers
    }
}

/// Reports surface size changes since the last poll.
#[derive(Debug)]
pub struct ResizeObserver {
    surface: Option<Weak<Mutex<SurfaceState>>>,
    seen: u64,
}

impl ResizeObserver {
    /// The new size if the surface changed since the previous poll.
    pub fn poll(&mut self) -> Option<SurfaceSize> {
        let state = self.surface.as_ref()?.upgrade()?;
        let state = state.lock();
        if state.generation == self.seen {
            return None;
        }
        self.seen = state.generation;
        Some(state.size)
    }

    pub fn is_connected(&self) -> bool {
        self.surface.is_some()
    }

    pub fn disconnect(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        if let Some(state) = surface.upgrade() {
            let mut state = state.lock();
            state.observers = state.observers.saturating_sub(1);
        }
    }
}

impl Drop for ResizeObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
