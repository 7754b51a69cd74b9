// Thu Jan 29 2026 - Alex

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

type Observer = Box<dyn Fn(f32) + Send + Sync>;

// The observer lock also orders deliveries, so it never sees a value go back.
struct ObserverSlot {
    callback: Option<Observer>,
    delivered: f32,
}

struct ProgressInner {
    bits: AtomicU32,
    observer: Mutex<ObserverSlot>,
}

/// Lock-free fraction in `[0, 1]` that only moves forward while a dump runs.
#[derive(Clone)]
pub struct Progress {
    inner: Arc<ProgressInner>,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                bits: AtomicU32::new(0f32.to_bits()),
                observer: Mutex::new(ObserverSlot {
                    callback: None,
                    delivered: 0.0,
                }),
            }),
        }
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.bits.load(Ordering::Acquire))
    }

    /// Called with the new value after every change.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.inner.observer.lock().callback = Some(Box::new(observer));
    }

    pub fn clear_observer(&self) {
        self.inner.observer.lock().callback = None;
    }

    pub fn advance(&self, delta: f32) {
        if delta > 0.0 {
            self.update(|current| current + delta);
        }
    }

    /// Moves to `value` unless progress is already past it.
    pub fn advance_to(&self, value: f32) {
        self.update(|current| current.max(value));
    }

    /// Back to zero. Only for the start of a new run.
    pub fn reset(&self) {
        let mut slot = self.inner.observer.lock();
        self.inner.bits.store(0f32.to_bits(), Ordering::Release);
        slot.delivered = 0.0;
        if let Some(callback) = slot.callback.as_ref() {
            callback(0.0);
        }
    }

    fn update<F: Fn(f32) -> f32>(&self, next: F) {
        let mut current_bits = self.inner.bits.load(Ordering::Acquire);
        loop {
            let current = f32::from_bits(current_bits);
            let target = next(current).clamp(0.0, 1.0);
            if target <= current {
                return;
            }

            match self.inner.bits.compare_exchange_weak(
                current_bits,
                target.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.notify();
                    return;
                }
                Err(actual) => current_bits = actual,
            }
        }
    }

    /// Delivers the latest value, skipping it if a newer one already went out.
    fn notify(&self) {
        let mut slot = self.inner.observer.lock();
        let value = self.get();
        if value <= slot.delivered {
            return;
        }
        slot.delivered = value;
        if let Some(callback) = slot.callback.as_ref() {
            callback(value);
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").field("value", &self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_forward_only() {
        let progress = Progress::new();
        progress.advance_to(0.5);
        progress.advance_to(0.3);
        assert_eq!(progress.get(), 0.5);

        progress.advance(-0.2);
        assert_eq!(progress.get(), 0.5);
    }

    #[test]
    fn test_clamped_to_one() {
        let progress = Progress::new();
        progress.advance(0.7);
        progress.advance(0.7);
        assert_eq!(progress.get(), 1.0);
    }

    #[test]
    fn test_concurrent_advances_are_not_lost() {
        let progress = Progress::new();
        (0..1000).into_par_iter().for_each(|_| progress.advance(0.0005));
        assert!((progress.get() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_observer_sees_monotonic_values() {
        let progress = Progress::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        progress.set_observer(move |v| sink.lock().push(v));

        progress.advance_to(0.2);
        progress.advance_to(0.1);
        progress.advance(0.3);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_parallel_observer_never_steps_back() {
        let progress = Progress::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        progress.set_observer(move |v| sink.lock().push(v));

        (0..2000).into_par_iter().for_each(|_| progress.advance(0.0004));

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last().copied(), Some(progress.get()));
    }

    #[test]
    fn test_reset_notifies_zero() {
        let progress = Progress::new();
        progress.advance_to(0.8);

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        progress.set_observer(move |v| sink.lock().push(v));
        progress.reset();
        progress.advance_to(0.1);

        assert_eq!(*seen.lock(), vec![0.0, 0.1]);
    }
}
