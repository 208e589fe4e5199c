//! Registry Lock
//!
//! `SmartMutex` is the one place where the build decides how the plugin
//! registry is guarded. With the `threads` feature it wraps a
//! `parking_lot::ReentrantMutex`, so the thread holding the lock may take
//! it again (a plugin initialiser querying the registry mid-load). Without
//! it the guard is a plain shared reference and costs nothing.
//!
//! Guards give shared access only; pair the lock with a `RefCell` for
//! mutation.

#[cfg(feature = "threads")]
mod imp {
    use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

    pub type SmartGuard<'a, T> = ReentrantMutexGuard<'a, T>;

    #[derive(Debug, Default)]
    pub struct SmartMutex<T> {
        inner: ReentrantMutex<T>,
    }

    impl<T> SmartMutex<T> {
        pub fn new(value: T) -> Self {
            Self { inner: ReentrantMutex::new(value) }
        }

        /// Acquire the lock; released when the guard drops
        pub fn lock(&self) -> SmartGuard<'_, T> {
            self.inner.lock()
        }
    }
}

#[cfg(not(feature = "threads"))]
mod imp {
    pub type SmartGuard<'a, T> = &'a T;

    #[derive(Debug, Default)]
    pub struct SmartMutex<T> {
        inner: T,
    }

    impl<T> SmartMutex<T> {
        pub fn new(value: T) -> Self {
            Self { inner: value }
        }

        /// No-op in single-threaded builds
        pub fn lock(&self) -> SmartGuard<'_, T> {
            &self.inner
        }
    }
}

pub use imp::{SmartGuard, SmartMutex};

/// Whether this build guards the registry with a real mutex
pub const fn threads_enabled() -> bool {
    cfg!(feature = "threads")
}
