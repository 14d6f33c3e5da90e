//! A per-node writer-preferring reader/writer lock, paired with an
//! independent subtree reference count used to detect quiescence.
//!
//! Neither `std::sync::RwLock` nor `parking_lot::RwLock` expose the
//! writer-preference policy or the decoupled, separately-waitable
//! refcount this crate's traversal protocol needs (see the node
//! synchronizer write-up in the crate's design notes), so this type is
//! built directly on `parking_lot`'s `Mutex`/`Condvar` primitives plus an
//! `UnsafeCell`, the same way a hand-rolled reader/writer lock is built
//! anywhere this pattern shows up: one short-lived internal mutex guards
//! a small counters struct, and the data itself lives behind an
//! `UnsafeCell` that callers access only once they hold the counters'
//! permission to do so.

use std::cell::UnsafeCell;

use parking_lot::{Condvar, Mutex};

struct State {
    readers: usize,
    readers_waiting: usize,
    writer_active: bool,
    writers_waiting: usize,
    refcount: usize,
}

impl State {
    fn new() -> Self {
        State {
            readers: 0,
            readers_waiting: 0,
            writer_active: false,
            writers_waiting: 0,
            refcount: 0,
        }
    }
}

pub(crate) struct NodeLock<T> {
    state: Mutex<State>,
    readers_cv: Condvar,
    writers_cv: Condvar,
    quiescent_cv: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is gated by `state`, which is itself behind a
// `Mutex`; the lock/unlock pairing guarantees the usual reader/writer
// exclusivity before any `&T`/`&mut T` is handed out.
unsafe impl<T: Send> Send for NodeLock<T> {}
unsafe impl<T: Send> Sync for NodeLock<T> {}

impl<T> NodeLock<T> {
    pub(crate) fn new(value: T) -> Self {
        NodeLock {
            state: Mutex::new(State::new()),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
            quiescent_cv: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Blocks while any writer is active or waiting, then registers as a
    /// reader. Waiting readers never block other readers; a waiting
    /// writer blocks all of them (writer preference).
    pub(crate) fn lock_read(&self) {
        let mut state = self.state.lock();
        while state.writer_active || state.writers_waiting > 0 {
            state.readers_waiting += 1;
            self.readers_cv.wait(&mut state);
            state.readers_waiting -= 1;
        }
        state.readers += 1;
    }

    pub(crate) fn unlock_read(&self) {
        let mut state = self.state.lock();
        state.readers -= 1;
        if state.readers == 0 {
            self.writers_cv.notify_one();
        }
    }

    /// Blocks while any reader or writer is active, then registers as the
    /// sole writer.
    pub(crate) fn lock_write(&self) {
        let mut state = self.state.lock();
        while state.writer_active || state.readers > 0 {
            state.writers_waiting += 1;
            self.writers_cv.wait(&mut state);
            state.writers_waiting -= 1;
        }
        state.writer_active = true;
    }

    /// Releases the writer lock. Wakes every waiting reader if any are
    /// waiting, otherwise wakes a single waiting writer.
    pub(crate) fn unlock_write(&self) {
        let mut state = self.state.lock();
        state.writer_active = false;
        if state.readers_waiting > 0 {
            drop(state);
            self.readers_cv.notify_all();
        } else {
            drop(state);
            self.writers_cv.notify_one();
        }
    }

    /// Marks one more in-flight operation as touching the subtree rooted
    /// at this node. Independent of the reader/writer lock above.
    pub(crate) fn enter(&self) {
        self.state.lock().refcount += 1;
    }

    /// Marks an in-flight operation as having left the subtree. Wakes
    /// anyone waiting in [`NodeLock::wait_quiescent`] once the count
    /// reaches zero.
    pub(crate) fn leave(&self) {
        let mut state = self.state.lock();
        state.refcount -= 1;
        if state.refcount == 0 {
            drop(state);
            self.quiescent_cv.notify_all();
        }
    }

    /// Blocks until no in-flight operation holds a refcount at this node.
    pub(crate) fn wait_quiescent(&self) {
        let mut state = self.state.lock();
        while state.refcount != 0 {
            self.quiescent_cv.wait(&mut state);
        }
    }

    /// # Safety
    /// The caller must hold the read or write lock on this `NodeLock`
    /// (via [`NodeLock::lock_read`]/[`NodeLock::lock_write`]) for the
    /// duration of the returned pointer's use, with read access only
    /// dereferenced immutably and write access exclusively.
    pub(crate) unsafe fn data(&self) -> *mut T {
        self.data.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn readers_run_concurrently() {
        let lock = Arc::new(NodeLock::new(0usize));
        lock.lock_read();
        lock.lock_read();
        lock.unlock_read();
        lock.unlock_read();
    }

    #[test]
    fn writer_excludes_readers() {
        let lock = NodeLock::new(0usize);
        lock.lock_write();
        unsafe {
            *lock.data() = 1;
        }
        lock.unlock_write();
        lock.lock_read();
        assert_eq!(unsafe { *lock.data() }, 1);
        lock.unlock_read();
    }

    #[test]
    fn concurrent_writers_serialize() {
        let lock = Arc::new(NodeLock::new(0usize));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    lock.lock_write();
                    unsafe {
                        *lock.data() += 1;
                    }
                    lock.unlock_write();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        lock.lock_read();
        assert_eq!(unsafe { *lock.data() }, 8000);
        lock.unlock_read();
    }

    #[test]
    fn quiescence_waits_for_refcount_drain() {
        let lock = Arc::new(NodeLock::new(()));
        lock.enter();
        let waiter = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || lock.wait_quiescent())
        };
        thread::sleep(std::time::Duration::from_millis(10));
        lock.leave();
        waiter.join().unwrap();
    }
}
