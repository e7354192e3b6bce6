//! Bounded pool of live connections to one server.
//!
//! The pool hands a connection to exactly one caller at a time. Idle
//! connections sit on a LIFO stack (most recently released first, for cache
//! locality; order is not semantically significant). The pool grows lazily by
//! dialing new connections until the cap, then blocks callers on a condvar
//! until a connection is released or discarded.
//!
//! The correctness-critical branch is discard: a connection that saw a
//! transport error is closed and its slot freed, never returned to the idle
//! stack, so one broken socket cannot poison later callers.

use crate::transport::Transport;
use std::io;
use std::sync::{Condvar, Mutex};

/// Default connection cap.
pub const DEFAULT_POOL_SIZE: usize = 4;

type Conn = Box<dyn Transport>;
type Connector = dyn Fn() -> io::Result<Conn> + Send + Sync;

struct PoolState {
    /// Idle connections, popped LIFO.
    idle: Vec<Conn>,
    /// Connections alive anywhere: idle + checked out. Never exceeds the cap.
    live: usize,
}

/// A bounded, blocking connection pool.
pub struct ConnectionPool {
    connector: Box<Connector>,
    max: usize,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl ConnectionPool {
    /// Create a pool that dials new connections with `connector`, holding at
    /// most `max` connections alive at once. A cap of 0 is clamped to 1 so
    /// `acquire` can always make progress.
    pub fn new<F>(max: usize, connector: F) -> Self
    where
        F: Fn() -> io::Result<Conn> + Send + Sync + 'static,
    {
        Self {
            connector: Box::new(connector),
            max: max.max(1),
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                live: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// The configured connection cap.
    pub fn max_connections(&self) -> usize {
        self.max
    }

    /// Connections currently alive (idle + checked out). For observability
    /// and tests.
    pub fn live_connections(&self) -> usize {
        self.lock().live
    }

    /// Check out a connection.
    ///
    /// Takes an idle connection if one exists; otherwise dials a new one if
    /// the pool is below its cap; otherwise blocks until another caller
    /// releases or discards. The lock is never held across the dial.
    pub fn acquire(&self) -> io::Result<PooledConn<'_>> {
        let mut state = self.lock();
        loop {
            if let Some(conn) = state.idle.pop() {
                return Ok(PooledConn {
                    conn: Some(conn),
                    pool: self,
                });
            }
            if state.live < self.max {
                state.live += 1;
                drop(state);
                match (self.connector)() {
                    Ok(conn) => {
                        return Ok(PooledConn {
                            conn: Some(conn),
                            pool: self,
                        })
                    }
                    Err(err) => {
                        // Give the reserved slot back and wake a waiter so it
                        // can attempt its own dial.
                        self.lock().live -= 1;
                        self.available.notify_one();
                        return Err(err);
                    }
                }
            }
            state = self
                .available
                .wait(state)
                .expect("connection pool lock poisoned");
        }
    }

    fn put_back(&self, conn: Conn) {
        self.lock().idle.push(conn);
        self.available.notify_one();
    }

    fn forget_one(&self) {
        self.lock().live -= 1;
        self.available.notify_one();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state
            .lock()
            .expect("connection pool lock poisoned")
    }
}

/// A checked-out connection.
///
/// Exactly one of [`release`](PooledConn::release) or
/// [`discard`](PooledConn::discard) ends the checkout. Dropping the guard
/// without releasing counts as a discard, so a panicking or early-returning
/// caller can never leak a suspect connection back into the idle stack.
pub struct PooledConn<'a> {
    conn: Option<Conn>,
    pool: &'a ConnectionPool,
}

impl PooledConn<'_> {
    /// Return the connection to the idle stack for reuse.
    pub fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }

    /// Close the connection and free its pool slot.
    pub fn discard(mut self) {
        if self.conn.take().is_some() {
            self.pool.forget_one();
        }
    }
}

impl io::Read for PooledConn<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.conn
            .as_mut()
            .expect("connection already returned to pool")
            .read(buf)
    }
}

impl io::Write for PooledConn<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.conn
            .as_mut()
            .expect("connection already returned to pool")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.conn
            .as_mut()
            .expect("connection already returned to pool")
            .flush()
    }
}

impl Drop for PooledConn<'_> {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            self.pool.forget_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    /// Connector producing socketpair client ends; the server ends are parked
    /// in a vec so the connections stay open.
    fn pair_connector() -> (impl Fn() -> io::Result<Conn> + Send + Sync, Arc<Mutex<Vec<UnixStream>>>)
    {
        let parked = Arc::new(Mutex::new(Vec::new()));
        let parked_clone = Arc::clone(&parked);
        let connector = move || {
            let (client, server) = UnixStream::pair()?;
            parked_clone.lock().unwrap().push(server);
            Ok(Box::new(client) as Conn)
        };
        (connector, parked)
    }

    #[test]
    fn test_grows_lazily_to_cap() {
        let dials = Arc::new(AtomicUsize::new(0));
        let dials_clone = Arc::clone(&dials);
        let (connector, _parked) = pair_connector();
        let pool = ConnectionPool::new(2, move || {
            dials_clone.fetch_add(1, Ordering::SeqCst);
            connector()
        });

        assert_eq!(pool.live_connections(), 0);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.live_connections(), 2);
        assert_eq!(dials.load(Ordering::SeqCst), 2);

        a.release();
        b.release();

        // Reuses idle connections instead of dialing again
        let c = pool.acquire().unwrap();
        assert_eq!(dials.load(Ordering::SeqCst), 2);
        c.release();
    }

    #[test]
    fn test_blocked_acquire_unblocks_on_release() {
        let (connector, _parked) = pair_connector();
        let pool = Arc::new(ConnectionPool::new(1, connector));

        let held = pool.acquire().unwrap();

        let (tx, rx) = mpsc::channel();
        let pool_clone = Arc::clone(&pool);
        thread::spawn(move || {
            let conn = pool_clone.acquire().unwrap();
            tx.send(()).unwrap();
            conn.release();
        });

        // The second acquire must be blocked while the only connection is out
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        held.release();
        rx.recv_timeout(Duration::from_millis(500))
            .expect("blocked acquire was not woken by release");
    }

    #[test]
    fn test_cap_is_never_exceeded() {
        let (connector, _parked) = pair_connector();
        let pool = Arc::new(ConnectionPool::new(3, connector));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let pool = Arc::clone(&pool);
            let peak = Arc::clone(&peak);
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    let conn = pool.acquire().unwrap();
                    peak.fetch_max(pool.live_connections(), Ordering::SeqCst);
                    conn.release();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_discard_frees_slot_and_wakes_waiter() {
        let (connector, _parked) = pair_connector();
        let pool = Arc::new(ConnectionPool::new(1, connector));

        let held = pool.acquire().unwrap();

        let (tx, rx) = mpsc::channel();
        let pool_clone = Arc::clone(&pool);
        thread::spawn(move || {
            let conn = pool_clone.acquire().unwrap();
            tx.send(pool_clone.live_connections()).unwrap();
            conn.release();
        });

        held.discard();

        // Waiter wakes and dials a replacement; cap still respected
        let live = rx.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(live, 1);
    }

    #[test]
    fn test_discarded_connection_is_not_reused() {
        let (connector, parked) = pair_connector();
        let pool = ConnectionPool::new(1, connector);

        let mut conn = pool.acquire().unwrap();
        conn.write_all(b"x").unwrap();
        conn.discard();
        assert_eq!(pool.live_connections(), 0);

        // The replacement is a fresh socket: the first server end saw the
        // write, the second sees nothing pending.
        let conn2 = pool.acquire().unwrap();
        let servers = parked.lock().unwrap();
        assert_eq!(servers.len(), 2);
        let mut buf = [0u8; 1];
        servers[0]
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        assert!((&servers[0]).read_exact(&mut buf).is_ok());
        conn2.release();
    }

    #[test]
    fn test_connect_failure_frees_reserved_slot() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let pool = ConnectionPool::new(1, move || {
            if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
            } else {
                let (client, server) = UnixStream::pair()?;
                // Leak the server end so the connection stays open
                std::mem::forget(server);
                Ok(Box::new(client) as Conn)
            }
        });

        assert!(pool.acquire().is_err());
        assert_eq!(pool.live_connections(), 0);

        // The failed dial did not consume the slot
        let conn = pool.acquire().unwrap();
        assert_eq!(pool.live_connections(), 1);
        conn.release();
    }

    #[test]
    fn test_plain_drop_counts_as_discard() {
        let (connector, _parked) = pair_connector();
        let pool = ConnectionPool::new(2, connector);

        let conn = pool.acquire().unwrap();
        assert_eq!(pool.live_connections(), 1);
        drop(conn);
        assert_eq!(pool.live_connections(), 0);
    }
}
