//! TCP server: one I/O thread per connection, calls on a fixed worker pool.
//!
//! # Invariants
//! - At most `workers` calls execute at the same time, process-wide.
//! - Replies on one connection are written in request order.
//! - After `shutdown`, the listener is closed and every open connection is
//!   shut down, so clients observe `UNAVAILABLE`.

use crate::dispatch::Dispatcher;
use crate::frame::{encode_line, ResponseFrame};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use todolists_core::{ListRepository, Status, TodoListService};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const DEFAULT_WORKERS: usize = 10;

/// Listener address and worker pool size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub address: String,
    pub workers: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:0".to_string(),
            workers: DEFAULT_WORKERS,
        }
    }
}

type ConnectionRegistry = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// Running server; shuts down when dropped.
pub struct ServerHandle {
    local_addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    connections: ConnectionRegistry,
    acceptor: Option<JoinHandle<()>>,
}

/// Binds the listener and starts accepting calls in the background.
///
/// # Errors
/// - Returns an error when the address cannot be bound.
/// - Returns an error when the worker pool cannot be built.
pub fn serve<R>(
    options: &ServerOptions,
    service: Arc<TodoListService<R>>,
) -> io::Result<ServerHandle>
where
    R: ListRepository + Send + Sync + 'static,
{
    let workers = options.workers.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("todolists-worker-{index}"))
        .build()
        .map_err(io::Error::other)?;

    let listener = TcpListener::bind(options.address.as_str())?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let stopping = Arc::new(AtomicBool::new(false));
    let connections: ConnectionRegistry = Arc::new(Mutex::new(HashMap::new()));
    let context = AcceptContext {
        dispatcher: Arc::new(Dispatcher::new(service)),
        pool: Arc::new(pool),
        stopping: Arc::clone(&stopping),
        connections: Arc::clone(&connections),
        next_connection_id: AtomicU64::new(0),
    };

    let acceptor = thread::Builder::new()
        .name("todolists-acceptor".to_string())
        .spawn(move || accept_loop(listener, context))?;

    info!("event=server_start module=rpc status=ok address={local_addr} workers={workers}");

    Ok(ServerHandle {
        local_addr,
        stopping,
        connections,
        acceptor: Some(acceptor),
    })
}

impl ServerHandle {
    /// Address actually bound, including the port chosen for `:0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> usize {
        self.connections.lock().len()
    }

    /// Blocks until the server stops.
    pub fn wait(mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                error!("event=server_wait module=rpc status=error reason=acceptor_panicked");
            }
        }
    }

    /// Stops accepting, closes open connections and joins the acceptor.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                error!("event=server_stop module=rpc status=error reason=acceptor_panicked");
            }
        }

        let open: Vec<TcpStream> = self.connections.lock().drain().map(|(_, s)| s).collect();
        for stream in &open {
            let _ = stream.shutdown(Shutdown::Both);
        }
        info!(
            "event=server_stop module=rpc status=ok address={} closed_connections={}",
            self.local_addr,
            open.len()
        );
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.acceptor.is_some() {
            self.stop();
        }
    }
}

struct AcceptContext<R: ListRepository> {
    dispatcher: Arc<Dispatcher<R>>,
    pool: Arc<ThreadPool>,
    stopping: Arc<AtomicBool>,
    connections: ConnectionRegistry,
    next_connection_id: AtomicU64,
}

fn accept_loop<R>(listener: TcpListener, context: AcceptContext<R>)
where
    R: ListRepository + Send + Sync + 'static,
{
    while !context.stopping.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(err) = start_connection(stream, peer, &context) {
                    warn!("event=connection_open module=rpc status=error peer={peer} error={err}");
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => {
                warn!("event=accept module=rpc status=error error={err}");
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
    debug!("event=accept module=rpc status=stopped");
}

fn start_connection<R>(
    stream: TcpStream,
    peer: SocketAddr,
    context: &AcceptContext<R>,
) -> io::Result<()>
where
    R: ListRepository + Send + Sync + 'static,
{
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)?;

    let id = context.next_connection_id.fetch_add(1, Ordering::SeqCst);
    context.connections.lock().insert(id, stream.try_clone()?);

    let dispatcher = Arc::clone(&context.dispatcher);
    let pool = Arc::clone(&context.pool);
    let connections = Arc::clone(&context.connections);
    let spawned = thread::Builder::new()
        .name(format!("todolists-conn-{id}"))
        .spawn(move || {
            debug!("event=connection_open module=rpc status=ok peer={peer} connection_id={id}");
            if let Err(err) = serve_connection(stream, &dispatcher, &pool) {
                debug!("event=connection_io module=rpc status=error peer={peer} error={err}");
            }
            connections.lock().remove(&id);
            debug!("event=connection_close module=rpc status=ok peer={peer} connection_id={id}");
        });

    if let Err(err) = spawned {
        context.connections.lock().remove(&id);
        return Err(err);
    }
    Ok(())
}

fn serve_connection<R>(
    stream: TcpStream,
    dispatcher: &Dispatcher<R>,
    pool: &ThreadPool,
) -> io::Result<()>
where
    R: ListRepository + Send + Sync,
{
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = pool.install(|| dispatcher.dispatch_line(&line));
        let encoded = encode_line(&response).or_else(|status| {
            encode_line(&ResponseFrame::error(Status::internal(status.message)))
        });
        match encoded {
            Ok(encoded) => {
                writer.write_all(encoded.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            Err(status) => {
                error!("event=reply_encode module=rpc status=error error={status}");
                return Err(io::Error::other(status));
            }
        }
    }
    Ok(())
}
