use std::{fmt::Display, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use log::*;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::{connection::RelayEndpoint, errors::ConnectionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unconfigured,
    Connecting,
    Connected,
    Disconnected,
    Errored(String),
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Unconfigured => write!(f, "Not connected"),
            ConnectionStatus::Connecting => write!(f, "Connecting"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Errored(reason) => write!(f, "Connection error: {reason}"),
        }
    }
}

#[derive(Debug)]
pub enum LinkEventKind {
    Opened,
    Frame(String),
    Closed,
    Failed(ConnectionError),
}

/// A report from a connection task, tagged with the generation of the connection that produced it
#[derive(Debug)]
pub struct LinkEvent {
    pub generation: u64,
    pub kind: LinkEventKind,
}

pub type StatusObserver = Arc<dyn Fn(&ConnectionStatus) + Send + Sync>;

struct LiveLink {
    generation: u64,
    shutdown: Option<oneshot::Sender<()>>,
    _task: JoinHandle<()>,
}

impl LiveLink {
    fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The task may already have finished, in which case there is nothing to close
            let _ = tx.send(());
        }
    }
}

impl Drop for LiveLink {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct ConnectionSupervisor {
    endpoint: Option<RelayEndpoint>,
    status: ConnectionStatus,
    generation: u64,
    link: Option<LiveLink>,
    events: mpsc::UnboundedSender<LinkEvent>,
    observers: Vec<StatusObserver>,
}

impl ConnectionSupervisor {
    /// Creates an unconfigured supervisor, along with the receiving end of its event channel. The host must pass every
    /// event it receives to [`Self::handle_event`].
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let supervisor = Self {
            endpoint: None,
            status: ConnectionStatus::Unconfigured,
            generation: 0,
            link: None,
            events,
            observers: Vec::new(),
        };
        (supervisor, receiver)
    }

    /// Registers a callback that is invoked, on the caller's thread, every time the status changes
    pub fn on_status_change<F>(&mut self, f: F) -> &mut Self
    where F: Fn(&ConnectionStatus) + Send + Sync + 'static {
        self.observers.push(Arc::new(f));
        self
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn endpoint(&self) -> Option<&RelayEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_live(&self) -> bool {
        self.link.is_some()
    }

    /// Validates and stores the relay address. An invalid address is rejected without side effects.
    pub fn configure(&mut self, address: &str) -> Result<&RelayEndpoint, ConnectionError> {
        let endpoint = RelayEndpoint::parse(address)?;
        debug!("🔗️ Relay address set to {endpoint}");
        Ok(self.endpoint.insert(endpoint))
    }

    /// Opens a connection to the configured relay, closing the current one first. Returns the generation of the new
    /// connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self) -> Result<u64, ConnectionError> {
        let url = self.endpoint.as_ref().map(|e| e.url().clone()).ok_or(ConnectionError::NotConfigured)?;
        self.close_link();
        self.generation += 1;
        let generation = self.generation;
        let (shutdown, shutdown_rx) = oneshot::channel();
        info!("🔗️ Connecting to relay at {url} (connection #{generation})");
        let task = tokio::spawn(run_link(url, generation, self.events.clone(), shutdown_rx));
        self.link = Some(LiveLink { generation, shutdown: Some(shutdown), _task: task });
        self.set_status(ConnectionStatus::Connecting);
        Ok(generation)
    }

    /// Configure a new address and connect to it. This is what a user confirming a new address amounts to.
    pub fn reconnect(&mut self, address: &str) -> Result<u64, ConnectionError> {
        self.configure(address)?;
        self.connect()
    }

    /// Drops the connection and returns to the unconfigured state while a new address is being entered
    pub fn edit(&mut self) {
        self.teardown();
        self.set_status(ConnectionStatus::Unconfigured);
    }

    /// Closes the active connection, if any
    pub fn teardown(&mut self) {
        if self.close_link() {
            self.set_status(ConnectionStatus::Disconnected);
        }
    }

    /// Applies an event from a connection task. Events from superseded connections are dropped.
    ///
    /// Returns the payload of a frame received on the current connection.
    pub fn handle_event(&mut self, event: LinkEvent) -> Option<String> {
        let current = self.link.as_ref().map(|l| l.generation);
        if current != Some(event.generation) {
            trace!("🔗️ Dropping event from stale connection #{}: {:?}", event.generation, event.kind);
            return None;
        }
        match event.kind {
            LinkEventKind::Opened => {
                info!("🔗️ Connected to relay (connection #{})", event.generation);
                self.set_status(ConnectionStatus::Connected);
                None
            },
            LinkEventKind::Frame(payload) => Some(payload),
            LinkEventKind::Closed => {
                info!("🔗️ Relay closed connection #{}", event.generation);
                self.link = None;
                self.set_status(ConnectionStatus::Disconnected);
                None
            },
            LinkEventKind::Failed(e) => {
                warn!("🔗️ Connection #{} failed. {e}", event.generation);
                self.link = None;
                self.set_status(ConnectionStatus::Errored(e.to_string()));
                None
            },
        }
    }

    fn close_link(&mut self) -> bool {
        match self.link.take() {
            Some(mut link) => {
                debug!("🔗️ Closing connection #{}", link.generation);
                link.close();
                true
            },
            None => false,
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status == status {
            return;
        }
        trace!("🔗️ Status: {} -> {status}", self.status);
        self.status = status;
        for observer in &self.observers {
            observer(&self.status);
        }
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        self.close_link();
    }
}

async fn run_link(
    url: Url,
    generation: u64,
    events: mpsc::UnboundedSender<LinkEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let emit = |kind| {
        // The receiver is gone once the host has shut down, and then nobody cares about this connection anymore
        let _ = events.send(LinkEvent { generation, kind });
    };
    let stream = tokio::select! {
        _ = &mut shutdown => {
            trace!("🔗️ Connection #{generation} abandoned before it was established");
            return;
        },
        result = connect_async(url.as_str()) => match result {
            Ok((stream, _)) => stream,
            Err(e) => {
                emit(LinkEventKind::Failed(ConnectionError::Transport(e.to_string())));
                return;
            },
        },
    };
    emit(LinkEventKind::Opened);
    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    debug!("🔗️ Could not send close frame on connection #{generation}. {e}");
                }
                trace!("🔗️ Connection #{generation} closed");
                return;
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => emit(LinkEventKind::Frame(text)),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => emit(LinkEventKind::Frame(text)),
                    Err(_) => warn!("🔗️ Ignoring binary frame that is not UTF-8 on connection #{generation}"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    emit(LinkEventKind::Closed);
                    return;
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    emit(LinkEventKind::Failed(ConnectionError::Transport(e.to_string())));
                    return;
                },
            },
        }
    }
}
