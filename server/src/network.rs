//! Server network layer: WebSocket accept loop and game loop coordination

use crate::connection::ConnectionId;
use crate::game::Game;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Messages sent from socket tasks to the game loop
#[derive(Debug)]
pub enum NetworkEvent {
    Opened {
        id: ConnectionId,
        sender: mpsc::UnboundedSender<String>,
    },
    Message {
        id: ConnectionId,
        text: String,
    },
    Closed {
        id: ConnectionId,
    },
}

/// Owns the listener and the game. Socket tasks only ever talk to the game
/// through [`NetworkEvent`]s, so game state has a single owner.
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    game: Game,
    next_id: Arc<AtomicU32>,
    /// Handed to the acceptor on `run`; the loop ends once every sender is gone.
    events_tx: Option<mpsc::UnboundedSender<NetworkEvent>>,
    events_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Server {
    pub async fn bind(addr: &str, game: Game) -> ServerResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            game,
            next_id: Arc::new(AtomicU32::new(0)),
            events_tx: Some(events_tx),
            events_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Spawns task that accepts sockets and hands each to its own task.
    /// The server keeps no sender of its own afterwards.
    fn spawn_acceptor(&mut self) {
        let events_tx = self.events_tx.take();
        let (Some(listener), Some(events_tx)) = (self.listener.take(), events_tx) else {
            return;
        };
        let next_id = Arc::clone(&self.next_id);

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let id = next_id.fetch_add(1, Ordering::Relaxed);
                        tokio::spawn(serve_socket(stream, addr, id, events_tx.clone()));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }
        });
    }

    pub fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Opened { id, sender } => {
                if !self.game.connection_opened(id, Box::new(sender)) {
                    debug!("Connection {} refused", id);
                }
            }
            NetworkEvent::Message { id, text } => self.game.receive(id, text),
            NetworkEvent::Closed { id } => self.game.connection_closed(id),
        }
    }

    /// Main server loop. Network events are queued into the game as they
    /// arrive; the game itself only advances on the tick. Returns once the
    /// acceptor and every socket task have gone away.
    pub async fn run(mut self) -> ServerResult<()> {
        self.spawn_acceptor();

        let mut tick_interval = interval(self.game.config().tick_interval);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    self.game.update(Instant::now());
                },
            }
        }

        Ok(())
    }
}

/// Runs one WebSocket: a writer task drains the game's frames, the reader
/// forwards text frames as events until the peer goes away
async fn serve_socket(
    stream: TcpStream,
    addr: SocketAddr,
    id: ConnectionId,
    events_tx: mpsc::UnboundedSender<NetworkEvent>,
) {
    let websocket = match accept_async(stream).await {
        Ok(websocket) => websocket,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    info!("Connection {} opened from {}", id, addr);

    let (mut write, mut read) = websocket.split();
    let (sender, mut outgoing) = mpsc::unbounded_channel::<String>();

    if events_tx.send(NetworkEvent::Opened { id, sender }).is_err() {
        return;
    }

    tokio::spawn(async move {
        while let Some(frame) = outgoing.recv().await {
            if let Err(e) = write.send(Message::Text(frame)).await {
                debug!("Write to connection {} failed: {}", id, e);
                break;
            }
        }
        let _ = write.close().await;
    });

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if events_tx.send(NetworkEvent::Message { id, text }).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Error reading from connection {}: {}", id, e);
                break;
            }
        }
    }

    info!("Connection {} closed", id);
    let _ = events_tx.send(NetworkEvent::Closed { id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use std::time::Duration;

    fn quiet_game() -> Game {
        Game::new(GameConfig::default().without_cats())
    }

    #[tokio::test]
    async fn test_bind_to_ephemeral_port() {
        let server = Server::bind("127.0.0.1:0", quiet_game()).await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_run_ends_without_event_senders() {
        let mut server = Server::bind("127.0.0.1:0", quiet_game()).await.unwrap();
        server.listener = None;

        let result = tokio::time::timeout(Duration::from_secs(1), server.run()).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_events_feed_the_game() {
        let mut server = Server::bind("127.0.0.1:0", quiet_game()).await.unwrap();
        let (sender, mut frames) = mpsc::unbounded_channel();

        server.handle_event(NetworkEvent::Opened { id: 7, sender });
        server.handle_event(NetworkEvent::Message {
            id: 7,
            text: r#"{"type":"hello"}"#.to_string(),
        });
        assert_eq!(server.game().connection_count(), 1);

        server.game.update(Instant::now());
        let hello = frames.try_recv().unwrap();
        assert!(hello.starts_with(r#"{"type":"hello""#));

        server.handle_event(NetworkEvent::Closed { id: 7 });
        server.game.update(Instant::now());
        assert_eq!(server.game().connection_count(), 0);
    }
}
