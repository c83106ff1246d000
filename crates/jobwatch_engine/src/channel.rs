//! Push channel carrying job progress: Socket.IO over a WebSocket.
//!
//! [`ProgressChannel::run`] keeps one subscription alive for the whole
//! session, reconnecting with exponential backoff until cancelled. It never
//! interprets events beyond decoding them; filtering by job happens in the
//! core.

use futures_util::{SinkExt, StreamExt};
use jobwatch_core::ProgressEvent;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use watch_logging::{watch_debug, watch_info, watch_trace, watch_warn};

use crate::config::next_delay;
use crate::packet::{
    decode_engine, decode_socket, encode_pong, EnginePacket, SocketPacket,
    CONNECT_DEFAULT_NAMESPACE, DEFAULT_NAMESPACE,
};
use crate::{ChannelError, ChannelStatus, ClientSettings, EngineEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum SessionEnd {
    Cancelled,
    Closed,
}

enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone)]
pub struct ProgressChannel {
    settings: ClientSettings,
}

impl ProgressChannel {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Subscribe and forward decoded progress events to `sink` until `cancel` fires.
    pub async fn run(&self, sink: &dyn ProgressSink, cancel: &CancellationToken) {
        let reconnect = &self.settings.reconnect;
        let mut delay = reconnect.initial_delay;
        loop {
            let mut connected = false;
            match self.session(sink, cancel, &mut connected).await {
                Ok(SessionEnd::Cancelled) => {
                    watch_debug!("Progress channel cancelled");
                    return;
                }
                Ok(SessionEnd::Closed) => watch_info!("Progress channel closed by server"),
                Err(err) => watch_warn!("Progress channel error: {}", err),
            }
            if connected {
                sink.emit(EngineEvent::Channel(ChannelStatus::Disconnected));
                delay = reconnect.initial_delay;
            }

            watch_debug!("Reconnecting progress channel in {:?}", delay);
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, reconnect);
        }
    }

    async fn session(
        &self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
        connected: &mut bool,
    ) -> Result<SessionEnd, ChannelError> {
        let url = self.settings.socket_url();
        let connect = tokio::time::timeout(
            self.settings.connect_timeout,
            connect_async(url.as_str()),
        );
        let (mut socket, _response) = tokio::select! {
            _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            result = connect => match result {
                Ok(Ok(pair)) => pair,
                Ok(Err(err)) => return Err(ChannelError::Connect(err.to_string())),
                Err(_) => return Err(ChannelError::Connect("timed out".to_string())),
            },
        };
        watch_debug!("WebSocket open at {}", url);

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = socket.close(None).await;
                    return Ok(SessionEnd::Cancelled);
                }
                frame = socket.next() => frame,
            };
            let message = match frame {
                None => return Ok(SessionEnd::Closed),
                Some(Ok(message)) => message,
                Some(Err(err)) => return Err(ChannelError::Receive(err.to_string())),
            };
            match message {
                Message::Text(text) => {
                    let flow = self
                        .handle_text(text.as_str(), &mut socket, sink, connected)
                        .await?;
                    if let Flow::Stop = flow {
                        return Ok(SessionEnd::Closed);
                    }
                }
                Message::Close(frame) => {
                    watch_debug!("WebSocket close frame: {:?}", frame);
                    return Ok(SessionEnd::Closed);
                }
                Message::Binary(_) => {
                    watch_trace!("Ignoring binary frame");
                }
                // Handled by tungstenite.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn handle_text(
        &self,
        text: &str,
        socket: &mut Socket,
        sink: &dyn ProgressSink,
        connected: &mut bool,
    ) -> Result<Flow, ChannelError> {
        let packet = match decode_engine(text) {
            Ok(packet) => packet,
            Err(err) => {
                watch_warn!("Dropping undecodable frame {:?}: {}", text, err);
                return Ok(Flow::Continue);
            }
        };
        match packet {
            EnginePacket::Open(handshake) => {
                watch_debug!("Engine.IO handshake: {}", handshake);
                send_text(socket, CONNECT_DEFAULT_NAMESPACE).await?;
                Ok(Flow::Continue)
            }
            EnginePacket::Ping(data) => {
                send_text(socket, &encode_pong(&data)).await?;
                Ok(Flow::Continue)
            }
            EnginePacket::Close => Ok(Flow::Stop),
            EnginePacket::Message(body) => self.handle_socket_packet(&body, sink, connected),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
                Ok(Flow::Continue)
            }
        }
    }

    fn handle_socket_packet(
        &self,
        body: &str,
        sink: &dyn ProgressSink,
        connected: &mut bool,
    ) -> Result<Flow, ChannelError> {
        let packet = match decode_socket(body) {
            Ok(packet) => packet,
            Err(err) => {
                watch_warn!("Dropping undecodable packet {:?}: {}", body, err);
                return Ok(Flow::Continue);
            }
        };
        match packet {
            SocketPacket::Connect { namespace } if namespace == DEFAULT_NAMESPACE => {
                watch_info!("Subscribed to {:?} events", self.settings.event_name);
                *connected = true;
                sink.emit(EngineEvent::Channel(ChannelStatus::Connected));
            }
            SocketPacket::Event {
                namespace,
                name,
                args,
                ..
            } if namespace == DEFAULT_NAMESPACE && name == self.settings.event_name => {
                if let Some(event) = decode_progress(args) {
                    sink.emit(EngineEvent::Progress(event));
                }
            }
            SocketPacket::Event { name, .. } => {
                watch_trace!("Ignoring event {:?}", name);
            }
            SocketPacket::ConnectError { message, .. } => {
                return Err(ChannelError::Refused(message));
            }
            SocketPacket::Disconnect { namespace } if namespace == DEFAULT_NAMESPACE => {
                return Ok(Flow::Stop);
            }
            SocketPacket::Connect { .. }
            | SocketPacket::Disconnect { .. }
            | SocketPacket::Ack { .. } => {}
        }
        Ok(Flow::Continue)
    }
}

/// First event argument as a progress payload. Malformed payloads are logged and dropped.
fn decode_progress(args: Vec<Value>) -> Option<ProgressEvent> {
    let payload = args.into_iter().next()?;
    match serde_json::from_value::<ProgressEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            watch_warn!("Dropping malformed progress payload: {}", err);
            None
        }
    }
}

async fn send_text(socket: &mut Socket, text: &str) -> Result<(), ChannelError> {
    socket
        .send(Message::text(text))
        .await
        .map_err(|err| ChannelError::Send(err.to_string()))
}
