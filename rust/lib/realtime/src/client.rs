//! Websocket transport for row-change channels.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::RealtimeError;
use crate::protocol::{self, ChangeEvent, ChangeFilter, Frame, Incoming, PROTOCOL_VSN};
use crate::subscription::Subscription;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct RealtimeClient {
    endpoint: String,
    api_key: String,
    heartbeat: Duration,
}

impl RealtimeClient {
    /// `endpoint` is the websocket URL, e.g. `wss://x.supabase.co/realtime/v1/websocket`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            heartbeat: HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat = interval;
        self
    }

    pub fn socket_url(&self) -> String {
        format!("{}?apikey={}&vsn={}", self.endpoint, self.api_key, PROTOCOL_VSN)
    }

    /// Open a socket, join `channel` with `filter`, and deliver each inserted
    /// row decoded as `T`.
    ///
    /// The connection lives in a spawned task that runs until the returned
    /// handle is dropped or the server closes the channel. Either way the
    /// task sends `phx_leave` before closing the socket.
    ///
    /// Rows that fail to decode are logged and skipped. The channel is not
    /// re-established after the server closes it.
    pub async fn subscribe_inserts<T>(
        &self,
        channel: &str,
        filter: ChangeFilter,
        access_token: Option<String>,
    ) -> Result<Subscription<T>, RealtimeError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (ws, _) = connect_async(self.socket_url()).await?;
        let (mut write, mut read) = ws.split();

        let topic = protocol::topic_for(channel);
        let join = protocol::join_frame(&topic, &[filter], access_token.as_deref(), 1);
        write.send(encode(&join)?).await?;
        info!(%topic, "realtime channel joining");

        let (tx, rx) = mpsc::channel(BUFFER);
        let heartbeat = self.heartbeat;

        let task = tokio::spawn(async move {
            let mut next_ref: u64 = 2;
            let mut ticker = tokio::time::interval(heartbeat);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let frame = protocol::heartbeat_frame(next_ref);
                        next_ref += 1;
                        let sent = match encode(&frame) {
                            Ok(msg) => write.send(msg).await.map_err(RealtimeError::from),
                            Err(e) => Err(e),
                        };
                        if let Err(e) = sent {
                            warn!(%topic, error = %e, "heartbeat failed");
                            break;
                        }
                    }
                    _ = tx.closed() => {
                        debug!(%topic, "subscriber gone");
                        break;
                    }
                    msg = read.next() => {
                        let text = match msg {
                            Some(Ok(Message::Text(text))) => text,
                            Some(Ok(Message::Close(_))) | None => {
                                info!(%topic, "realtime socket closed");
                                break;
                            }
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                warn!(%topic, error = %e, "realtime socket error");
                                break;
                            }
                        };
                        let frame: Frame = match serde_json::from_str(&text) {
                            Ok(f) => f,
                            Err(e) => {
                                warn!(%topic, error = %e, "undecodable frame");
                                continue;
                            }
                        };
                        match protocol::classify(frame, &topic) {
                            Incoming::Change(change) if change.event == ChangeEvent::Insert => {
                                match serde_json::from_value::<T>(change.record) {
                                    Ok(row) => {
                                        if tx.send(row).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => warn!(%topic, error = %e, "undecodable row"),
                                }
                            }
                            Incoming::Reply { reference, ok: false, response } => {
                                warn!(%topic, ?reference, %response, "push rejected");
                            }
                            Incoming::Reply { reference, ok: true, .. } if reference.as_deref() == Some("1") => {
                                info!(%topic, "realtime channel joined");
                            }
                            Incoming::Closed { reason } => {
                                warn!(%topic, %reason, "realtime channel closed");
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }

            if let Ok(msg) = encode(&protocol::leave_frame(&topic, next_ref)) {
                let _ = write.send(msg).await;
            }
            let _ = write.close().await;
        });

        Ok(Subscription::with_task(rx, task))
    }
}

fn encode(frame: &Frame) -> Result<Message, RealtimeError> {
    Ok(Message::Text(serde_json::to_string(frame)?))
}
