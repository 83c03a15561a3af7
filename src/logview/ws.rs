use std::path::PathBuf;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};

use super::{tail_lines, LogFollower};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Send a backlog, then stream appended lines until the client goes away
pub async fn stream_logs<F>(socket: WebSocket, locate: F, backlog: usize)
where
    F: Fn() -> PathBuf + Send + Sync + 'static,
{
    let (mut sender, mut receiver) = socket.split();

    let path = locate();
    let initial = match tokio::task::spawn_blocking(move || tail_lines(&path, backlog)).await {
        Ok(Ok(lines)) => lines,
        Ok(Err(e)) => {
            tracing::warn!("Could not read log backlog: {}", e);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Log backlog task failed: {}", e);
            Vec::new()
        }
    };

    let mut follower = LogFollower::from_end(locate).await;

    for line in initial {
        if sender.send(Message::Text(line)).await.is_err() {
            return;
        }
    }

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match follower.poll().await {
                    Ok(lines) => {
                        for line in lines {
                            if sender.send(Message::Text(line)).await.is_err() {
                                tracing::debug!("Log viewer disconnected");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %follower.path().display(), "Log follow failed: {}", e);
                    }
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(payload))) => {
                        if sender.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("Log viewer socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!("Log viewer session ended");
}
