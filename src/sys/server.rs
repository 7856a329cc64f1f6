use crate::events::{AppEvent, ControlCommand};
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/skipwheel.sock";

/// Accepts newline-separated [`ControlCommand`]s on [`SOCKET_PATH`].
pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let mut lines = BufReader::new(read_half).lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = match line.parse::<ControlCommand>() {
                            Ok(cmd) => {
                                if tx.send(AppEvent::Control(cmd)).await.is_err() {
                                    break;
                                }
                                "ok\n".to_string()
                            }
                            Err(e) => {
                                log::warn!("Control socket: {}", e);
                                format!("error: {e}\n")
                            }
                        };
                        if write_half.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
