// Observer server - Newline-delimited JSON over TCP
//
// Each observer gets the latest snapshot and marker list on connect, then
// every broadcast in order. Lines sent by the observer are command messages.

use crate::messaging::broadcast::Broadcast;
use crate::messaging::channels::{BroadcastGateway, CommandSender};
use crate::messaging::command::HudCommand;
use log::{debug, info, trace, warn};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;

/// Observer connection errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accept observers forever
///
/// Must run inside a `tokio::task::LocalSet`.
pub async fn serve(
    listener: TcpListener,
    gateway: BroadcastGateway,
    commands: CommandSender,
) -> Result<(), ServerError> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Observer connected: {}", addr);

        let gateway = gateway.clone();
        let commands = commands.clone();
        tokio::task::spawn_local(async move {
            if let Err(e) = handle_observer(stream, gateway, commands).await {
                warn!("Observer {} dropped: {}", addr, e);
            }
            info!("Observer disconnected: {}", addr);
        });
    }
}

/// Serve one observer until it disconnects
pub async fn handle_observer(
    stream: TcpStream,
    gateway: BroadcastGateway,
    commands: CommandSender,
) -> Result<(), ServerError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    // Raw bytes: a line that is not UTF-8 is still a line to skip, not a reason to hang up
    let mut line = Vec::new();

    let subscription = gateway.subscribe();
    for message in &subscription.catch_up {
        write_message(&mut writer, message).await?;
    }

    let mut receiver = subscription.receiver;
    loop {
        tokio::select! {
            message = receiver.recv() => match message {
                Ok(message) => write_message(&mut writer, &message).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Observer too slow, {} broadcasts skipped", skipped);
                }
                Err(RecvError::Closed) => return Ok(()),
            },
            // Partial reads stay in `line` if the other branch wins
            read = reader.read_until(b'\n', &mut line) => {
                if read? == 0 {
                    return Ok(());
                }
                forward_command(&String::from_utf8_lossy(&line), &commands).await;
                line.clear();
            }
        }
    }
}

/// Decode an inbound line and hand it to the event loop
///
/// Malformed messages are logged and dropped; observers never get an error back.
async fn forward_command(line: &str, commands: &CommandSender) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match HudCommand::from_json(line) {
        Ok(command) => {
            if commands.send(command).await.is_err() {
                debug!("Command channel closed, dropping observer command");
            }
        }
        Err(e) => warn!("Ignoring malformed command {:?}: {}", line, e),
    }
}

/// Write one message as a JSON line
pub async fn write_message<W>(writer: &mut W, message: &Broadcast) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    trace!("Sending {} to observer", message.event_name());
    let mut line = message.to_json()?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
