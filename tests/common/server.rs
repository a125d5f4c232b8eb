//! Scripted IRC server.
//!
//! Accepts one bot connection and lets the test play the server side line
//! by line.

use infobot_proto::Message;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

pub const SERVER_NAME: &str = "irc.test";

/// A listening fake server on an ephemeral port.
pub struct FakeServer {
    listener: TcpListener,
}

#[allow(dead_code)]
impl FakeServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }
}

/// The server side of one bot connection.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

#[allow(dead_code)]
impl ServerConn {
    /// Send a raw IRC line to the bot.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the bot.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("bot closed the connection");
        }
        line.trim_end()
            .parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive lines until `predicate` matches, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// Expect nothing from the bot for a short while.
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        match self.recv_timeout(Duration::from_millis(200)).await {
            Ok(msg) => anyhow::bail!("unexpected line from bot: {msg}"),
            Err(_) => Ok(()),
        }
    }

    /// Play registration and the channel join burst.
    ///
    /// `names` is the RPL_NAMREPLY list (`"@alice bob"`); the bot's own nick
    /// is added to it.
    pub async fn welcome(&mut self, nick: &str, channel: &str, names: &str) -> anyhow::Result<()> {
        self.recv_until(|m| m.is("USER")).await?;
        self.send_raw(&format!(":{SERVER_NAME} 001 {nick} :Welcome to the test network"))
            .await?;

        let join = self.recv().await?;
        anyhow::ensure!(
            join.is("JOIN") && join.param(0) == Some(channel),
            "expected JOIN {channel}, got {join}"
        );

        self.send_raw(&format!(":{nick}!bot@test JOIN {channel}")).await?;
        self.send_raw(&format!(":{SERVER_NAME} 353 {nick} = {channel} :{nick} {names}"))
            .await?;
        self.send_raw(&format!(":{SERVER_NAME} 366 {nick} {channel} :End of /NAMES list."))
            .await?;
        Ok(())
    }
}
