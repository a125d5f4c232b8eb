//! Integration tests for a full bot session over TCP.

mod common;

use common::{CHANNEL, FakeServer, ScriptedBackend, ServerConn, router};
use infobot::bot::{self, Bot};
use infobot::config::Config;
use infobot::error::BotError;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Session {
    conn: ServerConn,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), BotError>>,
}

fn config(port: u16, autorejoin: bool) -> Config {
    Config::from_toml(&format!(
        r##"
channel = "{CHANNEL}"
autorejoin = {autorejoin}

[irc]
host = "127.0.0.1"
port = {port}
nick = "infobot"
realname = "Channel directory"

[store]
backend = "memory"
"##
    ))
    .expect("test config parses")
}

/// Start a bot against a fresh fake server and play the welcome burst.
async fn start(names: &str, autorejoin: bool) -> anyhow::Result<Session> {
    let server = FakeServer::bind().await?;
    let config = config(server.port(), autorejoin);
    let mut bot = Bot::new(&config, router(Arc::new(ScriptedBackend::new())));

    let stream = bot::connect(&config.irc).await?;
    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        bot::run_session(stream, &mut bot, shutdown).await
    });

    let mut conn = server.accept().await?;
    conn.welcome("infobot", CHANNEL, names).await?;

    Ok(Session {
        conn,
        shutdown: Some(tx),
        task,
    })
}

#[tokio::test]
async fn test_registration_handshake() {
    let server = FakeServer::bind().await.unwrap();
    let config = config(server.port(), false);
    let mut bot = Bot::new(&config, router(Arc::new(ScriptedBackend::new())));
    let stream = bot::connect(&config.irc).await.unwrap();
    let task = tokio::spawn(async move {
        bot::run_session(stream, &mut bot, std::future::pending()).await
    });

    let mut conn = server.accept().await.unwrap();
    let nick = conn.recv().await.unwrap();
    assert!(nick.is("NICK"));
    assert_eq!(nick.param(0), Some("infobot"));

    let user = conn.recv().await.unwrap();
    assert!(user.is("USER"));
    assert_eq!(user.param(3), Some("Channel directory"));

    conn.send_raw(":irc.test 433 * infobot :Nickname is already in use")
        .await
        .unwrap();
    let retry = conn.recv().await.unwrap();
    assert!(retry.is("NICK"));
    assert_eq!(retry.param(0), Some("infobot_"));

    conn.send_raw(":irc.test 001 infobot_ :Welcome").await.unwrap();
    let join = conn.recv().await.unwrap();
    assert!(join.is("JOIN"));
    assert_eq!(join.param(0), Some(CHANNEL));

    task.abort();
}

#[tokio::test]
async fn test_erroneous_nick_ends_session() {
    let server = FakeServer::bind().await.unwrap();
    let config = config(server.port(), false);
    let mut bot = Bot::new(&config, router(Arc::new(ScriptedBackend::new())));
    let stream = bot::connect(&config.irc).await.unwrap();
    let task = tokio::spawn(async move {
        bot::run_session(stream, &mut bot, std::future::pending()).await
    });

    let mut conn = server.accept().await.unwrap();
    conn.recv_until(|m| m.is("USER")).await.unwrap();
    conn.send_raw(":irc.test 432 * infobot :Erroneous Nickname")
        .await
        .unwrap();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(BotError::NickRejected { .. })));
}

#[tokio::test]
async fn test_ping_pong() {
    let mut session = start("", false).await.unwrap();

    session.conn.send_raw("PING :irc.test").await.unwrap();
    let pong = session.conn.recv().await.unwrap();
    assert!(pong.is("PONG"));
    assert_eq!(pong.param(0), Some("irc.test"));
}

#[tokio::test]
async fn test_commands_round_trip() {
    let mut session = start("@mod alice", false).await.unwrap();
    let conn = &mut session.conn;

    conn.send_raw(":alice!a@test PRIVMSG #chan :.add writes rust")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert!(reply.is("PRIVMSG"));
    assert_eq!(reply.param(0), Some(CHANNEL));
    assert_eq!(reply.param(1), Some("Set info: writes rust"));

    conn.send_raw(":mod!m@test PRIVMSG infobot :.freeze alice")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(0), Some("mod"));
    assert_eq!(reply.param(1), Some("Froze info for alice."));

    conn.send_raw(":alice!a@test PRIVMSG #chan :.add something else")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(1), Some("Only mods can do this."));

    conn.send_raw(":bob!b@test PRIVMSG #chan :.info alice")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(1), Some("alice: writes rust"));
}

#[tokio::test]
async fn test_chatter_gets_no_reply() {
    let mut session = start("alice", false).await.unwrap();

    session
        .conn
        .send_raw(":alice!a@test PRIVMSG #chan :good morning")
        .await
        .unwrap();
    session
        .conn
        .send_raw(":alice!a@test NOTICE #chan :.help")
        .await
        .unwrap();
    session.conn.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_operator_status_follows_mode_changes() {
    let mut session = start("@mod alice", false).await.unwrap();
    let conn = &mut session.conn;

    conn.send_raw(":mod!m@test MODE #chan +o alice").await.unwrap();
    conn.send_raw(":mod!m@test MODE #chan -o mod").await.unwrap();

    conn.send_raw(":mod!m@test PRIVMSG #chan :.freeze bob")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(1), Some("Only mods can do this."));

    conn.send_raw(":alice!a@test PRIVMSG #chan :.freeze bob")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(1), Some("Froze info for bob."));
}

#[tokio::test]
async fn test_operator_loses_status_on_part() {
    let mut session = start("@mod", false).await.unwrap();
    let conn = &mut session.conn;

    conn.send_raw(":mod!m@test PART #chan :brb").await.unwrap();
    conn.send_raw(":mod!m@test PRIVMSG infobot :.freeze bob")
        .await
        .unwrap();
    let reply = conn.recv().await.unwrap();
    assert_eq!(reply.param(1), Some("Only mods can do this."));
}

#[tokio::test]
async fn test_autorejoin_after_kick() {
    let mut session = start("@mod", true).await.unwrap();
    let conn = &mut session.conn;

    conn.send_raw(":mod!m@test KICK #chan infobot :begone")
        .await
        .unwrap();

    let join = conn.recv().await.unwrap();
    assert!(join.is("JOIN"));
    assert_eq!(join.param(0), Some(CHANNEL));

    let notice = conn.recv().await.unwrap();
    assert!(notice.is("PRIVMSG"));
    assert_eq!(notice.param(0), Some(CHANNEL));
    assert_eq!(
        notice.param(1),
        Some("mod: I automatically rejoin to prevent people from accidentally kicking me.")
    );
}

#[tokio::test]
async fn test_no_rejoin_when_disabled() {
    let mut session = start("@mod", false).await.unwrap();

    session
        .conn
        .send_raw(":mod!m@test KICK #chan infobot :begone")
        .await
        .unwrap();
    session.conn.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_sends_quit() {
    let mut session = start("", false).await.unwrap();

    if let Some(tx) = session.shutdown.take() {
        let _ = tx.send(());
    }
    let quit = session.conn.recv().await.unwrap();
    assert!(quit.is("QUIT"));

    let result = session.task.await.unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_server_error_ends_session() {
    let mut session = start("", false).await.unwrap();

    session
        .conn
        .send_raw("ERROR :Closing Link: infobot (K-Lined)")
        .await
        .unwrap();
    let result = session.task.await.unwrap();
    assert!(matches!(result, Err(BotError::ServerClosed(reason)) if reason.contains("K-Lined")));
}

#[tokio::test]
async fn test_disconnect_ends_session() {
    let session = start("", false).await.unwrap();

    drop(session.conn);
    let result = session.task.await.unwrap();
    assert!(matches!(result, Err(BotError::Disconnected)));
}

#[tokio::test]
async fn test_connect_refused() {
    let port = {
        let server = FakeServer::bind().await.unwrap();
        server.port()
    };
    let config = config(port, false);
    let result = bot::connect(&config.irc).await;
    assert!(matches!(result, Err(BotError::Connect { .. })));
}
