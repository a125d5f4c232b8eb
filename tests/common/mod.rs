//! Integration test common infrastructure.
//!
//! Provides store backends with injectable faults, roster builders, and a
//! scripted IRC server for driving a live bot session.

pub mod backends;
pub mod server;

#[allow(unused_imports)]
pub use backends::ScriptedBackend;
#[allow(unused_imports)]
pub use server::{FakeServer, ServerConn};

use infobot::directory::Directory;
use infobot::membership::{Membership, RosterSnapshot};
use infobot::router::{Incoming, Reply, Router};
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub const CHANNEL: &str = "#chan";

/// Roster for [`CHANNEL`] built from a NAMES-style list (`"@alice bob"`).
#[allow(dead_code)]
pub fn roster(names: &str) -> RosterSnapshot {
    let membership = Membership::new(CHANNEL);
    membership.add_names(names);
    membership.snapshot()
}

/// Router over `backend` with a short store timeout.
#[allow(dead_code)]
pub fn router(backend: Arc<ScriptedBackend>) -> Router {
    let directory = Directory::new(backend, Duration::from_millis(100));
    Router::new(directory, CHANNEL)
}

/// Send `text` to the channel as `sender` and return the reply text.
#[allow(dead_code)]
pub async fn say(
    router: &Router,
    roster: &RosterSnapshot,
    sender: &str,
    text: &str,
) -> Option<String> {
    let incoming = Incoming {
        sender,
        channel: CHANNEL,
        text,
        is_direct: false,
    };
    router.handle(&incoming, roster).await.map(|r| r.text)
}

/// Send `text` to the bot privately as `sender`.
#[allow(dead_code)]
pub async fn whisper(
    router: &Router,
    roster: &RosterSnapshot,
    sender: &str,
    text: &str,
) -> Option<Reply> {
    let incoming = Incoming {
        sender,
        channel: "infobot",
        text,
        is_direct: true,
    };
    router.handle(&incoming, roster).await
}
