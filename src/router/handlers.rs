//! Per-command handlers.
//!
//! Each handler checks privileges before touching the store and returns the
//! reply text. `Err` is reserved for store failures.

use tracing::{info, warn};

use super::command::Command;
use super::{Router, replies};
use crate::directory::{Identity, IdentityError};
use crate::membership::RosterSnapshot;
use crate::store::StoreError;

type HandlerResult = Result<String, StoreError>;

/// Reply for a name that cannot be stored under.
fn rejected_name(raw: &str, err: &IdentityError) -> String {
    match err {
        IdentityError::Empty => replies::invalid_name(raw.trim()),
        IdentityError::Reserved(name) => replies::invalid_name(name),
    }
}

impl Router {
    pub(super) async fn execute(
        &self,
        command: Command,
        caller: &str,
        roster: &RosterSnapshot,
    ) -> HandlerResult {
        match command {
            Command::Add { info } => self.add_info(caller, &info, roster).await,
            Command::Info { name } => self.get_info(&name).await,
            Command::Delete { name } => self.delete_info(caller, &name, roster).await,
            Command::Freeze { name } => self.freeze_info(caller, &name, roster).await,
            Command::Unfreeze { name } => self.unfreeze_info(caller, &name, roster).await,
            Command::Set { name, info } => self.set_info(caller, &name, &info, roster).await,
            Command::Usage(topic) => Ok(topic.text().to_string()),
        }
    }

    /// Store info for the caller. A frozen caller needs operator status.
    async fn add_info(&self, caller: &str, info: &str, roster: &RosterSnapshot) -> HandlerResult {
        let id = match Identity::parse(caller) {
            Ok(id) => id,
            Err(e) => return Ok(rejected_name(caller, &e)),
        };

        if self.directory.is_frozen(&id).await? && !self.is_operator(roster, caller) {
            info!(nick = %caller, "Refused info update for frozen entry");
            return Ok(replies::ONLY_MODS.to_string());
        }

        self.directory.set_entry(&id, info).await?;
        Ok(replies::info_set(info))
    }

    /// Look up an entry. Reserved names never resolve.
    async fn get_info(&self, name: &str) -> HandlerResult {
        let id = match Identity::parse(name) {
            Ok(id) => id,
            Err(_) => return Ok(replies::no_info(name.trim())),
        };

        Ok(match self.directory.get_entry(&id).await? {
            Some(info) => replies::info_line(id.display(), &info),
            None => replies::no_info(id.display()),
        })
    }

    /// Remove an entry and its freeze flag.
    async fn delete_info(&self, caller: &str, name: &str, roster: &RosterSnapshot) -> HandlerResult {
        if !self.is_operator(roster, caller) {
            return Ok(replies::ONLY_MODS.to_string());
        }
        let id = match Identity::parse(name) {
            Ok(id) => id,
            Err(e) => return Ok(rejected_name(name, &e)),
        };

        if self.directory.get_entry(&id).await?.is_none() {
            return Ok(replies::no_info(id.display()));
        }

        self.directory.delete_entry(&id).await?;
        info!(by = %caller, name = %id, "Deleted entry");

        if let Err(e) = self.directory.delete_freeze_flag(&id).await {
            warn!(
                by = %caller,
                name = %id,
                error = %e,
                "Entry deleted but its freeze flag could not be cleared"
            );
            crate::metrics::record_command_error("delete", e.error_code());
            return Ok(replies::deleted_flag_kept(id.display()));
        }

        Ok(replies::deleted(id.display()))
    }

    async fn freeze_info(&self, caller: &str, name: &str, roster: &RosterSnapshot) -> HandlerResult {
        if !self.is_operator(roster, caller) {
            return Ok(replies::ONLY_MODS.to_string());
        }
        let id = match Identity::parse(name) {
            Ok(id) => id,
            Err(e) => return Ok(rejected_name(name, &e)),
        };

        if self.directory.is_frozen(&id).await? {
            return Ok(replies::already_frozen(id.display()));
        }

        self.directory.set_frozen(&id, true).await?;
        info!(by = %caller, name = %id, "Froze entry");
        Ok(replies::froze(id.display()))
    }

    async fn unfreeze_info(
        &self,
        caller: &str,
        name: &str,
        roster: &RosterSnapshot,
    ) -> HandlerResult {
        if !self.is_operator(roster, caller) {
            return Ok(replies::ONLY_MODS.to_string());
        }
        let id = match Identity::parse(name) {
            Ok(id) => id,
            Err(e) => return Ok(rejected_name(name, &e)),
        };

        if !self.directory.is_frozen(&id).await? {
            return Ok(replies::not_frozen(id.display()));
        }

        self.directory.set_frozen(&id, false).await?;
        info!(by = %caller, name = %id, "Unfroze entry");
        Ok(replies::unfroze(id.display()))
    }

    /// Operator override: ignores the freeze flag.
    async fn set_info(
        &self,
        caller: &str,
        name: &str,
        info: &str,
        roster: &RosterSnapshot,
    ) -> HandlerResult {
        if !self.is_operator(roster, caller) {
            return Ok(replies::ONLY_MODS.to_string());
        }
        let id = match Identity::parse(name) {
            Ok(id) => id,
            Err(e) => return Ok(rejected_name(name, &e)),
        };

        self.directory.set_entry(&id, info).await?;
        info!(by = %caller, name = %id, "Set entry");
        Ok(replies::set_for(id.display()))
    }
}
