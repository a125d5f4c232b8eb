//! Reply texts.

pub const ONLY_MODS: &str = "Only mods can do this.";

pub const STORE_FAILURE: &str = "Something went wrong talking to the info store. Try again later.";

pub fn info_set(info: &str) -> String {
    format!("Set info: {info}")
}

pub fn no_info(name: &str) -> String {
    format!("No info found for {name}.")
}

pub fn info_line(name: &str, info: &str) -> String {
    format!("{name}: {info}")
}

pub fn deleted(name: &str) -> String {
    format!("Deleted info for {name}.")
}

pub fn deleted_flag_kept(name: &str) -> String {
    format!("Deleted info for {name}, but its freeze flag could not be cleared.")
}

pub fn already_frozen(name: &str) -> String {
    format!("The info for {name} was already frozen.")
}

pub fn froze(name: &str) -> String {
    format!("Froze info for {name}.")
}

pub fn unfroze(name: &str) -> String {
    format!("Unfroze info for {name}.")
}

pub fn not_frozen(name: &str) -> String {
    format!("The info for {name} was not frozen.")
}

pub fn set_for(name: &str) -> String {
    format!("Set info for {name}.")
}

pub fn invalid_name(name: &str) -> String {
    format!("{name} is not a valid name.")
}
