//! Every line the player can be shown. Handlers answer with these so tests
//! and the dispatcher agree on the exact wording.

pub static MSG_UNKNOWN_COMMAND: &str = "unknown command";

pub static MSG_NO_DIRECTION: &str = "no direction given";

pub static MSG_NO_ITEM: &str = "no item given";

pub static MSG_NO_ITEMS: &str = "need an item and a target";

pub static MSG_NOWHERE_TO_PUT: &str = "nowhere to put it";

pub static MSG_NO_SUCH_THING: &str = "no such thing";

pub static MSG_CANNOT_WEAR: &str = "cannot wear";

pub static MSG_DOOR_CLOSED: &str = "door is closed";

pub static MSG_NOTHING_TO_APPLY: &str = "nothing to apply to";

pub static MSG_EMPTY_ROOM: &str = "empty room";

pub static MSG_CANNOT_APPLY: &str = "cannot apply";

pub static MSG_APPLIED: &str = "applied";

/// Surfaced when an internal failure was swallowed; distinct from every
/// legitimate reply.
pub static MSG_NOTHING_HAPPENS: &str = "nothing happens";

/// Fallback reply for a prevented entry whose payload carries no message.
pub static MSG_CANNOT_ENTER: &str = "you cannot enter";

pub fn no_path(direction: &str) -> String {
    format!("no path to {}", direction)
}

pub fn added_to_inventory(name: &str) -> String {
    format!("added to inventory: {}", name)
}

pub fn dropped(name: &str) -> String {
    format!("dropped: {}", name)
}

pub fn now_wearing(name: &str) -> String {
    format!("you put on: {}", name)
}

pub fn not_in_inventory(name: &str) -> String {
    format!("not in inventory - {}", name)
}
