use tracing::info;

use crate::domain::WorldState;
use crate::kernel::DomainError;
use crate::replies::{self, MSG_NOTHING_TO_APPLY, MSG_NO_ITEMS};

pub fn register(world: &mut WorldState) {
    world.register_command("use", |world, args| {
        if args.len() < 2 {
            return Ok(MSG_NO_ITEMS.to_owned());
        }
        apply(world, args[0], args[1])
    });
}

/// The source must be carried; the target must be physically present in the
/// current room, or failing that in the configured fallback room. Other
/// rooms are never searched.
fn apply(world: &mut WorldState, item: &str, target: &str) -> Result<String, DomainError> {
    if !world.player().has_item(item) {
        return Ok(replies::not_in_inventory(item));
    }
    let current = world
        .player()
        .room()
        .map(str::to_owned)
        .ok_or(DomainError::PlayerNowhere)?;
    let in_current = world
        .room(&current)
        .map(|room| room.has_item(target))
        .unwrap_or(false);
    let in_fallback = world
        .fallback_room()
        .and_then(|name| world.room(name))
        .map(|room| room.has_item(target))
        .unwrap_or(false);
    if !in_current && !in_fallback {
        return Ok(MSG_NOTHING_TO_APPLY.to_owned());
    }
    info!(%item, %target, "use");
    world.apply_interaction(item, target)
}
