use tracing::info;

use crate::domain::{WorldState, BARRIER_ROOM};
use crate::kernel::DomainError;
use crate::replies::{self, MSG_DOOR_CLOSED, MSG_NO_DIRECTION};

pub fn register(world: &mut WorldState) {
    world.register_command("go", |world, args| {
        let Some(direction) = args.first() else {
            return Ok(MSG_NO_DIRECTION.to_owned());
        };
        go(world, direction)
    });
}

fn go(world: &mut WorldState, direction: &str) -> Result<String, DomainError> {
    let current = world
        .player()
        .room()
        .map(str::to_owned)
        .ok_or(DomainError::PlayerNowhere)?;
    let room = world
        .room(&current)
        .ok_or_else(|| DomainError::UnknownRoom(current.clone()))?;
    let Some(next) = room.exit_to(direction).map(str::to_owned) else {
        return Ok(replies::no_path(direction));
    };
    // The one passage gated by a session flag instead of a trait.
    if next == BARRIER_ROOM && !world.barrier_open() {
        return Ok(MSG_DOOR_CLOSED.to_owned());
    }
    world.set_last_verb("go");
    info!(%direction, from = %current, "go");
    world.move_player(&next)
}
