use crate::domain::WorldState;
use crate::kernel::DomainError;

pub fn register(world: &mut WorldState) {
    world.register_command("look", |world, _args| look(world));
}

fn look(world: &mut WorldState) -> Result<String, DomainError> {
    let current = world
        .player()
        .room()
        .map(str::to_owned)
        .ok_or(DomainError::PlayerNowhere)?;
    world.room_overview(&current)
}
