//! Three members exchanging messages through a mediator.
//!
//! Run with `cargo run -p conveyor --example chat`.

use conveyor::prelude::*;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_development()
        .with_env_prefix("CONVEYOR")
        .load()?;
    init_logging(&config.logging)?;

    let mut room = ChatRoom::new();
    for name in ["Kim", "Lee", "Park"] {
        room.add_user(name)?;
    }

    room.send("Kim", "I am Kim")?;
    room.send("Lee", "I am Lee")?;

    room.remove_user("Park")?;
    let delivered = room.send("Kim", "Park left")?;

    for name in room.members() {
        for Message { from, body } in room.inbox(name)? {
            info!(user = name, from = %from, body = %body, "inbox");
        }
    }
    info!(delivered, "last message fan-out");
    Ok(())
}
