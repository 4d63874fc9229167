//! Moves two entities through a startup phase and a few update frames,
//! logging every system batch.
//!
//! Run with: RUST_LOG=debug cargo run --example movement --features profiling

use phase_ecs::prelude::*;

/// Prints where every entity ended up
struct Report;

impl System for Report {
    type Data = (Position,);

    fn name(&self) -> &str {
        "Report"
    }

    fn update(&mut self, store: &mut ComponentStore, query: &Query<(Position,)>) -> Result<()> {
        if let Some((position,)) = query.components(store) {
            tracing::info!(entity = query.entity().id(), x = position.0.x, y = position.0.y, "position");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    phase_ecs::profiling::init_stdout()?;

    let mut app = App::with_config(AppConfig {
        log_steps: true,
        ..AppConfig::default()
    });

    app.spawn_bundle(Some(10), (Position::new(0.0, 0.0), Velocity::new(1.0, 1.0)))?;
    app.spawn_bundle(Some(15), (Position::new(5.0, 5.0), Velocity::new(-1.0, -1.0)))?;
    app.spawn_bundle(None, (Position::new(2.0, 2.0),))?;

    let startup = Startup::shared();
    let frames = Repeat::shared("Frames", Update::ORDER, 3);
    let teardown = Repeat::shared("Teardown", 2, 1);

    app.add_hook(LoggingHook)
        .add_system(&startup, |_| Report)
        .add_system(&frames, |_| Movement)
        .add_system(&teardown, |_| Report);

    app.run()
}
