//! Flagrush Server
//!
//! Runs the CTF engine with a scripted demo match so the moving parts
//! can be watched end to end: team join, pickup, carry, capture, win.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use flagrush::{
    command::{execute, Command, CommandContext},
    session::SessionManager,
    ArenaStore, CtfConfig, PlayerId, Transform, Vec3, TICK_RATE, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Flagrush Server v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_match().await
}

/// Demo function to exercise the engine.
async fn demo_match() -> Result<()> {
    info!("=== Starting Demo Match ===");

    let manager = SessionManager::new();
    let red_stand = Vec3::new(0.0, 64.0, 0.0);
    let blue_stand = Vec3::new(100.0, 64.0, 0.0);
    let id = manager
        .create_session(CtfConfig::default(), red_stand, blue_stand)
        .await;
    let session = manager
        .get_session(&id)
        .await
        .expect("session just created");

    let store_dir = std::env::temp_dir().join("flagrush-demo");
    let store = ArenaStore::new(&store_dir);
    info!("Arena store: {}", store_dir.display());

    // Watch engine events as collaborators would
    let mut events = {
        let s = session.read().await;
        s.subscribe_events()
    };
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(tick = event.tick, "event: {:?}", event.data);
        }
    });

    // Two players, one per team
    let scorer = PlayerId::random();
    let defender = PlayerId::random();
    let scorer_ctx = CommandContext {
        player: Some(scorer),
        position: Some(red_stand),
        transform: Some(Transform::at(red_stand)),
        privileged: false,
    };
    let defender_ctx = CommandContext {
        player: Some(defender),
        position: Some(blue_stand),
        transform: Some(Transform::at(blue_stand)),
        privileged: false,
    };
    let admin_ctx = CommandContext {
        player: Some(scorer),
        position: Some(red_stand),
        transform: Some(Transform::at(red_stand)),
        privileged: true,
    };

    // Arena setup: spawns and capture zones at the stands
    for (ctx, team) in [(&scorer_ctx, "red"), (&defender_ctx, "blue")] {
        run(&session, &store, ctx, Command::SetSpawn { team: team.into() }).await;
        run(
            &session,
            &store,
            ctx,
            Command::SetCapture { team: team.into(), radius: Some(3.0) },
        )
        .await;
    }
    run(&session, &store, &admin_ctx, Command::Save).await;
    run(
        &session,
        &store,
        &admin_ctx,
        Command::PresetSave { name: "demo-arena".into() },
    )
    .await;

    // Teams and match
    run(&session, &store, &scorer_ctx, Command::TeamJoin { team: "red".into() }).await;
    run(&session, &store, &defender_ctx, Command::TeamJoin { team: "blue".into() }).await;
    run(&session, &store, &admin_ctx, Command::SetLimit { limit: 1 }).await;
    run(&session, &store, &admin_ctx, Command::Start).await;

    // The red player raids the blue base and takes the flag
    {
        let mut s = session.write().await;
        s.update_position(scorer, blue_stand);
    }
    let raid_ctx = CommandContext {
        position: Some(blue_stand),
        ..scorer_ctx.clone()
    };
    run(&session, &store, &raid_ctx, Command::Pickup { team: "blue".into() }).await;
    run(&session, &store, &raid_ctx, Command::Status).await;

    // Carry it home; the tick resolves the capture
    {
        let mut s = session.write().await;
        s.update_position(scorer, Vec3::new(1.0, 64.0, 0.0));
        let result = s.run_tick();
        if result.match_ended {
            info!(winner = ?result.winner, "demo capture won the match");
        }
    }

    run(&session, &store, &admin_ctx, Command::Score).await;
    run(&session, &store, &admin_ctx, Command::Reset).await;

    manager.remove_session(&id).await;
    info!("=== Demo Complete ===");
    Ok(())
}

async fn run(
    session: &std::sync::Arc<tokio::sync::RwLock<flagrush::CtfSession>>,
    store: &ArenaStore,
    ctx: &CommandContext,
    command: Command,
) {
    let outcome = execute(session, store, ctx, command).await;
    for line in &outcome.lines {
        if outcome.success {
            info!("> {}", line);
        } else {
            info!("! {}", line);
        }
    }
}
