//! Integration tests for inbound command handling.
//!
//! Commands are fed as raw JSON text through the [`CommandRouter`], the
//! same path the `WebSocket` handler uses.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::sync::Arc;

use nbody_core::config::{NBodyConfig, WorldConfig};
use nbody_core::Simulation;
use nbody_gateway::state::AppState;
use nbody_gateway::transport::{ObserverId, WsSession};
use nbody_gateway::{CommandError, CommandOutcome};
use nbody_physics::PhysicsParams;

fn make_state() -> AppState {
    let mut config = NBodyConfig::default();
    config.world = WorldConfig {
        particle_count: 10,
        seed: Some(3),
        ..WorldConfig::default()
    };
    config.spawn.max_batch = 100;
    let sim = Arc::new(Simulation::new(PhysicsParams::default(), config.world.clone()));
    AppState::new(sim, &config)
}

fn session() -> (ObserverId, Arc<WsSession>, tokio::sync::mpsc::Receiver<String>) {
    let observer = ObserverId::new();
    let (session, rx) = WsSession::channel(observer, 8);
    (observer, Arc::new(session), rx)
}

#[tokio::test]
async fn fps_command_subscribes_observer() {
    let state = make_state();
    let (observer, session, mut rx) = session();

    let outcome = state
        .commands
        .handle_text(observer, &session, r#"{"type":"fps","fps":30}"#)
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Subscribed { fps: 30 });
    assert_eq!(state.scheduler.rate_of(observer).await, Some(30));
    let frame = rx.recv().await.unwrap();
    assert!(frame.starts_with(r#"{"bodies":["#));

    state.scheduler.shutdown().await;
}

#[tokio::test]
async fn non_positive_fps_is_rejected() {
    let state = make_state();
    let (observer, session, _rx) = session();

    for text in [r#"{"type":"fps","fps":0}"#, r#"{"type":"fps","fps":-4}"#] {
        let err = state
            .commands
            .handle_text(observer, &session, text)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidRate { .. }));
    }
    assert_eq!(state.scheduler.subscriber_count().await, 0);
}

#[tokio::test]
async fn create_bodies_appends_within_range() {
    let state = make_state();
    let (observer, session, _rx) = session();
    let before = state.simulation.len();

    let outcome = state
        .commands
        .handle_text(
            observer,
            &session,
            r#"{"type":"createBodies","count":5,"range":10.0,"blackHole":true}"#,
        )
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Created { count: 5 });
    let bodies = state.simulation.snapshot();
    assert_eq!(bodies.len(), before + 5);
    for body in &bodies[before..] {
        assert!(body.is_attractor());
        assert_eq!(body.mass, 5e5);
        for c in [body.x(), body.y(), body.z()] {
            assert!((-10.0..=10.0).contains(&c));
        }
        for c in [body.vx(), body.vy(), body.vz()] {
            assert!((-10.0..=10.0).contains(&c));
        }
    }
}

#[tokio::test]
async fn create_particles_by_default() {
    let state = make_state();
    let (observer, session, _rx) = session();

    state
        .commands
        .handle_text(
            observer,
            &session,
            r#"{"type":"createBodies","count":2,"range":0.0}"#,
        )
        .await
        .unwrap();

    let bodies = state.simulation.snapshot();
    let added = &bodies[bodies.len() - 2..];
    for body in added {
        assert!(!body.is_attractor());
        assert_eq!(body.mass, 1.0);
        assert_eq!(body.position.length(), 0.0);
        assert_eq!(body.velocity.length(), 0.0);
    }
}

#[tokio::test]
async fn velocity_range_override_applies() {
    let mut config = NBodyConfig::default();
    config.world.particle_count = 0;
    config.spawn.velocity_range = Some(0.5);
    let state = AppState::from_config(&config);
    let (observer, session, _rx) = session();

    state
        .commands
        .handle_text(
            observer,
            &session,
            r#"{"type":"createBodies","count":20,"range":100.0}"#,
        )
        .await
        .unwrap();

    for body in state.simulation.snapshot().iter().filter(|b| !b.is_attractor()) {
        for c in [body.vx(), body.vy(), body.vz()] {
            assert!((-0.5..=0.5).contains(&c));
        }
    }
}

#[tokio::test]
async fn invalid_counts_change_nothing() {
    let state = make_state();
    let (observer, session, _rx) = session();
    let before = state.simulation.len();

    for text in [
        r#"{"type":"createBodies","count":-1,"range":5.0,"blackHole":false}"#,
        r#"{"type":"createBodies","count":101,"range":5.0,"blackHole":false}"#,
    ] {
        let err = state
            .commands
            .handle_text(observer, &session, text)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidCount { limit: 100, .. }));
    }
    assert_eq!(state.simulation.len(), before);
}

#[tokio::test]
async fn delete_body_in_and_out_of_range() {
    let state = make_state();
    let (observer, session, _rx) = session();
    let before = state.simulation.len();

    let outcome = state
        .commands
        .handle_text(observer, &session, r#"{"type":"deleteBody","index":999}"#)
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::DeleteRejected { index: 999 });
    assert_eq!(state.simulation.len(), before);

    let outcome = state
        .commands
        .handle_text(observer, &session, r#"{"type":"deleteBody","index":-1}"#)
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::DeleteRejected { index: -1 });

    let second = state.simulation.snapshot()[2].clone();
    let outcome = state
        .commands
        .handle_text(observer, &session, r#"{"type":"deleteBody","index":1}"#)
        .await
        .unwrap();
    assert_eq!(outcome, CommandOutcome::Deleted { index: 1 });
    let after = state.simulation.snapshot();
    assert_eq!(after.len(), before - 1);
    assert_eq!(after[1], second);
}

#[tokio::test]
async fn reset_restores_initial_layout() {
    let state = make_state();
    let (observer, session, _rx) = session();
    let initial = state.simulation.len();

    state
        .commands
        .handle_text(
            observer,
            &session,
            r#"{"type":"createBodies","count":7,"range":1.0,"blackHole":false}"#,
        )
        .await
        .unwrap();
    state.simulation.step();

    let outcome = state
        .commands
        .handle_text(observer, &session, r#"{"type":"reset"}"#)
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Reset);
    assert_eq!(state.simulation.len(), initial);
    assert_eq!(state.simulation.step_count(), 0);
}

#[tokio::test]
async fn malformed_input_is_a_decode_error() {
    let state = make_state();
    let (observer, session, _rx) = session();
    let before = state.simulation.len();

    for text in [
        "not json",
        r#"{"type":"teleport"}"#,
        r#"{"type":"deleteBody"}"#,
        r#"{"fps":30}"#,
    ] {
        let err = state
            .commands
            .handle_text(observer, &session, text)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Decode(_)), "{text}");
    }
    assert_eq!(state.simulation.len(), before);
    assert_eq!(state.scheduler.subscriber_count().await, 0);
}
