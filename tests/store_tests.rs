//! Integration tests for the configuration store.

use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use terra::config::ConfigField;
use terra::{Action, BoundaryCondition, ConfigDocument, InvalidReason, ResultSnapshot, SimConfig, Store};

// ============================================================================
// Log bookkeeping
// ============================================================================

#[test]
fn test_log_length_tracks_appends_since_last_clear() {
    let mut rng = rand::thread_rng();
    let mut store = Store::new();
    let mut expected = 0usize;

    for i in 0..500 {
        if rng.gen_bool(0.1) {
            store.dispatch(Action::ClearLog);
            expected = 0;
        } else {
            store.dispatch(Action::AppendLog(format!("[Info] line {i}")));
            expected += 1;
        }
        assert_eq!(store.runtime().log.len(), expected);
    }
}

#[test]
fn test_log_keeps_arrival_order() {
    let mut store = Store::new();
    for line in ["a", "b", "c"] {
        store.dispatch(Action::AppendLog(line.into()));
    }
    assert_eq!(store.runtime().log, vec!["a", "b", "c"]);
}

// ============================================================================
// Boundary conditions
// ============================================================================

#[test]
fn test_switching_away_from_lid_driven_zeroes_lid_velocity() {
    let mut store = Store::new();
    store.try_dispatch(Action::SetULid(2.5)).unwrap();
    assert_eq!(store.config().u_lid, 2.5);

    store.try_dispatch(Action::SetBcPattern(BoundaryCondition::PoiseuilleFlow)).unwrap();
    assert_eq!(store.config().bc_pattern, BoundaryCondition::PoiseuilleFlow);
    assert_eq!(store.config().u_lid, 0.0);

    // Switching back leaves the velocity for the operator to set again
    store.try_dispatch(Action::SetBcPattern(BoundaryCondition::CavityFlow)).unwrap();
    assert_eq!(store.config().u_lid, 0.0);
}

#[test]
fn test_only_cavity_flow_keeps_lid_velocity() {
    for pattern in BoundaryCondition::ALL {
        let mut store = Store::new();
        store.try_dispatch(Action::SetULid(5.0)).unwrap();
        store.try_dispatch(Action::SetBcPattern(pattern)).unwrap();
        let expected = if pattern == BoundaryCondition::CavityFlow { 5.0 } else { 0.0 };
        assert_eq!(store.config().u_lid, expected, "{pattern}");
    }
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejected_values_leave_state_untouched() {
    let mut store = Store::new();
    let before = store.state().clone();

    for action in [
        Action::SetMaxN(0),
        Action::SetULid(f64::NAN),
        Action::SetULid(-0.5),
        Action::SetOutFile(PathBuf::new()),
    ] {
        assert!(store.try_dispatch(action).is_err());
    }
    assert_eq!(store.state(), &before);
}

#[test]
fn test_monitor_particle_must_be_below_max_n() {
    let mut store = Store::new();
    store.try_dispatch(Action::SetMaxN(100)).unwrap();

    let err = store.try_dispatch(Action::SetMonitorParticle(100)).unwrap_err();
    assert_eq!(err.field, ConfigField::MonitorParticle);
    assert_eq!(err.reason, InvalidReason::OutOfRange);
    store.try_dispatch(Action::SetMonitorParticle(99)).unwrap();
}

#[test]
fn test_max_n_cannot_drop_below_monitor_particle() {
    let mut store = Store::new();
    let before = store.state().clone();
    assert_eq!(before.config.monitor_particle, 10);

    let err = store.try_dispatch(Action::SetMaxN(5)).unwrap_err();
    assert_eq!(err.field, ConfigField::MonitorParticle);
    assert_eq!(err.reason, InvalidReason::OutOfRange);
    assert_eq!(store.state(), &before);
    assert!(store.config().validate().is_ok());

    store.try_dispatch(Action::SetMonitorParticle(2)).unwrap();
    store.try_dispatch(Action::SetMaxN(5)).unwrap();
    assert_eq!(store.config().max_n, 5);
}

// ============================================================================
// Load / reset
// ============================================================================

#[test]
fn test_load_config_merges_without_touching_runtime() {
    let mut store = Store::new();
    store.dispatch(Action::AppendLog("[Info] kept".into()));
    store.dispatch(Action::SetIsRunning(true));

    let doc: ConfigDocument = serde_json::from_str(r#"{ "max_step": 42, "dt": 0.002 }"#).unwrap();
    store.try_dispatch(Action::LoadConfig(doc)).unwrap();

    assert_eq!(store.config().max_step, 42);
    assert_eq!(store.config().dt, 0.002);
    assert_eq!(store.config().max_n, SimConfig::default().max_n);
    assert_eq!(store.runtime().log, vec!["[Info] kept"]);
    assert!(store.runtime().is_running);
}

#[test]
fn test_reset_restores_defaults_and_clears_runtime() {
    let mut store = Store::new();
    store.try_dispatch(Action::SetMaxN(20)).unwrap();
    store.dispatch(Action::AppendLog("x".into()));
    store.dispatch(Action::SetSnapshot(Arc::new(ResultSnapshot::default())));

    store.dispatch(Action::ResetToDefault);
    assert_eq!(store.config(), &SimConfig::default());
    assert!(store.runtime().log.is_empty());
    assert!(store.runtime().snapshot.is_none());
}

#[test]
fn test_saved_config_round_trips_through_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");

    let mut store = Store::new();
    store.try_dispatch(Action::SetULid(1.5)).unwrap();
    store.config().save(&path).unwrap();

    let mut other = Store::new();
    other
        .try_dispatch(Action::LoadConfig(ConfigDocument::load(&path).unwrap()))
        .unwrap();
    assert_eq!(other.config(), store.config());
}
