
use mock_host::{
    backends, call_log, CountingHandler, FakeControlMode, FakeControlModes, FakeCrosshair,
    FakeMouseEvent, FakeSession,
};
use reticle_toggle::reticle::host::{ColorBackends, CrosshairCapability, MouseEventHandler};
use reticle_toggle::reticle::{ReticleColorController, ReticleSettings, RightClickHook};
use std::cell::RefCell;
use std::rc::Rc;

fn controller() -> Rc<RefCell<ReticleColorController>> {
    Rc::new(RefCell::new(ReticleColorController::new(
        ReticleSettings::default(),
        ColorBackends::default(),
    )))
}

fn registry_with(
    names: &[&str],
) -> (Rc<FakeControlModes>, Vec<Rc<CountingHandler>>) {
    let originals: Vec<Rc<CountingHandler>> =
        names.iter().map(|_| CountingHandler::new(false)).collect();
    let modes = names
        .iter()
        .zip(&originals)
        .map(|(name, original)| {
            FakeControlMode::new(name, Some(original.clone() as Rc<dyn MouseEventHandler>))
        })
        .collect();
    (Rc::new(FakeControlModes { modes }), originals)
}

#[test]
fn install_wraps_only_present_modes_with_handlers() {
    let controller = controller();
    let (registry, _originals) = registry_with(&["ArcadeControlMode", "SniperControlMode"]);
    let mut registry = Rc::try_unwrap(registry).ok().expect("sole owner");
    registry
        .modes
        .push(FakeControlMode::new("StrategicControlMode", None));
    registry
        .modes
        .push(FakeControlMode::new("PostMortemControlMode", None));

    let mut hook = RightClickHook::new(&controller);
    hook.install(&registry);

    assert_eq!(
        hook.patched_modes(),
        vec!["ArcadeControlMode".to_string(), "SniperControlMode".to_string()]
    );
    assert!(registry.modes[2].current_handler().is_none());
}

#[test]
fn right_click_is_consumed_and_toggles() {
    let controller = controller();
    let (registry, originals) = registry_with(&["ArcadeControlMode"]);
    let mut hook = RightClickHook::new(&controller);
    hook.install(&*registry);

    let handled = registry.modes[0].dispatch(&FakeMouseEvent::right_down());

    assert!(handled);
    assert!(controller.borrow().uses_alternate());
    assert_eq!(originals[0].calls.get(), 0);
}

#[test]
fn other_events_reach_the_original_handler_unchanged() {
    let controller = controller();
    let original = CountingHandler::new(true);
    let registry = FakeControlModes {
        modes: vec![FakeControlMode::new(
            "SniperControlMode",
            Some(original.clone() as Rc<dyn MouseEventHandler>),
        )],
    };
    let mut hook = RightClickHook::new(&controller);
    hook.install(&registry);

    let released = FakeMouseEvent {
        down: false,
        button: 257,
    };
    assert!(registry.modes[0].dispatch(&FakeMouseEvent::left_down()));
    assert!(registry.modes[0].dispatch(&released));

    assert_eq!(original.calls.get(), 2);
    assert!(!controller.borrow().uses_alternate());
}

#[test]
fn repeated_install_does_not_double_wrap() {
    let controller = controller();
    let (registry, originals) = registry_with(&["ArcadeControlMode"]);
    let mut hook = RightClickHook::new(&controller);
    hook.install(&*registry);
    hook.install(&*registry);

    assert_eq!(hook.patched_modes().len(), 1);

    registry.modes[0].dispatch(&FakeMouseEvent::right_down());
    assert!(controller.borrow().uses_alternate());

    hook.uninstall();
    let restored = registry.modes[0].current_handler().expect("handler");
    let original: Rc<dyn MouseEventHandler> = originals[0].clone();
    assert!(Rc::ptr_eq(&restored, &original));
}

#[test]
fn install_uninstall_cycles_never_nest_wrappers() {
    let log = call_log();
    let session = FakeSession::with_crosshair(FakeCrosshair {
        capabilities: vec![CrosshairCapability::OverrideColor],
        fail_override: false,
        capability_queries: Default::default(),
        log: log.clone(),
    });
    let controller = Rc::new(RefCell::new(ReticleColorController::new(
        ReticleSettings::default(),
        backends(Some(session), None),
    )));
    let (registry, originals) = registry_with(&["ArcadeControlMode"]);
    let mut hook = RightClickHook::new(&controller);

    for _ in 0..3 {
        hook.install(&*registry);
        hook.uninstall();
    }
    hook.install(&*registry);

    for _ in 0..4 {
        assert!(registry.modes[0].dispatch(&FakeMouseEvent::right_down()));
    }
    registry.modes[0].dispatch(&FakeMouseEvent::left_down());

    assert_eq!(log.borrow().len(), 4);
    assert!(!controller.borrow().uses_alternate());
    assert_eq!(originals[0].calls.get(), 1);
}

#[test]
fn dropped_controller_passes_events_through() {
    let controller = controller();
    let (registry, originals) = registry_with(&["DualGunControlMode"]);
    let mut hook = RightClickHook::new(&controller);
    hook.install(&*registry);
    drop(controller);

    let handled = registry.modes[0].dispatch(&FakeMouseEvent::right_down());

    assert!(!handled);
    assert_eq!(originals[0].calls.get(), 1);
}

#[test]
fn uninstall_without_install_is_a_no_op() {
    let controller = controller();
    let mut hook = RightClickHook::new(&controller);
    hook.uninstall();
    assert!(!hook.is_installed());
}

#[test]
fn dropping_the_hook_restores_originals() {
    let controller = controller();
    let (registry, originals) = registry_with(&["ArcadeControlMode"]);
    {
        let mut hook = RightClickHook::new(&controller);
        hook.install(&*registry);
    }

    registry.modes[0].dispatch(&FakeMouseEvent::right_down());
    assert_eq!(originals[0].calls.get(), 1);
    assert!(!controller.borrow().uses_alternate());
}
