//! IRQ table behaviour through the platform-ops contract

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicU32, Ordering};

use capi::irq::MAX_PRIORITY;
use capi::{IrqController, Nvic, SimNvic, MAX32655_IRQ_COUNT};
use noos::{Errno, IrqId, IrqPlatformOps};

static LAST_IRQ: AtomicU32 = AtomicU32::new(u32::MAX);

static FIRST_HANDLER: fn(IrqId) = |irq| {
    LAST_IRQ.store(u32::from(irq), Ordering::SeqCst);
};
static SECOND_HANDLER: fn(IrqId) = |_| {};

#[test]
fn connect_replaces_previous_handler() {
    static OLD: AtomicU32 = AtomicU32::new(0);
    static NEW: AtomicU32 = AtomicU32::new(0);
    static OLD_HANDLER: fn(IrqId) = |_| {
        OLD.fetch_add(1, Ordering::SeqCst);
    };
    static NEW_HANDLER: fn(IrqId) = |_| {
        NEW.fetch_add(1, Ordering::SeqCst);
    };

    let ctrl = IrqController::new(SimNvic::new());
    ctrl.connect(30, &OLD_HANDLER).unwrap();
    ctrl.connect(30, &NEW_HANDLER).unwrap();
    assert!(ctrl.dispatch(30));

    assert_eq!(OLD.load(Ordering::SeqCst), 0);
    assert_eq!(NEW.load(Ordering::SeqCst), 1);
}

#[test]
fn handler_receives_its_irq_number() {
    let ctrl = IrqController::new(SimNvic::new());
    ctrl.connect(42, &FIRST_HANDLER).unwrap();
    assert!(ctrl.dispatch(42));
    assert_eq!(LAST_IRQ.load(Ordering::SeqCst), 42);
}

#[test]
fn disconnect_masks_and_forgets() {
    let ctrl = IrqController::new(SimNvic::new());
    ctrl.connect(9, &SECOND_HANDLER).unwrap();
    ctrl.enable(9).unwrap();
    ctrl.disconnect(9).unwrap();

    assert!(!ctrl.is_connected(9));
    assert!(!ctrl.is_enabled(9).unwrap());
    assert!(!ctrl.dispatch(9));
}

#[test]
fn platform_ops_forward_to_controller() {
    let ctrl = IrqController::new(SimNvic::new());
    let mut ops = &ctrl;
    ops.register_callback(12, &SECOND_HANDLER).unwrap();
    ops.enable(12).unwrap();
    ops.set_priority(12, MAX_PRIORITY).unwrap();
    IrqPlatformOps::global_enable(&mut ops).unwrap();

    assert!(ctrl.is_connected(12));
    assert!(ctrl.is_enabled(12).unwrap());
    assert_eq!(ctrl.priority(12).unwrap(), MAX_PRIORITY);
    assert!(ctrl.with_nvic(SimNvic::globally_enabled));

    ops.unregister_callback(12).unwrap();
    IrqPlatformOps::global_disable(&mut ops).unwrap();
    assert!(!ctrl.with_nvic(|n| n.globally_enabled()));
}

#[test]
fn last_valid_line_is_accepted() {
    let ctrl = IrqController::new(SimNvic::new());
    let last = MAX32655_IRQ_COUNT - 1;
    ctrl.connect(last, &FIRST_HANDLER).unwrap();
    ctrl.enable(last).unwrap();
    assert!(ctrl.with_nvic(|n| n.is_enabled(last)));
    assert_eq!(
        ctrl.connect(MAX32655_IRQ_COUNT, &FIRST_HANDLER),
        Err(Errno::InvalidArgument)
    );
}
