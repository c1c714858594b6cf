use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for aggregation codec and resolution paths.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventOps {
    // Codec entrypoints
    pub text_parsed: u64,
    pub wire_decoded: u64,

    // Resolution outcomes
    pub resolved: u64,
    pub unmapped_index: u64,
    pub unmapped_child_type: u64,

    pub factories_built: u64,
}

///
/// TypeCounters
/// Per aggregation-type tag.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeCounters {
    pub text_parsed: u64,
    pub wire_decoded: u64,
    pub resolutions: u64,
    pub factories_built: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventReport {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        types: m.types.clone(),
    })
}
