pub(crate) mod check;
pub(crate) mod core_events;
