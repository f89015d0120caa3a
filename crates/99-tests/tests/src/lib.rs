//! End-to-end scenarios for the interaction loop, driven through the scheduler.

#[cfg(test)]
mod support;

#[cfg(test)]
mod invariants;

#[cfg(test)]
mod grab_scenarios;

#[cfg(test)]
mod use_sessions;

#[cfg(test)]
mod snap_scenarios;

#[cfg(test)]
mod lifecycle;
