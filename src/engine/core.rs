// src/engine/core.rs

//! Pure decision logic for the redeploy loop.
//!
//! Given what the IO shell observed at the top of an iteration, [`decide`]
//! says what to do next. No Tokio, no processes, no filesystem.

/// What the shell saw at the top of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// The application process is still running.
    pub alive: bool,
    /// Shutdown was requested (Ctrl-C).
    pub stop_requested: bool,
    pub redeploy_enabled: bool,
    /// The detector reported a change since the previous poll.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopDecision {
    /// The application exited on its own; leave without restarting.
    Exit,
    /// Stop the application and leave.
    ShutDown,
    /// Stop, rebuild, start again.
    Rebuild,
    /// Nothing to do; sleep and look again.
    KeepWatching,
}

/// Decide the next step. Liveness is checked first, then shutdown, then
/// changes; changes are ignored entirely when redeploy is disabled.
pub fn decide(obs: Observation) -> LoopDecision {
    if !obs.alive {
        return LoopDecision::Exit;
    }
    if obs.stop_requested {
        return LoopDecision::ShutDown;
    }
    if obs.redeploy_enabled && obs.changed {
        return LoopDecision::Rebuild;
    }
    LoopDecision::KeepWatching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(alive: bool, stop_requested: bool, redeploy_enabled: bool, changed: bool) -> Observation {
        Observation {
            alive,
            stop_requested,
            redeploy_enabled,
            changed,
        }
    }

    #[test]
    fn dead_process_exits_even_with_pending_work() {
        assert_eq!(decide(obs(false, true, true, true)), LoopDecision::Exit);
        assert_eq!(decide(obs(false, false, true, false)), LoopDecision::Exit);
    }

    #[test]
    fn shutdown_beats_changes() {
        assert_eq!(decide(obs(true, true, true, true)), LoopDecision::ShutDown);
    }

    #[test]
    fn change_triggers_rebuild_only_when_enabled() {
        assert_eq!(decide(obs(true, false, true, true)), LoopDecision::Rebuild);
        assert_eq!(
            decide(obs(true, false, false, true)),
            LoopDecision::KeepWatching
        );
    }

    #[test]
    fn quiet_iteration_keeps_watching() {
        assert_eq!(
            decide(obs(true, false, true, false)),
            LoopDecision::KeepWatching
        );
    }
}
