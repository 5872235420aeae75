use std::collections::BTreeSet;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devloop::errors::{DevloopError, Result};
use devloop::exec::ProcessBackend;
use devloop::launch::LaunchCommand;

#[derive(Debug, Default)]
struct ProcessTable {
    next_id: usize,
    alive: BTreeSet<usize>,
    started: Vec<LaunchCommand>,
    stops: usize,
    max_alive: usize,
}

/// Handle to one fake process.
#[derive(Debug)]
pub struct FakeHandle {
    id: usize,
    checks: usize,
    exit_code: Option<i32>,
}

/// A fake process backend that never spawns anything.
///
/// Processes are entries in a shared table; the table tracks how many were
/// alive at once so tests can assert the single-process invariant.
///
/// - `exit_after_checks(n, code)`: every process exits on its own once it
///   has been asked `is_alive` `n` times.
/// - `fail_start()`: every `start` fails with `ProcessLaunch`.
/// - `needs_kill()`: `stop` reports that a force-kill was needed.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessBackend {
    table: Arc<Mutex<ProcessTable>>,
    exit_after: Option<(usize, Option<i32>)>,
    fail_start: bool,
    needs_kill: bool,
}

impl FakeProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_after_checks(mut self, checks: usize, code: Option<i32>) -> Self {
        self.exit_after = Some((checks, code));
        self
    }

    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn needs_kill(mut self) -> Self {
        self.needs_kill = true;
        self
    }

    pub fn starts(&self) -> usize {
        self.table.lock().unwrap().started.len()
    }

    pub fn started_commands(&self) -> Vec<LaunchCommand> {
        self.table.lock().unwrap().started.clone()
    }

    pub fn stops(&self) -> usize {
        self.table.lock().unwrap().stops
    }

    pub fn alive_count(&self) -> usize {
        self.table.lock().unwrap().alive.len()
    }

    /// Largest number of processes that were alive at the same time.
    pub fn max_alive(&self) -> usize {
        self.table.lock().unwrap().max_alive
    }
}

impl ProcessBackend for FakeProcessBackend {
    type Handle = FakeHandle;

    fn start(&mut self, command: &LaunchCommand) -> Result<FakeHandle> {
        if self.fail_start {
            return Err(DevloopError::ProcessLaunch {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted start failure"),
            });
        }

        let mut table = self.table.lock().unwrap();
        let id = table.next_id;
        table.next_id += 1;
        table.alive.insert(id);
        table.started.push(command.clone());
        table.max_alive = table.max_alive.max(table.alive.len());

        Ok(FakeHandle {
            id,
            checks: 0,
            exit_code: None,
        })
    }

    fn is_alive(&mut self, handle: &mut FakeHandle) -> bool {
        let mut table = self.table.lock().unwrap();
        if !table.alive.contains(&handle.id) {
            return false;
        }

        handle.checks += 1;
        if let Some((limit, code)) = self.exit_after {
            if handle.checks >= limit {
                table.alive.remove(&handle.id);
                handle.exit_code = code;
                return false;
            }
        }
        true
    }

    fn stop<'a>(
        &'a mut self,
        handle: &'a mut FakeHandle,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        let graceful = {
            let mut table = self.table.lock().unwrap();
            table.stops += 1;
            let was_alive = table.alive.remove(&handle.id);
            !(was_alive && self.needs_kill)
        };
        Box::pin(async move { graceful })
    }

    fn exit_code(&self, handle: &FakeHandle) -> Option<i32> {
        handle.exit_code
    }
}
