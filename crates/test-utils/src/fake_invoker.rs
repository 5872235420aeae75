use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use devloop::build::{BuildInvoker, DefaultPhase, RecordedStep};
use devloop::errors::{DevloopError, Result};

/// A fake build invoker that:
/// - records the name of every step it was asked to run
/// - fails the steps named in `failing`
///
/// Default phases are named `compile` / `copy-resources`; replayed steps use
/// their label (`plugin:goal (execution)`).
#[derive(Debug, Clone, Default)]
pub struct FakeInvoker {
    calls: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Names of the steps run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn run(&self, name: String) -> Result<()> {
        self.calls.lock().unwrap().push(name.clone());
        if self.failing.contains(&name) {
            return Err(DevloopError::BuildStep {
                step: name,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

impl BuildInvoker for FakeInvoker {
    fn invoke_phase(
        &mut self,
        phase: DefaultPhase,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let result = self.run(phase.to_string());
        Box::pin(async move { result })
    }

    fn replay<'a>(
        &'a mut self,
        step: &'a RecordedStep,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let result = self.run(step.label());
        Box::pin(async move { result })
    }
}
