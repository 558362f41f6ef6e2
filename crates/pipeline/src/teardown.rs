//! Teardown composition.
//!
//! Each phase that acquires a resource registers one release action.
//! [`Teardown::run`] executes the actions front-to-back: the most
//! recently registered action first, so the narrower resource (a
//! database) is released before the coarser one (its server). Every
//! action is attempted even when an earlier one fails. Failures are
//! collected into one aggregate [`TeardownError`] instead of
//! short-circuiting.
//!
//! Running drains the action list, so a second invocation finds nothing
//! to do and returns `Ok`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// Outcome of one release action.
pub type TeardownResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type TeardownFuture = Pin<Box<dyn Future<Output = TeardownResult> + Send>>;

/// One labelled, one-shot release action.
///
/// The closure is deferred: nothing runs until the composite teardown
/// does.
///
/// ```
/// use seedbed_pipeline::TeardownStep;
///
/// let step = TeardownStep::new("stop container ctr-0", move || {
///     Box::pin(async move {
///         // ask the runtime to stop ctr-0
///         Ok(())
///     })
/// });
/// ```
pub struct TeardownStep {
    label: String,
    action: Box<dyn FnOnce() -> TeardownFuture + Send>,
}

impl TeardownStep {
    pub fn new(
        label: impl Into<String>,
        action: impl FnOnce() -> TeardownFuture + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    /// The action's label, used in logs and failure reports.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One release action that failed during a teardown run.
#[derive(Debug, Clone)]
pub struct TeardownFailure {
    pub action: String,
    pub message: String,
}

/// Aggregate of all release actions that failed in one run. The actions
/// after a failing one still ran.
#[derive(Debug)]
pub struct TeardownError {
    pub failures: Vec<TeardownFailure>,
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.failures.iter().map(|f| f.action.as_str()).collect();
        write!(
            f,
            "Teardown finished with {} failed action(s): {}",
            self.failures.len(),
            actions.join(", ")
        )
    }
}

impl std::error::Error for TeardownError {}

/// Ordered collection of release actions for one setup call.
#[derive(Default)]
pub struct Teardown {
    steps: Mutex<Vec<TeardownStep>>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release action. It will run before every action
    /// registered earlier, so later-acquired resources release first.
    pub fn register(&self, step: TeardownStep) {
        self.lock().insert(0, step);
    }

    /// Number of pending release actions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run all pending release actions front-to-back.
    ///
    /// Every action is attempted; failures are logged and collected into
    /// the returned [`TeardownError`]. The list is drained first, so
    /// invoking `run` again is a no-op `Ok`.
    pub async fn run(&self) -> Result<(), TeardownError> {
        let steps: Vec<TeardownStep> = self.lock().drain(..).collect();
        if steps.is_empty() {
            return Ok(());
        }

        let mut failures = Vec::new();
        for step in steps {
            tracing::debug!(action = %step.label, "Running teardown action");
            if let Err(e) = (step.action)().await {
                tracing::error!(action = %step.label, error = %e, "Teardown action failed");
                failures.push(TeardownFailure {
                    action: step.label,
                    message: e.to_string(),
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError { failures })
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TeardownStep>> {
        // A poisoned lock only means a panic elsewhere; the list itself
        // is still usable for cleanup.
        self.steps
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("pending", &self.len())
            .finish()
    }
}
