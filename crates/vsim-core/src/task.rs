//! Task engine.
//!
//! Every state-mutating operation runs as a [`Task`]: the caller gets the
//! task's reference back and polls (or [`TaskManager::wait`]s) for the
//! terminal [`TaskInfo`]. The body itself runs synchronously inside
//! [`Task::run`].
//!
//! # Lifecycle
//!
//! ```text
//! Queued ──► Running ──► Success
//!                   └──► Error
//! ```
//!
//! Transitions are validated by [`TaskState::can_transition_to`]; a terminal
//! record is never overwritten.
//!
//! # Fault containment
//!
//! A body that panics does not take the engine down. The panic is caught at
//! the task boundary and recorded as [`MethodFault::SystemError`], so every
//! terminal task carries exactly one of a result or a fault.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use vsim_types::{EntityKind, EntityReference, HostDatastoreBrowserSearchResults, MethodFault};

use crate::event::EventKind;
use crate::simulator::Simulator;

// =============================================================================
// Task State
// =============================================================================

/// Lifecycle state of a task.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Created, body not started.
    Queued,
    /// Body executing.
    Running,
    /// Finished with a result.
    Success,
    /// Finished with a fault.
    Error,
}

impl TaskState {
    /// Returns true for `Success` and `Error`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running) | (Self::Running, Self::Success | Self::Error)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Result value carried by a successful task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskValue {
    /// Result of a datastore browser search.
    SearchResults(HostDatastoreBrowserSearchResults),
}

/// What a task body returns: an optional result value or a typed fault.
pub type TaskResult = Result<Option<TaskValue>, MethodFault>;

/// Task engine failures. These are engine misuse, never operation faults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// No task with this reference exists.
    #[error("task not found: {0}")]
    NotFound(EntityReference),

    /// The requested state change is not allowed.
    #[error("task {task}: illegal transition {from} -> {to}")]
    IllegalTransition {
        /// The task.
        task: EntityReference,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
    },
}

impl From<TaskError> for MethodFault {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(reference) => Self::ManagedObjectNotFound { reference },
            other @ TaskError::IllegalTransition { .. } => Self::system(other.to_string()),
        }
    }
}

// =============================================================================
// Task Info
// =============================================================================

/// Snapshot of one task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// The task's own reference.
    pub task: EntityReference,
    /// Operation name, e.g. `Destroy_Task`.
    pub operation: String,
    /// Entity the task runs against.
    pub owner: EntityReference,
    /// Owner's display name when the task was created.
    pub owner_name: String,
    /// Current state.
    pub state: TaskState,
    /// Result value, set only on `Success`.
    pub result: Option<TaskValue>,
    /// Fault, set only on `Error`.
    pub error: Option<MethodFault>,
    /// When the task was created.
    pub queued_time: DateTime<Utc>,
    /// When the body started.
    pub start_time: Option<DateTime<Utc>>,
    /// When the task turned terminal.
    pub complete_time: Option<DateTime<Utc>>,
}

impl TaskInfo {
    /// Converts a terminal record into the body's outcome.
    ///
    /// Returns `None` while the task is still queued or running.
    #[must_use]
    pub fn outcome(&self) -> Option<TaskResult> {
        match self.state {
            TaskState::Success => Some(Ok(self.result.clone())),
            TaskState::Error => Some(Err(self
                .error
                .clone()
                .unwrap_or_else(|| MethodFault::system("task failed without a fault")))),
            TaskState::Queued | TaskState::Running => None,
        }
    }
}

// =============================================================================
// Task Manager
// =============================================================================

/// Store of all task records.
///
/// Records are kept after completion so they stay queryable. [`wait`]
/// blocks on a condition variable signalled on every terminal transition,
/// so a waiter on one thread observes a task finished on another.
///
/// [`wait`]: TaskManager::wait
#[derive(Debug)]
pub struct TaskManager {
    next_id: AtomicU64,
    tasks: Mutex<BTreeMap<EntityReference, TaskInfo>>,
    finished: Condvar,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManager {
    /// Creates an empty manager. The first task is `task-1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(BTreeMap::new()),
            finished: Condvar::new(),
        }
    }

    /// Registers a queued task record and returns its reference.
    pub fn create(
        &self,
        owner: &EntityReference,
        owner_name: &str,
        operation: &str,
    ) -> EntityReference {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = EntityReference::of(
            EntityKind::Task,
            format!("{}{id}", EntityKind::Task.id_prefix()),
        );
        let record = TaskInfo {
            task: task.clone(),
            operation: operation.to_string(),
            owner: owner.clone(),
            owner_name: owner_name.to_string(),
            state: TaskState::Queued,
            result: None,
            error: None,
            queued_time: Utc::now(),
            start_time: None,
            complete_time: None,
        };
        debug!(%task, %owner, operation, "task queued");
        self.tasks.lock().insert(task.clone(), record);
        task
    }

    /// Moves a task to `Running`.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] or [`TaskError::IllegalTransition`].
    pub fn start(&self, task: &EntityReference) -> Result<(), TaskError> {
        let mut tasks = self.tasks.lock();
        let record = Self::transition(&mut tasks, task, TaskState::Running)?;
        record.start_time = Some(Utc::now());
        Ok(())
    }

    /// Records the body's outcome and moves the task to its terminal state.
    ///
    /// Wakes every waiter. Returns the terminal state.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] or [`TaskError::IllegalTransition`] (e.g. a
    /// task that was never started, or one already terminal).
    pub fn complete(
        &self,
        task: &EntityReference,
        outcome: TaskResult,
    ) -> Result<TaskState, TaskError> {
        let next = if outcome.is_ok() {
            TaskState::Success
        } else {
            TaskState::Error
        };

        let mut tasks = self.tasks.lock();
        let record = Self::transition(&mut tasks, task, next)?;
        match outcome {
            Ok(value) => record.result = value,
            Err(fault) => record.error = Some(fault),
        }
        record.complete_time = Some(Utc::now());
        drop(tasks);

        self.finished.notify_all();
        Ok(next)
    }

    fn transition<'a>(
        tasks: &'a mut BTreeMap<EntityReference, TaskInfo>,
        task: &EntityReference,
        to: TaskState,
    ) -> Result<&'a mut TaskInfo, TaskError> {
        let record = tasks
            .get_mut(task)
            .ok_or_else(|| TaskError::NotFound(task.clone()))?;
        if !record.state.can_transition_to(to) {
            return Err(TaskError::IllegalTransition {
                task: task.clone(),
                from: record.state,
                to,
            });
        }
        debug!(%task, from = %record.state, %to, "task transition");
        record.state = to;
        Ok(record)
    }

    /// Returns a snapshot of the task record.
    #[must_use]
    pub fn info(&self, task: &EntityReference) -> Option<TaskInfo> {
        self.tasks.lock().get(task).cloned()
    }

    /// Returns true if a record exists for `task`.
    #[must_use]
    pub fn contains(&self, task: &EntityReference) -> bool {
        self.tasks.lock().contains_key(task)
    }

    /// Blocks until `task` is terminal and returns its record.
    ///
    /// # Errors
    ///
    /// [`TaskError::NotFound`] if no such task exists.
    pub fn wait(&self, task: &EntityReference) -> Result<TaskInfo, TaskError> {
        let mut tasks = self.tasks.lock();
        loop {
            let record = tasks
                .get(task)
                .ok_or_else(|| TaskError::NotFound(task.clone()))?;
            if record.state.is_terminal() {
                return Ok(record.clone());
            }
            self.finished.wait(&mut tasks);
        }
    }

    /// Returns every task record, ordered by reference.
    #[must_use]
    pub fn all(&self) -> Vec<TaskInfo> {
        self.tasks.lock().values().cloned().collect()
    }

    /// Returns the number of task records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Returns true if no task was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

// =============================================================================
// Task
// =============================================================================

/// What a task body can see while it runs.
pub struct TaskContext {
    simulator: Simulator,
    task: EntityReference,
    owner: EntityReference,
}

impl TaskContext {
    /// The simulator the task runs in.
    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// The running task.
    #[must_use]
    pub fn task(&self) -> &EntityReference {
        &self.task
    }

    /// The entity the task runs against.
    #[must_use]
    pub fn owner(&self) -> &EntityReference {
        &self.owner
    }
}

/// A task body: a function of the current world state.
pub type TaskBody = Box<dyn FnOnce(&TaskContext) -> TaskResult + Send>;

/// A created, not yet run, task.
///
/// Dropping a task without running it completes its record with a
/// [`MethodFault::SystemError`], so waiters never block on a task that
/// will not run.
pub struct Task {
    simulator: Simulator,
    reference: EntityReference,
    owner: EntityReference,
    operation: String,
    body: Option<TaskBody>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("reference", &self.reference)
            .field("owner", &self.owner)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

impl Task {
    /// Registers a queued task for `owner` with the simulator's task manager.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] if `owner` is not in the
    /// inventory.
    pub fn create<F>(
        simulator: &Simulator,
        owner: &EntityReference,
        operation: &str,
        body: F,
    ) -> Result<Self, MethodFault>
    where
        F: FnOnce(&TaskContext) -> TaskResult + Send + 'static,
    {
        let owner_name = simulator
            .inventory()
            .get(owner)
            .map(|e| e.name().to_string())
            .ok_or_else(|| MethodFault::not_found(owner))?;
        let reference = simulator.tasks().create(owner, &owner_name, operation);
        Ok(Self {
            simulator: simulator.clone(),
            reference,
            owner: owner.clone(),
            operation: operation.to_string(),
            body: Some(Box::new(body)),
        })
    }

    /// The task's reference.
    #[must_use]
    pub fn reference(&self) -> &EntityReference {
        &self.reference
    }

    /// Runs the body to a terminal state and returns the task's reference.
    ///
    /// The task is appended to the owner's recent-task list before the body
    /// starts, and a [`EventKind::TaskCompleted`] event is recorded after it
    /// ends.
    pub fn run(mut self) -> EntityReference {
        let Some(body) = self.body.take() else {
            return self.reference.clone();
        };
        let simulator = &self.simulator;
        let (reference, owner, operation) = (&self.reference, &self.owner, &self.operation);

        let limit = simulator.config().recent_task_limit;
        simulator.with_inventory_mut(|inventory| {
            if let Some(entity) = inventory.get_mut(owner) {
                entity.push_recent_task(reference.clone(), limit);
            }
        });

        let outcome = match simulator.tasks().start(reference) {
            Ok(()) => {
                let ctx = TaskContext {
                    simulator: simulator.clone(),
                    task: reference.clone(),
                    owner: owner.clone(),
                };
                catch_unwind(AssertUnwindSafe(|| body(&ctx))).unwrap_or_else(|payload| {
                    let reason = panic_message(payload.as_ref());
                    error!(task = %reference, %owner, %operation, %reason, "task body panicked");
                    Err(MethodFault::system(reason))
                })
            }
            Err(err) => Err(err.into()),
        };

        self.finish(outcome);
        self.reference.clone()
    }

    /// Completes the record and records the completion event.
    fn finish(&self, outcome: TaskResult) {
        let Self {
            simulator,
            reference,
            owner,
            operation,
            ..
        } = self;

        match simulator.tasks().complete(reference, outcome) {
            Ok(state) => {
                info!(task = %reference, %owner, %operation, %state, "task completed");
                simulator.events().record(EventKind::TaskCompleted {
                    task: reference.clone(),
                    owner: owner.clone(),
                    operation: operation.clone(),
                    state,
                });
            }
            Err(err) => error!(task = %reference, %err, "task could not be completed"),
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if self.body.take().is_none() {
            return;
        }
        warn!(task = %self.reference, owner = %self.owner, "task dropped before it ran");
        let outcome = match self.simulator.tasks().start(&self.reference) {
            Ok(()) => Err(MethodFault::system("task dropped before it ran")),
            Err(err) => Err(err.into()),
        };
        self.finish(outcome);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic in task body: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic in task body: {s}")
    } else {
        "panic in task body".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
