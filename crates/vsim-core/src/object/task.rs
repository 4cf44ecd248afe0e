use std::any::Any;

use vsim_types::MethodFault;

use super::{Common, ManagedObject};
use crate::task::{TaskInfo, TaskResult};

/// A task handle.
///
/// Task records live in the task manager, not the inventory, so
/// [`ManagedObject::name`] reports the operation name.
#[derive(Debug, Clone)]
pub struct Task {
    common: Common,
}

impl Task {
    /// Wraps `common` without checking the kind.
    #[must_use]
    pub fn new(common: Common) -> Self {
        Self { common }
    }

    /// Returns a snapshot of the task record.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] for an unknown task.
    pub fn info(&self) -> Result<TaskInfo, MethodFault> {
        self.common
            .simulator()
            .tasks()
            .info(self.reference())
            .ok_or_else(|| MethodFault::not_found(self.reference()))
    }

    /// Blocks until the task is terminal and returns its outcome.
    ///
    /// The outer error is a lookup failure; the inner result is the task's
    /// own result or fault.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] for an unknown task.
    pub fn wait(&self) -> Result<TaskResult, MethodFault> {
        let info = self.common.simulator().tasks().wait(self.reference())?;
        info.outcome()
            .ok_or_else(|| MethodFault::system("wait returned a non-terminal task"))
    }
}

impl ManagedObject for Task {
    fn common(&self) -> &Common {
        &self.common
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn name(&self) -> Result<String, MethodFault> {
        self.info().map(|info| info.operation)
    }
}
