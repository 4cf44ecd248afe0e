use std::any::Any;

use vsim_types::{DatastorePath, EntityReference, MethodFault, SearchDatastoreRequest};

use super::{Common, ManagedObject, Request, Response};
use crate::behavior::datastore as behavior;

/// A datastore.
#[derive(Debug, Clone)]
pub struct Datastore {
    common: Common,
}

impl Datastore {
    /// Wraps `common` without checking the kind.
    #[must_use]
    pub fn new(common: Common) -> Self {
        Self { common }
    }

    /// Starts a browser search task and returns its reference.
    ///
    /// # Errors
    ///
    /// Path faults raised before the task is created:
    /// [`MethodFault::InvalidDatastorePath`] for a malformed path and
    /// [`MethodFault::InvalidDatastore`] for a bracketed path naming another
    /// datastore.
    pub fn search(&self, request: &SearchDatastoreRequest) -> Result<EntityReference, MethodFault> {
        let sim = self.common.simulator();
        let task = behavior::search_task(sim, self.reference(), request)?;
        Ok(task.run())
    }

    /// Re-checks the backing directory and stamps the refresh time.
    ///
    /// # Errors
    ///
    /// [`MethodFault::HostConfigFault`] if the directory is unreachable.
    pub fn refresh(&self) -> Result<(), MethodFault> {
        behavior::refresh(self.common.simulator(), self.reference())
    }

    /// Starts a destroy task and returns its reference.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] if the datastore is gone.
    pub fn destroy(&self) -> Result<EntityReference, MethodFault> {
        let sim = self.common.simulator();
        let task = behavior::destroy_task(sim, self.reference())?;
        Ok(task.run())
    }

    /// Formats `[name] relative` for this datastore.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] if the datastore is gone.
    pub fn path(&self, relative: &str) -> Result<String, MethodFault> {
        Ok(DatastorePath::new(self.name()?, relative).to_string())
    }
}

impl ManagedObject for Datastore {
    fn common(&self) -> &Common {
        &self.common
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn dispatch(&self, request: Request) -> Result<Response, MethodFault> {
        match request {
            Request::SearchDatastore(req) => self.search(&req).map(Response::Task),
            Request::RefreshDatastore => self.refresh().map(|()| Response::Empty),
            Request::Destroy => self.destroy().map(Response::Task),
        }
    }
}
