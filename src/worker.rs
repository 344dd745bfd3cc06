//! Platform adapter
//!
//! Hosts deliver lifecycle, fetch and message events; the worker routes
//! each one to its handler and resolves once the handler's effects are
//! complete, so the host knows when it may tear the worker down.

use crate::command::{Command, CommandHandler, CommandOutcome};
use crate::context::WorkerContext;
use crate::error::OffgridResult;
use crate::intercept::{Interception, Interceptor, Request};
use crate::lifecycle::{Activation, LifecycleController};
use tracing::debug;

/// An event delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Message(String),
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed { staged: usize },
    Activated(Activation),
    Fetched(Interception),
    /// `None` when the message was not a known command
    Handled(Option<CommandOutcome>),
}

/// The offline cache worker
pub struct Worker {
    lifecycle: LifecycleController,
    interceptor: Interceptor,
    commands: CommandHandler,
}

impl Worker {
    pub fn new(ctx: WorkerContext) -> Self {
        Self {
            lifecycle: LifecycleController::new(ctx.clone()),
            interceptor: Interceptor::new(ctx.clone()),
            commands: CommandHandler::new(ctx),
        }
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn commands(&self) -> &CommandHandler {
        &self.commands
    }

    /// Route one event to its handler
    pub async fn dispatch(&self, event: WorkerEvent) -> OffgridResult<EventOutcome> {
        match event {
            WorkerEvent::Install => {
                let staged = self.lifecycle.install().await?;
                Ok(EventOutcome::Installed { staged })
            }
            WorkerEvent::Activate => Ok(EventOutcome::Activated(self.lifecycle.activate().await?)),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetched(
                self.interceptor.handle(&request).await?,
            )),
            WorkerEvent::Message(payload) => match Command::from_message(&payload) {
                Some(command) => Ok(EventOutcome::Handled(Some(
                    self.commands.handle(command).await?,
                ))),
                None => {
                    debug!("Ignoring message {:?}", payload);
                    Ok(EventOutcome::Handled(None))
                }
            },
        }
    }
}
