//! Scripted [`CommandRunner`] for tests.

use std::cell::RefCell;

use docexport_shared::Result;

use crate::runner::{CommandRunner, ToolCommand, ToolOutput};

type Responder = Box<dyn Fn(&ToolCommand) -> Result<ToolOutput>>;

/// Records every command and answers with a closure.
pub struct FakeRunner {
    respond: Responder,
    log: RefCell<Vec<ToolCommand>>,
}

impl FakeRunner {
    pub fn new(respond: impl Fn(&ToolCommand) -> Result<ToolOutput> + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.log.borrow().clone()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        self.log.borrow_mut().push(command.clone());
        (self.respond)(command)
    }
}
