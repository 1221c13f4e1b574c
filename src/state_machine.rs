use std::collections::HashMap;
use std::fmt;
use crate::cli::RunOptions;
use crate::connection::Connector;
use crate::connection_manager::ConnectionManager;
use crate::errors::StateMachineError;
use crate::outcome::ImportResult;
use crate::state_handlers::{
    AdminAttemptHandler, CheckingFileHandler, InitialHandler, UserAttemptHandler,
    WaitingForServerHandler,
};
use tracing::info;

/// Steps of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Initial,
    WaitingForServer,
    CheckingFile,
    UserAttempt,
    AdminAttempt,
    Completed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Initial => write!(f, "Initial"),
            State::WaitingForServer => write!(f, "Waiting for Server"),
            State::CheckingFile => write!(f, "Checking SQL File"),
            State::UserAttempt => write!(f, "Importing as User"),
            State::AdminAttempt => write!(f, "Importing as Root"),
            State::Completed => write!(f, "Completed"),
        }
    }
}

/// Data that flows through the state machine. Options never change; the
/// connection manager owns whatever session is live.
pub struct StateContext<C: Connector> {
    pub options: RunOptions,
    pub connections: ConnectionManager<C>,
    pub result: Option<ImportResult>,
}

impl<C: Connector> StateContext<C> {
    pub fn new(options: RunOptions, connections: ConnectionManager<C>) -> Self {
        Self {
            options,
            connections,
            result: None,
        }
    }

    /// Record the terminal result and move to `Completed`
    pub fn finish(&mut self, result: ImportResult) -> State {
        self.result = Some(result);
        State::Completed
    }
}

/// One state's behaviour: inspect the context, return the next state
pub trait StateHandler<C: Connector> {
    fn execute(&self, context: &mut StateContext<C>) -> State;
}

/// State machine that manages the flow between states
pub struct StateMachine<C: Connector> {
    current_state: State,
    context: StateContext<C>,
    handlers: HashMap<State, Box<dyn StateHandler<C>>>,
}

impl<C: Connector> StateMachine<C> {
    pub fn new(context: StateContext<C>) -> Self {
        Self {
            current_state: State::Initial,
            context,
            handlers: HashMap::new(),
        }
    }

    /// Machine with every import state wired up
    pub fn with_standard_handlers(context: StateContext<C>) -> Self
    where
        C: 'static,
    {
        let mut machine = Self::new(context);
        machine.register_handler(State::Initial, Box::new(InitialHandler));
        machine.register_handler(State::WaitingForServer, Box::new(WaitingForServerHandler));
        machine.register_handler(State::CheckingFile, Box::new(CheckingFileHandler));
        machine.register_handler(State::UserAttempt, Box::new(UserAttemptHandler));
        machine.register_handler(State::AdminAttempt, Box::new(AdminAttemptHandler));
        machine
    }

    pub fn register_handler(&mut self, state: State, handler: Box<dyn StateHandler<C>>) {
        self.handlers.insert(state, handler);
    }

    pub fn get_current_state(&self) -> State {
        self.current_state
    }

    pub fn get_context(&self) -> &StateContext<C> {
        &self.context
    }

    /// Drive the machine to `Completed` and hand back the result
    pub fn run(&mut self) -> Result<ImportResult, StateMachineError> {
        while self.current_state != State::Completed {
            let handler = self.handlers.get(&self.current_state).ok_or_else(|| {
                StateMachineError::NoHandlerRegistered {
                    state: self.current_state.to_string(),
                }
            })?;

            info!(state = %self.current_state, "entering state");
            self.current_state = handler.execute(&mut self.context);
        }

        self.context.connections.disconnect();
        self.context
            .result
            .clone()
            .ok_or(StateMachineError::MissingResult)
    }
}
