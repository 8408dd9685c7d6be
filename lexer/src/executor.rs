use std::thread;

use log::{debug, error};

/// A unit of work handed to an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks off the calling thread, without making the caller wait.
///
/// Any `Fn(Task)` closure is an executor, which makes it easy to plug in a
/// thread pool:
///
/// ```
/// # use xml_lexer::{Executor, Task};
/// let spawn = |task: Task| {
///     std::thread::spawn(task);
/// };
/// spawn.execute(Box::new(|| println!("parsing")));
/// ```
pub trait Executor {
    /// Schedules `task`. An executor that drops a task without running it
    /// makes the lexer report a failure instead of blocking forever.
    fn execute(&self, task: Task);
}

impl<F: Fn(Task)> Executor for F {
    fn execute(&self, task: Task) {
        self(task)
    }
}

/// Spawns a detached OS thread per task.
#[derive(Debug, Clone, Default)]
pub struct ThreadExecutor {
    name: Option<String>,
}

impl ThreadExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the spawned threads, which shows up in panics and debuggers.
    pub fn named(name: impl Into<String>) -> Self {
        ThreadExecutor {
            name: Some(name.into()),
        }
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, task: Task) {
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        match builder.spawn(task) {
            Ok(handle) => debug!("Spawned producer thread {:?}", handle.thread().id()),
            // the task is dropped here, which fails the parse
            Err(err) => error!("Failed to spawn producer thread: {err}"),
        }
    }
}
