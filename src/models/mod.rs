pub mod subtask;
pub mod task;
pub mod user;

pub use subtask::{Subtask, SubtaskInput, SubtaskUpdate};
pub use task::{Task, TaskInput, TaskListQuery, TaskSort, TaskUpdate, TaskWithSubtasks};
pub use user::{User, UserCredentials};
