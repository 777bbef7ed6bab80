//! 实体模型模块

mod task;
mod user;

pub use task::{NewTask, Task, TaskFilter, TaskUpdate};
pub use user::{NewUser, User};
