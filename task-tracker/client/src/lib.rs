pub mod board;
pub mod client;
pub mod task;

pub use board::{Notification, TaskBoard};
pub use client::{ClientError, TaskClient};
pub use task::{Task, TaskUpdate};
