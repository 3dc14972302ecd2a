//! Application services for task lifecycle orchestration.

mod lifecycle;
mod locks;
mod notifications;

pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use notifications::{DeliveryReport, DisplayZone, TaskNotifications};
