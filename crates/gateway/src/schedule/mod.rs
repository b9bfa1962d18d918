//! The recurring-schedule core: canonical model, error-collecting
//! validation, and trigger-expression compilation.

pub mod model;
pub mod trigger;
pub mod validation;

pub use model::{ScheduleSpec, TimeOfDay, VALID_WEEKDAYS};
pub use trigger::{compile, trigger_name, ReminderPayload, TriggerExpression};
pub use validation::{
    validate_routine, validate_schedule, CleanRoutine, RoutineInput, ScheduleInput,
};
