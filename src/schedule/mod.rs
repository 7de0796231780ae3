pub mod types;
pub mod slot_utils;
pub mod assign;

pub use types::{CoverageDeficit, Day, EmployeeId, Preference, Rules, Schedule, ScheduleOutcome, Shift, Slot};
pub use slot_utils::{all_slots, calculate_slot_rankings};
pub use assign::compute_schedule;
