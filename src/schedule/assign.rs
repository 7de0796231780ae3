use std::collections::BTreeMap;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use super::types::{CoverageDeficit, EmployeeId, Preference, Rules, Schedule, ScheduleOutcome};
use super::slot_utils::all_slots;

/// Computes a weekly schedule in two passes.
///
/// 1. Preferences are honoured in the order given, as long as the employee is
///    under `per_employee_cap` and not already in that slot.
/// 2. Every slot still under `per_slot_minimum` is topped up with employees
///    drawn uniformly at random from those under the cap and not yet in the
///    slot. A slot that runs out of candidates stays short and is reported
///    in `deficits`.
///
/// `roster` lists every known employee; employees that only appear in
/// `preferences` are added to it. The random source is only used by the
/// second pass, so a seeded `rng` makes the whole result reproducible.
pub fn compute_schedule<R: Rng + ?Sized>(
    roster: &[EmployeeId],
    preferences: &[Preference],
    rules: &Rules,
    rng: &mut R,
) -> ScheduleOutcome {
    let mut schedule = Schedule::default();

    // Everyone starts at zero, including employees with no preferences
    let mut load: BTreeMap<EmployeeId, u32> = roster.iter().map(|&id| (id, 0)).collect();
    for pref in preferences {
        load.entry(pref.employee).or_insert(0);
    }

    let preferred = fill_from_preferences(&mut schedule, &mut load, preferences, rules.per_employee_cap);
    let deficits = backfill_minimum_coverage(&mut schedule, &mut load, rules, rng);

    debug!(
        employees = load.len(),
        preferences = preferences.len(),
        preferred,
        total = schedule.total_assignments(),
        deficits = deficits.len(),
        "schedule computed"
    );

    ScheduleOutcome {
        schedule,
        deficits,
        load,
    }
}

/// Greedy first-fit over the preference list. Returns how many assignments were made.
pub(crate) fn fill_from_preferences(
    schedule: &mut Schedule,
    load: &mut BTreeMap<EmployeeId, u32>,
    preferences: &[Preference],
    cap: u32,
) -> usize {
    let mut assigned = 0;
    for pref in preferences {
        let count = load.entry(pref.employee).or_insert(0);
        if *count >= cap || schedule.is_assigned(pref.slot, pref.employee) {
            continue;
        }
        schedule.assign(pref.slot, pref.employee);
        *count += 1;
        assigned += 1;
    }
    assigned
}

/// Tops up every slot below the minimum, in day-then-shift order
pub(crate) fn backfill_minimum_coverage<R: Rng + ?Sized>(
    schedule: &mut Schedule,
    load: &mut BTreeMap<EmployeeId, u32>,
    rules: &Rules,
    rng: &mut R,
) -> Vec<CoverageDeficit> {
    let cap = rules.per_employee_cap;
    let minimum = rules.per_slot_minimum as usize;
    let mut deficits = Vec::new();

    for slot in all_slots(&rules.days, &rules.shifts) {
        while schedule.staffing(slot) < minimum {
            // Pool is rebuilt per pick: someone may have just reached the cap
            let candidates: Vec<EmployeeId> = load
                .iter()
                .filter(|(id, count)| **count < cap && !schedule.is_assigned(slot, **id))
                .map(|(id, _)| *id)
                .collect();

            let Some(&chosen) = candidates.choose(rng) else {
                break;
            };
            schedule.assign(slot, chosen);
            if let Some(count) = load.get_mut(&chosen) {
                *count += 1;
            }
            debug!(%slot, employee = %chosen, "backfilled");
        }

        let staffed = schedule.staffing(slot);
        if staffed < minimum {
            deficits.push(CoverageDeficit {
                slot,
                assigned: staffed as u32,
                required: rules.per_slot_minimum,
            });
        }
    }

    deficits
}
