use std::collections::{BTreeMap, HashSet};
use super::types::{Day, Preference, Shift, Slot};

/// Separator in intake tokens such as "Monday-Morning"
pub const TOKEN_SEPARATOR: char = '-';

/// Enumerates every slot in day-then-shift order
pub fn all_slots(days: &[Day], shifts: &[Shift]) -> Vec<Slot> {
    days.iter()
        .flat_map(|&day| shifts.iter().map(move |&shift| Slot::new(day, shift)))
        .collect()
}

/// Counts how many distinct employees asked for each slot
/// Repeated preferences from the same employee count once
pub fn calculate_slot_rankings(preferences: &[Preference]) -> BTreeMap<Slot, u32> {
    let mut seen = HashSet::new();
    let mut rankings = BTreeMap::new();
    for pref in preferences {
        if seen.insert((pref.employee, pref.slot)) {
            *rankings.entry(pref.slot).or_insert(0) += 1;
        }
    }
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::EmployeeId;

    #[test]
    fn full_week_has_21_slots_in_order() {
        let slots = all_slots(&Day::ALL, &Shift::ALL);
        assert_eq!(slots.len(), 21);
        assert_eq!(slots[0], Slot::new(Day::Monday, Shift::Morning));
        assert_eq!(slots[2], Slot::new(Day::Monday, Shift::Evening));
        assert_eq!(slots[3], Slot::new(Day::Tuesday, Shift::Morning));
        assert_eq!(slots[20], Slot::new(Day::Sunday, Shift::Evening));
    }

    #[test]
    fn rankings_ignore_repeat_preferences() {
        let monday = Slot::new(Day::Monday, Shift::Morning);
        let friday = Slot::new(Day::Friday, Shift::Evening);
        let prefs = vec![
            Preference { employee: EmployeeId(1), slot: monday },
            Preference { employee: EmployeeId(1), slot: monday },
            Preference { employee: EmployeeId(2), slot: monday },
            Preference { employee: EmployeeId(2), slot: friday },
        ];
        let rankings = calculate_slot_rankings(&prefs);
        assert_eq!(rankings.get(&monday), Some(&2));
        assert_eq!(rankings.get(&friday), Some(&1));
        assert_eq!(rankings.len(), 2);
    }
}
