use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde::Serialize;

/// Day of the scheduling week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Day::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| wanted.to_string())
    }
}

/// One of the three daily shifts, in the order they happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Afternoon => "Afternoon",
            Shift::Evening => "Evening",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Shift::ALL
            .iter()
            .copied()
            .find(|sh| sh.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| wanted.to_string())
    }
}

/// A schedulable unit. Ordering is day first, then shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Slot {
    pub day: Day,
    pub shift: Shift,
}

impl Slot {
    pub fn new(day: Day, shift: Shift) -> Self {
        Slot { day, shift }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.shift)
    }
}

/// Database identity of an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An employee's interest in working a given slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preference {
    pub employee: EmployeeId,
    pub slot: Slot,
}

/// Limits and calendar used by one schedule computation
#[derive(Debug, Clone)]
pub struct Rules {
    pub days: Vec<Day>,
    pub shifts: Vec<Shift>,
    pub per_employee_cap: u32,
    pub per_slot_minimum: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            days: Day::ALL.to_vec(),
            shifts: Shift::ALL.to_vec(),
            per_employee_cap: 5,
            per_slot_minimum: 2,
        }
    }
}

/// Slot -> employees working it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub slots: BTreeMap<Slot, BTreeSet<EmployeeId>>,
}

impl Schedule {
    /// Returns false if the employee was already in the slot
    pub fn assign(&mut self, slot: Slot, employee: EmployeeId) -> bool {
        self.slots.entry(slot).or_default().insert(employee)
    }

    pub fn is_assigned(&self, slot: Slot, employee: EmployeeId) -> bool {
        self.slots.get(&slot).is_some_and(|set| set.contains(&employee))
    }

    pub fn staffing(&self, slot: Slot) -> usize {
        self.slots.get(&slot).map_or(0, BTreeSet::len)
    }

    /// (slot, employee) pairs in slot order
    pub fn assignments(&self) -> impl Iterator<Item = (Slot, EmployeeId)> + '_ {
        self.slots
            .iter()
            .flat_map(|(slot, set)| set.iter().map(move |emp| (*slot, *emp)))
    }

    pub fn total_assignments(&self) -> usize {
        self.slots.values().map(BTreeSet::len).sum()
    }
}

/// A slot left below the minimum because nobody eligible remained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageDeficit {
    pub slot: Slot,
    pub assigned: u32,
    pub required: u32,
}

/// Result of one engine run
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    pub schedule: Schedule,
    pub deficits: Vec<CoverageDeficit>,
    pub load: BTreeMap<EmployeeId, u32>, // employee -> slots assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_parses_case_insensitively() {
        assert_eq!("monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!(" SUNDAY ".parse::<Day>(), Ok(Day::Sunday));
        assert_eq!("Funday".parse::<Day>(), Err("Funday".to_string()));
    }

    #[test]
    fn shift_parses_case_insensitively() {
        assert_eq!("evening".parse::<Shift>(), Ok(Shift::Evening));
        assert!("Night".parse::<Shift>().is_err());
    }

    #[test]
    fn slots_order_by_day_then_shift() {
        let mut slots = vec![
            Slot::new(Day::Tuesday, Shift::Morning),
            Slot::new(Day::Monday, Shift::Evening),
            Slot::new(Day::Monday, Shift::Morning),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                Slot::new(Day::Monday, Shift::Morning),
                Slot::new(Day::Monday, Shift::Evening),
                Slot::new(Day::Tuesday, Shift::Morning),
            ]
        );
    }

    #[test]
    fn assign_rejects_duplicate_entry() {
        let mut schedule = Schedule::default();
        let slot = Slot::new(Day::Friday, Shift::Afternoon);
        assert!(schedule.assign(slot, EmployeeId(1)));
        assert!(!schedule.assign(slot, EmployeeId(1)));
        assert_eq!(schedule.staffing(slot), 1);
        assert!(schedule.is_assigned(slot, EmployeeId(1)));
        assert_eq!(schedule.total_assignments(), 1);
    }

    #[test]
    fn default_rules_cover_full_week() {
        let rules = Rules::default();
        assert_eq!(rules.days.len(), 7);
        assert_eq!(rules.shifts.len(), 3);
        assert_eq!(rules.per_employee_cap, 5);
        assert_eq!(rules.per_slot_minimum, 2);
    }

    #[test]
    fn deficit_serializes_with_named_day_and_shift() {
        let deficit = CoverageDeficit {
            slot: Slot::new(Day::Thursday, Shift::Evening),
            assigned: 1,
            required: 2,
        };
        assert_eq!(
            serde_json::to_value(deficit).unwrap(),
            serde_json::json!({
                "slot": {"day": "Thursday", "shift": "Evening"},
                "assigned": 1,
                "required": 2
            })
        );
        assert_eq!(serde_json::to_value(EmployeeId(4)).unwrap(), serde_json::json!(4));
    }
}
