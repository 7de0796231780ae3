use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::schedule::{CoverageDeficit, EmployeeId, Slot};
use crate::store::ScheduleRow;

/// Every shift one employee works, in slot order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeShifts {
    pub employee_id: EmployeeId,
    pub name: String,
    pub slots: Vec<Slot>,
}

/// Formats an employee name with its id, since names are not unique
pub fn format_employee_name(name: &str, id: EmployeeId) -> String {
    format!("{} (#{})", name, id)
}

/// Names working `slot`, formatted, in row order
fn names_in_slot(rows: &[ScheduleRow], slot: Slot) -> Vec<String> {
    rows.iter()
        .filter(|r| r.slot == slot)
        .map(|r| format_employee_name(&r.employee_name, r.employee_id))
        .collect()
}

/// Renders one line per slot: "Monday Morning: Ada (#1), Bob (#2)" or "[EMPTY]"
pub fn render_schedule(rows: &[ScheduleRow], slots: &[Slot]) -> String {
    let mut out = String::new();
    for &slot in slots {
        let names = names_in_slot(rows, slot);
        if names.is_empty() {
            let _ = writeln!(out, "{}: [EMPTY]", slot);
        } else {
            let _ = writeln!(out, "{}: {}", slot, names.join(", "));
        }
    }
    out
}

/// Groups the schedule by employee, ordered by employee id
pub fn summarize_by_employee(rows: &[ScheduleRow]) -> Vec<EmployeeShifts> {
    let mut summary: Vec<EmployeeShifts> = Vec::new();
    for row in rows {
        match summary.iter_mut().find(|s| s.employee_id == row.employee_id) {
            Some(entry) => entry.slots.push(row.slot),
            None => summary.push(EmployeeShifts {
                employee_id: row.employee_id,
                name: row.employee_name.clone(),
                slots: vec![row.slot],
            }),
        }
    }
    summary.sort_by_key(|s| s.employee_id);
    for entry in &mut summary {
        entry.slots.sort();
    }
    summary
}

pub fn render_coverage_report(deficits: &[CoverageDeficit]) -> String {
    if deficits.is_empty() {
        return "All slots meet minimum coverage.\n".to_string();
    }
    let mut out = format!("⚠️  Slots below minimum coverage ({}):\n", deficits.len());
    for d in deficits {
        let _ = writeln!(out, "  - {} ({}/{})", d.slot, d.assigned, d.required);
    }
    out
}

/// Prints a schedule and the per-employee summary
pub fn print_schedule(title: &str, rows: &[ScheduleRow], slots: &[Slot]) {
    println!("\n=== {} ===", title);
    println!("Total assignments: {}", rows.len());
    println!("\nSchedule by slot:");
    for line in render_schedule(rows, slots).lines() {
        println!("  {}", line);
    }

    println!("\nShifts by employee:");
    for entry in summarize_by_employee(rows) {
        let worked: Vec<String> = entry.slots.iter().map(Slot::to_string).collect();
        println!(
            "  {} -> {}",
            format_employee_name(&entry.name, entry.employee_id),
            worked.join(", ")
        );
    }
}

/// Writes the schedule to a text file with a header line
pub fn write_schedule_to_file(
    title: &str,
    rows: &[ScheduleRow],
    slots: &[Slot],
    path: &Path,
) -> std::io::Result<()> {
    let body = format!("** {} **\n{}", title, render_schedule(rows, slots));
    fs::write(path, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{all_slots, Day, Shift};

    fn row(day: Day, shift: Shift, id: i64, name: &str) -> ScheduleRow {
        ScheduleRow {
            slot: Slot::new(day, shift),
            employee_id: EmployeeId(id),
            employee_name: name.to_string(),
        }
    }

    #[test]
    fn renders_every_slot_including_empty_ones() {
        let rows = vec![
            row(Day::Monday, Shift::Morning, 1, "Ada"),
            row(Day::Monday, Shift::Morning, 2, "Bob"),
        ];
        let text = render_schedule(&rows, &all_slots(&[Day::Monday], &Shift::ALL));
        assert_eq!(
            text,
            "Monday Morning: Ada (#1), Bob (#2)\n\
             Monday Afternoon: [EMPTY]\n\
             Monday Evening: [EMPTY]\n"
        );
    }

    #[test]
    fn summary_groups_slots_per_employee() {
        let rows = vec![
            row(Day::Monday, Shift::Morning, 2, "Bob"),
            row(Day::Tuesday, Shift::Evening, 1, "Ada"),
            row(Day::Monday, Shift::Evening, 1, "Ada"),
        ];
        let summary = summarize_by_employee(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].name, "Ada");
        assert_eq!(
            summary[0].slots,
            vec![
                Slot::new(Day::Monday, Shift::Evening),
                Slot::new(Day::Tuesday, Shift::Evening),
            ]
        );
        assert_eq!(summary[1].slots, vec![Slot::new(Day::Monday, Shift::Morning)]);
    }

    #[test]
    fn coverage_report_lists_short_slots() {
        let deficits = vec![CoverageDeficit {
            slot: Slot::new(Day::Sunday, Shift::Evening),
            assigned: 1,
            required: 2,
        }];
        let report = render_coverage_report(&deficits);
        assert!(report.contains("(1):"));
        assert!(report.contains("Sunday Evening (1/2)"));
        assert_eq!(render_coverage_report(&[]), "All slots meet minimum coverage.\n");
    }

    #[test]
    fn schedule_file_has_title_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.txt");
        let rows = vec![row(Day::Friday, Shift::Afternoon, 3, "Cy")];
        write_schedule_to_file("Week", &rows, &[Slot::new(Day::Friday, Shift::Afternoon)], &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "** Week **\nFriday Afternoon: Cy (#3)\n"
        );
    }
}
