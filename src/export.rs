use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::store::ScheduleRow;

/// Writes schedule rows as CSV with the columns day, shift, employee_id, employee
pub fn write_schedule_csv<W: Write>(rows: &[ScheduleRow], output: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(output);

    wtr.write_record(["day", "shift", "employee_id", "employee"])?;
    for row in rows {
        let employee_id = row.employee_id.to_string();
        wtr.write_record([
            row.slot.day.as_str(),
            row.slot.shift.as_str(),
            employee_id.as_str(),
            row.employee_name.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the schedule to a CSV file, overwriting it
pub fn export_schedule_to_csv(rows: &[ScheduleRow], csv_path: &Path) -> Result<(), csv::Error> {
    let file = File::create(csv_path)?;
    write_schedule_csv(rows, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Day, EmployeeId, Shift, Slot};

    fn rows() -> Vec<ScheduleRow> {
        vec![
            ScheduleRow {
                slot: Slot::new(Day::Monday, Shift::Morning),
                employee_id: EmployeeId(1),
                employee_name: "Ada".to_string(),
            },
            ScheduleRow {
                slot: Slot::new(Day::Monday, Shift::Morning),
                employee_id: EmployeeId(2),
                employee_name: "Lovelace, Ada".to_string(),
            },
        ]
    }

    #[test]
    fn writes_header_and_rows() {
        let mut out = Vec::new();
        write_schedule_csv(&rows(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "day,shift,employee_id,employee\n\
             Monday,Morning,1,Ada\n\
             Monday,Morning,2,\"Lovelace, Ada\"\n"
        );
    }

    #[test]
    fn empty_schedule_still_has_header() {
        let mut out = Vec::new();
        write_schedule_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "day,shift,employee_id,employee\n");
    }

    #[test]
    fn export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.csv");
        std::fs::write(&path, "stale").unwrap();

        export_schedule_to_csv(&rows(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("day,shift,employee_id,employee\n"));
        assert!(!text.contains("stale"));
    }
}
