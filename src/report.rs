use serde::Serialize;
use std::fmt;

use crate::data::{CourseId, RoomId, StudentId};
use crate::solver::ScheduleOptimizer;

/// One committed course as the student sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub course_id: CourseId,
    pub course_name: String,
    pub room_id: Option<RoomId>,
    pub time: String,
    pub enrolled: usize,
    pub max_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_id: StudentId,
    pub entries: Vec<ReportLine>,
}

/// Read-only projection of a student's committed schedule. `None` for an
/// unknown student; a known student without enrollments gets an empty report.
pub fn student_report(optimizer: &ScheduleOptimizer, student: StudentId) -> Option<StudentReport> {
    optimizer.catalog().student(student)?;

    let entries = optimizer
        .student_schedule(student)
        .iter()
        .filter_map(|entry| {
            let course = optimizer.catalog().course(entry.course_id)?;
            Some(ReportLine {
                course_id: course.code,
                course_name: course.name.clone(),
                room_id: entry.room_id,
                time: entry.time_slot.to_string(),
                enrolled: optimizer.enrollment(course.code),
                max_capacity: course.max_capacity,
            })
        })
        .collect();

    Some(StudentReport {
        student_id: student,
        entries,
    })
}

impl fmt::Display for StudentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schedule for Student ID {}:", self.student_id)?;
        for line in &self.entries {
            writeln!(f, "{}", line.course_name)?;
            match line.room_id {
                Some(room) => writeln!(f, "  Room: {room}")?,
                None => writeln!(f, "  Room: unassigned")?,
            }
            writeln!(f, "  Time: {}", line.time)?;
            writeln!(f, "  Current Enrollment: {}/{}", line.enrolled, line.max_capacity)?;
        }
        Ok(())
    }
}
