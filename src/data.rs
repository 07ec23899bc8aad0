use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Rejection;
use crate::report::StudentReport;

// Type aliases for clarity
pub type StudentId = u32;
pub type RoomId = u32;
pub type CourseId = u32;
pub type Timestamp = u64;

pub const DAYS_PER_WEEK: u8 = 5;
pub const PERIODS_PER_DAY: u8 = 8;

const DAY_NAMES: [&str; DAYS_PER_WEEK as usize] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// A student requesting enrollments. Only the academic year changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub major: String,
    pub academic_year: u32,
}

/// Represents a physical room of a given type and capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_type: String,
    pub capacity: u32,
    pub equipment: String,
}

/// A course offered as a single section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: CourseId,
    pub name: String,
    pub required_room_type: String,
    pub max_capacity: u32,
}

impl Room {
    /// Type matches and every seat the course may fill is available.
    pub fn suits(&self, course: &Course) -> bool {
        self.room_type == course.required_room_type && self.capacity >= course.max_capacity
    }

    pub fn wasted_capacity(&self, course: &Course) -> u32 {
        self.capacity.saturating_sub(course.max_capacity)
    }
}

/// One cell of the weekly grid: day 1..=5 (Monday..Friday), period 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TimeSlot {
    pub day: u8,
    pub period: u8,
}

impl TimeSlot {
    pub fn new(day: u8, period: u8) -> Option<Self> {
        let valid = (1..=DAYS_PER_WEEK).contains(&day) && (1..=PERIODS_PER_DAY).contains(&period);
        valid.then_some(Self { day, period })
    }

    /// The full week, day-major: (1,1), (1,2), ..., (5,8).
    pub fn week() -> Vec<TimeSlot> {
        (1..=DAYS_PER_WEEK)
            .flat_map(|day| (1..=PERIODS_PER_DAY).map(move |period| TimeSlot { day, period }))
            .collect()
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[usize::from(self.day.clamp(1, DAYS_PER_WEEK) - 1)]
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Period {}", self.day_name(), self.period)
    }
}

/// A pending enrollment request. Consumed exactly once by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub is_core_course: bool,
    pub timestamp: Timestamp,
}

/// The committed unit of assignment. `room_id` is `None` only for courses
/// pinned by the unroomed fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub course_id: CourseId,
    pub room_id: Option<RoomId>,
    pub time_slot: TimeSlot,
}

/// How an accepted request was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    /// First enrollee; room and slot were discovered for the course.
    Opened,
    /// Later enrollee; joined the course's fixed room and slot.
    Joined,
    /// First enrollee under the unroomed fallback: slot pinned, no room.
    Degraded,
}

/// Result of processing one request from the queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub request: RegistrationRequest,
    pub course_name: String,
    pub placement: Option<Placement>,
    pub rejection: Option<Rejection>,
}

impl RequestOutcome {
    pub fn accepted(&self) -> bool {
        self.placement.is_some()
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.placement, &self.rejection) {
            (Some(Placement::Degraded), _) => write!(
                f,
                "Enrolled in {} without a room (no suitable room was free)",
                self.course_name
            ),
            (Some(_), _) => write!(f, "Successfully enrolled in {}", self.course_name),
            (None, Some(reason)) => {
                write!(f, "Could not enroll in {} ({})", self.course_name, reason)
            }
            (None, None) => write!(f, "Could not enroll in {}", self.course_name),
        }
    }
}

/// Catalog supplied with a batch; the built-in catalog is used when absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInput {
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
}

/// The complete input for one batch run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    #[serde(default)]
    pub catalog: Option<CatalogInput>,
    pub students: Vec<Student>,
    pub requests: Vec<RegistrationRequest>,
}

/// The final output of a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutput {
    pub outcomes: Vec<RequestOutcome>,
    pub schedules: Vec<StudentReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_has_forty_distinct_slots_in_day_major_order() {
        let week = TimeSlot::week();
        assert_eq!(week.len(), 40);
        assert_eq!(week[0], TimeSlot { day: 1, period: 1 });
        assert_eq!(week[8], TimeSlot { day: 2, period: 1 });
        assert_eq!(week[39], TimeSlot { day: 5, period: 8 });
        let mut sorted = week.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), 40);
    }

    #[test]
    fn slot_renders_day_name_and_period() {
        assert_eq!(TimeSlot::new(1, 1).unwrap().to_string(), "Monday, Period 1");
        assert_eq!(TimeSlot::new(5, 8).unwrap().to_string(), "Friday, Period 8");
        assert!(TimeSlot::new(0, 1).is_none());
        assert!(TimeSlot::new(3, 9).is_none());
    }

    #[test]
    fn room_suitability_checks_type_and_capacity() {
        let lab = Room {
            id: 1,
            room_type: "Lab".to_string(),
            capacity: 30,
            equipment: "Computers".to_string(),
        };
        let course = |kind: &str, max| Course {
            code: 1,
            name: "X".to_string(),
            required_room_type: kind.to_string(),
            max_capacity: max,
        };
        assert!(lab.suits(&course("Lab", 30)));
        assert!(lab.suits(&course("Lab", 25)));
        assert!(!lab.suits(&course("Lab", 31)));
        assert!(!lab.suits(&course("Classroom", 20)));
        assert_eq!(lab.wasted_capacity(&course("Lab", 25)), 5);
    }
}
