use serde::Serialize;
use thiserror::Error;

use crate::data::{CourseId, RoomId, StudentId, TimeSlot};

/// Why a single request was turned away. No state changes on rejection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Rejection {
    #[error("course {course} is full")]
    CapacityExceeded { course: CourseId },
    #[error("no suitable room is free at any slot for course {course}")]
    NoFeasibleSlot { course: CourseId },
    #[error("course {course} meets at {slot}, which clashes with the student's schedule")]
    LateStudentConflict { course: CourseId, slot: TimeSlot },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("request rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("unknown student {0}")]
    UnknownStudent(StudentId),
    #[error("unknown course {0}")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("registrar state is unavailable after a panic while it was held")]
    Poisoned,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate student id {0}")]
    DuplicateStudent(StudentId),
    #[error("duplicate course code {0}")]
    DuplicateCourse(CourseId),
    #[error("duplicate room id {0}")]
    DuplicateRoom(RoomId),
    #[error("course {0} must have a capacity greater than zero")]
    ZeroCourseCapacity(CourseId),
    #[error("room {0} must have a capacity greater than zero")]
    ZeroRoomCapacity(RoomId),
    #[error("student {0} must be in academic year 1 or later")]
    InvalidYear(StudentId),
    #[error("request references unknown student {0}")]
    UnknownStudent(StudentId),
    #[error("request references unknown course {0}")]
    UnknownCourse(CourseId),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Extract(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}
