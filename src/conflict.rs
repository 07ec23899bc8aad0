//! Committed bookings and the two conflict predicates evaluated against them.
//!
//! Both predicates borrow the bookings immutably, so a check always sees one
//! consistent snapshot; mutation needs `&mut` and cannot interleave.

use std::collections::{BTreeSet, HashMap};

use crate::data::{RoomId, ScheduleEntry, StudentId, TimeSlot};

#[derive(Debug, Clone, Default)]
pub struct Bookings {
    student_schedules: HashMap<StudentId, Vec<ScheduleEntry>>,
    room_schedule: HashMap<RoomId, BTreeSet<TimeSlot>>,
}

impl Bookings {
    /// True iff one of the student's committed entries uses exactly `slot`.
    pub fn student_has_conflict(&self, student: StudentId, slot: TimeSlot) -> bool {
        self.student_schedules
            .get(&student)
            .is_some_and(|entries| entries.iter().any(|entry| entry.time_slot == slot))
    }

    /// True iff the room is already booked at `slot`.
    pub fn room_is_busy(&self, room: RoomId, slot: TimeSlot) -> bool {
        self.room_schedule
            .get(&room)
            .is_some_and(|slots| slots.contains(&slot))
    }

    pub fn schedule_of(&self, student: StudentId) -> &[ScheduleEntry] {
        self.student_schedules
            .get(&student)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn room_bookings(&self, room: RoomId) -> impl Iterator<Item = TimeSlot> + '_ {
        self.room_schedule.get(&room).into_iter().flatten().copied()
    }

    pub(crate) fn attach(&mut self, student: StudentId, entry: ScheduleEntry) {
        self.student_schedules.entry(student).or_default().push(entry);
    }

    pub(crate) fn occupy(&mut self, room: RoomId, slot: TimeSlot) -> bool {
        self.room_schedule.entry(room).or_default().insert(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: u8, period: u8) -> TimeSlot {
        TimeSlot::new(day, period).unwrap()
    }

    #[test]
    fn empty_bookings_have_no_conflicts() {
        let bookings = Bookings::default();
        assert!(!bookings.student_has_conflict(1, slot(1, 1)));
        assert!(!bookings.room_is_busy(202, slot(1, 1)));
        assert!(bookings.schedule_of(1).is_empty());
    }

    #[test]
    fn conflicts_match_exact_slot_only() {
        let mut bookings = Bookings::default();
        let monday_first = slot(1, 1);
        bookings.attach(
            1,
            ScheduleEntry {
                course_id: 101,
                room_id: Some(201),
                time_slot: monday_first,
            },
        );
        assert!(bookings.occupy(201, monday_first));
        assert!(!bookings.occupy(201, monday_first));

        assert!(bookings.student_has_conflict(1, monday_first));
        assert!(!bookings.student_has_conflict(1, slot(1, 2)));
        assert!(!bookings.student_has_conflict(2, monday_first));
        assert!(bookings.room_is_busy(201, monday_first));
        assert!(!bookings.room_is_busy(201, slot(2, 1)));
        assert!(!bookings.room_is_busy(202, monday_first));
        assert_eq!(bookings.room_bookings(201).collect::<Vec<_>>(), vec![monday_first]);
    }
}
