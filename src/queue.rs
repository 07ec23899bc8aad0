use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::catalog::Catalog;
use crate::data::{RegistrationRequest, Timestamp};
use crate::error::ScheduleError;

/// A queued request with the priority it was enqueued with.
#[derive(Debug, Clone)]
struct Pending {
    academic_year: u32,
    sequence: u64,
    request: RegistrationRequest,
}

impl Pending {
    // Smaller key is served first.
    fn key(&self) -> (u32, bool, Timestamp, u64) {
        (
            self.academic_year,
            !self.request.is_core_course,
            self.request.timestamp,
            self.sequence,
        )
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // BinaryHeap pops the greatest element, so the key comparison is reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Pending requests ordered by academic year (lower first), then core before
/// elective, then earlier timestamp, then insertion order.
#[derive(Debug, Default)]
pub struct RequestQueue {
    heap: BinaryHeap<Pending>,
    next_sequence: u64,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request, capturing the student's current academic year.
    pub fn enqueue(
        &mut self,
        catalog: &Catalog,
        request: RegistrationRequest,
    ) -> Result<(), ScheduleError> {
        let student = catalog
            .student(request.student_id)
            .ok_or(ScheduleError::UnknownStudent(request.student_id))?;
        trace!(
            "Enqueued request of student {} (year {}) for course {}",
            student.id,
            student.academic_year,
            request.course_id
        );
        self.heap.push(Pending {
            academic_year: student.academic_year,
            sequence: self.next_sequence,
            request,
        });
        self.next_sequence += 1;
        Ok(())
    }

    /// `None` means the queue is drained.
    pub fn pop_highest_priority(&mut self) -> Option<RegistrationRequest> {
        self.heap.pop().map(|pending| pending.request)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Student;

    fn catalog_with(students: &[(u32, u32)]) -> Catalog {
        let mut catalog = Catalog::standard();
        for &(id, year) in students {
            catalog
                .add_student(Student {
                    id,
                    major: "Computer Science".to_string(),
                    academic_year: year,
                })
                .unwrap();
        }
        catalog
    }

    fn request(student_id: u32, core: bool, timestamp: Timestamp) -> RegistrationRequest {
        RegistrationRequest {
            student_id,
            course_id: 101,
            is_core_course: core,
            timestamp,
        }
    }

    fn drain(queue: &mut RequestQueue) -> Vec<RegistrationRequest> {
        std::iter::from_fn(|| queue.pop_highest_priority()).collect()
    }

    #[test]
    fn lower_year_always_pops_first() {
        let catalog = catalog_with(&[(1, 3), (2, 1), (3, 2)]);
        let mut queue = RequestQueue::new();
        // Year 3 is core and earliest, yet still loses to lower years.
        queue.enqueue(&catalog, request(1, true, 0)).unwrap();
        queue.enqueue(&catalog, request(3, false, 5)).unwrap();
        queue.enqueue(&catalog, request(2, false, 9)).unwrap();

        let order: Vec<_> = drain(&mut queue).iter().map(|r| r.student_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn core_beats_elective_within_a_year() {
        let catalog = catalog_with(&[(1, 2), (2, 2)]);
        let mut queue = RequestQueue::new();
        queue.enqueue(&catalog, request(1, false, 1)).unwrap();
        queue.enqueue(&catalog, request(2, true, 2)).unwrap();

        let first = queue.pop_highest_priority().unwrap();
        assert_eq!(first.student_id, 2);
        assert!(first.is_core_course);
    }

    #[test]
    fn earlier_timestamp_then_insertion_order_breaks_ties() {
        let catalog = catalog_with(&[(1, 1), (2, 1), (3, 1)]);
        let mut queue = RequestQueue::new();
        queue.enqueue(&catalog, request(1, true, 20)).unwrap();
        queue.enqueue(&catalog, request(2, true, 10)).unwrap();
        queue.enqueue(&catalog, request(3, true, 10)).unwrap();

        let order: Vec<_> = drain(&mut queue).iter().map(|r| r.student_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn empty_queue_yields_none() {
        let catalog = catalog_with(&[(1, 1)]);
        let mut queue = RequestQueue::new();
        assert!(queue.pop_highest_priority().is_none());
        queue.enqueue(&catalog, request(1, true, 0)).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_highest_priority().is_some());
        assert!(queue.is_empty());
        assert!(queue.pop_highest_priority().is_none());
    }

    #[test]
    fn unknown_student_is_refused() {
        let catalog = catalog_with(&[]);
        let mut queue = RequestQueue::new();
        assert_eq!(
            queue.enqueue(&catalog, request(9, true, 0)),
            Err(ScheduleError::UnknownStudent(9))
        );
        assert!(queue.is_empty());
    }
}
