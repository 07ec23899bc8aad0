use crate::catalog::Catalog;
use crate::conflict::Bookings;
use crate::data::{
    Course, CourseId, Placement, RegistrationInput, RegistrationOutput, RegistrationRequest,
    RequestOutcome, RoomId, ScheduleEntry, Student, StudentId, TimeSlot,
};
use crate::error::{CatalogError, Rejection, ScheduleError};
use crate::queue::RequestQueue;
use crate::report::{self, StudentReport};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// What a first enrollee gets when no slot has a free suitable room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Reject with `NoFeasibleSlot`; nothing is committed.
    #[default]
    Reject,
    /// Pin the course to the first slot of the week without a room and
    /// report the placement as degraded.
    Unroomed,
}

/// A course's single section once its first enrollee is accepted.
#[derive(Debug, Clone)]
struct CourseBooking {
    entry: ScheduleEntry,
    enrollees: Vec<StudentId>,
}

/// Greedy allocator. Sole owner and mutator of all committed state.
#[derive(Debug)]
pub struct ScheduleOptimizer {
    catalog: Catalog,
    slots: Vec<TimeSlot>,
    fallback: FallbackPolicy,
    bookings: Bookings,
    courses: HashMap<CourseId, CourseBooking>,
}

impl ScheduleOptimizer {
    pub fn new(catalog: Catalog, fallback: FallbackPolicy) -> Self {
        Self {
            catalog,
            slots: TimeSlot::week(),
            fallback,
            bookings: Bookings::default(),
            courses: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn bookings(&self) -> &Bookings {
        &self.bookings
    }

    pub fn register_student(&mut self, student: Student) -> Result<StudentId, CatalogError> {
        self.catalog.add_student(student)
    }

    pub fn upsert_student(&mut self, student: Student) -> Result<StudentId, CatalogError> {
        self.catalog.upsert_student(student)
    }

    pub fn set_academic_year(
        &mut self,
        student: StudentId,
        year: u32,
    ) -> Result<(), CatalogError> {
        self.catalog.set_academic_year(student, year)
    }

    /// Commits the request or rejects it without touching any state.
    pub fn schedule_registration(
        &mut self,
        request: &RegistrationRequest,
    ) -> Result<Placement, ScheduleError> {
        let student = request.student_id;
        if self.catalog.student(student).is_none() {
            return Err(ScheduleError::UnknownStudent(student));
        }
        let course = self
            .catalog
            .course(request.course_id)
            .ok_or(ScheduleError::UnknownCourse(request.course_id))?;

        if self.enrollment(course.code) >= course.max_capacity as usize {
            debug!("Course {} is full, rejecting student {}", course.code, student);
            return Err(Rejection::CapacityExceeded { course: course.code }.into());
        }

        if self.courses.contains_key(&course.code) {
            let code = course.code;
            self.join(student, code)
        } else {
            let course = course.clone();
            self.open(student, &course)
        }
    }

    /// Committed entries for a student, in enrollment order.
    pub fn student_schedule(&self, student: StudentId) -> &[ScheduleEntry] {
        self.bookings.schedule_of(student)
    }

    pub fn enrollment(&self, course: CourseId) -> usize {
        self.courses
            .get(&course)
            .map_or(0, |booking| booking.enrollees.len())
    }

    pub fn course_assignment(&self, course: CourseId) -> Option<ScheduleEntry> {
        self.courses.get(&course).map(|booking| booking.entry)
    }

    pub fn room_bookings(&self, room: RoomId) -> Vec<TimeSlot> {
        self.bookings.room_bookings(room).collect()
    }

    fn open(&mut self, student: StudentId, course: &Course) -> Result<Placement, ScheduleError> {
        let (entry, placement) = match self.discover(course, student) {
            Some((slot, room)) => {
                info!(
                    "Course {} opened in room {} at {} for student {}",
                    course.code,
                    room,
                    slot,
                    student
                );
                self.bookings.occupy(room, slot);
                let entry = ScheduleEntry {
                    course_id: course.code,
                    room_id: Some(room),
                    time_slot: slot,
                };
                (entry, Placement::Opened)
            }
            None => self.fall_back(student, course)?,
        };

        self.bookings.attach(student, entry);
        self.courses.insert(
            course.code,
            CourseBooking {
                entry,
                enrollees: vec![student],
            },
        );
        Ok(placement)
    }

    fn fall_back(
        &self,
        student: StudentId,
        course: &Course,
    ) -> Result<(ScheduleEntry, Placement), ScheduleError> {
        let infeasible = Rejection::NoFeasibleSlot { course: course.code };
        match self.fallback {
            FallbackPolicy::Reject => {
                warn!("No free {} room for course {}", course.required_room_type, course.code);
                Err(infeasible.into())
            }
            FallbackPolicy::Unroomed => {
                let slot = self.slots[0];
                if self.bookings.student_has_conflict(student, slot) {
                    warn!(
                        "Course {} cannot fall back to {}: student {} is busy",
                        course.code,
                        slot,
                        student
                    );
                    return Err(infeasible.into());
                }
                warn!("Course {} pinned to {} without a room", course.code, slot);
                let entry = ScheduleEntry {
                    course_id: course.code,
                    room_id: None,
                    time_slot: slot,
                };
                Ok((entry, Placement::Degraded))
            }
        }
    }

    fn join(&mut self, student: StudentId, course: CourseId) -> Result<Placement, ScheduleError> {
        let booking = self
            .courses
            .get_mut(&course)
            .ok_or(ScheduleError::UnknownCourse(course))?;
        let entry = booking.entry;
        if self.bookings.student_has_conflict(student, entry.time_slot) {
            debug!(
                "Student {} clashes with course {} at {}",
                student,
                entry.course_id,
                entry.time_slot
            );
            return Err(Rejection::LateStudentConflict {
                course: entry.course_id,
                slot: entry.time_slot,
            }
            .into());
        }

        booking.enrollees.push(student);
        self.bookings.attach(student, entry);
        trace!("Student {} joined course {}", student, entry.course_id);
        Ok(Placement::Joined)
    }

    /// Slots ranked by how many prospective enrollees are busy there, skipping
    /// any slot where the requesting student is busy; the first one with a
    /// suitable free room wins.
    fn discover(&self, course: &Course, student: StudentId) -> Option<(TimeSlot, RoomId)> {
        let prospective = [student];
        self.slots
            .iter()
            .copied()
            .map(|slot| (self.conflict_count(&prospective, slot), slot))
            .sorted_by_key(|(conflicts, _)| *conflicts)
            .filter(|(_, slot)| !self.bookings.student_has_conflict(student, *slot))
            .find_map(|(_, slot)| self.find_optimal_room(course, slot).map(|room| (slot, room)))
    }

    fn conflict_count(&self, students: &[StudentId], slot: TimeSlot) -> usize {
        students
            .iter()
            .filter(|student| self.bookings.student_has_conflict(**student, slot))
            .count()
    }

    /// The suitable room free at `slot` with the least wasted capacity; the
    /// first one listed wins a tie.
    fn find_optimal_room(&self, course: &Course, slot: TimeSlot) -> Option<RoomId> {
        self.catalog
            .rooms()
            .iter()
            .filter(|room| room.suits(course) && !self.bookings.room_is_busy(room.id, slot))
            .min_by_key(|room| room.wasted_capacity(course))
            .map(|room| room.id)
    }
}

/// The intake queue together with the optimizer that drains it.
#[derive(Debug)]
pub struct Registrar {
    optimizer: ScheduleOptimizer,
    queue: RequestQueue,
}

impl Registrar {
    pub fn new(catalog: Catalog, fallback: FallbackPolicy) -> Self {
        Self {
            optimizer: ScheduleOptimizer::new(catalog, fallback),
            queue: RequestQueue::new(),
        }
    }

    pub fn optimizer(&self) -> &ScheduleOptimizer {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut ScheduleOptimizer {
        &mut self.optimizer
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn submit(&mut self, request: RegistrationRequest) -> Result<(), ScheduleError> {
        let catalog = self.optimizer.catalog();
        if catalog.course(request.course_id).is_none() {
            return Err(ScheduleError::UnknownCourse(request.course_id));
        }
        self.queue.enqueue(catalog, request)
    }

    /// Registers new students, applies year changes to known ones and queues
    /// the requests. Nothing changes if any student or request is invalid.
    pub fn submit_batch(
        &mut self,
        students: Vec<Student>,
        requests: Vec<RegistrationRequest>,
    ) -> Result<usize, ScheduleError> {
        let mut staged = self.optimizer.catalog().clone();
        for student in &students {
            staged.upsert_student(student.clone())?;
        }
        staged.check_requests(&requests)?;

        for student in students {
            self.optimizer.upsert_student(student)?;
        }
        let queued = requests.len();
        for request in requests {
            self.submit(request)?;
        }
        Ok(queued)
    }

    /// Resolves the highest-priority request; `None` once the queue is empty.
    pub fn process_next(&mut self) -> Option<RequestOutcome> {
        let request = self.queue.pop_highest_priority()?;
        let result = self.optimizer.schedule_registration(&request);
        let course_name = self
            .optimizer
            .catalog()
            .course(request.course_id)
            .map(|course| course.name.clone())
            .unwrap_or_default();

        let outcome = match result {
            Ok(placement) => RequestOutcome {
                request,
                course_name,
                placement: Some(placement),
                rejection: None,
            },
            Err(ScheduleError::Rejected(rejection)) => RequestOutcome {
                request,
                course_name,
                placement: None,
                rejection: Some(rejection),
            },
            Err(err) => {
                warn!("Dropping request: {}", err);
                RequestOutcome {
                    request,
                    course_name,
                    placement: None,
                    rejection: None,
                }
            }
        };
        info!("Student {}: {}", outcome.request.student_id, outcome);
        Some(outcome)
    }

    pub fn process_pending(&mut self) -> Vec<RequestOutcome> {
        std::iter::from_fn(|| self.process_next()).collect()
    }
}

/// A registrar behind one lock. Every submission and every per-request commit
/// runs with the lock held, so commits for different requests never interleave.
#[derive(Debug, Clone)]
pub struct SharedRegistrar {
    inner: Arc<Mutex<Registrar>>,
}

impl SharedRegistrar {
    pub fn new(registrar: Registrar) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registrar)),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Registrar>, ScheduleError> {
        self.inner.lock().map_err(|_| ScheduleError::Poisoned)
    }

    pub fn submit(&self, request: RegistrationRequest) -> Result<(), ScheduleError> {
        self.lock()?.submit(request)
    }

    /// Schedules a request immediately, bypassing the queue.
    pub fn schedule(&self, request: &RegistrationRequest) -> Result<Placement, ScheduleError> {
        self.lock()?.optimizer_mut().schedule_registration(request)
    }

    /// Drains the queue one request per lock acquisition.
    pub fn process_pending(&self) -> Result<Vec<RequestOutcome>, ScheduleError> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.lock()?.process_next() {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Runs one batch: builds the catalog, queues every request, drains the queue
/// and reports every student's schedule.
pub fn solve(
    input: &RegistrationInput,
    fallback: FallbackPolicy,
) -> Result<RegistrationOutput, CatalogError> {
    let start_time = Instant::now();
    let mut catalog = Catalog::from_input(input.catalog.as_ref())?;
    for student in &input.students {
        catalog.add_student(student.clone())?;
    }
    catalog.check_requests(&input.requests)?;

    info!(
        "Processing {} requests from {} students over {} rooms...",
        input.requests.len(),
        input.students.len(),
        catalog.rooms().len()
    );
    let mut registrar = Registrar::new(catalog, fallback);
    for request in &input.requests {
        // references were checked above
        if let Err(err) = registrar.submit(request.clone()) {
            warn!("Skipping request: {}", err);
        }
    }
    let outcomes = registrar.process_pending();

    let optimizer = registrar.optimizer();
    let schedules: Vec<StudentReport> = optimizer
        .catalog()
        .students()
        .iter()
        .filter_map(|student| report::student_report(optimizer, student.id))
        .collect();

    info!(
        "Accepted {} of {} requests in {:.2?}",
        outcomes.iter().filter(|outcome| outcome.accepted()).count(),
        outcomes.len(),
        start_time.elapsed()
    );
    Ok(RegistrationOutput { outcomes, schedules })
}
