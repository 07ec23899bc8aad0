//! Registry of students, courses, and rooms.
//!
//! Entities are created once and referred to everywhere else by id. Rooms keep
//! their insertion order, which is the enumeration order room discovery uses to
//! break ties.

use std::collections::{BTreeMap, HashMap};

use crate::data::{
    CatalogInput, Course, CourseId, RegistrationRequest, Room, RoomId, Student, StudentId,
};
use crate::error::CatalogError;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rooms: Vec<Room>,
    courses: Vec<Course>,
    students: Vec<Student>,
    room_index: HashMap<RoomId, usize>,
    course_index: HashMap<CourseId, usize>,
    student_index: HashMap<StudentId, usize>,
    courses_by_year: BTreeMap<u32, Vec<CourseId>>,
}

impl Catalog {
    pub fn new(rooms: Vec<Room>, courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for room in rooms {
            catalog.add_room(room)?;
        }
        for course in courses {
            catalog.add_course(course, None)?;
        }
        Ok(catalog)
    }

    /// Rooms and per-year course lists of the department this system was built for.
    pub fn standard() -> Self {
        let room = |id, kind: &str, capacity, equipment: &str| Room {
            id,
            room_type: kind.to_string(),
            capacity,
            equipment: equipment.to_string(),
        };
        let course = |code, name: &str, kind: &str, max_capacity| Course {
            code,
            name: name.to_string(),
            required_room_type: kind.to_string(),
            max_capacity,
        };

        let rooms = [
            room(201, "Classroom", 40, "Whiteboard"),
            room(202, "Lab", 30, "Computers"),
            room(203, "Classroom", 35, "Whiteboard"),
            room(204, "Lab", 25, "Computers"),
        ];
        let years = [
            (
                1,
                [
                    course(101, "Information Systems", "Classroom", 40),
                    course(102, "Programming", "Lab", 30),
                    course(103, "Web Technology", "Lab", 30),
                    course(104, "Networks", "Lab", 30),
                    course(105, "Mathematics", "Classroom", 40),
                ],
            ),
            (
                2,
                [
                    course(201, "Information Systems", "Classroom", 40),
                    course(202, "Programming", "Lab", 30),
                    course(203, "Database Systems", "Lab", 30),
                    course(204, "Cloud Computing", "Lab", 30),
                    course(205, "Internet Computing", "Lab", 30),
                ],
            ),
            (
                3,
                [
                    course(301, "Software Engineering", "Classroom", 40),
                    course(302, "Programming", "Lab", 30),
                    course(303, "Cyber Security", "Lab", 30),
                    course(304, "Artificial Intelligence", "Lab", 30),
                    course(305, "Machine Learning", "Lab", 30),
                ],
            ),
        ];

        let mut catalog = Self::default();
        for r in rooms {
            catalog.rooms.push(r);
        }
        for (year, courses) in years {
            for c in courses {
                catalog.courses_by_year.entry(year).or_default().push(c.code);
                catalog.courses.push(c);
            }
        }
        catalog.reindex();
        catalog
    }

    pub fn from_input(input: Option<&CatalogInput>) -> Result<Self, CatalogError> {
        match input {
            Some(input) => Self::new(input.rooms.clone(), input.courses.clone()),
            None => Ok(Self::standard()),
        }
    }

    fn reindex(&mut self) {
        self.room_index = self.rooms.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        self.course_index = self.courses.iter().enumerate().map(|(i, c)| (c.code, i)).collect();
        self.student_index = self.students.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
    }

    pub fn add_room(&mut self, room: Room) -> Result<RoomId, CatalogError> {
        if room.capacity == 0 {
            return Err(CatalogError::ZeroRoomCapacity(room.id));
        }
        if self.room_index.contains_key(&room.id) {
            return Err(CatalogError::DuplicateRoom(room.id));
        }
        let id = room.id;
        self.room_index.insert(id, self.rooms.len());
        self.rooms.push(room);
        Ok(id)
    }

    /// Adds a course, optionally listing it under an academic year.
    pub fn add_course(
        &mut self,
        course: Course,
        year: Option<u32>,
    ) -> Result<CourseId, CatalogError> {
        if course.max_capacity == 0 {
            return Err(CatalogError::ZeroCourseCapacity(course.code));
        }
        if self.course_index.contains_key(&course.code) {
            return Err(CatalogError::DuplicateCourse(course.code));
        }
        let code = course.code;
        self.course_index.insert(code, self.courses.len());
        self.courses.push(course);
        if let Some(year) = year {
            self.courses_by_year.entry(year).or_default().push(code);
        }
        Ok(code)
    }

    pub fn add_student(&mut self, student: Student) -> Result<StudentId, CatalogError> {
        if student.academic_year < 1 {
            return Err(CatalogError::InvalidYear(student.id));
        }
        if self.student_index.contains_key(&student.id) {
            return Err(CatalogError::DuplicateStudent(student.id));
        }
        let id = student.id;
        self.student_index.insert(id, self.students.len());
        self.students.push(student);
        Ok(id)
    }

    /// Adds a new student, or moves a known one to the given academic year.
    /// The major cannot change.
    pub fn upsert_student(&mut self, student: Student) -> Result<StudentId, CatalogError> {
        let known_major = self.student(student.id).map(|known| known.major.clone());
        match known_major {
            None => self.add_student(student),
            Some(major) if major != student.major => {
                Err(CatalogError::DuplicateStudent(student.id))
            }
            Some(_) => {
                self.set_academic_year(student.id, student.academic_year)?;
                Ok(student.id)
            }
        }
    }

    /// Moves a student to another academic year. Requests already queued keep
    /// the priority they were enqueued with.
    pub fn set_academic_year(&mut self, id: StudentId, year: u32) -> Result<(), CatalogError> {
        if year < 1 {
            return Err(CatalogError::InvalidYear(id));
        }
        let index = *self
            .student_index
            .get(&id)
            .ok_or(CatalogError::UnknownStudent(id))?;
        self.students[index].academic_year = year;
        Ok(())
    }

    /// Checks that every request names a known student and course.
    pub fn check_requests(&self, requests: &[RegistrationRequest]) -> Result<(), CatalogError> {
        for request in requests {
            if self.student(request.student_id).is_none() {
                return Err(CatalogError::UnknownStudent(request.student_id));
            }
            if self.course(request.course_id).is_none() {
                return Err(CatalogError::UnknownCourse(request.course_id));
            }
        }
        Ok(())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.room_index.get(&id).map(|&i| &self.rooms[i])
    }

    pub fn course(&self, code: CourseId) -> Option<&Course> {
        self.course_index.get(&code).map(|&i| &self.courses[i])
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.student_index.get(&id).map(|&i| &self.students[i])
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses_for_year(&self, year: u32) -> Vec<&Course> {
        self.courses_by_year
            .get(&year)
            .into_iter()
            .flatten()
            .filter_map(|code| self.course(*code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: StudentId, year: u32) -> Student {
        Student {
            id,
            major: "Computer Science".to_string(),
            academic_year: year,
        }
    }

    #[test]
    fn standard_catalog_lists_five_courses_per_year() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.rooms().len(), 4);
        for year in 1..=3 {
            assert_eq!(catalog.courses_for_year(year).len(), 5);
        }
        assert!(catalog.courses_for_year(4).is_empty());
        assert_eq!(catalog.course(203).map(|c| c.name.as_str()), Some("Database Systems"));
        assert_eq!(catalog.room(204).map(|r| r.capacity), Some(25));
    }

    #[test]
    fn rejects_duplicates_and_bad_values() {
        let mut catalog = Catalog::standard();
        let dup_room = catalog.rooms()[0].clone();
        assert_eq!(catalog.add_room(dup_room), Err(CatalogError::DuplicateRoom(201)));
        assert_eq!(
            catalog.add_course(
                Course {
                    code: 900,
                    name: "Empty".to_string(),
                    required_room_type: "Lab".to_string(),
                    max_capacity: 0,
                },
                None
            ),
            Err(CatalogError::ZeroCourseCapacity(900))
        );
        assert_eq!(catalog.add_student(student(1, 0)), Err(CatalogError::InvalidYear(1)));
        assert_eq!(catalog.add_student(student(1, 1)), Ok(1));
        assert_eq!(catalog.add_student(student(1, 2)), Err(CatalogError::DuplicateStudent(1)));
    }

    #[test]
    fn year_can_change_after_creation() {
        let mut catalog = Catalog::standard();
        catalog.add_student(student(7, 1)).unwrap();
        catalog.set_academic_year(7, 2).unwrap();
        assert_eq!(catalog.student(7).map(|s| s.academic_year), Some(2));
        assert_eq!(catalog.set_academic_year(8, 2), Err(CatalogError::UnknownStudent(8)));
    }

    #[test]
    fn upsert_adds_new_students_and_updates_years() {
        let mut catalog = Catalog::standard();
        assert_eq!(catalog.upsert_student(student(3, 1)), Ok(3));
        assert_eq!(catalog.upsert_student(student(3, 2)), Ok(3));
        assert_eq!(catalog.student(3).map(|s| s.academic_year), Some(2));
        assert_eq!(catalog.upsert_student(student(3, 0)), Err(CatalogError::InvalidYear(3)));

        let mut other_major = student(3, 2);
        other_major.major = "Mathematics".to_string();
        assert_eq!(catalog.upsert_student(other_major), Err(CatalogError::DuplicateStudent(3)));
        assert_eq!(catalog.students().len(), 1);
    }

    #[test]
    fn request_check_flags_unknown_references() {
        let mut catalog = Catalog::standard();
        catalog.add_student(student(1, 1)).unwrap();
        let request = |student_id, course_id| RegistrationRequest {
            student_id,
            course_id,
            is_core_course: true,
            timestamp: 0,
        };
        assert!(catalog.check_requests(&[request(1, 101)]).is_ok());
        assert_eq!(
            catalog.check_requests(&[request(2, 101)]),
            Err(CatalogError::UnknownStudent(2))
        );
        assert_eq!(
            catalog.check_requests(&[request(1, 999)]),
            Err(CatalogError::UnknownCourse(999))
        );
    }
}
