use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::StoreError;
use crate::model::{NewStudent, Student, StudentId, StudentPatch};
use crate::stats::Statistics;
use crate::validation::Validator;

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory student store.
///
/// The collection and the id counter share one lock; a mutation holds the
/// write guard from lookup to apply. Records keep insertion order and ids
/// are never handed out twice.
#[derive(Debug)]
pub struct StudentStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    students: Vec<Student>,
    next_id: u64,
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                students: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("student store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("student store lock poisoned".to_string()))
    }

    /// Validate and insert a new student, assigning the next id.
    pub fn create(&self, new: NewStudent) -> StoreResult<Student> {
        let now = Utc::now();
        Validator::validate_new_student(&new, now.date_naive())?;

        let mut inner = self.write()?;
        let id = StudentId(inner.next_id);
        inner.next_id += 1;

        let student = Student::from_new(id, new, now);
        inner.students.push(student.clone());
        Ok(student)
    }

    /// All students in insertion order.
    pub fn get_all(&self) -> StoreResult<Vec<Student>> {
        Ok(self.read()?.students.clone())
    }

    pub fn get_by_id(&self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.read()?.students.iter().find(|s| s.id == id).cloned())
    }

    /// Apply a partial update to an existing student.
    ///
    /// Fails with [`StoreError::NotFound`] before any validation if `id` is
    /// unknown. Supplied fields are checked GPA, then date of birth, then
    /// email; nothing is written unless all of them pass.
    pub fn update(&self, id: StudentId, patch: StudentPatch) -> StoreResult<Student> {
        let now = Utc::now();
        let mut inner = self.write()?;

        let student = inner
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;

        Validator::validate_patch(&patch, now.date_naive())?;

        student.apply(patch, now);
        Ok(student.clone())
    }

    /// Remove a student and return it. The id is not reused.
    pub fn delete(&self, id: StudentId) -> StoreResult<Student> {
        let mut inner = self.write()?;

        let index = inner
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;

        Ok(inner.students.remove(index))
    }

    pub fn statistics(&self) -> StoreResult<Statistics> {
        Ok(Statistics::compute(&self.read()?.students))
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.students.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::{Months, NaiveDate};

    fn years_ago(years: u32) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(12 * years))
            .unwrap()
    }

    fn new_student(first_name: &str, gpa: f64) -> NewStudent {
        NewStudent::new(
            first_name,
            "Doe",
            years_ago(20),
            gpa,
            format!("{}@example.com", first_name.to_lowercase()),
        )
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = StudentStore::new();

        let a = store.create(new_student("Alice", 3.8)).unwrap();
        let b = store.create(new_student("Bob", 3.5)).unwrap();

        assert_eq!(a.id, StudentId(1));
        assert_eq!(b.id, StudentId(2));
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = StudentStore::new();

        let a = store.create(new_student("Alice", 3.8)).unwrap();
        let b = store.create(new_student("Bob", 3.5)).unwrap();
        store.delete(a.id).unwrap();
        let c = store.create(new_student("Carol", 3.1)).unwrap();

        assert_eq!(c.id, StudentId(3));

        let all = store.get_all().unwrap();
        let ids: Vec<StudentId> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b.id, c.id]);
    }

    #[test]
    fn test_create_rejects_invalid_gpa() {
        let store = StudentStore::new();

        let err = store.create(new_student("Bob", 5.0)).unwrap_err();
        assert_eq!(err, StoreError::Validation(ValidationError::GpaOutOfRange(5.0)));
        assert_eq!(err.to_string(), "GPA must be between 0 and 4.0");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_create_exactly_eighteen() {
        let store = StudentStore::new();

        let mut student = new_student("Eve", 3.0);
        student.date_of_birth = years_ago(18);
        assert!(store.create(student).is_ok());
    }

    #[test]
    fn test_create_one_day_short_of_eighteen() {
        let store = StudentStore::new();

        let mut student = new_student("Eve", 3.0);
        student.date_of_birth = years_ago(18).succ_opt().unwrap();
        let err = store.create(student).unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Underage(17))
        ));
        assert_eq!(err.to_string(), "Student must be at least 18 years old");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_create_rejects_invalid_email_and_keeps_counter() {
        let store = StudentStore::new();

        let mut student = new_student("Charlie", 3.6);
        student.email = "invalid-email".to_string();
        let err = store.create(student).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");

        // A rejected create does not consume an id.
        let ok = store.create(new_student("Dana", 3.6)).unwrap();
        assert_eq!(ok.id, StudentId(1));
    }

    #[test]
    fn test_get_by_id() {
        let store = StudentStore::new();
        let a = store.create(new_student("Alice", 3.8)).unwrap();

        assert_eq!(store.get_by_id(a.id).unwrap(), Some(a));
        assert_eq!(store.get_by_id(StudentId(999)).unwrap(), None);
    }

    #[test]
    fn test_update_gpa_only() {
        let store = StudentStore::new();
        let before = store.create(new_student("John", 3.8)).unwrap();

        let after = store
            .update(
                before.id,
                StudentPatch {
                    gpa: Some(3.9),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(after.gpa, 3.9);
        assert_eq!(after.id, before.id);
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.last_name, before.last_name);
        assert_eq!(after.date_of_birth, before.date_of_birth);
        assert_eq!(after.email, before.email);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(store.get_by_id(before.id).unwrap(), Some(after));
    }

    #[test]
    fn test_update_rejects_underage_dob_and_leaves_record() {
        let store = StudentStore::new();
        let before = store.create(new_student("John", 3.8)).unwrap();

        let err = store
            .update(
                before.id,
                StudentPatch {
                    first_name: Some("Johnny".to_string()),
                    date_of_birth: Some(years_ago(10)),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Student must be at least 18 years old");
        assert_eq!(store.get_by_id(before.id).unwrap(), Some(before));
    }

    #[test]
    fn test_update_reports_gpa_before_email() {
        let store = StudentStore::new();
        let student = store.create(new_student("John", 3.8)).unwrap();

        let err = store
            .update(
                student.id,
                StudentPatch {
                    gpa: Some(4.01),
                    email: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "GPA must be between 0 and 4.0");
    }

    #[test]
    fn test_update_missing_student() {
        let store = StudentStore::new();
        store.create(new_student("John", 3.8)).unwrap();
        let snapshot = store.get_all().unwrap();

        let err = store
            .update(
                StudentId(42),
                StudentPatch {
                    gpa: Some(9.0),
                    ..Default::default()
                },
            )
            .unwrap_err();

        // Not-found wins over the invalid GPA.
        assert_eq!(err, StoreError::NotFound(StudentId(42)));
        assert_eq!(err.to_string(), "Student not found");
        assert_eq!(store.get_all().unwrap(), snapshot);
    }

    #[test]
    fn test_delete_returns_removed_student() {
        let store = StudentStore::new();
        let a = store.create(new_student("Alice", 3.8)).unwrap();

        let removed = store.delete(a.id).unwrap();
        assert_eq!(removed, a);
        assert!(store.is_empty().unwrap());
        assert_eq!(store.get_by_id(a.id).unwrap(), None);
    }

    #[test]
    fn test_delete_missing_student() {
        let store = StudentStore::new();
        store.create(new_student("Alice", 3.8)).unwrap();
        let snapshot = store.get_all().unwrap();

        let err = store.delete(StudentId(7)).unwrap_err();
        assert_eq!(err, StoreError::NotFound(StudentId(7)));
        assert_eq!(store.get_all().unwrap(), snapshot);
    }

    #[test]
    fn test_statistics() {
        let store = StudentStore::new();
        assert_eq!(store.statistics().unwrap(), Statistics::default());

        store.create(new_student("John", 3.8)).unwrap();
        store.create(new_student("Jane", 3.5)).unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average_gpa, 3.65);
        assert_eq!(stats.highest_gpa, 3.8);
        assert_eq!(stats.lowest_gpa, 3.5);
    }

    #[test]
    fn test_concurrent_creates_get_unique_ids() {
        let store = std::sync::Arc::new(StudentStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .create(new_student(&format!("Student{}", i), 3.0))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap().0).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        assert_eq!(store.len().unwrap(), 8);
    }
}
