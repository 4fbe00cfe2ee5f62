use gradebook_core::db::open_db_in_memory;
use gradebook_core::service::confirm::{
    ADD_STUDENT_PROMPT, DELETE_STUDENT_PROMPT, MODIFY_AND_REACTIVATE_PROMPT,
    MODIFY_STUDENT_PROMPT, REACTIVATE_STUDENT_PROMPT,
};
use gradebook_core::{
    Confirm, EditPolicy, FormKind, Gradebook, MutationOutcome, Screen, SqliteStudentRepository,
    Student, StudentField, StudentId, StudentRepository, StudentService, StudentServiceError,
};
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Confirmer with queued answers; records every prompt and record it was shown.
#[derive(Clone, Default)]
struct ScriptedConfirm {
    answers: Rc<RefCell<VecDeque<bool>>>,
    asked: Rc<RefCell<Vec<String>>>,
    shown: Rc<RefCell<Vec<Student>>>,
}

impl ScriptedConfirm {
    fn answer(&self, value: bool) {
        self.answers.borrow_mut().push_back(value);
    }

    fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn shown(&self) -> Vec<Student> {
        self.shown.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }

    fn confirm_record(&mut self, prompt: &str, student: &Student) -> bool {
        self.shown.borrow_mut().push(student.clone());
        self.confirm(prompt)
    }
}

type Row = (i64, String, String, String, String, String, String, String, i64);

fn snapshot(conn: &Connection) -> Vec<Row> {
    let mut stmt = conn
        .prepare(
            "SELECT id, first_name, last_name, address, city, state, zip, dob, active
             FROM student ORDER BY id;",
        )
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })
        .unwrap();
    rows.map(Result::unwrap).collect()
}

fn seed(conn: &Connection, first: &str, last: &str, active: bool) -> StudentId {
    conn.execute(
        "INSERT INTO student (first_name, last_name, active) VALUES (?1, ?2, ?3);",
        params![first, last, i64::from(active)],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn active_flag(conn: &Connection, id: StudentId) -> bool {
    conn.query_row("SELECT active FROM student WHERE id = ?1;", [id], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap()
        == 1
}

fn last_names<R, C>(app: &Gradebook<R, C>) -> Vec<String>
where
    R: StudentRepository,
    C: Confirm,
{
    app.students()
        .directory()
        .entries()
        .iter()
        .map(|entry| entry.last_name.clone())
        .collect()
}

fn open_app(
    conn: &Connection,
    policy: EditPolicy,
) -> (Gradebook<SqliteStudentRepository<'_>, ScriptedConfirm>, ScriptedConfirm) {
    let confirm = ScriptedConfirm::default();
    let repo = SqliteStudentRepository::try_new(conn).unwrap();
    let mut app = Gradebook::new(repo, confirm.clone(), policy);
    app.show(Screen::StudentDirectory).unwrap();
    (app, confirm)
}

#[test]
fn doe_roe_scenario() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    seed(&conn, "Richard", "Roe", false);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    assert_eq!(last_names(&app), vec!["Doe"]);

    let students = app.students_mut().unwrap();
    students.reload_directory(true).unwrap();
    assert_eq!(last_names(&app), vec!["Doe", "Roe"]);

    let students = app.students_mut().unwrap();
    students.reload_directory(false).unwrap();
    students.select(0).unwrap();
    confirm.answer(true);
    assert_eq!(
        students.delete_selected().unwrap(),
        MutationOutcome::Applied(doe)
    );
    assert!(last_names(&app).is_empty());

    app.students_mut().unwrap().reload_directory(true).unwrap();
    assert_eq!(last_names(&app), vec!["Doe", "Roe"]);
    assert!(!active_flag(&conn, doe));
}

#[test]
fn create_confirmed_inserts_active_row_closes_form_and_reloads() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Amy", "Adams", true);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    let form = students.open_create_form();
    form.set(StudentField::FirstName, "  Zoe ");
    form.set(StudentField::LastName, "Zimmer");
    form.set(StudentField::City, "Springfield");

    confirm.answer(true);
    let outcome = students.submit_create().unwrap();
    let MutationOutcome::Applied(id) = outcome else {
        panic!("expected applied outcome, got {outcome:?}");
    };

    assert!(students.create_form().is_none());
    assert_eq!(confirm.asked(), vec![ADD_STUDENT_PROMPT.to_string()]);
    assert_eq!(last_names(&app), vec!["Adams", "Zimmer"]);

    let matches: Vec<_> = app
        .students()
        .directory()
        .entries()
        .iter()
        .filter(|entry| entry.id == id)
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].first_name, "Zoe");
    assert!(active_flag(&conn, id));
}

#[test]
fn create_declined_writes_nothing_and_keeps_form_open() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Amy", "Adams", true);
    let before = snapshot(&conn);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    let form = students.open_create_form();
    form.first_name = "Zoe".to_string();
    form.last_name = "Zimmer".to_string();

    confirm.answer(false);
    assert_eq!(students.submit_create().unwrap(), MutationOutcome::Declined);
    assert_eq!(
        students.create_form().map(|draft| draft.last_name.as_str()),
        Some("Zimmer")
    );
    assert_eq!(snapshot(&conn), before);

    // The still-open form can be submitted again.
    confirm.answer(true);
    assert!(students.submit_create().unwrap().is_applied());
    assert_eq!(snapshot(&conn).len(), 2);
}

#[test]
fn create_with_blank_name_is_rejected_without_prompt() {
    let conn = open_db_in_memory().unwrap();
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.open_create_form().first_name = "Zoe".to_string();
    let err = students.submit_create().unwrap_err();

    assert!(matches!(err, StudentServiceError::Validation(_)));
    assert!(confirm.asked().is_empty());
    assert!(students.create_form().is_some());
    assert!(snapshot(&conn).is_empty());
}

#[test]
fn submit_without_open_form_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let (mut app, _confirm) = open_app(&conn, EditPolicy::default());
    let students = app.students_mut().unwrap();

    assert!(matches!(
        students.submit_create().unwrap_err(),
        StudentServiceError::NoOpenForm(FormKind::Create)
    ));
    assert!(matches!(
        students.submit_edit().unwrap_err(),
        StudentServiceError::NoOpenForm(FormKind::Edit)
    ));
}

#[test]
fn edit_inactive_student_reactivates_and_overwrites_fields() {
    let conn = open_db_in_memory().unwrap();
    let roe = seed(&conn, "Richard", "Roe", false);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.reload_directory(true).unwrap();
    students.select(0).unwrap();

    let form = students.begin_edit().unwrap();
    assert_eq!(form.id, roe);
    assert!(!form.was_active);
    assert_eq!(students.detail().map(|s| s.id), Some(roe));

    let form = students.edit_form_mut().unwrap();
    form.draft.first_name = "Rick".to_string();
    form.draft.zip = "10001".to_string();

    confirm.answer(true);
    assert_eq!(
        students.submit_edit().unwrap(),
        MutationOutcome::Applied(roe)
    );
    assert!(students.edit_form().is_none());
    assert_eq!(
        confirm.asked(),
        vec![MODIFY_AND_REACTIVATE_PROMPT.to_string()]
    );

    app.students_mut().unwrap().reload_directory(false).unwrap();
    let entries = app.students().directory().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].first_name, "Rick");

    let row = snapshot(&conn).remove(0);
    assert_eq!(row.6, "10001");
    assert_eq!(row.8, 1);
}

#[test]
fn edit_with_reactivation_disabled_keeps_student_inactive() {
    let conn = open_db_in_memory().unwrap();
    let roe = seed(&conn, "Richard", "Roe", false);
    let (mut app, confirm) = open_app(
        &conn,
        EditPolicy {
            reactivate_on_edit: false,
        },
    );

    let students = app.students_mut().unwrap();
    students.reload_directory(true).unwrap();
    students.select(0).unwrap();
    students.begin_edit().unwrap();
    students.edit_form_mut().unwrap().draft.city = "Boston".to_string();

    confirm.answer(true);
    assert!(students.submit_edit().unwrap().is_applied());
    assert_eq!(confirm.asked(), vec![MODIFY_STUDENT_PROMPT.to_string()]);
    assert!(!active_flag(&conn, roe));
    assert!(students.directory().include_inactive());
    assert_eq!(students.directory().len(), 1);
}

#[test]
fn edit_declined_closes_form_without_writing() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Jane", "Doe", true);
    let before = snapshot(&conn);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    students.begin_edit().unwrap();
    students.edit_form_mut().unwrap().draft.last_name = "Changed".to_string();

    confirm.answer(false);
    assert_eq!(students.submit_edit().unwrap(), MutationOutcome::Declined);
    assert!(students.edit_form().is_none());
    assert_eq!(snapshot(&conn), before);
}

#[test]
fn edit_acts_on_fresh_store_data_not_the_listing() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    let (mut app, _confirm) = open_app(&conn, EditPolicy::default());

    conn.execute("UPDATE student SET city = 'Chicago' WHERE id = ?1;", [doe]).unwrap();

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    let form = students.begin_edit().unwrap();
    assert_eq!(form.draft.city, "Chicago");
}

#[test]
fn delete_declined_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Jane", "Doe", true);
    let before = snapshot(&conn);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    confirm.answer(false);
    assert_eq!(students.delete_selected().unwrap(), MutationOutcome::Declined);

    assert_eq!(confirm.asked(), vec![DELETE_STUDENT_PROMPT.to_string()]);
    assert_eq!(snapshot(&conn), before);
    assert_eq!(students.directory().len(), 1);
    assert_eq!(students.detail().map(|s| s.fields.last_name.as_str()), Some("Doe"));
}

#[test]
fn delete_shows_freshly_fetched_record_before_prompting() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());
    conn.execute("UPDATE student SET city = 'Chicago' WHERE id = ?1;", [doe]).unwrap();

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    confirm.answer(false);
    students.delete_selected().unwrap();

    let shown = confirm.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, doe);
    assert_eq!(shown[0].fields.city, "Chicago");
    assert!(shown[0].active);
}

#[test]
fn delete_changes_only_active_flag_and_respects_current_filter() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    seed(&conn, "Amy", "Adams", true);
    let mut before = snapshot(&conn);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.reload_directory(true).unwrap();
    students.select(1).unwrap();
    confirm.answer(true);
    assert_eq!(
        students.delete_selected().unwrap(),
        MutationOutcome::Applied(doe)
    );

    assert!(students.directory().include_inactive());
    assert_eq!(last_names(&app), vec!["Adams", "Doe"]);
    assert_eq!(app.students().directory().selection(), None);

    before[0].8 = 0;
    assert_eq!(snapshot(&conn), before);
}

#[test]
fn mutations_without_selection_fail_before_prompting() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Jane", "Doe", true);
    let before = snapshot(&conn);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    assert!(matches!(
        students.delete_selected().unwrap_err(),
        StudentServiceError::NoSelection
    ));
    assert!(matches!(
        students.begin_edit().unwrap_err(),
        StudentServiceError::NoSelection
    ));
    assert!(matches!(
        students.reactivate_selected().unwrap_err(),
        StudentServiceError::NoSelection
    ));
    assert!(matches!(
        students.load_selected_detail().unwrap_err(),
        StudentServiceError::NoSelection
    ));

    assert!(confirm.asked().is_empty());
    assert_eq!(snapshot(&conn), before);
}

#[test]
fn select_out_of_range_is_reported() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Jane", "Doe", true);
    let (mut app, _confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    let err = students.select(3).unwrap_err();
    assert!(matches!(
        err,
        StudentServiceError::SelectionOutOfRange { index: 3, len: 1 }
    ));
    assert_eq!(students.directory().selection(), None);
}

#[test]
fn reactivate_brings_student_back_to_active_listing() {
    let conn = open_db_in_memory().unwrap();
    let roe = seed(&conn, "Richard", "Roe", false);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());
    assert!(last_names(&app).is_empty());

    let students = app.students_mut().unwrap();
    students.reload_directory(true).unwrap();
    students.select(0).unwrap();
    confirm.answer(true);
    assert_eq!(
        students.reactivate_selected().unwrap(),
        MutationOutcome::Applied(roe)
    );
    assert_eq!(confirm.asked(), vec![REACTIVATE_STUDENT_PROMPT.to_string()]);

    students.reload_directory(false).unwrap();
    assert_eq!(last_names(&app), vec!["Roe"]);
}

#[test]
fn selected_student_deleted_elsewhere_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    let (mut app, confirm) = open_app(&conn, EditPolicy::default());

    conn.execute("DELETE FROM student WHERE id = ?1;", [doe]).unwrap();

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    let err = students.delete_selected().unwrap_err();
    assert!(matches!(err, StudentServiceError::StudentNotFound(id) if id == doe));
    assert!(confirm.asked().is_empty());
}

#[test]
fn failed_reload_keeps_listing_and_app_recovers() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "Jane", "Doe", true);
    seed(&conn, "Richard", "Roe", false);
    let (mut app, _confirm) = open_app(&conn, EditPolicy::default());

    conn.execute_batch("ALTER TABLE student RENAME TO student_offline;").unwrap();
    let students = app.students_mut().unwrap();
    let err = students.reload_directory(true).unwrap_err();
    assert!(matches!(err, StudentServiceError::Repo(_)));
    assert_eq!(last_names(&app), vec!["Doe"]);
    assert!(!app.students().directory().include_inactive());

    conn.execute_batch("ALTER TABLE student_offline RENAME TO student;").unwrap();
    app.students_mut().unwrap().reload_directory(true).unwrap();
    assert_eq!(last_names(&app), vec!["Doe", "Roe"]);
}

#[test]
fn failed_detail_load_keeps_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);
    seed(&conn, "Richard", "Roe", true);
    let (mut app, _confirm) = open_app(&conn, EditPolicy::default());

    let students = app.students_mut().unwrap();
    students.select(0).unwrap();
    students.load_selected_detail().unwrap();

    conn.execute_batch("ALTER TABLE student RENAME TO student_offline;").unwrap();
    assert!(students.load_selected_detail().is_err());
    assert_eq!(students.detail().map(|s| s.id), Some(doe));
}

#[test]
fn committed_write_with_failed_reload_reports_refresh_failure() {
    let conn = open_db_in_memory().unwrap();
    let doe = seed(&conn, "Jane", "Doe", true);

    // Breaks the directory query after the re-fetch but before the write.
    let break_directory_on_confirm = |_prompt: &str| {
        conn.execute_batch("ALTER TABLE student RENAME COLUMN last_name TO surname;").unwrap();
        true
    };
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let mut students =
        StudentService::new(repo, break_directory_on_confirm, EditPolicy::default());
    students.reload_directory(false).unwrap();
    students.select(0).unwrap();

    match students.delete_selected().unwrap_err() {
        StudentServiceError::RefreshFailed { committed, .. } => assert_eq!(committed, doe),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!active_flag(&conn, doe));
    assert_eq!(students.directory().len(), 1);
}
