//! Line-driven gradebook session.
//!
//! # Responsibility
//! - Parse one command per input line.
//! - Drive the `Gradebook` controller and render its state as text.
//!
//! # Invariants
//! - A failed command prints an error and leaves the session usable.
//! - Directory positions shown to the operator are 1-based.

use gradebook_core::{
    AppError, Confirm, DirectoryEntry, EditForm, EditPolicy, Gradebook, MutationOutcome, Screen,
    Student, StudentDraft, StudentField, StudentId, StudentRepository,
};
use std::io::{self, BufRead, Write};

pub const HELP_TEXT: &str = "\
commands:
  home | students | classes | courses | grades | reports   switch screen
  list                       show the student directory
  inactive on|off            include or hide inactive students
  select N                   select directory entry N
  detail                     show the selected student's full record
  new                        open the new student form
  edit                       open the edit form for the selected student
  set FIELD VALUE            set a form field (first, last, address, city, state, zip, dob)
  submit | cancel            submit or close the open form
  delete                     deactivate the selected student
  reactivate                 reactivate the selected student
  help | quit";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show(Screen),
    List,
    Inactive(bool),
    Select(usize),
    Detail,
    New,
    Edit,
    Set(StudentField, String),
    Submit,
    Cancel,
    Delete,
    Reactivate,
    Help,
    Quit,
}

/// Parses one input line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let word = word.to_ascii_lowercase();

    if let Ok(screen) = word.parse::<Screen>() {
        return Ok(Some(ShellCommand::Show(screen)));
    }

    let command = match word.as_str() {
        "list" | "ls" => ShellCommand::List,
        "inactive" => match rest.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" => ShellCommand::Inactive(true),
            "off" | "no" | "false" => ShellCommand::Inactive(false),
            other => return Err(format!("expected `inactive on|off`, got `{other}`")),
        },
        "select" => {
            let position: usize = rest
                .parse()
                .map_err(|_| format!("expected `select N`, got `{rest}`"))?;
            if position == 0 {
                return Err("directory positions start at 1".to_string());
            }
            ShellCommand::Select(position - 1)
        }
        "detail" | "show" => ShellCommand::Detail,
        "new" | "add" => ShellCommand::New,
        "edit" => ShellCommand::Edit,
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = StudentField::parse(field)
                .ok_or_else(|| format!("unknown student field `{field}`"))?;
            ShellCommand::Set(field, value.trim().to_string())
        }
        "submit" | "save" => ShellCommand::Submit,
        "cancel" => ShellCommand::Cancel,
        "delete" | "deactivate" => ShellCommand::Delete,
        "reactivate" => ShellCommand::Reactivate,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

/// Runs one command and returns the text to print.
pub fn execute<R, C>(app: &mut Gradebook<R, C>, command: ShellCommand) -> Result<String, AppError>
where
    R: StudentRepository,
    C: Confirm,
{
    match command {
        ShellCommand::Show(screen) => {
            app.show(screen)?;
            if screen == Screen::StudentDirectory {
                return Ok(render_directory(app.students().directory().entries()));
            }
            if screen.is_implemented() {
                Ok(screen.title().to_string())
            } else {
                Ok(format!("{}: not implemented yet", screen.title()))
            }
        }
        ShellCommand::List => {
            app.students_mut()?;
            Ok(render_directory(app.students().directory().entries()))
        }
        ShellCommand::Inactive(include) => {
            app.students_mut()?.reload_directory(include)?;
            Ok(render_directory(app.students().directory().entries()))
        }
        ShellCommand::Select(index) => {
            let entry = app.students_mut()?.select(index)?;
            Ok(format!("selected {}", render_entry(index, entry)))
        }
        ShellCommand::Detail => {
            let student = app.students_mut()?.load_selected_detail()?;
            Ok(render_student(student))
        }
        ShellCommand::New => {
            app.students_mut()?.open_create_form();
            Ok("new student form open; use `set FIELD VALUE`, then `submit`".to_string())
        }
        ShellCommand::Edit => {
            let students = app.students_mut()?;
            let policy = students.policy();
            let form = students.begin_edit()?;
            Ok(render_edit_form(form, policy))
        }
        ShellCommand::Set(field, value) => {
            let students = app.students_mut()?;
            if let Some(form) = students.edit_form_mut() {
                form.draft.set(field, value);
            } else if let Some(draft) = students.create_form_mut() {
                draft.set(field, value);
            } else {
                return Ok("no form is open; use `new` or `edit` first".to_string());
            }
            Ok(format!("{} updated", field.as_str()))
        }
        ShellCommand::Submit => {
            let students = app.students_mut()?;
            let outcome = if students.edit_form().is_some() {
                students.submit_edit()?
            } else {
                students.submit_create()?
            };
            Ok(render_outcome(outcome, "saved"))
        }
        ShellCommand::Cancel => {
            let students = app.students_mut()?;
            if students.edit_form().is_some() {
                students.cancel_edit()?;
            } else {
                students.cancel_create()?;
            }
            Ok("form closed".to_string())
        }
        ShellCommand::Delete => {
            let outcome = app.students_mut()?.delete_selected()?;
            Ok(render_outcome(outcome, "deactivated"))
        }
        ShellCommand::Reactivate => {
            let outcome = app.students_mut()?.reactivate_selected()?;
            Ok(render_outcome(outcome, "reactivated"))
        }
        ShellCommand::Help => Ok(HELP_TEXT.to_string()),
        ShellCommand::Quit => Ok(String::new()),
    }
}

/// Reads commands from stdin until `quit` or end of input.
pub fn run<R, C>(app: &mut Gradebook<R, C>) -> io::Result<()>
where
    R: StudentRepository,
    C: Confirm,
{
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", app.current_screen().title())?;

    loop {
        write!(stdout, "{}> ", app.current_screen())?;
        stdout.flush()?;

        // Read one line at a time so prompts can take the stdin lock too.
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => return Ok(()),
            Ok(Some(command)) => match execute(app, command) {
                Ok(text) => writeln!(stdout, "{text}")?,
                Err(err) => writeln!(stdout, "error: {err}")?,
            },
            Err(message) => writeln!(stdout, "error: {message}")?,
        }
    }
}

/// Asks yes/no questions on the terminal; anything but `y`/`yes` declines.
pub struct TerminalConfirm;

impl TerminalConfirm {
    fn ask(text: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "{text} [y/N] ").and_then(|_| stdout.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        Self::ask(prompt)
    }

    fn confirm_record(&mut self, prompt: &str, student: &Student) -> bool {
        Self::ask(&record_prompt(prompt, student))
    }
}

/// Record text followed by the question, as shown before a record-level write.
pub fn record_prompt(prompt: &str, student: &Student) -> String {
    format!("{}\n{prompt}", render_student(student))
}

pub fn render_directory(entries: &[DirectoryEntry]) -> String {
    if entries.is_empty() {
        return "(no students)".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| render_entry(index, entry))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(index: usize, entry: &DirectoryEntry) -> String {
    format!(
        "{:>3}. {}, {} (#{})",
        index + 1,
        entry.last_name,
        entry.first_name,
        entry.id
    )
}

fn render_student(student: &Student) -> String {
    render_record(
        &format!("#{} {}", student.id, active_label(student.active)),
        &student.fields,
    )
}

fn render_edit_form(form: &EditForm, policy: EditPolicy) -> String {
    let mut header = format!("editing #{} {}", form.id, active_label(form.was_active));
    if !form.was_active && policy.reactivate_on_edit {
        header.push_str(" (saving will reactivate)");
    }
    format!(
        "{}\nuse `set FIELD VALUE`, then `submit`",
        render_record(&header, &form.draft)
    )
}

fn render_record(header: &str, draft: &StudentDraft) -> String {
    let mut lines = vec![header.to_string()];
    for field in StudentField::ALL {
        lines.push(format!("  {:<10} {}", field.as_str(), draft.get(field)));
    }
    lines.join("\n")
}

fn active_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

fn render_outcome(outcome: MutationOutcome<StudentId>, verb: &str) -> String {
    match outcome {
        MutationOutcome::Applied(id) => format!("student {id} {verb}"),
        MutationOutcome::Declined => "cancelled; nothing was changed".to_string(),
    }
}
