//! Interactive menu loop
//!
//! Reads whitespace separated tokens from any `BufRead` and writes prompts
//! and listings to any `Write`, so the loop can be driven from tests.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::application::services::PersistenceService;
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{parse_grade, GradeMultiset, StudentDirectory, StudentRecord};

const MENU: &str = "\
1. Add student
2. Remove student
3. Edit student
4. Show all students
5. Show students with only 5s
6. Show students with any 3
7. Show students with exactly one 2
8. Save to file
9. Load from file
0. Exit
";

/// Splits input into whitespace separated tokens across lines.
pub struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or None at end of input.
    pub fn next_token(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }

    /// Drop whatever is left of the current line.
    pub fn discard_line(&mut self) {
        self.pending.clear();
    }
}

/// Menu choices, numbered as shown in [`MENU`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Add,
    Remove,
    Edit,
    ListAll,
    ListExcellent,
    ListWithThrees,
    ListWithSingleTwo,
    Save,
    Load,
    Exit,
}

impl Choice {
    fn parse(token: &str) -> Option<Self> {
        match token.parse::<i64>().ok()? {
            1 => Some(Choice::Add),
            2 => Some(Choice::Remove),
            3 => Some(Choice::Edit),
            4 => Some(Choice::ListAll),
            5 => Some(Choice::ListExcellent),
            6 => Some(Choice::ListWithThrees),
            7 => Some(Choice::ListWithSingleTwo),
            8 => Some(Choice::Save),
            9 => Some(Choice::Load),
            0 => Some(Choice::Exit),
            _ => None,
        }
    }
}

/// Interactive shell over a student directory.
pub struct Shell<R, W> {
    directory: StudentDirectory,
    persistence: PersistenceService,
    settings: Settings,
    input: TokenReader<R>,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        directory: StudentDirectory,
        persistence: PersistenceService,
        settings: Settings,
        input: R,
        out: W,
    ) -> Self {
        Self {
            directory,
            persistence,
            settings,
            input: TokenReader::new(input),
            out,
        }
    }

    pub fn into_parts(self) -> (StudentDirectory, W) {
        (self.directory, self.out)
    }

    /// Run until `0` or end of input.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> ApplicationResult<()> {
        loop {
            self.print(MENU)?;
            let Some(token) = self.read_token()? else {
                debug!("end of input");
                return Ok(());
            };
            let Some(choice) = Choice::parse(&token) else {
                debug!("ignoring menu input {:?}", token);
                self.input.discard_line();
                continue;
            };
            debug!("menu choice {:?}", choice);
            let completed = match choice {
                Choice::Add => self.add()?,
                Choice::Remove => self.remove()?,
                Choice::Edit => self.edit()?,
                Choice::ListAll => self.list(self.directory.list_all())?,
                Choice::ListExcellent => self.list(self.directory.list_excellent())?,
                Choice::ListWithThrees => self.list(self.directory.list_with_threes())?,
                Choice::ListWithSingleTwo => self.list(self.directory.list_with_single_two())?,
                Choice::Save => self.save()?,
                Choice::Load => self.load()?,
                Choice::Exit => return Ok(()),
            };
            if !completed {
                return Ok(());
            }
        }
    }

    // Handlers return Ok(false) when input ran out mid-command.

    fn add(&mut self) -> ApplicationResult<bool> {
        let Some(surname) = self.prompt("Enter surname: ")? else {
            return Ok(false);
        };
        let Some(initials) = self.prompt("Enter initials: ")? else {
            return Ok(false);
        };
        let Some(grades) = self.read_grades("Enter grades")? else {
            return Ok(false);
        };
        self.directory
            .add(StudentRecord::new(surname, initials, grades));
        Ok(true)
    }

    fn remove(&mut self) -> ApplicationResult<bool> {
        let Some(surname) = self.prompt("Enter surname of the student to remove: ")? else {
            return Ok(false);
        };
        self.directory.remove(&surname);
        Ok(true)
    }

    fn edit(&mut self) -> ApplicationResult<bool> {
        let Some(surname) = self.prompt("Enter surname of the student to edit: ")? else {
            return Ok(false);
        };
        let Some(new_surname) = self.prompt("Enter new surname: ")? else {
            return Ok(false);
        };
        let Some(initials) = self.prompt("Enter new initials: ")? else {
            return Ok(false);
        };
        let Some(grades) = self.read_grades("Enter new grades")? else {
            return Ok(false);
        };
        self.directory
            .edit(&surname, StudentRecord::new(new_surname, initials, grades));
        Ok(true)
    }

    fn list(&mut self, lines: Vec<String>) -> ApplicationResult<bool> {
        for line in lines {
            writeln!(self.out, "{}", line).with_context("write listing")?;
        }
        Ok(true)
    }

    fn save(&mut self) -> ApplicationResult<bool> {
        let Some(file) = self.prompt("Enter file name to save to: ")? else {
            return Ok(false);
        };
        let path = PathBuf::from(file);
        match self
            .persistence
            .save(&self.directory, &path, self.settings.save_order)
        {
            Ok(count) => self.print(&format!("Saved {} students to {}\n", count, path.display()))?,
            Err(e) => self.print(&format!("error: {}\n", e))?,
        }
        Ok(true)
    }

    fn load(&mut self) -> ApplicationResult<bool> {
        let Some(file) = self.prompt("Enter file name to load from: ")? else {
            return Ok(false);
        };
        let path = PathBuf::from(file);
        match self
            .persistence
            .load(&path, self.settings.grades_per_student)
        {
            Ok(output) => {
                self.directory = output.directory;
                let note = match &output.truncated {
                    Some(reason) => format!(" (stopped early: {})", reason),
                    None => String::new(),
                };
                self.print(&format!(
                    "Loaded {} students from {}{}\n",
                    output.records,
                    path.display(),
                    note
                ))?;
            }
            Err(e) => self.print(&format!("error: {}\n", e))?,
        }
        Ok(true)
    }

    /// Reads exactly `grades_per_student` numeric grades, re-prompting on bad tokens.
    fn read_grades(&mut self, label: &str) -> ApplicationResult<Option<GradeMultiset>> {
        let count = self.settings.grades_per_student;
        self.print(&format!("{} for {} subjects: ", label, count))?;
        let mut grades = GradeMultiset::new();
        while grades.len() < count {
            let Some(token) = self.read_token()? else {
                return Ok(None);
            };
            match parse_grade(&token) {
                Ok(grade) => grades.insert(grade),
                Err(e) => {
                    debug!("{}", e);
                    self.input.discard_line();
                    self.print("Error! Enter a numeric value for the grade: ")?;
                }
            }
        }
        Ok(Some(grades))
    }

    fn prompt(&mut self, text: &str) -> ApplicationResult<Option<String>> {
        self.print(text)?;
        self.read_token()
    }

    fn read_token(&mut self) -> ApplicationResult<Option<String>> {
        self.input.next_token().with_context("read input")
    }

    fn print(&mut self, text: &str) -> ApplicationResult<()> {
        self.out.write_all(text.as_bytes()).with_context("write output")?;
        self.out.flush().with_context("flush output")
    }
}
