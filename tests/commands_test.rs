//! Tests for one-shot command execution against student files

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use gradebook::cli::args::Cli;
use gradebook::cli::commands::execute_command;
use gradebook::config::Settings;
use gradebook::exitcode;
use gradebook::infrastructure::di::ServiceContainer;
use gradebook::infrastructure::traits::FileSystem;
use gradebook::util::testing;

const DAMAGED: &str = "Adams CC 2 3 4 5 4\nJones AB 3 two 5 2 4\nSmith JD 5 5 5 5 5\n";

/// In-memory file system keyed by path.
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    fn content(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.content(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

fn run(container: &ServiceContainer, args: &[&str]) -> Result<(), i32> {
    testing::init_test_setup();
    let cli = Cli::try_parse_from(std::iter::once("gradebook").chain(args.iter().copied()))
        .expect("parse args");
    execute_command(&cli, container).map_err(|e| e.exit_code())
}

fn real_container() -> ServiceContainer {
    ServiceContainer::new(Settings::default())
}

fn student_file(temp: &TempDir) -> (PathBuf, String) {
    let path = temp.path().join("students.txt");
    let arg = path.display().to_string();
    (path, arg)
}

#[test]
fn given_missing_file_when_adding_then_file_created_with_one_student() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);

    // Act
    let result = run(
        &real_container(),
        &["-f", &file, "add", "Brown", "BB", "4", "5", "4", "4", "3"],
    );

    // Assert
    assert_eq!(result, Ok(()));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Brown BB 3 4 4 4 5 \n"
    );
}

#[test]
fn given_existing_file_when_adding_removing_and_editing_then_saved_back_each_time() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);
    let container = real_container();

    // Act
    run(&container, &["-f", &file, "add", "Smith", "JD", "5", "5", "5", "5", "5"]).unwrap();
    run(&container, &["-f", &file, "add", "Jones", "AB", "3", "2", "5", "2", "4"]).unwrap();
    run(&container, &["-f", &file, "remove", "Smith"]).unwrap();
    run(
        &container,
        &["-f", &file, "edit", "Jones", "Brown", "CD", "4", "4", "4", "4", "2"],
    )
    .unwrap();

    // Assert
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Brown CD 2 4 4 4 4 \n"
    );
}

#[test]
fn given_absent_surname_when_removing_then_file_unchanged() {
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);
    std::fs::write(&path, "Smith JD 5 5 5 5 5 \n").unwrap();

    let result = run(&real_container(), &["-f", &file, "remove", "Nobody"]);

    assert_eq!(result, Ok(()));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Smith JD 5 5 5 5 5 \n"
    );
}

#[rstest]
#[case(&["add", "Brown", "BB", "4", "4", "4", "4", "4"])]
#[case(&["remove", "Adams"])]
#[case(&["edit", "Adams", "Brown", "BB", "4", "4", "4", "4", "4"])]
fn given_damaged_file_when_mutating_then_refused_and_file_kept(#[case] command: &[&str]) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);
    std::fs::write(&path, DAMAGED).unwrap();
    let args: Vec<&str> = ["-f", file.as_str()].into_iter().chain(command.iter().copied()).collect();

    // Act
    let result = run(&real_container(), &args);

    // Assert
    assert_eq!(result, Err(exitcode::DATAERR));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DAMAGED);
}

#[rstest]
#[case("list")]
#[case("tree")]
fn given_damaged_file_when_reading_then_prefix_shown_and_success(#[case] command: &str) {
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);
    std::fs::write(&path, DAMAGED).unwrap();

    let result = run(&real_container(), &["-f", &file, command]);

    assert_eq!(result, Ok(()));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DAMAGED);
}

#[test]
fn given_missing_file_when_listing_then_io_error() {
    let temp = TempDir::new().unwrap();
    let (_, file) = student_file(&temp);

    let result = run(&real_container(), &["-f", &file, "list"]);

    assert_eq!(result, Err(exitcode::IOERR));
}

#[test]
fn given_no_file_configured_when_adding_then_usage_error() {
    let result = run(
        &real_container(),
        &["add", "Smith", "JD", "5", "5", "5", "5", "5"],
    );

    assert_eq!(result, Err(exitcode::USAGE));
}

#[rstest]
#[case(&["add", "Smith", "JD", "5", "5", "5"])]
#[case(&["edit", "Smith", "Smith", "JD", "5", "5", "5", "5", "5", "5"])]
fn given_wrong_grade_count_when_mutating_then_usage_error_and_no_file(#[case] command: &[&str]) {
    let temp = TempDir::new().unwrap();
    let (path, file) = student_file(&temp);
    let args: Vec<&str> = ["-f", file.as_str()].into_iter().chain(command.iter().copied()).collect();

    let result = run(&real_container(), &args);

    assert_eq!(result, Err(exitcode::USAGE));
    assert!(!path.exists());
}

#[test]
fn given_memory_file_system_when_adding_twice_then_sorted_content_stored() {
    // Arrange
    let fs = Arc::new(MemoryFileSystem::default());
    let container = ServiceContainer::with_deps(Settings::default(), fs.clone());
    let path = Path::new("/virtual/students.txt");

    // Act
    run(&container, &["-f", "/virtual/students.txt", "add", "Smith", "JD", "5", "5", "5", "5", "5"])
        .unwrap();
    run(&container, &["-f", "/virtual/students.txt", "add", "Jones", "AB", "3", "2", "5", "2", "4"])
        .unwrap();

    // Assert
    assert_eq!(
        fs.content(path).as_deref(),
        Some("Jones AB 2 2 3 4 5 \nSmith JD 5 5 5 5 5 \n")
    );
}

#[test]
fn given_memory_file_system_with_damaged_file_when_adding_then_nothing_written() {
    let fs = Arc::new(MemoryFileSystem::default());
    let path = Path::new("/virtual/students.txt");
    fs.write(path, DAMAGED).unwrap();
    let container = ServiceContainer::with_deps(Settings::default(), fs.clone());

    let result = run(
        &container,
        &["-f", "/virtual/students.txt", "add", "Brown", "BB", "4", "4", "4", "4", "4"],
    );

    assert_eq!(result, Err(exitcode::DATAERR));
    assert_eq!(fs.content(path).as_deref(), Some(DAMAGED));
}
