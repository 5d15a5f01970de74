//! Tests for the interactive Shell, driven by scripted input

use std::io::Cursor;
use std::sync::Arc;

use tempfile::TempDir;

use gradebook::application::services::PersistenceService;
use gradebook::application::Shell;
use gradebook::config::Settings;
use gradebook::domain::StudentDirectory;
use gradebook::infrastructure::traits::RealFileSystem;
use gradebook::util::testing;

/// Run a shell over `script` starting from `directory`; returns final directory and output.
fn run_script(directory: StudentDirectory, script: &str) -> (StudentDirectory, String) {
    testing::init_test_setup();
    let persistence = PersistenceService::new(Arc::new(RealFileSystem));
    let mut shell = Shell::new(
        directory,
        persistence,
        Settings::default(),
        Cursor::new(script.to_string()),
        Vec::new(),
    );
    shell.run().expect("shell run");
    let (directory, out) = shell.into_parts();
    (directory, String::from_utf8(out).expect("utf8 output"))
}

fn listing_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|l| l.contains(": ") && !l.contains("Enter")).collect()
}

#[test]
fn given_two_adds_when_listing_excellent_then_only_smith() {
    // Arrange
    let script = "1\nSmith JD 5 5 5 5 5\n1\nJones AB 3 2 5 2 4\n5\n0\n";

    // Act
    let (directory, output) = run_script(StudentDirectory::new(), script);

    // Assert
    assert_eq!(directory.len(), 2);
    assert_eq!(listing_lines(&output), vec!["Smith JD: 5 5 5 5 5 "]);
}

#[test]
fn given_two_students_when_listing_threes_and_single_two_then_only_jones_for_threes() {
    let script = "1\nSmith JD 5 5 5 5 5\n1\nJones AB 3 2 5 2 4\n6\n7\n0\n";

    let (_, output) = run_script(StudentDirectory::new(), script);

    assert_eq!(listing_lines(&output), vec!["Jones AB: 2 2 3 4 5 "]);
}

#[test]
fn given_non_numeric_grade_when_adding_then_reprompts_and_skips_rest_of_line() {
    // Arrange: "x" is rejected and the rest of that line ("9 9") is dropped
    let script = "1\nSmith\nJD\n5 5 x 9 9\n5 5 5\n4\n0\n";

    // Act
    let (directory, output) = run_script(StudentDirectory::new(), script);

    // Assert
    assert!(output.contains("Error! Enter a numeric value for the grade: "));
    assert_eq!(directory.list_all(), vec!["Smith JD: 5 5 5 5 5 "]);
}

#[test]
fn given_student_when_removing_and_editing_then_directory_updated() {
    let script = "\
1 Smith JD 5 5 5 5 5
1 Jones AB 3 2 5 2 4
2 Smith
3 Jones Brown CD 4 4 4 4 2
4
0
";

    let (directory, output) = run_script(StudentDirectory::new(), script);

    assert_eq!(directory.list_all(), vec!["Brown CD: 2 4 4 4 4 "]);
    assert_eq!(listing_lines(&output), vec!["Brown CD: 2 4 4 4 4 "]);
}

#[test]
fn given_unknown_menu_input_when_running_then_ignored() {
    let script = "42\nhello\n1 Smith JD 5 5 5 5 5\n0\n";

    let (directory, output) = run_script(StudentDirectory::new(), script);

    assert_eq!(directory.len(), 1);
    assert!(output.matches("0. Exit").count() >= 3);
}

#[test]
fn given_end_of_input_mid_command_when_running_then_stops_cleanly() {
    let (directory, _) = run_script(StudentDirectory::new(), "1\nSmith JD 5 5\n");
    assert!(directory.is_empty());
}

#[test]
fn given_save_then_load_when_running_then_directory_restored() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("students.txt");
    let file = path.display().to_string();
    let script = format!(
        "1 Smith JD 5 5 5 5 5\n1 Jones AB 3 2 5 2 4\n8 {file}\n2 Smith\n2 Jones\n9 {file}\n4\n0\n"
    );

    // Act
    let (directory, output) = run_script(StudentDirectory::new(), &script);

    // Assert
    assert!(output.contains("Saved 2 students"));
    assert!(output.contains("Loaded 2 students"));
    assert_eq!(
        directory.list_all(),
        vec!["Jones AB: 2 2 3 4 5 ", "Smith JD: 5 5 5 5 5 "]
    );
}

#[test]
fn given_missing_file_when_loading_then_error_reported_and_directory_kept() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.txt").display().to_string();
    let script = format!("1 Smith JD 5 5 5 5 5\n9 {missing}\n0\n");

    let (directory, output) = run_script(StudentDirectory::new(), &script);

    assert!(output.contains("error: "));
    assert_eq!(directory.len(), 1);
}

#[test]
fn given_damaged_file_when_loading_then_prefix_kept_and_stop_reported() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("damaged.txt");
    std::fs::write(&path, "Adams CC 2 3 4 5 4\nJones AB 3 two 5 2 4\n").unwrap();
    let script = format!("9 {}\n0\n", path.display());

    // Act
    let (directory, output) = run_script(StudentDirectory::new(), &script);

    // Assert
    assert_eq!(directory.list_all(), vec!["Adams CC: 2 3 4 4 5 "]);
    assert!(
        output.contains("Loaded 1 students from") && output.contains("(stopped early: invalid grade"),
        "unexpected output: {}",
        output
    );
}
