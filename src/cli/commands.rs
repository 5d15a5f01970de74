//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::LoadOutput;
use crate::application::{ApplicationError, Shell};
use crate::cli::args::{Cli, Commands, ConfigCommands, ListFilter};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path};
use crate::domain::{Grade, StudentDirectory, StudentRecord, TreeRender};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        None | Some(Commands::Shell) => cmd_shell(cli, container),
        Some(Commands::List { filter }) => cmd_list(cli, container, *filter),
        Some(Commands::Add {
            surname,
            initials,
            grades,
        }) => cmd_add(cli, container, surname, initials, grades),
        Some(Commands::Remove { surname }) => cmd_remove(cli, container, surname),
        Some(Commands::Edit {
            surname,
            new_surname,
            initials,
            grades,
        }) => cmd_edit(cli, container, surname, new_surname, initials, grades),
        Some(Commands::Tree) => cmd_tree(cli, container),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "gradebook", &mut io::stdout());
            Ok(())
        }
    }
}

/// Renders selected by `filter`, in directory order.
pub fn listing(directory: &StudentDirectory, filter: ListFilter) -> Vec<String> {
    match filter {
        ListFilter::All => directory.list_all(),
        ListFilter::Excellent => directory.list_excellent(),
        ListFilter::Threes => directory.list_with_threes(),
        ListFilter::SingleTwo => directory.list_with_single_two(),
    }
}

/// `--file` wins over the configured `data_file`.
fn resolve_file(cli: &Cli, container: &ServiceContainer) -> CliResult<PathBuf> {
    cli.file
        .clone()
        .or_else(|| container.settings.data_file.clone())
        .ok_or_else(|| {
            CliError::Usage("no student file: pass --file or set data_file in config".to_string())
        })
}

fn build_record(
    container: &ServiceContainer,
    surname: &str,
    initials: &str,
    grades: &[Grade],
) -> CliResult<StudentRecord> {
    let expected = container.settings.grades_per_student;
    if grades.len() != expected {
        return Err(CliError::InvalidArgs(format!(
            "expected {} grades, got {}",
            expected,
            grades.len()
        )));
    }
    Ok(StudentRecord::new(
        surname,
        initials,
        grades.iter().copied().collect(),
    ))
}

/// Load for a command that writes the file back.
///
/// A file that stops reading early is refused: saving the partial directory
/// would drop every record after the bad group.
fn load_existing(container: &ServiceContainer, file: &Path) -> CliResult<StudentDirectory> {
    let LoadOutput {
        directory,
        truncated,
        ..
    } = container
        .persistence
        .load_or_empty(file, container.settings.grades_per_student)?;
    if let Some(reason) = truncated {
        output::warning(&format!("{}: left unchanged", file.display()));
        return Err(ApplicationError::Domain(reason).into());
    }
    Ok(directory)
}

/// Load for a read-only command; truncation is reported and the prefix used.
fn load_for_reading(container: &ServiceContainer, file: &Path) -> CliResult<StudentDirectory> {
    let LoadOutput {
        directory,
        truncated,
        ..
    } = container
        .persistence
        .load(file, container.settings.grades_per_student)?;
    if let Some(reason) = truncated {
        output::warning(&format!("{}: stopped reading early: {}", file.display(), reason));
    }
    Ok(directory)
}

fn store(container: &ServiceContainer, directory: &StudentDirectory, file: &Path) -> CliResult<()> {
    container
        .persistence
        .save(directory, file, container.settings.save_order)?;
    Ok(())
}

#[instrument(skip_all)]
fn cmd_shell(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let directory = match cli.file.clone().or_else(|| container.settings.data_file.clone()) {
        Some(file) => {
            let loaded = container
                .persistence
                .load_or_empty(&file, container.settings.grades_per_student)?;
            if let Some(reason) = loaded.truncated {
                output::warning(&format!("{}: stopped reading early: {}", file.display(), reason));
            }
            loaded.directory
        }
        None => StudentDirectory::new(),
    };
    debug!("starting shell with {} students", directory.len());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(
        directory,
        container.persistence.clone(),
        container.settings.as_ref().clone(),
        stdin.lock(),
        stdout.lock(),
    );
    shell.run()?;
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_list(cli: &Cli, container: &ServiceContainer, filter: ListFilter) -> CliResult<()> {
    let file = resolve_file(cli, container)?;
    let directory = load_for_reading(container, &file)?;
    for line in listing(&directory, filter) {
        output::info(&line);
    }
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_add(
    cli: &Cli,
    container: &ServiceContainer,
    surname: &str,
    initials: &str,
    grades: &[Grade],
) -> CliResult<()> {
    let file = resolve_file(cli, container)?;
    let record = build_record(container, surname, initials, grades)?;
    let mut directory = load_existing(container, &file)?;
    directory.add(record);
    store(container, &directory, &file)?;
    output::success(&format!("Added {}", surname));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_remove(cli: &Cli, container: &ServiceContainer, surname: &str) -> CliResult<()> {
    let file = resolve_file(cli, container)?;
    let mut directory = load_existing(container, &file)?;
    if !directory.remove(surname) {
        output::warning(&format!("no student with surname {}", surname));
        return Ok(());
    }
    store(container, &directory, &file)?;
    output::success(&format!("Removed {}", surname));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_edit(
    cli: &Cli,
    container: &ServiceContainer,
    surname: &str,
    new_surname: &str,
    initials: &str,
    grades: &[Grade],
) -> CliResult<()> {
    let file = resolve_file(cli, container)?;
    let record = build_record(container, new_surname, initials, grades)?;
    let mut directory = load_existing(container, &file)?;
    if !directory.edit(surname, record) {
        output::warning(&format!("no student with surname {}, added {}", surname, new_surname));
    }
    store(container, &directory, &file)?;
    output::success(&format!("Edited {} -> {}", surname, new_surname));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_tree(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let file = resolve_file(cli, container)?;
    let directory = load_for_reading(container, &file)?;
    output::info(&directory.to_tree_string());
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory)"),
            }
            let cwd = std::env::current_dir()
                .map_err(|e| InfraError::io("determine current directory", e))?;
            output::info(&format!("local:  {}", local_config_path(&cwd).display()));
        }
    }
    Ok(())
}
