//! Command-line client for the employee directory backend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use employee_directory::domain::ports::{MirrorKey, PersistentMirror};
use employee_directory::domain::{EmployeeRecord, canonical};
use employee_directory::{DirectorySettings, HttpDirectoryApp};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `directory-cli` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "directory-cli",
    about = "Inspect the employee directory and the locally mirrored draft",
    version
)]
struct CliArgs {
    /// Backend root URL. Overrides `EMPLOYEE_DIRECTORY_API_BASE_URL`.
    #[arg(long = "api-base-url", value_name = "url")]
    api_base_url: Option<String>,
    /// Mirror directory. Overrides `EMPLOYEE_DIRECTORY_MIRROR_DIR`.
    #[arg(long = "mirror-dir", value_name = "path")]
    mirror_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List every employee.
    List,
    /// List employees matching a search term.
    Search {
        /// Text matched against names and e-mail addresses.
        term: String,
    },
    /// Report whether an e-mail address is already in use.
    CheckEmail {
        /// Address to check.
        email: String,
    },
    /// Inspect or discard the mirrored draft.
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum DraftAction {
    /// Print the mirrored record and its unsaved-changes flag.
    Show,
    /// Reset the mirror keys.
    Discard,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = resolve_settings(&args)?;
    let app = HttpDirectoryApp::from_settings(&settings)
        .map_err(|error| io::Error::other(format!("build directory client: {error}")))?;
    let mut out = io::stdout().lock();

    match args.command {
        Command::List => {
            app.directory()
                .fetch_employees()
                .await
                .map_err(|error| io::Error::other(format!("list employees: {error}")))?;
            write_employees(&mut out, &app.directory().employees())?;
        }
        Command::Search { term } => {
            app.directory()
                .search_employees(&term)
                .await
                .map_err(|error| io::Error::other(format!("search employees: {error}")))?;
            write_employees(&mut out, &app.directory().employees())?;
        }
        Command::CheckEmail { email } => {
            let checked = app
                .directory()
                .check_email_exists(app.session(), app.session().epoch(), &email)
                .await
                .map_err(|error| io::Error::other(format!("check e-mail: {error}")))?;
            match checked {
                Some(exists) => writeln!(out, "exists={exists}")?,
                None => writeln!(out, "skipped: address too short")?,
            }
        }
        Command::Draft {
            action: DraftAction::Show,
        } => write_draft(&mut out, &app)?,
        Command::Draft {
            action: DraftAction::Discard,
        } => {
            app.session()
                .reset_employee_data()
                .map_err(|error| io::Error::other(format!("discard draft: {error}")))?;
            writeln!(out, "draft discarded")?;
        }
    }
    Ok(())
}

fn resolve_settings(args: &CliArgs) -> io::Result<DirectorySettings> {
    let mut settings = DirectorySettings::load_from_iter([OsString::from("directory-cli")])
        .map_err(|error| io::Error::other(format!("load configuration: {error}")))?;
    if let Some(url) = &args.api_base_url {
        settings.api_base_url = Some(url.clone());
    }
    if let Some(dir) = &args.mirror_dir {
        settings.mirror_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn write_employees(out: &mut impl Write, employees: &[EmployeeRecord]) -> io::Result<()> {
    for employee in employees {
        let id = employee.id.as_ref().map_or("-", |id| id.as_str());
        writeln!(
            out,
            "{id}\t{} {}\t{}",
            employee.first_name, employee.last_name, employee.email
        )?;
    }
    writeln!(out, "count={}", employees.len())
}

fn write_draft(out: &mut impl Write, app: &HttpDirectoryApp) -> io::Result<()> {
    let data_changed = app
        .session()
        .mirror()
        .get(MirrorKey::DataChanged)
        .map_err(|error| io::Error::other(format!("read draft flag: {error}")))?;
    writeln!(
        out,
        "data_changed={}",
        data_changed.as_deref().unwrap_or("false")
    )?;
    match app.session().pending_mirror_record() {
        Some(record) => {
            let encoded = canonical::encode(&record)
                .map_err(|error| io::Error::other(format!("encode draft: {error}")))?;
            writeln!(out, "employee_data={encoded}")
        }
        None => writeln!(out, "employee_data=none"),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing and output helpers.

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;
    use employee_directory::domain::EmployeeId;

    #[rstest]
    #[case(&["directory-cli", "list"])]
    #[case(&["directory-cli", "--api-base-url", "http://hr.local/", "search", "ada"])]
    #[case(&["directory-cli", "check-email", "ada@example.com"])]
    #[case(&["directory-cli", "--mirror-dir", "/tmp/m", "draft", "discard"])]
    fn accepts_documented_commands(#[case] argv: &[&str]) {
        assert!(CliArgs::try_parse_from(argv).is_ok());
    }

    #[test]
    fn flags_apply_when_nothing_is_configured() {
        let _guard = lock_env([
            ("EMPLOYEE_DIRECTORY_API_BASE_URL", None::<String>),
            ("EMPLOYEE_DIRECTORY_REQUEST_TIMEOUT_SECONDS", None::<String>),
            ("EMPLOYEE_DIRECTORY_MIRROR_DIR", None::<String>),
        ]);
        let args = CliArgs::try_parse_from([
            "directory-cli",
            "--api-base-url",
            "http://hr.local/",
            "--mirror-dir",
            "/tmp/directory-mirror",
            "draft",
            "show",
        ])
        .expect("arguments parse");

        let settings = resolve_settings(&args).expect("settings resolve");

        assert_eq!(settings.api_base_url.as_deref(), Some("http://hr.local/"));
        assert_eq!(
            settings.mirror_dir(),
            Some(&PathBuf::from("/tmp/directory-mirror"))
        );
        assert_eq!(settings.request_timeout_seconds, 10);
    }

    #[test]
    fn draft_requires_an_action() {
        assert!(CliArgs::try_parse_from(["directory-cli", "draft"]).is_err());
    }

    #[test]
    fn employees_are_written_one_per_line() {
        let employees = vec![
            EmployeeRecord {
                id: Some(EmployeeId::new("AB1234")),
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                email: "ada@example.com".to_owned(),
                ..EmployeeRecord::empty()
            },
            EmployeeRecord::empty(),
        ];
        let mut out = Vec::new();

        write_employees(&mut out, &employees).expect("write");

        let text = String::from_utf8(out).expect("utf-8");
        assert_eq!(
            text,
            "AB1234\tAda Lovelace\tada@example.com\n-\t \t\ncount=2\n"
        );
    }
}
