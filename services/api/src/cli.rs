use crate::demo::{
    run_attendance_classify, run_attendance_import, run_demo, run_leave_check, AttendanceImportArgs,
    ClassifyArgs, DemoArgs, LeaveCheckArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hrms::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HRMS",
    about = "Run the HRMS leave, attendance and tour service or exercise its policies from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate leave requests against the policy engine
    Leave {
        #[command(subcommand)]
        command: LeaveCommand,
    },
    /// Classify punches and import biometric exports
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
    /// Run an end-to-end walk-through of the leave, attendance, tour and report workflows
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LeaveCommand {
    /// Dry-run a leave request against the seeded demo organisation
    Check(LeaveCheckArgs),
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    /// Classify a single login/logout pair against the general shift
    Classify(ClassifyArgs),
    /// Parse a punch export and print the classified daily logs
    Import(AttendanceImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Leave {
            command: LeaveCommand::Check(args),
        } => run_leave_check(args),
        Command::Attendance {
            command: AttendanceCommand::Classify(args),
        } => run_attendance_classify(args),
        Command::Attendance {
            command: AttendanceCommand::Import(args),
        } => run_attendance_import(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["hrms-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn leave_check_parses_half_day_choices() {
        let cli = Cli::try_parse_from([
            "hrms-api",
            "leave",
            "check",
            "--employee",
            "emp-asha",
            "--type",
            "cl",
            "--start",
            "2025-06-09",
            "--end",
            "2025-06-10",
            "--end-choice",
            "2",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Leave {
                command: LeaveCommand::Check(args),
            }) => {
                assert_eq!(args.employee, "emp-asha");
                assert_eq!(args.end_choice, hrms::workflows::leave::DayChoice::FirstHalf);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn attendance_classify_rejects_bad_timestamps() {
        let result = Cli::try_parse_from([
            "hrms-api",
            "attendance",
            "classify",
            "--login",
            "yesterday",
            "--logout",
            "2025-06-02 17:30",
        ]);
        assert!(result.is_err());
    }
}
