//! Implementation of the `pomodoro check` command.

use colored::Colorize;
use pomodoro::smoke::{self, HOME_PATH, SmokeError};

pub const EXIT_PASSED: i32 = 0;
pub const EXIT_ASSERTION_FAILED: i32 = 1;
pub const EXIT_SETUP_FAILED: i32 = 2;

/// Runs the home page smoke check and returns the process exit code.
pub fn execute() -> i32 {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} failed to start runtime: {}", "ERROR".red().bold(), e);
            return EXIT_SETUP_FAILED;
        }
    };

    report(runtime.block_on(smoke::run()))
}

/// Prints the outcome and maps it to an exit code.
pub fn report(result: Result<(), SmokeError>) -> i32 {
    let code = exit_code(&result);
    match result {
        Ok(()) => println!("{} GET {}", "PASS".green().bold(), HOME_PATH),
        Err(e) if e.is_setup() => eprintln!("{} {}", "ERROR".red().bold(), e),
        Err(e) => eprintln!("{} {}", "FAIL".red().bold(), e),
    }
    code
}

pub fn exit_code(result: &Result<(), SmokeError>) -> i32 {
    match result {
        Ok(()) => EXIT_PASSED,
        Err(e) if e.is_setup() => EXIT_SETUP_FAILED,
        Err(_) => EXIT_ASSERTION_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomodoro::prelude::StatusCode;

    #[test]
    fn test_exit_codes_distinguish_failure_kinds() {
        assert_eq!(exit_code(&Ok(())), EXIT_PASSED);
        assert_eq!(
            exit_code(&Err(SmokeError::Setup("no app".into()))),
            EXIT_SETUP_FAILED
        );
        assert_eq!(
            exit_code(&Err(SmokeError::StatusMismatch {
                path: HOME_PATH,
                expected: StatusCode::OK,
                actual: StatusCode::NOT_FOUND,
            })),
            EXIT_ASSERTION_FAILED
        );
        assert_eq!(
            exit_code(&Err(SmokeError::MissingKeyword {
                path: HOME_PATH,
                keyword: "Pomodoro".to_string(),
                body: "<html>Welcome</html>".to_string(),
            })),
            EXIT_ASSERTION_FAILED
        );
    }
}
