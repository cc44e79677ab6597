//! Publishing the exported file to a git remote.
//!
//! Publishing happens after the JSON file is written and never affects it:
//! failures are reported to the caller, who decides how loudly to complain.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use thiserror::Error;

/// The three git operations of a publish, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStep {
    Stage,
    Commit,
    Push,
}

impl fmt::Display for GitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitStep::Stage => write!(f, "git add"),
            GitStep::Commit => write!(f, "git commit"),
            GitStep::Push => write!(f, "git push"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to launch {step}")]
    Launch {
        step: GitStep,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed ({status}): {stderr}")]
    Failed {
        step: GitStep,
        status: String,
        stderr: String,
    },
}

impl PublishError {
    pub fn step(&self) -> GitStep {
        match self {
            PublishError::Launch { step, .. } | PublishError::Failed { step, .. } => *step,
        }
    }
}

/// Something that can take a freshly written file and publish it.
pub trait Publisher {
    fn publish(&self, file: &Path) -> Result<(), PublishError>;
}

/// Result of running an external command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stderr: String,
}

/// Runs external programs; replaced in tests.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> io::Result<CommandOutput>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Stages, commits and pushes a file with the `git` command line client.
#[derive(Debug, Clone)]
pub struct GitPublisher<R = SystemRunner> {
    repo_path: PathBuf,
    remote: String,
    message: String,
    runner: R,
}

impl GitPublisher<SystemRunner> {
    pub fn new(
        repo_path: impl Into<PathBuf>,
        remote: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_runner(repo_path, remote, message, SystemRunner)
    }
}

impl<R: CommandRunner> GitPublisher<R> {
    pub fn with_runner(
        repo_path: impl Into<PathBuf>,
        remote: impl Into<String>,
        message: impl Into<String>,
        runner: R,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote: remote.into(),
            message: message.into(),
            runner,
        }
    }

    fn git(&self, step: GitStep, args: Vec<OsString>) -> Result<(), PublishError> {
        debug!("Running {} in {}", step, self.repo_path.display());

        let output = self
            .runner
            .run("git", &args, &self.repo_path)
            .map_err(|source| PublishError::Launch { step, source })?;

        if !output.success {
            return Err(PublishError::Failed {
                step,
                status: output.status,
                stderr: output.stderr,
            });
        }

        Ok(())
    }
}

impl<R: CommandRunner> Publisher for GitPublisher<R> {
    fn publish(&self, file: &Path) -> Result<(), PublishError> {
        // git runs inside the repository, so relative paths must not depend on our cwd
        let file = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());

        self.git(GitStep::Stage, vec!["add".into(), file.into_os_string()])?;
        self.git(
            GitStep::Commit,
            vec!["commit".into(), "-m".into(), self.message.clone().into()],
        )?;
        self.git(GitStep::Push, vec!["push".into(), self.remote.clone().into()])?;

        info!("Published to remote '{}'", self.remote);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every invocation and fails the configured step.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail_on: Option<&'static str>,
        unlaunchable: bool,
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[OsString], _cwd: &Path) -> io::Result<CommandOutput> {
            if self.unlaunchable {
                return Err(io::Error::new(io::ErrorKind::NotFound, "git not installed"));
            }

            let mut call = vec![program.to_string()];
            call.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
            let subcommand = call[1].clone();
            self.calls.borrow_mut().push(call);

            let failed = self.fail_on == Some(subcommand.as_str());
            Ok(CommandOutput {
                success: !failed,
                status: (if failed { "exit status: 1" } else { "exit status: 0" }).to_string(),
                stderr: if failed { "rejected".to_string() } else { String::new() },
            })
        }
    }

    fn publisher(runner: FakeRunner) -> GitPublisher<FakeRunner> {
        GitPublisher::with_runner("/srv/site", "upstream", "Refresh export", runner)
    }

    #[test]
    fn test_runs_add_commit_push() {
        let publisher = publisher(FakeRunner::default());
        publisher.publish(Path::new("/srv/site/data.json")).unwrap();

        let calls = publisher.runner.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0][..2], ["git", "add"]);
        assert!(calls[0][2].ends_with("data.json"));
        assert_eq!(calls[1], ["git", "commit", "-m", "Refresh export"]);
        assert_eq!(calls[2], ["git", "push", "upstream"]);
    }

    #[test]
    fn test_stops_at_failed_step() {
        let publisher = publisher(FakeRunner {
            fail_on: Some("commit"),
            ..FakeRunner::default()
        });

        let err = publisher.publish(Path::new("data.json")).unwrap_err();
        assert_eq!(err.step(), GitStep::Commit);
        assert_eq!(err.to_string(), "git commit failed (exit status: 1): rejected");

        // Nothing is pushed after a failed commit
        assert_eq!(publisher.runner.calls.borrow().len(), 2);
    }

    #[test]
    fn test_launch_failure() {
        let publisher = publisher(FakeRunner {
            unlaunchable: true,
            ..FakeRunner::default()
        });

        let err = publisher.publish(Path::new("data.json")).unwrap_err();
        assert!(matches!(err, PublishError::Launch { step: GitStep::Stage, .. }));
    }
}
