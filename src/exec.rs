//! Running generated programs.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ExecError;
use crate::value::DynamicValue;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Toolchain settings for the run step
#[derive(Debug, Clone, PartialEq)]
pub struct ExecConfig {
    /// Toolchain binary, `go` unless told otherwise
    pub command: String,
    /// Extra flags for `go run`, placed before the file
    pub flags: Vec<String>,
    pub timeout: Duration,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            command: "go".to_string(),
            flags: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ExecConfig {
    /// `<command> run <flags...> <path> <args...>`
    pub fn command_line(&self, path: &Path, args: &[String]) -> Vec<String> {
        let mut line = Vec::with_capacity(self.flags.len() + args.len() + 3);
        line.push(self.command.clone());
        line.push("run".to_string());
        line.extend(self.flags.iter().cloned());
        line.push(path.display().to_string());
        line.extend(args.iter().cloned());
        line
    }
}

/// Replace arguments that name a host reference with that value's text
pub fn resolve_args(args: &[String], refs: &HashMap<String, DynamicValue>) -> Vec<String> {
    args.iter()
        .map(|arg| match refs.get(arg) {
            Some(value) => value.to_string(),
            None => arg.clone(),
        })
        .collect()
}

/// Something that can compile and run a source file, returning its stdout
pub trait Executor {
    fn execute(&self, path: &Path, args: &[String]) -> Result<String, ExecError>;
}

/// Runs source files through the Go toolchain
pub struct GoExecutor {
    config: ExecConfig,
}

impl GoExecutor {
    pub fn new(config: ExecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }
}

impl Default for GoExecutor {
    fn default() -> Self {
        Self::new(ExecConfig::default())
    }
}

impl Executor for GoExecutor {
    fn execute(&self, path: &Path, args: &[String]) -> Result<String, ExecError> {
        let line = self.config.command_line(path, args);
        tracing::info!(command = %line.join(" "), "running program");

        let io_error = |source: std::io::Error| ExecError::Io {
            command: self.config.command.clone(),
            source,
        };

        let mut command = Command::new(&line[0]);
        command
            .args(&line[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        own_process_group(&mut command);
        let mut child = command.spawn().map_err(io_error)?;

        // Pipes are drained while the child runs
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_all(stdout_pipe.as_mut()));
        let stderr_reader = thread::spawn(move || read_all(stderr_pipe.as_mut()));

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait().map_err(io_error)? {
                break status;
            }
            if started.elapsed() >= self.config.timeout {
                tracing::warn!(timeout = ?self.config.timeout, "program timed out, killing it");
                kill_tree(&mut child);
                let _ = child.wait();
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(ExecError::Timeout(self.config.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        tracing::debug!(%status, stdout_bytes = stdout.len(), "program finished");

        if status.success() {
            Ok(stdout)
        } else {
            Err(ExecError::Failed {
                status: status.to_string(),
                stderr,
            })
        }
    }
}

/// `go run` builds and then spawns the program as its own child, so the run
/// gets a process group that can be killed as a whole.
#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: kill(2) takes plain integers; a negative pid names the group
    // created by own_process_group and nothing else.
    if unsafe { libc::kill(-pid, libc::SIGKILL) } != 0 {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn read_all<R: Read>(pipe: Option<&mut R>) -> String {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
