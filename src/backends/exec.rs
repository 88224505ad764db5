//! Diagnosis collaborator
//!
//! The diagnosis itself is produced by an external program. `CommandDiagnoser`
//! runs it with the prompt on stdin and takes its stdout as the report.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::core::error::{DoctorError, DoctorResult};

/// Environment variable carrying the reviewer instructions
pub const ENV_SYSTEM_PROMPT: &str = "SOPHIDOC_SYSTEM_PROMPT";

/// Environment variable carrying the project type description
pub const ENV_PROJECT_TYPE: &str = "SOPHIDOC_PROJECT_TYPE";

/// Produces a diagnosis for a composed prompt
pub trait Diagnoser {
    fn diagnose(&self, project_type: &str, prompt: &str) -> DoctorResult<String>;
}

/// Runs a command line, feeding the prompt through stdin
#[derive(Debug, Clone)]
pub struct CommandDiagnoser {
    program: String,
    args: Vec<String>,
    system_prompt: String,
}

impl CommandDiagnoser {
    /// Parse a shell-style command line such as `llm -m "gpt-4o"`
    pub fn new(command_line: &str, system_prompt: impl Into<String>) -> DoctorResult<Self> {
        let mut words = shlex::split(command_line).ok_or_else(|| {
            DoctorError::Config(format!("Cannot parse diagnose command: {}", command_line))
        })?;
        if words.is_empty() {
            return Err(DoctorError::Config("Diagnose command is empty".to_string()));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
            system_prompt: system_prompt.into(),
        })
    }
}

impl Diagnoser for CommandDiagnoser {
    fn diagnose(&self, project_type: &str, prompt: &str) -> DoctorResult<String> {
        tracing::debug!(program = %self.program, args = ?self.args, "Running diagnose command");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(ENV_SYSTEM_PROMPT, &self.system_prompt)
            .env(ENV_PROJECT_TYPE, project_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DoctorError::Collaborator(format!("cannot start '{}': {}", self.program, e))
            })?;

        // Feed stdin from a separate thread so a chatty child cannot deadlock us
        let stdin = child.stdin.take();
        let input = prompt.to_string();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(input.as_bytes()) {
                    tracing::debug!("Diagnose command closed stdin early: {}", e);
                }
            }
        });

        let output = child.wait_with_output().map_err(|e| {
            DoctorError::Collaborator(format!("'{}' did not complete: {}", self.program, e))
        })?;
        let _ = writer.join();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(DoctorError::Collaborator(if detail.is_empty() {
                format!("'{}' failed with {}", self.program, status)
            } else {
                format!("'{}' failed with {}: {}", self.program, status, detail)
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_is_split_like_a_shell() {
        let d = CommandDiagnoser::new(r#"llm -m "gpt 4o" --system 'x y'"#, "").unwrap();
        assert_eq!(d.program, "llm");
        assert_eq!(d.args, vec!["-m", "gpt 4o", "--system", "x y"]);
    }

    #[test]
    fn test_empty_or_unbalanced_command_is_config_error() {
        assert!(matches!(
            CommandDiagnoser::new("   ", ""),
            Err(DoctorError::Config(_))
        ));
        assert!(matches!(
            CommandDiagnoser::new("llm \"unterminated", ""),
            Err(DoctorError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_prompt_goes_through_stdin() {
        let d = CommandDiagnoser::new("cat", "be nice").unwrap();
        let out = d.diagnose("CLI", "Project Type: CLI\n\nhello").unwrap();
        assert_eq!(out, "Project Type: CLI\n\nhello");
    }

    #[cfg(unix)]
    #[test]
    fn test_environment_is_exported() {
        let d = CommandDiagnoser::new(
            r#"sh -c 'printf "%s|%s" "$SOPHIDOC_PROJECT_TYPE" "$SOPHIDOC_SYSTEM_PROMPT"'"#,
            "review carefully",
        )
        .unwrap();
        let out = d.diagnose("Rust CLI", "ignored").unwrap();
        assert_eq!(out, "Rust CLI|review carefully");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_collaborator_error() {
        let d = CommandDiagnoser::new(r#"sh -c 'echo quota exceeded >&2; exit 3'"#, "").unwrap();
        match d.diagnose("x", "prompt") {
            Err(DoctorError::Collaborator(msg)) => {
                assert!(msg.contains("exit code 3"), "{}", msg);
                assert!(msg.contains("quota exceeded"), "{}", msg);
            }
            other => panic!("expected collaborator error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_collaborator_error() {
        let d = CommandDiagnoser::new("sophidoc-no-such-program-xyz", "").unwrap();
        assert!(matches!(
            d.diagnose("x", "prompt"),
            Err(DoctorError::Collaborator(_))
        ));
    }
}
