//! Transport seam between the tutor session and a language model.

use crate::error::{TutorError, TutorResult};
use std::io::Write;
use std::process::{Command, Stdio};

/// Something that turns a prompt into model text.
///
/// Implementations may block; [`TutorWorker`](crate::TutorWorker) runs them
/// off the simulation thread.
pub trait TutorBackend: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str) -> TutorResult<String>;
}

/// Runs an external program with the prompt on stdin and takes its stdout
/// as the reply. The API key is passed through the environment so the
/// program can reach whichever model service it wraps.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    api_key_var: String,
}

impl CommandBackend {
    pub const PROGRAM_VAR: &'static str = "VL_TUTOR_CMD";
    pub const API_KEY_VAR: &'static str = "API_KEY";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            api_key_var: Self::API_KEY_VAR.to_string(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_api_key_var(mut self, var: impl Into<String>) -> Self {
        self.api_key_var = var.into();
        self
    }

    /// Program from `$VL_TUTOR_CMD`, split on whitespace.
    pub fn from_env() -> TutorResult<Self> {
        let raw = std::env::var(Self::PROGRAM_VAR)
            .map_err(|_| TutorError::NotConfigured(format!("${} is not set", Self::PROGRAM_VAR)))?;
        let mut parts = raw.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| TutorError::NotConfigured(format!("${} is empty", Self::PROGRAM_VAR)))?;
        Ok(Self::new(program).with_args(parts))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl TutorBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn generate(&self, prompt: &str) -> TutorResult<String> {
        let api_key = std::env::var(&self.api_key_var).map_err(|_| {
            TutorError::MissingCredentials {
                var: self.api_key_var.clone(),
            }
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(&self.api_key_var, api_key)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(TutorError::Backend {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
