//! External optimizer post-processor.
//!
//! Runs a command such as `optipng -quiet {filename}` against a temporary
//! copy of the encoded thumbnail and reads the optimized file back.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use thumbforge_common::{Error, OutputFormat, Result, SizeSpec};

use super::PostProcessor;

const FILENAME_VAR: &str = "{filename}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimize {
    program: String,
    args: Vec<String>,
}

impl Optimize {
    /// Parse a whitespace-separated command line containing `{filename}`.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::invalid_input("Optimize command is empty"))?;
        let args: Vec<String> = parts.collect();

        if !args.iter().any(|a| a.contains(FILENAME_VAR)) {
            return Err(Error::invalid_input(format!(
                "Optimize command must reference {}: {}",
                FILENAME_VAR, command
            )));
        }

        Ok(Self { program, args })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn resolve_program(&self) -> Result<PathBuf> {
        which::which(&self.program)
            .map_err(|_| Error::processing(format!("Optimizer not found: {}", self.program)))
    }
}

impl PostProcessor for Optimize {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn process(&self, data: Vec<u8>, format: OutputFormat, _spec: &SizeSpec) -> Result<Vec<u8>> {
        let program = self.resolve_program()?;

        let mut file = tempfile::Builder::new()
            .prefix("thumbforge-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        file.write_all(&data)?;
        file.flush()?;

        let path = file.path().display().to_string();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(FILENAME_VAR, &path))
            .collect();

        tracing::debug!(program = %program.display(), ?args, "Running optimizer");

        let output = Command::new(&program).args(&args).output()?;
        if !output.status.success() {
            return Err(Error::processing(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(std::fs::read(file.path())?)
    }
}
