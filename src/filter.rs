//! External content filters
//!
//! A filter is an opaque byte-stream transform: raw blob bytes in, HTML out.
//! `ExecFilter` runs a command per invocation. The child process is owned by
//! a guard that kills and reaps it on every early exit.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Byte-stream transform keyed by name
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Transform `input`. `filename_hint` is the basename of the blob.
    fn apply(&self, filename_hint: &str, input: &[u8]) -> Result<Vec<u8>, FilterError>;
}

/// Command line of an external filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Runs an external command; the filename hint is passed as the last argument.
pub struct ExecFilter {
    name: String,
    config: FilterConfig,
}

impl ExecFilter {
    pub fn new(name: impl Into<String>, config: FilterConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// Owns a running filter process until it has been waited for.
struct ChildGuard<'a> {
    child: Option<Child>,
    filter: &'a str,
}

impl<'a> ChildGuard<'a> {
    fn pipes(&mut self) -> Result<(ChildStdin, ChildStdout), FilterError> {
        let missing = || FilterError::Io {
            filter: self.filter.to_string(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "filter pipes not available"),
        };
        let child = self.child.as_mut().ok_or_else(missing)?;
        let stdin = child.stdin.take().ok_or_else(missing)?;
        let stdout = child.stdout.take().ok_or_else(missing)?;
        Ok((stdin, stdout))
    }

    fn wait(mut self) -> Result<ExitStatus, FilterError> {
        let filter = self.filter;
        match self.child.take() {
            Some(mut child) => child.wait().map_err(|source| FilterError::Io {
                filter: filter.to_string(),
                source,
            }),
            None => Err(FilterError::Io {
                filter: filter.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "filter already reaped"),
            }),
        }
    }
}

impl Drop for ChildGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(filter = self.filter, "Killing unfinished filter process");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Filter for ExecFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, filename_hint: &str, input: &[u8]) -> Result<Vec<u8>, FilterError> {
        let child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(filename_hint)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| FilterError::Spawn {
                filter: self.name.clone(),
                source,
            })?;
        let mut guard = ChildGuard {
            child: Some(child),
            filter: &self.name,
        };
        let (stdin, stdout) = guard.pipes()?;

        // stdout is drained on a scoped thread so a filter that writes before
        // it has read all of its input cannot fill the pipe and stall us.
        let output = std::thread::scope(|scope| {
            let reader = scope.spawn(move || drain(stdout));
            let written = feed(stdin, input);
            let read = reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "filter reader panicked")));
            written.and(read)
        })
        .map_err(|source| FilterError::Io {
            filter: self.name.clone(),
            source,
        })?;

        let status = guard.wait()?;
        if !status.success() {
            return Err(FilterError::Exit {
                filter: self.name.clone(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(output)
    }
}

fn feed(mut stdin: ChildStdin, input: &[u8]) -> io::Result<()> {
    stdin.write_all(input)?;
    stdin.flush()
    // stdin drops here, closing the pipe so the filter sees EOF
}

fn drain(mut stdout: ChildStdout) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf)?;
    Ok(buf)
}

/// In-process filter backed by a function
pub struct FnFilter<F> {
    name: String,
    f: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&str, &[u8]) -> Result<Vec<u8>, FilterError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&str, &[u8]) -> Result<Vec<u8>, FilterError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, filename_hint: &str, input: &[u8]) -> Result<Vec<u8>, FilterError> {
        (self.f)(filename_hint, input)
    }
}

/// Named filters available to a repository
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `ExecFilter` per configured command.
    pub fn from_config(configs: &HashMap<String, FilterConfig>) -> Self {
        let mut registry = Self::new();
        for (name, config) in configs {
            registry.register(Box::new(ExecFilter::new(name.clone(), config.clone())));
        }
        registry
    }

    pub fn register(&mut self, filter: Box<dyn Filter>) {
        let name = filter.name().to_string();
        if self.filters.insert(name.clone(), filter).is_some() {
            warn!(filter = %name, "Replacing previously registered filter");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    /// Run the named transform over `input`.
    pub fn apply(
        &self,
        transform_name: &str,
        filename_hint: &str,
        input: &[u8],
    ) -> Result<Vec<u8>, FilterError> {
        let filter = self
            .get(transform_name)
            .ok_or_else(|| FilterError::UnknownFilter(transform_name.to_string()))?;
        filter.apply(filename_hint, input)
    }
}
