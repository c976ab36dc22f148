//! A running FontForge bridge process.

use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

use crate::{
    EngineConfig, EngineError,
    fontforge::protocol::{Reply, Request},
};

/// The Python script executed by FontForge, translating [`Request`]s into calls on its font
/// object.
const BRIDGE_SCRIPT: &str = include_str!("bridge.py");

/// A FontForge process executing the bridge script.
///
/// Dropping the [`Session`] closes the bridge's input, which makes it exit, and then waits for
/// the process.
pub struct Session {
    /// The FontForge process.
    child: Child,
    /// The bridge's request stream. `None` once the session has been closed.
    stdin: Option<ChildStdin>,
    /// The bridge's reply stream.
    stdout: BufReader<ChildStdout>,
    /// The bridge script. Kept alive for as long as the process may read it.
    _script: NamedTempFile,
}

impl Session {
    /// Launches FontForge as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the bridge script could not be written, and
    /// [`EngineError::Launch`] if FontForge could not be launched.
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut script = tempfile::Builder::new()
            .prefix("mkttf-bridge")
            .suffix(".py")
            .tempfile()?;
        script.write_all(BRIDGE_SCRIPT.as_bytes())?;
        script.flush()?;

        let mut cmd = Command::new(&config.executable);
        cmd.arg("-lang=py").arg("-script").arg(script.path());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        debug!("Running command: {cmd:?}");
        let mut child = cmd.spawn().map_err(|error| EngineError::Launch {
            executable: config.executable.clone(),
            error,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            unreachable!("stdin and stdout are piped");
        };

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            _script: script,
        })
    }

    /// Sends `request` to the bridge and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Failed`] if the bridge reports a failure, and
    /// [`EngineError::Protocol`] or [`EngineError::Io`] if the bridge could not be reached.
    pub fn call(&mut self, request: &Request<'_>) -> Result<serde_json::Value, EngineError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(EngineError::Protocol("session already closed".to_owned()));
        };

        let mut line = serde_json::to_string(request)?;
        trace!("-> {line}");
        line.push('\n');
        stdin.write_all(line.as_bytes())?;
        stdin.flush()?;

        line.clear();
        if self.stdout.read_line(&mut line)? == 0 {
            let status = self.child.wait()?;
            return Err(EngineError::Protocol(format!(
                "fontforge exited unexpectedly ({status})"
            )));
        }
        trace!("<- {}", line.trim_end());

        let reply: Reply = serde_json::from_str(&line)?;
        reply.into_result()
    }

    /// Asks the bridge to close the font and exit, then waits for the process.
    fn close(&mut self) -> Result<(), EngineError> {
        if self.stdin.is_none() {
            return Ok(());
        }

        let result = self.call(&Request::Close);
        self.stdin = None;

        let status = self.child.wait()?;
        debug!("fontforge exited with {status}");
        result.map(|_| ())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!("error shutting down fontforge: {error}");
        }
    }
}
