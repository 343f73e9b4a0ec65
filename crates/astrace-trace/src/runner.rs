use crate::stream::{decode_line, LineSource};
use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TracerSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for TracerSettings {
    fn default() -> Self {
        Self {
            program: "tracert".to_string(),
            args: Vec::new(),
        }
    }
}

pub struct ProcessLines {
    child: Child,
    lines: Receiver<Vec<u8>>,
    encoding: &'static Encoding,
}

impl ProcessLines {
    pub fn spawn(
        destination: &str,
        settings: &TracerSettings,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let mut child = Command::new(&settings.program)
            .args(&settings.args)
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {} for {destination}", settings.program))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("missing tracer stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("missing tracer stderr"))?;

        // Merged per line, so stdout/stderr interleaving is only approximate.
        let (tx, rx) = mpsc::channel();
        forward_lines(stdout, tx.clone());
        forward_lines(stderr, tx);

        debug!(program = %settings.program, destination, "tracer started");
        Ok(Self {
            child,
            lines: rx,
            encoding,
        })
    }
}

fn forward_lines<R: Read + Send + 'static>(stream: R, sender: Sender<Vec<u8>>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "tracer output read failed");
                    break;
                }
            }
        }
    });
}

impl LineSource for ProcessLines {
    fn next_line(&mut self) -> Result<Option<String>> {
        // Both reader threads hang up once the child closes its pipes.
        match self.lines.recv() {
            Ok(raw) => Ok(Some(decode_line(self.encoding, &raw))),
            Err(_) => Ok(None),
        }
    }
}

// Kills the tracer if it is still running.
impl Drop for ProcessLines {
    fn drop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => debug!(%status, "tracer exited"),
            _ => {
                let _ = self.child.kill();
                let _ = self.child.wait();
                debug!("tracer stopped early");
            }
        }
    }
}
