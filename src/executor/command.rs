//! Command-backed move executor
//!
//! Composes the external mover behind xargs:
//!
//! ```text
//! xargs -0 -n <batch> -P <procs> <mover> -S <src> -R <dest> -N <threads>
//! ```
//!
//! Paths are streamed to xargs null-separated (arbitrary path characters
//! survive) from a dedicated feeder thread; stdout and stderr are each read
//! line-by-line on their own thread and funnelled into one bounded channel.
//! The returned stream drains that channel, then reaps the child - so the
//! caller sees end-of-stream only after the invocation is fully done.

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::{CompletionRecord, MoveExecutor, MoveRequest, RecordStream};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Channel capacity between the reader threads and the consumer
const LINE_CHANNEL_CAPACITY: usize = 1024;

/// Move executor that shells out through xargs
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    /// The transfer program xargs fans out to
    mover: String,
}

impl CommandExecutor {
    /// Create an executor around the given mover program
    pub fn new(mover: impl Into<String>) -> Self {
        Self {
            mover: mover.into(),
        }
    }

    /// Assemble the xargs pipeline command for one request
    fn build_command(&self, request: &MoveRequest) -> Command {
        let mut cmd = Command::new("xargs");
        cmd.arg("-0")
            .arg("-n")
            .arg(request.batch_size.to_string())
            .arg("-P")
            .arg(request.max_processes.to_string())
            .arg(&self.mover)
            .arg("-S")
            .arg(&request.src_resc)
            .arg("-R")
            .arg(&request.dest_resc)
            .arg("-N")
            .arg(request.min_threads.to_string());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl MoveExecutor for CommandExecutor {
    fn run(&self, request: &MoveRequest, paths: &[String]) -> ExecutorResult<RecordStream> {
        let mut cmd = self.build_command(request);

        debug!(
            mover = %self.mover,
            processes = request.max_processes,
            batch = request.batch_size,
            threads = request.min_threads,
            items = paths.len(),
            "Spawning mover pipeline"
        );

        let mut child = cmd.spawn().map_err(|e| ExecutorError::SpawnFailed {
            program: self.mover.clone(),
            reason: e.to_string(),
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(ExecutorError::PipeUnavailable { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ExecutorError::PipeUnavailable { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(ExecutorError::PipeUnavailable { stream: "stderr" })?;

        let (tx, rx) = bounded::<String>(LINE_CHANNEL_CAPACITY);

        let feeder = spawn_feeder(stdin, paths.to_vec())?;
        let out_reader = spawn_reader("mover-stdout", stdout, tx.clone())?;
        let err_reader = spawn_reader("mover-stderr", stderr, tx)?;

        Ok(Box::new(CommandStream {
            rx,
            child: Some(child),
            threads: vec![feeder, out_reader, err_reader],
        }))
    }
}

/// Write the paths null-separated to the child's stdin, then close it
fn spawn_feeder(
    mut stdin: std::process::ChildStdin,
    paths: Vec<String>,
) -> ExecutorResult<JoinHandle<()>> {
    thread::Builder::new()
        .name("mover-stdin".to_string())
        .spawn(move || {
            for path in &paths {
                if let Err(e) = stdin
                    .write_all(path.as_bytes())
                    .and_then(|_| stdin.write_all(b"\0"))
                {
                    // Child exited early; its status is reported on drain
                    warn!(error = %e, "Mover stdin closed before all paths were fed");
                    return;
                }
            }
            if let Err(e) = stdin.flush() {
                warn!(error = %e, "Failed to flush mover stdin");
            }
            // stdin drops here, signalling end of input
        })
        .map_err(|e| ExecutorError::ThreadFailed {
            name: "mover-stdin",
            reason: e.to_string(),
        })
}

/// Forward one output pipe into the shared line channel
fn spawn_reader<R: Read + Send + 'static>(
    name: &'static str,
    pipe: R,
    tx: Sender<String>,
) -> ExecutorResult<JoinHandle<()>> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let reader = BufReader::new(pipe);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            // Consumer went away; stop reading
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(stream = name, error = %e, "Error reading mover output");
                        return;
                    }
                }
            }
        })
        .map_err(|e| ExecutorError::ThreadFailed {
            name,
            reason: e.to_string(),
        })
}

/// Iterator over the child's merged output, reaping it at end of stream
struct CommandStream {
    rx: Receiver<String>,
    child: Option<Child>,
    threads: Vec<JoinHandle<()>>,
}

impl CommandStream {
    /// Join the pump threads and reap the child process
    fn finish(&mut self) {
        // Drain any lines still in flight so the readers can never be
        // stuck on a full channel; recv disconnects once both readers exit
        while self.rx.recv().is_ok() {}
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) if !status.success() => {
                    warn!(status = %status, "Mover pipeline exited with failure status");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to reap mover pipeline"),
            }
        }
    }
}

impl Iterator for CommandStream {
    type Item = CompletionRecord;

    fn next(&mut self) -> Option<CompletionRecord> {
        loop {
            match self.rx.recv() {
                Ok(line) => {
                    if let Some(record) = CompletionRecord::parse(&line) {
                        return Some(record);
                    }
                    // Blank line - not a completion signal
                }
                Err(_) => {
                    // All readers done: every output line has been consumed
                    self.finish();
                    return None;
                }
            }
        }
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_shape() {
        let exec = CommandExecutor::new("iphymv");
        let request = MoveRequest {
            src_resc: "demoResc".into(),
            dest_resc: "archiveResc".into(),
            min_threads: 2,
            max_processes: 6,
            batch_size: 72,
        };

        let cmd = exec.build_command(&request);
        assert_eq!(cmd.get_program(), "xargs");

        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-0", "-n", "72", "-P", "6", "iphymv", "-S", "demoResc", "-R", "archiveResc",
                "-N", "2"
            ]
        );
    }

    #[test]
    fn test_missing_mover_still_drains() {
        // xargs spawns fine even when the mover does not exist; the failure
        // shows up on the output stream and the stream must still terminate
        // cleanly once the child is reaped.
        let exec = CommandExecutor::new("definitely-not-a-real-mover");
        let request = MoveRequest {
            src_resc: "r1".into(),
            dest_resc: "r2".into(),
            min_threads: 0,
            max_processes: 1,
            batch_size: 2,
        };
        let stream = exec.run(&request, &["/zone/a".to_string()]).unwrap();
        let records: Vec<_> = stream.collect();
        assert!(records.iter().all(|r| !r.raw.trim().is_empty()));
    }
}
