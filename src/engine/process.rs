use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One invocation of an external collaborator program.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub stdin: Option<Vec<u8>>,
    /// Zero disables the timeout.
    pub timeout_seconds: u64,
}

/// Runs the program to completion and returns its output, failing on spawn
/// errors, timeouts and non-zero exit codes.
pub fn run(spec: &ProcessSpec) -> Result<Output> {
    debug!(
        "process run {} args={:?} timeout={}s",
        spec.program.display(),
        spec.args,
        spec.timeout_seconds
    );
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.stdin(if spec.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    for (k, v) in &spec.env {
        cmd.env(k, v);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {}", spec.program.display()))?;

    // Feed stdin from its own thread; a child that writes before it has
    // consumed all of its input would otherwise block against us.
    let stdin_thread = match (spec.stdin.clone(), child.stdin.take()) {
        (Some(bytes), Some(mut stdin)) => Some(std::thread::spawn(move || -> Result<()> {
            stdin.write_all(&bytes).with_context(|| "write stdin")?;
            stdin.flush().ok();
            Ok(())
        })),
        _ => None,
    };

    let timeout = (spec.timeout_seconds > 0).then(|| Duration::from_secs(spec.timeout_seconds));
    let output = wait_with_timeout(&mut child, timeout)
        .with_context(|| format!("waiting for {}", spec.program.display()))?;

    if let Some(handle) = stdin_thread {
        match handle.join() {
            Ok(Err(err)) => debug!("stdin writer for {}: {err:#}", spec.program.display()),
            Err(_) => return Err(anyhow!("stdin writer thread panicked")),
            Ok(Ok(())) => {}
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} exited with {}: {}",
            spec.program.display(),
            output.status,
            stderr.trim()
        ));
    }

    if !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("stderr {}: {}", spec.program.display(), stderr.trim());
    }

    Ok(output)
}

fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Output> {
    // Drain pipes while waiting so a chatty child can't deadlock on a full
    // stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            let stdout = stdout_thread
                .join()
                .map_err(|_| anyhow!("stdout reader thread panicked"))??;
            let stderr = stderr_thread
                .join()
                .map_err(|_| anyhow!("stderr reader thread panicked"))??;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if let Some(timeout) = timeout {
            if start.elapsed() > timeout {
                warn!("process timed out after {:?}", timeout);
                let _ = child.kill();
                child.wait().with_context(|| "wait after kill")?;
                let stderr = stderr_thread
                    .join()
                    .map_err(|_| anyhow!("stderr reader thread panicked"))??;
                let _ = stdout_thread.join();
                return Err(anyhow!(
                    "process exceeded timeout ({:?}); stderr: {}",
                    timeout,
                    String::from_utf8_lossy(&stderr).trim()
                ));
            }
        }

        std::thread::sleep(Duration::from_millis(20));
    }
}
