use std::fmt;
use std::io;
use std::time::Duration;

use dix_core::PlayerIndex;
use dix_wire::Command;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// A human at the terminal, or a bot subprocess, behind one interface.
pub enum Seat {
    Terminal(TerminalSeat),
    Subprocess(SubprocessSeat),
}

impl Seat {
    pub async fn send(&mut self, command: &Command) -> io::Result<()> {
        match self {
            Seat::Terminal(seat) => seat.send(command).await,
            Seat::Subprocess(seat) => seat.send(command).await,
        }
    }

    pub async fn receive(&mut self) -> io::Result<String> {
        match self {
            Seat::Terminal(seat) => seat.receive().await,
            Seat::Subprocess(seat) => seat.receive().await,
        }
    }

    /// Send `command` and wait for the reply concurrently, required for
    /// pipe-backed seats since a subprocess can start answering before its
    /// stdin write finishes draining.
    pub async fn communicate(&mut self, command: &Command) -> io::Result<String> {
        match self {
            Seat::Terminal(seat) => seat.communicate(command).await,
            Seat::Subprocess(seat) => seat.communicate(command).await,
        }
    }

    pub async fn close(&mut self) {
        match self {
            Seat::Terminal(_) => {}
            Seat::Subprocess(seat) => seat.close().await,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Terminal(seat) => write!(f, "{seat}"),
            Seat::Subprocess(seat) => write!(f, "{seat}"),
        }
    }
}

/// Interactive seat controlled by a human at the controlling terminal.
pub struct TerminalSeat {
    player: PlayerIndex,
    reader: BufReader<tokio::io::Stdin>,
}

impl TerminalSeat {
    pub fn new(player: PlayerIndex) -> Self {
        TerminalSeat {
            player,
            reader: BufReader::new(tokio::io::stdin()),
        }
    }

    pub async fn send(&mut self, command: &Command) -> io::Result<()> {
        println!("[seat {}] <- {}", self.player, command.write());
        Ok(())
    }

    pub async fn receive(&mut self) -> io::Result<String> {
        print!("[seat {}] -> ", self.player);
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        Ok(line.trim_end_matches('\n').to_string())
    }

    pub async fn communicate(&mut self, command: &Command) -> io::Result<String> {
        self.send(command).await?;
        self.receive().await
    }
}

impl fmt::Display for TerminalSeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TerminalSeat(player={})", self.player)
    }
}

type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;
type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

enum Backend {
    Sandboxed(dix_box::ChildHandle),
    Plain(tokio::process::Child),
}

/// Unattended seat controlled by a bot running as a subprocess, optionally
/// namespaced and cgroup-limited via `dix-box`.
pub struct SubprocessSeat {
    player: PlayerIndex,
    args: Vec<String>,
    deadline: Option<Duration>,
    backend: Option<Backend>,
    stdin: BoxedWriter,
    stdout: BufReader<BoxedReader>,
    stderr_task: tokio::task::JoinHandle<()>,
}

impl SubprocessSeat {
    /// Spawn `args` as the seat's bot. When `sandbox` is `Some`, the process
    /// runs inside a `dix-box` sandbox rooted at the config's `root`;
    /// otherwise it's a plain child process, piped the same way.
    pub async fn create(
        player: PlayerIndex,
        args: Vec<String>,
        sandbox: Option<&dix_box::BoxConfig>,
        cwd: Option<&std::path::Path>,
        deadline: Option<Duration>,
    ) -> io::Result<Self> {
        let (backend, stdin, stdout, stderr_reader) = match sandbox {
            Some(config) => spawn_sandboxed(&args, config, cwd)?,
            None => spawn_plain(&args, cwd)?,
        };

        let stderr_task = spawn_stderr_forwarder(player, stderr_reader);

        Ok(SubprocessSeat {
            player,
            args,
            deadline,
            backend: Some(backend),
            stdin,
            stdout: BufReader::new(stdout),
            stderr_task,
        })
    }

    pub async fn send(&mut self, command: &Command) -> io::Result<()> {
        write_line(&mut self.stdin, &command.write()).await
    }

    pub async fn receive(&mut self) -> io::Result<String> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, read_line(&mut self.stdout))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "seat reply deadline exceeded"))?,
            None => read_line(&mut self.stdout).await,
        }
    }

    pub async fn communicate(&mut self, command: &Command) -> io::Result<String> {
        let line = command.write();
        let receive = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout(deadline, read_line(&mut self.stdout))
                    .await
                    .map_err(|_| {
                        io::Error::new(io::ErrorKind::TimedOut, "seat reply deadline exceeded")
                    })?,
                None => read_line(&mut self.stdout).await,
            }
        };
        let (sent, received) = tokio::join!(write_line(&mut self.stdin, &line), receive);
        sent?;
        received
    }

    pub async fn close(&mut self) {
        match self.backend.take() {
            Some(Backend::Plain(mut child)) => {
                let _ = child.wait().await;
            }
            Some(Backend::Sandboxed(mut child)) => {
                // dix-box's ChildHandle::wait is a blocking pidfd poll; run
                // it off the async executor so it doesn't stall other seats.
                tokio::task::spawn_blocking(move || child.close())
                    .await
                    .ok();
            }
            None => {}
        }
        let stderr_task = std::mem::replace(&mut self.stderr_task, tokio::spawn(async {}));
        let _ = stderr_task.await;
    }
}

impl fmt::Display for SubprocessSeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubprocessSeat(player={}, args={:?})", self.player, self.args)
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn read_line<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "seat closed its output"));
    }
    Ok(line.trim_end_matches('\n').to_string())
}

fn spawn_sandboxed(
    args: &[String],
    config: &dix_box::BoxConfig,
    cwd: Option<&std::path::Path>,
) -> io::Result<(Backend, BoxedWriter, BoxedReader, BoxedReader)> {
    let mut child = dix_box::spawn(
        args,
        config,
        cwd,
        dix_box::StdioSpec::Piped,
        dix_box::StdioSpec::Piped,
        dix_box::StdioSpec::Piped,
    )
    .map_err(|err| io::Error::other(err.to_string()))?;

    let stdin = child.stdin.take().expect("stdin was piped");
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let stdin: BoxedWriter = Box::new(tokio::fs::File::from_std(stdin));
    let stdout: BoxedReader = Box::new(tokio::fs::File::from_std(stdout));
    let stderr: BoxedReader = Box::new(tokio::fs::File::from_std(stderr));

    Ok((Backend::Sandboxed(child), stdin, stdout, stderr))
}

fn spawn_plain(
    args: &[String],
    cwd: Option<&std::path::Path>,
) -> io::Result<(Backend, BoxedWriter, BoxedReader, BoxedReader)> {
    let mut command = tokio::process::Command::new(&args[0]);
    command
        .args(&args[1..])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let mut child = command.spawn()?;

    let stdin: BoxedWriter = Box::new(child.stdin.take().expect("stdin was piped"));
    let stdout: BoxedReader = Box::new(child.stdout.take().expect("stdout was piped"));
    let stderr: BoxedReader = Box::new(child.stderr.take().expect("stderr was piped"));

    Ok((Backend::Plain(child), stdin, stdout, stderr))
}

fn spawn_stderr_forwarder(
    player: PlayerIndex,
    stderr: BoxedReader,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("[seat {player}] {line}"),
                Ok(None) => break,
                Err(err) => {
                    log::warn!("[seat {player}] stderr read failed: {err}");
                    break;
                }
            }
        }
    })
}

