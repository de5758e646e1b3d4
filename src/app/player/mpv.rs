use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;

use super::{MediaBackend, MediaEvent};

const OBSERVED_PROPERTIES: [&str; 4] = ["time-pos", "duration", "pause", "eof-reached"];

/// Maps one line of mpv's JSON IPC output to a media event. Command replies
/// and events we do not track map to `None`.
pub(crate) fn parse_mpv_message(line: &str) -> Option<MediaEvent> {
    let value: Value = serde_json::from_str(line).ok()?;
    match value.get("event")?.as_str()? {
        "property-change" => {
            let data = value.get("data")?;
            match value.get("name")?.as_str()? {
                "time-pos" => data.as_f64().map(MediaEvent::TimeUpdate),
                "duration" => data.as_f64().map(MediaEvent::Duration),
                "pause" => data.as_bool().map(MediaEvent::Paused),
                "eof-reached" => data
                    .as_bool()
                    .filter(|reached| *reached)
                    .map(|_| MediaEvent::Ended),
                _ => None,
            }
        }
        "file-loaded" => Some(MediaEvent::Loaded),
        "end-file" => match value.get("reason").and_then(Value::as_str) {
            Some("eof") => Some(MediaEvent::Ended),
            Some("error") => Some(MediaEvent::Failed(
                value
                    .get("file_error")
                    .and_then(Value::as_str)
                    .unwrap_or("playback error")
                    .to_string(),
            )),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(unix)]
mod imp {
    use std::fs;
    use std::io::{BufRead, BufReader, Write};
    use std::net::Shutdown;
    use std::os::unix::net::UnixStream;
    use std::path::PathBuf;
    use std::process::{Child, Command, Stdio};
    use std::sync::mpsc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use anyhow::{Context, Result, anyhow};
    use serde_json::json;

    use super::{MediaEvent, OBSERVED_PROPERTIES, parse_mpv_message};

    const CONNECT_ATTEMPTS: usize = 50;
    const CONNECT_DELAY: Duration = Duration::from_millis(40);

    pub(crate) struct MpvProcess {
        bin: PathBuf,
        socket_path: PathBuf,
        child: Option<Child>,
        ipc: Option<UnixStream>,
        events_rx: Option<mpsc::Receiver<MediaEvent>>,
        reader: Option<JoinHandle<()>>,
    }

    impl MpvProcess {
        pub(crate) fn new(bin: PathBuf) -> Self {
            let socket_path =
                std::env::temp_dir().join(format!("podshelf-mpv-{}.sock", std::process::id()));
            Self {
                bin,
                socket_path,
                child: None,
                ipc: None,
                events_rx: None,
                reader: None,
            }
        }

        pub(crate) fn spawn(&mut self, url: &str, start_at: f64) -> Result<()> {
            self.shutdown();
            // Stale socket from a previous crash.
            let _ = fs::remove_file(&self.socket_path);

            let mut cmd = Command::new(&self.bin);
            cmd.args(["--no-video", "--no-terminal", "--keep-open=yes", "--idle=no"])
                .arg(format!("--input-ipc-server={}", self.socket_path.display()))
                .arg(format!("--start={start_at:.3}"))
                .arg(url)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());

            let child = cmd.spawn().map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    anyhow!(
                        "{} not found. Install mpv or set PODSHELF_MPV_BIN",
                        self.bin.display()
                    )
                } else {
                    anyhow!(err).context(format!("failed to spawn {}", self.bin.display()))
                }
            })?;
            self.child = Some(child);

            if let Err(err) = self.attach() {
                self.shutdown();
                return Err(err);
            }
            Ok(())
        }

        /// Connects to the IPC socket of the freshly spawned child and starts
        /// observing playback properties.
        fn attach(&mut self) -> Result<()> {
            let stream = self.connect()?;
            let reader_stream = stream
                .try_clone()
                .context("failed to clone mpv IPC socket")?;
            let (tx, rx) = mpsc::channel::<MediaEvent>();
            let reader = thread::spawn(move || {
                for line in BufReader::new(reader_stream).lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    if let Some(event) = parse_mpv_message(&line)
                        && tx.send(event).is_err()
                    {
                        break;
                    }
                }
            });

            self.ipc = Some(stream);
            self.events_rx = Some(rx);
            self.reader = Some(reader);

            for (id, name) in OBSERVED_PROPERTIES.iter().enumerate() {
                self.send(json!({ "command": ["observe_property", id + 1, name] }))?;
            }
            Ok(())
        }

        fn connect(&self) -> Result<UnixStream> {
            let mut last_err = None;
            for _ in 0..CONNECT_ATTEMPTS {
                match UnixStream::connect(&self.socket_path) {
                    Ok(stream) => return Ok(stream),
                    Err(err) => last_err = Some(err),
                }
                thread::sleep(CONNECT_DELAY);
            }
            Err(anyhow!(
                "mpv IPC socket {} never came up: {}",
                self.socket_path.display(),
                last_err.map(|err| err.to_string()).unwrap_or_default()
            ))
        }

        pub(crate) fn send(&mut self, command: serde_json::Value) -> Result<()> {
            let stream = self.ipc.as_mut().context("mpv is not running")?;
            let mut line = command.to_string();
            line.push('\n');
            stream
                .write_all(line.as_bytes())
                .context("failed to send command to mpv")
        }

        pub(crate) fn drain_events(&mut self) -> Vec<MediaEvent> {
            let mut events = match &self.events_rx {
                Some(rx) => rx.try_iter().collect::<Vec<_>>(),
                None => Vec::new(),
            };

            if let Some(child) = self.child.as_mut()
                && let Ok(Some(status)) = child.try_wait()
            {
                self.child = None;
                if !status.success() {
                    events.push(MediaEvent::Failed(format!("mpv exited with {status}")));
                }
            }
            events
        }

        pub(crate) fn shutdown(&mut self) {
            if let Some(stream) = self.ipc.take() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            self.events_rx = None;
            if let Some(mut child) = self.child.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
            if let Some(handle) = self.reader.take() {
                let _ = handle.join();
            }
            let _ = fs::remove_file(&self.socket_path);
        }
    }

}

/// Plays audio through an external `mpv`, driven over its JSON IPC socket.
pub(crate) struct MpvBackend {
    #[cfg(unix)]
    process: imp::MpvProcess,
    #[cfg(not(unix))]
    bin: PathBuf,
}

impl MpvBackend {
    pub(crate) fn new(bin: PathBuf) -> Self {
        Self {
            #[cfg(unix)]
            process: imp::MpvProcess::new(bin),
            #[cfg(not(unix))]
            bin,
        }
    }
}

#[cfg(unix)]
impl MediaBackend for MpvBackend {
    fn load(&mut self, url: &str, start_at: f64) -> Result<()> {
        self.process.spawn(url, start_at)
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.process
            .send(serde_json::json!({ "command": ["set_property", "pause", paused] }))
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        self.process
            .send(serde_json::json!({ "command": ["seek", seconds, "absolute"] }))
    }

    fn stop(&mut self) -> Result<()> {
        self.process.shutdown();
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        self.process.drain_events()
    }
}

#[cfg(not(unix))]
impl MediaBackend for MpvBackend {
    fn load(&mut self, _url: &str, _start_at: f64) -> Result<()> {
        anyhow::bail!(
            "{} playback needs a Unix IPC socket on this platform",
            self.bin.display()
        )
    }

    fn set_paused(&mut self, _paused: bool) -> Result<()> {
        Ok(())
    }

    fn seek(&mut self, _seconds: f64) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        Vec::new()
    }
}

impl Drop for MpvBackend {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
