use anyhow::{Context, Result};
use api::{Detection, DetectionSource};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

/// Plays back a recorded session, one JSON detection per line, one line per poll.
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
}

impl ReplaySource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lines: None,
            line_no: 0,
        }
    }
}

impl DetectionSource for ReplaySource {
    fn initialize(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open replay file {:?}", self.path))?;
        self.lines = Some(BufReader::new(file).lines());
        self.line_no = 0;
        info!("Replaying detections from {:?}", self.path);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<Detection>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        for line in lines.by_ref() {
            self.line_no += 1;
            let line = line.context("Failed to read replay file")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Detection>(&line) {
                Ok(detection) => return Ok(Some(detection)),
                Err(e) => warn!("Skipping replay line {}: {}", self.line_no, e),
            }
        }

        info!("Replay finished after {} lines", self.line_no);
        self.lines = None;
        Ok(None)
    }

    fn unload(&mut self) {
        self.lines = None;
    }
}
