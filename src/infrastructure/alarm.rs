// Audible alarm for a headless terminal
use crate::application::render_surface::{AlarmError, AlarmSink};
use std::io::Write;

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AlarmSink for TerminalBell {
    fn play(&mut self) -> Result<(), AlarmError> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}
