/// What the monitor should do on the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// Run the per-particle correction pass
    pub check: bool,
    /// Run the read-only health sweep
    pub sweep: bool,
}

/// Decimates monitor work relative to the frame rate.
///
/// At 60 fps the default cadence corrects at 20 Hz and sweeps roughly every
/// five seconds.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    check_interval: u32,
    sweep_interval: u32,
    frame: u32,
    acted: u32,
}

impl TickScheduler {
    pub fn new(check_interval: u32, sweep_interval: u32) -> Self {
        Self {
            check_interval: check_interval.max(1),
            sweep_interval: sweep_interval.max(1),
            frame: 0,
            acted: 0,
        }
    }

    /// Count one frame and report what runs on it
    pub fn advance(&mut self) -> Tick {
        self.frame = self.frame.wrapping_add(1);

        if self.frame % self.check_interval != 0 {
            return Tick::default();
        }

        self.acted = self.acted.wrapping_add(1);
        Tick {
            check: true,
            sweep: self.acted % self.sweep_interval == 0,
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.acted = 0;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn acted(&self) -> u32 {
        self.acted
    }
}
