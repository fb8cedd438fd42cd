/// Identifies one started countdown. Ticks carrying an older token are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome
{
    Stale,
    Running { remaining: u32 },
    Expired,
}

/// One-second countdown for the active round. Starting a new countdown
/// replaces the previous one, so at most one is ever live.
#[derive(Debug, Default)]
pub struct RoundTimer
{
    generation: u64,
    active: bool,
    remaining: u32,
}

impl RoundTimer
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn start(&mut self, seconds: u32) -> TimerToken
    {
        self.cancel();
        self.active = true;
        self.remaining = seconds;
        TimerToken(self.generation)
    }

    pub fn cancel(&mut self)
    {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool
    {
        self.active
    }

    #[cfg(test)]
    pub fn remaining(&self) -> u32
    {
        self.remaining
    }

    pub fn token(&self) -> Option<TimerToken>
    {
        self.active.then_some(TimerToken(self.generation))
    }

    /// Counts one elapsed second. Expiry deactivates the timer.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome
    {
        if !self.active || token.0 != self.generation {
            return TickOutcome::Stale;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.cancel();
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining: self.remaining,
        }
    }
}
