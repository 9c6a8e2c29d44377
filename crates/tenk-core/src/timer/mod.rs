mod pomodoro;
mod stopwatch;
mod ticker;

pub use pomodoro::{Pomodoro, PomodoroPhase, PomodoroPlan, PomodoroSession};
pub use stopwatch::{Stopwatch, StopwatchState};
pub use ticker::{TickControl, Ticker};
