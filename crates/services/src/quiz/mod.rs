mod progress;
mod session;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use progress::QuizProgress;
pub use session::{Advance, Phase, QuizSession, Submission};
pub use workflow::{ChoiceOutcome, QuizLoopService, StepOutcome};
