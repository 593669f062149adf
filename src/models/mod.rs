pub mod deck;
pub mod flashcard;
pub mod review_state;
pub mod session_card;
pub mod sm2;
pub mod study_session;

pub use deck::{Deck, DeckSummary, validate_title};
pub use flashcard::{Flashcard, StoredCard};
pub use review_state::ReviewState;
pub use session_card::SessionCard;
pub use sm2::{Rating, ScheduleError, compute_next_review, is_due};
pub use study_session::{QueueMode, SessionError, StudySession};
