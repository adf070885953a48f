mod answer;
mod design;
mod ids;
mod question;
mod quiz;
mod user;

pub use ids::{AnswerId, DesignId, ParseIdError, QuestionId, QuizId, SubjectId, UserId};

pub use answer::{Answer, latest_answer};
pub use design::{DesignError, QuizDesign, QuizDesignSubject};
pub use question::{FormattedText, GeneratedQuestion, Question};
pub use quiz::Quiz;
pub use user::{User, UserError};
