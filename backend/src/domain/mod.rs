//! Domain types and ports.
//!
//! Purpose: define the strongly typed entities, the token service, and the
//! store ports the HTTP adapter composes. Types here are transport
//! agnostic; serde attributes document the wire contract and nothing else.

pub mod error;
pub mod keyed_lock;
pub mod password;
pub mod ports;
pub mod response;
pub mod survey;
pub mod token;
pub mod user;

pub use self::error::{DomainError, ErrorCode};
pub use self::keyed_lock::KeyedLock;
pub use self::ports::{ResponseStore, StoreError, StoreResult, SurveyStore, UserStore};
pub use self::response::{Answer, AnswerValue, NewResponse, SurveyResponse};
pub use self::survey::{ActiveSurvey, NewSurvey, Question, QuestionKind, Survey, SurveyUpdate};
pub use self::token::{Claims, Identity, TokenError, TokenService, TOKEN_LIFETIME_HOURS};
pub use self::user::{NewUser, PublicUser, Role, User};
