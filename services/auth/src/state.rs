use crate::domain::repository::{CodeDelivery, UserRepository, VerificationCodeStore};
use crate::infra::clock::SystemClock;
use crate::infra::db::DbUserRepository;
use crate::infra::delivery::ChannelDelivery;
use crate::infra::store::CodeStore;
use crate::usecase::verification::{IssueCodeUseCase, ValidateCodeUseCase};

/// Shared application state passed to every handler via axum `State`.
///
/// Generic over its ports; the service binary runs on the defaults.
#[derive(Clone)]
pub struct AppState<U = DbUserRepository, S = CodeStore, D = ChannelDelivery> {
    pub users: U,
    pub codes: S,
    pub delivery: D,
    /// Echo issued codes back to the caller (development only).
    pub expose_codes: bool,
}

impl<U, S, D> AppState<U, S, D>
where
    U: UserRepository + Clone,
    S: VerificationCodeStore + Clone,
    D: CodeDelivery + Clone,
{
    pub fn user_repo(&self) -> U {
        self.users.clone()
    }

    pub fn code_store(&self) -> S {
        self.codes.clone()
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    pub fn issuer(&self) -> IssueCodeUseCase<S, D, SystemClock> {
        IssueCodeUseCase {
            codes: self.code_store(),
            delivery: self.delivery.clone(),
            clock: self.clock(),
        }
    }

    pub fn validator(&self) -> ValidateCodeUseCase<S, SystemClock> {
        ValidateCodeUseCase {
            codes: self.code_store(),
            clock: self.clock(),
        }
    }
}
