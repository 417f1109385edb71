use url::form_urlencoded;
use uuid::Uuid;

use crate::domain::repository::{Clock, UserRepository, VerificationCodeStore};
use crate::domain::types::{
    DEFAULT_BIO, Identifier, MAX_NAME_LEN, Purpose, User, validate_code_format,
};
use crate::error::AuthServiceError;
use crate::usecase::verification::{ValidateCodeInput, ValidateCodeUseCase};

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// Generated avatar seeded by the display name.
pub fn avatar_url(seed: &str) -> String {
    format!("{AVATAR_BASE_URL}?seed={}", encode_uri_component(seed))
}

/// Percent-encoding with the same unreserved set as JavaScript's
/// `encodeURIComponent`: spaces become `%20` and `!'()~` stay literal.
fn encode_uri_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%7E", "~")
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub identifier: Identifier,
    pub code: String,
}

pub struct LoginUseCase<U, S, C>
where
    U: UserRepository,
    S: VerificationCodeStore,
    C: Clock,
{
    pub users: U,
    pub validator: ValidateCodeUseCase<S, C>,
}

impl<U, S, C> LoginUseCase<U, S, C>
where
    U: UserRepository,
    S: VerificationCodeStore,
    C: Clock,
{
    pub async fn execute(&self, input: LoginInput) -> Result<User, AuthServiceError> {
        validate_code_format(&input.code)?;

        // Unknown identifiers look exactly like a bad code and leave any stored code alone.
        let user = self
            .users
            .find_by_identifier(&input.identifier)
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        self.validator
            .require(&ValidateCodeInput {
                identifier: input.identifier,
                purpose: Purpose::Login,
                code: input.code,
            })
            .await?;

        Ok(user)
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub identifier: Identifier,
    pub code: String,
}

pub struct RegisterUseCase<U, S, C>
where
    U: UserRepository,
    S: VerificationCodeStore,
    C: Clock,
{
    pub users: U,
    pub validator: ValidateCodeUseCase<S, C>,
}

impl<U, S, C> RegisterUseCase<U, S, C>
where
    U: UserRepository,
    S: VerificationCodeStore,
    C: Clock,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, AuthServiceError> {
        let name = input.name.trim().to_owned();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(AuthServiceError::InvalidName);
        }
        validate_code_format(&input.code)?;

        // Checked before redemption so a taken identifier does not burn the code.
        if self
            .users
            .find_by_identifier(&input.identifier)
            .await?
            .is_some()
        {
            return Err(AuthServiceError::AlreadyRegistered);
        }

        self.validator
            .require(&ValidateCodeInput {
                identifier: input.identifier.clone(),
                purpose: Purpose::Register,
                code: input.code,
            })
            .await?;

        let now = self.validator.clock.now();
        let (email, phone) = match input.identifier {
            Identifier::Email(v) => (Some(v), None),
            Identifier::Sms(v) => (None, Some(v)),
        };
        let user = User {
            id: Uuid::new_v4(),
            avatar: avatar_url(&name),
            name,
            email,
            phone,
            bio: DEFAULT_BIO.to_owned(),
            created_at: now,
            updated_at: now,
        };

        // A concurrent registration for the same identifier surfaces as AlreadyRegistered.
        self.users.create(&user).await?;
        Ok(user)
    }
}

// ── Get user ─────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, id: Uuid) -> Result<User, AuthServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }
}
