//! Sign-up, sign-in, sign-out and email verification.
//!
//! # Flows
//!
//! ```text
//! SignUp ─→ AccountCreated ─→ ProfileCreated ─→ SignUpCompleted
//! SignIn ─→ Authenticated ─┬→ SignedIn              (verified)
//!                          └→ VerificationRequired  (unverified)
//! SignOut ─→ SignedOut
//! ApplyVerificationCode ─→ EmailVerified
//! ResendVerification ─→ VerificationResent
//! ```
//!
//! Any step may end in `Failed`. Failures are always delivered through an
//! effect so a caller waiting on the store sees them.

use crate::actions::AuthAction;
use crate::config::AuthConfig;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{EmailProvider, IdentityProvider, ProfileRepository, RateLimiter, SessionStore};
use crate::state::{Account, AuthState, Session, SessionId, UserProfile};
use crate::utils::{validate_email, validate_password};
use event_vibe_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::marker::PhantomData;

/// Authentication reducer.
#[derive(Debug, Clone)]
pub struct AuthReducer<I, P, E, S, RL> {
    config: AuthConfig,
    _phantom: PhantomData<fn() -> (I, P, E, S, RL)>,
}

impl<I, P, E, S, RL> AuthReducer<I, P, E, S, RL> {
    /// Create a reducer with the given settings.
    #[must_use]
    pub const fn new(config: AuthConfig) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    /// The settings in use.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl<I, P, E, S, RL> Default for AuthReducer<I, P, E, S, RL> {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}

fn fail(error: AuthError) -> SmallVec<[Effect<AuthAction>; 4]> {
    smallvec![Effect::future(async move { Some(AuthAction::Failed { error }) })]
}

/// Issue a fresh code for `account` and mail the link.
async fn send_verification<I, E>(identity: &I, email: &E, config: &AuthConfig, account: &Account) -> Result<()>
where
    I: IdentityProvider,
    E: EmailProvider,
{
    let code = identity.issue_verification_code(account.uid).await?;
    let link = config.verification_link(&code);
    email.send_verification_email(&account.email, &link).await
}

impl<I, P, E, S, RL> Reducer for AuthReducer<I, P, E, S, RL>
where
    I: IdentityProvider + Clone + 'static,
    P: ProfileRepository + Clone + 'static,
    E: EmailProvider + Clone + 'static,
    S: SessionStore + Clone + 'static,
    RL: RateLimiter + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<I, P, E, S, RL>;

    #[allow(clippy::too_many_lines)] // One arm per flow step
    fn reduce(
        &self,
        state: &mut AuthState,
        action: AuthAction,
        env: &AuthEnvironment<I, P, E, S, RL>,
    ) -> SmallVec<[Effect<AuthAction>; 4]> {
        if action.is_terminal() {
            state.outcome = action.outcome();
            return smallvec![Effect::None];
        }

        match action {
            // ═══════════════════════════════════════════════════════════════
            // SignUp: validate, then create the identity account
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SignUp {
                email,
                password,
                name,
                role,
                location,
            } => {
                state.outcome = None;
                let email = match validate_email(&email) {
                    Ok(email) => email,
                    Err(error) => return fail(error),
                };
                state.email = Some(email.clone());

                if let Err(error) = validate_password(&password) {
                    return fail(error);
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    return fail(AuthError::InvalidInput("Name is required".into()));
                }
                let location = location.trim().to_string();
                if location.is_empty() {
                    return fail(AuthError::InvalidInput("Location is required".into()));
                }

                let identity = env.identity.clone();
                smallvec![Effect::future(async move {
                    match identity.create_account(&email, &password, &name).await {
                        Ok(account) => {
                            tracing::info!(uid = %account.uid, role = role.as_str(), "Account created");
                            Some(AuthAction::AccountCreated {
                                account,
                                role,
                                location,
                            })
                        }
                        Err(error) => {
                            tracing::info!(error = %error, "Sign-up rejected");
                            Some(AuthAction::Failed { error })
                        }
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // AccountCreated: write the profile document
            // ═══════════════════════════════════════════════════════════════
            AuthAction::AccountCreated {
                account,
                role,
                location,
            } => {
                let profile = UserProfile {
                    uid: account.uid,
                    email: account.email,
                    name: account.display_name,
                    role,
                    location,
                    created_at: env.clock.now(),
                };
                let profiles = env.profiles.clone();
                smallvec![Effect::future(async move {
                    match profiles.create_profile(&profile).await {
                        Ok(()) => Some(AuthAction::ProfileCreated { profile }),
                        Err(error) => {
                            tracing::error!(uid = %profile.uid, error = %error, "Failed to write profile");
                            Some(AuthAction::Failed { error })
                        }
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // ProfileCreated: send the verification email, stay signed out
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ProfileCreated { profile } => {
                let identity = env.identity.clone();
                let email = env.email.clone();
                let config = self.config.clone();
                let account = Account {
                    uid: profile.uid,
                    email: profile.email.clone(),
                    display_name: profile.name.clone(),
                    email_verified: false,
                };
                smallvec![Effect::future(async move {
                    // The user can ask for another email from the verify page.
                    if let Err(error) = send_verification(&identity, &email, &config, &account).await {
                        tracing::warn!(uid = %account.uid, error = %error, "Verification email not sent");
                    }
                    Some(AuthAction::SignUpCompleted { profile })
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // SignIn: check credentials
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SignIn { email, password } => {
                state.outcome = None;
                let email = match validate_email(&email) {
                    Ok(email) => email,
                    Err(error) => return fail(error),
                };
                state.email = Some(email.clone());
                if password.is_empty() {
                    return fail(AuthError::InvalidCredentials);
                }

                let identity = env.identity.clone();
                smallvec![Effect::future(async move {
                    match identity.authenticate(&email, &password).await {
                        Ok(account) => Some(AuthAction::Authenticated { account }),
                        Err(error) => Some(AuthAction::Failed { error }),
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // Authenticated: unverified → resend; verified → session
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Authenticated { account } => {
                state.email = Some(account.email.clone());

                if !account.email_verified {
                    let identity = env.identity.clone();
                    let email = env.email.clone();
                    let config = self.config.clone();
                    return smallvec![Effect::future(async move {
                        if let Err(error) = send_verification(&identity, &email, &config, &account).await {
                            tracing::warn!(uid = %account.uid, error = %error, "Verification email not sent");
                        }
                        tracing::info!(uid = %account.uid, "Sign-in refused until email is verified");
                        Some(AuthAction::VerificationRequired { email: account.email })
                    })];
                }

                let profiles = env.profiles.clone();
                let sessions = env.sessions.clone();
                let now = env.clock.now();
                let ttl = self.config.session_ttl;
                smallvec![Effect::future(async move {
                    let profile = match profiles.get_profile(account.uid).await {
                        Ok(Some(profile)) => profile,
                        Ok(None) => {
                            tracing::error!(uid = %account.uid, "Verified account has no profile");
                            return Some(AuthAction::Failed {
                                error: AuthError::ProfileNotFound,
                            });
                        }
                        Err(error) => return Some(AuthAction::Failed { error }),
                    };

                    let Some(expires_at) = now.checked_add_signed(ttl) else {
                        return Some(AuthAction::Failed {
                            error: AuthError::InternalError("Session lifetime out of range".into()),
                        });
                    };
                    let session = Session {
                        session_id: SessionId::new(),
                        user_id: account.uid,
                        email: account.email,
                        created_at: now,
                        expires_at,
                    };
                    match sessions.create_session(&session, ttl).await {
                        Ok(()) => {
                            tracing::info!(uid = %session.user_id, role = profile.role.as_str(), "Signed in");
                            Some(AuthAction::SignedIn { session, profile })
                        }
                        Err(error) => Some(AuthAction::Failed { error }),
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // SignOut: idempotent delete
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SignOut { session_id } => {
                state.outcome = None;
                let sessions = env.sessions.clone();
                smallvec![Effect::future(async move {
                    match sessions.delete_session(session_id).await {
                        Ok(()) => Some(AuthAction::SignedOut),
                        Err(error) => Some(AuthAction::Failed { error }),
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // ApplyVerificationCode: consume the code
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ApplyVerificationCode { code } => {
                state.outcome = None;
                let code = code.trim().to_string();
                if code.is_empty() {
                    return fail(AuthError::VerificationCodeInvalid);
                }

                let identity = env.identity.clone();
                smallvec![Effect::future(async move {
                    match identity.apply_verification_code(&code).await {
                        Ok(uid) => {
                            tracing::info!(uid = %uid, "Email verified");
                            Some(AuthAction::EmailVerified { uid })
                        }
                        Err(error) => Some(AuthAction::Failed { error }),
                    }
                })]
            }

            // ═══════════════════════════════════════════════════════════════
            // ResendVerification: rate limited, answer never varies
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ResendVerification { email } => {
                state.outcome = None;
                let email = match validate_email(&email) {
                    Ok(email) => email,
                    Err(error) => return fail(error),
                };
                state.email = Some(email.clone());

                let identity = env.identity.clone();
                let email_provider = env.email.clone();
                let rate_limiter = env.rate_limiter.clone();
                let config = self.config.clone();
                smallvec![Effect::future(async move {
                    let key = format!("resend_verification:{email}");
                    if let Err(error) = rate_limiter
                        .check_and_record(&key, config.resend_limit, config.resend_window)
                        .await
                    {
                        return Some(AuthAction::Failed { error });
                    }

                    match identity.find_account_by_email(&email).await {
                        Ok(Some(account)) if !account.email_verified => {
                            if let Err(error) =
                                send_verification(&identity, &email_provider, &config, &account).await
                            {
                                tracing::warn!(uid = %account.uid, error = %error, "Verification email not sent");
                            }
                        }
                        Ok(_) => {
                            tracing::debug!("Resend requested for unknown or verified account");
                        }
                        Err(error) => return Some(AuthAction::Failed { error }),
                    }
                    Some(AuthAction::VerificationResent)
                })]
            }

            // Terminal actions were handled above.
            _ => smallvec![Effect::None],
        }
    }
}
