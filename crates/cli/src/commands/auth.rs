//! Sign-in, PIN and biometric setup commands.

use clap::Subcommand;
use farmstand_core::User;
use farmstand_storefront::AppError;
use farmstand_storefront::auth::{GateOutcome, SignupRequest};
use farmstand_storefront::error::{clear_sentry_user, set_sentry_user};
use secrecy::SecretString;

use super::State;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the session and unlock setup
    Status,
    /// Send a one-time code by SMS
    SendOtp {
        /// Phone number
        phone: String,
    },
    /// Check a one-time code
    VerifyOtp {
        /// Six-digit code
        code: String,
    },
    /// Choose the 4-digit unlock PIN
    SetupPin {
        pin: String,
        confirmation: String,
    },
    /// Use biometrics to unlock
    EnableBiometrics,
    /// Decline biometric unlock
    SkipBiometrics,
    /// Run the unlock gate
    Unlock {
        /// Unlock with this PIN instead of biometrics
        #[arg(long)]
        pin: Option<String>,
    },
}

pub async fn run(state: &State, action: AuthAction) -> Result<(), AppError> {
    let auth = state.auth();
    match action {
        AuthAction::Login { email, password } => {
            let user = auth.login(&email, &SecretString::from(password)).await?;
            signed_in(&user);
        }
        AuthAction::Signup {
            email,
            password,
            first_name,
            last_name,
            phone,
        } => {
            let user = auth
                .signup(SignupRequest {
                    email,
                    password: SecretString::from(password),
                    first_name,
                    last_name,
                    phone_number: phone,
                })
                .await?;
            signed_in(&user);
        }
        AuthAction::Logout => {
            auth.logout().await?;
            clear_sentry_user();
        }
        AuthAction::Status => {
            match auth.current_user() {
                Some(user) => log_user(&user),
                None => tracing::info!("Not signed in"),
            }
            let setup = auth.is_biometric_setup_complete().await;
            let availability = auth.check_biometric_availability().await;
            tracing::info!(
                pin_enabled = setup.pin_enabled,
                biometric_enabled = setup.biometric_enabled,
                biometric_available = availability.is_available,
                biometric_kind = %availability.kind,
                "Unlock setup"
            );
        }
        AuthAction::SendOtp { phone } => {
            auth.send_otp(&phone).await?;
            tracing::info!("Verification code sent to {phone}");
        }
        AuthAction::VerifyOtp { code } => {
            auth.verify_otp(&code).await?;
            tracing::info!("Phone number verified");
        }
        AuthAction::SetupPin { pin, confirmation } => {
            auth.setup_pin(&SecretString::from(pin), &SecretString::from(confirmation))
                .await?;
            tracing::info!("PIN saved");
        }
        AuthAction::EnableBiometrics => {
            let kind = auth.enable_biometrics().await?;
            tracing::info!("{} unlock enabled", kind.label());
        }
        AuthAction::SkipBiometrics => {
            auth.skip_biometrics().await?;
            tracing::info!("Biometric unlock skipped; the PIN will be used");
        }
        AuthAction::Unlock { pin: Some(pin) } => {
            let user = auth.unlock_with_pin(&SecretString::from(pin)).await?;
            signed_in(&user);
        }
        AuthAction::Unlock { pin: None } => match auth.authenticate_user().await? {
            GateOutcome::Biometric(user) => signed_in(&user),
            GateOutcome::PinRequired => {
                tracing::info!("Enter your PIN with `fs-cli auth unlock --pin <PIN>`");
            }
        },
    }
    Ok(())
}

fn signed_in(user: &User) {
    set_sentry_user(&user.id, Some(user.email.as_str()));
    log_user(user);
}

fn log_user(user: &User) {
    tracing::info!(
        id = %user.id,
        email = %user.email,
        role = %user.role,
        "Signed in as {}",
        user.display_name()
    );
}
