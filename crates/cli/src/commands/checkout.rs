//! Checkout command.

use clap::Args;
use farmstand_storefront::AppError;
use farmstand_storefront::auth::Verification;
use secrecy::SecretString;

use super::State;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Confirm with this PIN instead of biometrics
    #[arg(long)]
    pin: Option<String>,
}

pub async fn run(state: &State, args: CheckoutArgs) -> Result<(), AppError> {
    let verification = match args.pin {
        Some(pin) => Verification::Pin(SecretString::from(pin)),
        None => Verification::Biometric,
    };

    let order = state.checkout(&verification).await?;
    tracing::info!(
        id = %order.id,
        items = order.item_count(),
        total = %order.total_amount,
        deliver_to = order.delivery_address.as_deref().unwrap_or("-"),
        "Order placed"
    );
    Ok(())
}
