//! Browsing through to a placed order.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use farmstand_core::{AddressDraft, BiometricKind, OrderStatus, Price, ProductId};
use farmstand_integration_tests::TestDevice;
use farmstand_storefront::CheckoutError;
use farmstand_storefront::auth::{SimulatedBiometrics, Verification};
use secrecy::SecretString;

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

#[tokio::test]
async fn test_browse_fill_cart_and_pay_with_pin() {
    let device = TestDevice::new().unwrap();
    let state = device.open_without_biometrics().await.unwrap();

    assert_eq!(
        state.catalog().categories(),
        ["All", "Vegetables", "Dairy & Eggs", "Pantry"]
    );
    let matches = state.catalog().filter("HONEY", "All");
    assert_eq!(matches.len(), 1);
    let honey = matches[0].clone();

    state.cart().add(honey.clone(), 1);
    state.cart().add(honey, 1);
    let eggs = state.catalog().get(&ProductId::new("eggs")).unwrap().clone();
    state.cart().add(eggs, 3);
    state.cart().set_quantity(&ProductId::new("eggs"), 0);
    assert_eq!(state.cart().total_items(), 2);
    assert_eq!(state.cart().total_price(), Price::from_cents(2400));

    state
        .addresses()
        .add(AddressDraft {
            street: "12 Barn Lane".to_owned(),
            city: "Hood River".to_owned(),
            state: "OR".to_owned(),
            country: "USA".to_owned(),
            zip_code: "97031".to_owned(),
            is_default: true,
        })
        .unwrap();

    state
        .auth()
        .login("ada@example.com", &secret("pw"))
        .await
        .unwrap();
    state
        .auth()
        .setup_pin(&secret("1357"), &secret("1357"))
        .await
        .unwrap();

    let order = state
        .checkout(&Verification::Pin(secret("1357")))
        .await
        .unwrap();
    assert!(order.id.as_str().starts_with("order_"));
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, Price::from_cents(2400));
    assert_eq!(order.item_count(), 2);
    assert_eq!(
        order.delivery_address.as_deref(),
        Some("12 Barn Lane, Hood River, OR 97031, USA")
    );
    state.flush().await;
    drop(state);

    let reopened = device.open_without_biometrics().await.unwrap();
    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.orders().orders(), vec![order]);
}

#[tokio::test]
async fn test_failed_biometrics_falls_back_to_pin() {
    let device = TestDevice::new().unwrap();
    let state = device
        .open(SimulatedBiometrics::accepting(BiometricKind::Fingerprint).then(true).then(false))
        .await
        .unwrap();

    state.auth().enable_biometrics().await.unwrap();
    state
        .auth()
        .setup_pin(&secret("2468"), &secret("2468"))
        .await
        .unwrap();
    let tomatoes = state
        .catalog()
        .get(&ProductId::new("tomatoes"))
        .unwrap()
        .clone();
    state.cart().add(tomatoes, 2);

    let err = state.checkout(&Verification::Biometric).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Verification(ref e) if e.is_verification_failure()
    ));
    assert_eq!(
        err.to_string(),
        "Biometric authentication failed. Please use your PIN."
    );
    assert_eq!(state.cart().total_items(), 2);

    let order = state
        .checkout(&Verification::Pin(secret("2468")))
        .await
        .unwrap();
    assert_eq!(order.total_amount, Price::from_cents(998));
    assert!(order.delivery_address.is_none());
    assert_eq!(
        state.auth().biometrics().prompts(),
        ["Set up fingerprint recognition", "Authenticate with fingerprint"]
    );
}

#[tokio::test]
async fn test_empty_cart_is_rejected_before_verification() {
    let device = TestDevice::new().unwrap();
    let state = device
        .open(SimulatedBiometrics::accepting(BiometricKind::Fingerprint))
        .await
        .unwrap();

    let err = state
        .checkout(&Verification::Pin(secret("9999")))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(state.auth().biometrics().prompts().is_empty());
    assert!(state.orders().orders().is_empty());
}
