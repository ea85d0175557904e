//! Register an order in the gateway test environment and check a callback.
//!
//! # Running
//!
//! ```bash
//! export SBER_USERNAME="your-api-user"
//! export SBER_PASSWORD="your-api-password"
//! cargo run --example register_order -- 10747 10.5
//! ```
//!
//! Outcomes are appended to `sberpay.log` in the working directory.

use sberpay::{
    CallbackVerifier, Credentials, LogConfig, OrderRegistrar, RegisterOrderResponse,
    SberpayConfig, SberpayError,
};

// Gateway test key shipped with the crate's fixtures. Replace with the key
// published in your merchant cabinet.
const GATEWAY_PUBLIC_KEY: &str = include_str!("../tests/fixtures/gateway_public.pem");

fn main() {
    let username = std::env::var("SBER_USERNAME").expect("Set SBER_USERNAME environment variable");
    let password = std::env::var("SBER_PASSWORD").expect("Set SBER_PASSWORD environment variable");

    let mut args = std::env::args().skip(1);
    let order_number = args.next().unwrap_or_else(|| "10747".to_string());
    let amount: f64 = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(10.5);

    let config = SberpayConfig::new(Credentials::new(username, password))
        .with_log(LogConfig::new("sberpay.log"));

    let registrar = match OrderRegistrar::new(config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    match registrar.register_order(
        &order_number,
        amount,
        "https://shop.example/paid",
        "https://shop.example/failed",
    ) {
        Ok(body) => match RegisterOrderResponse::from_value(&body) {
            Ok(response) if response.is_success() => {
                println!("✓ Order registered");
                println!("  Gateway order id: {:?}", response.order_id);
                println!("  Payment page: {:?}", response.form_url);
            }
            Ok(response) => {
                println!("✗ Gateway refused the order");
                println!("  {:?}: {:?}", response.error_code, response.error_message);
            }
            Err(e) => eprintln!("Unexpected response {}: {}", body, e),
        },
        Err(SberpayError::Transport(e)) => {
            eprintln!("Network error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Registration error: {}", e);
            std::process::exit(1);
        }
    }

    // A callback the gateway would send once the customer pays
    let callback = "mdOrder=6d7dd3386fe&operation=deposited&orderNumber=10747&status=1&checksum=00";
    let verifier = match CallbackVerifier::from_pem(GATEWAY_PUBLIC_KEY) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Bad gateway key: {}", e);
            std::process::exit(1);
        }
    };

    match verifier.verify_query(callback) {
        Ok(true) => println!("✓ Callback authentic"),
        Ok(false) => println!("✗ Callback checksum mismatch, ignoring"),
        Err(e) => eprintln!("Malformed callback: {}", e),
    }
}
