//! Order registrar - the main client-facing API.
//!
//! The `OrderRegistrar` composes an [`AuthenticatedTransport`] with an
//! optional [`OutcomeLogger`] and turns an [`OrderRequest`] into a
//! `register.do` call.

use crate::client::http::{AuthenticatedTransport, Params};
use crate::config::{SberpayConfig, REGISTER_OPERATION};
use crate::logging::OutcomeLogger;
use crate::SberpayError;
use serde_json::Value;
use std::fmt;

/// Monetary amount in minor units (1/100 of the major unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount {
    minor: u64,
}

impl Amount {
    /// Amount already expressed in minor units.
    pub fn from_minor(minor: u64) -> Self {
        Self { minor }
    }

    /// Convert a major-unit amount, rounding to the nearest minor unit.
    ///
    /// # Errors
    /// `InvalidAmount` for negative, NaN, infinite or out-of-range values.
    pub fn from_major(major: f64) -> Result<Self, SberpayError> {
        if !major.is_finite() {
            return Err(SberpayError::InvalidAmount(format!("{} is not finite", major)));
        }
        if major < 0.0 {
            return Err(SberpayError::InvalidAmount(format!("{} is negative", major)));
        }

        let minor = (major * 100.0).round();
        if minor >= u64::MAX as f64 {
            return Err(SberpayError::InvalidAmount(format!("{} is too large", major)));
        }

        Ok(Self {
            minor: minor as u64,
        })
    }

    /// Value in minor units.
    pub fn minor_units(&self) -> u64 {
        self.minor
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, cents) = (self.minor / 100, self.minor % 100);
        match cents {
            0 => write!(f, "{}", major),
            c if c % 10 == 0 => write!(f, "{}.{}", major, c / 10),
            c => write!(f, "{}.{:02}", major, c),
        }
    }
}

/// Order registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Order number in the merchant's system.
    pub order_number: String,

    /// Amount to charge.
    pub amount: Amount,

    /// Redirect after successful payment.
    pub return_url: String,

    /// Redirect after failed payment.
    pub fail_url: String,

    /// Free-form order description shown on the payment page.
    pub description: Option<String>,
}

impl OrderRequest {
    /// Create a registration request.
    pub fn new(
        order_number: impl Into<String>,
        amount: Amount,
        return_url: impl Into<String>,
        fail_url: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            return_url: return_url.into(),
            fail_url: fail_url.into(),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Registers payment orders with the gateway.
pub struct OrderRegistrar {
    transport: AuthenticatedTransport,
    logger: OutcomeLogger,
    language: String,
}

impl OrderRegistrar {
    /// Create a registrar from config.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - HTTP client creation fails
    /// - The configured log file cannot be opened
    pub fn new(config: SberpayConfig) -> Result<Self, SberpayError> {
        config.validate()?;

        let transport = AuthenticatedTransport::new(&config)?;
        let logger = OutcomeLogger::from_config(config.log.as_ref())?;

        Ok(Self::from_parts(transport, logger, config.language))
    }

    /// Assemble a registrar from already built collaborators.
    pub fn from_parts(
        transport: AuthenticatedTransport,
        logger: OutcomeLogger,
        language: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            logger,
            language: language.into(),
        }
    }

    /// Build the `register.do` fields for an order, without credentials.
    pub fn build_payload(&self, order: &OrderRequest) -> Params {
        let mut payload = Params::new();
        payload.insert("orderNumber".to_string(), order.order_number.clone());
        payload.insert("amount".to_string(), order.amount.minor_units().to_string());
        payload.insert("returnUrl".to_string(), order.return_url.clone());
        payload.insert("failUrl".to_string(), order.fail_url.clone());
        payload.insert("language".to_string(), self.language.clone());
        if let Some(description) = &order.description {
            payload.insert("description".to_string(), description.clone());
        }
        payload
    }

    /// Register an order and return the gateway's JSON response unmodified.
    ///
    /// When outcome logging is configured, the result is logged first. A
    /// failed log write is reported through `tracing` and does not hide the
    /// gateway response.
    ///
    /// # Errors
    /// - `Transport` - network failure
    /// - `ProtocolError` - the response body is not JSON
    pub fn register(&self, order: &OrderRequest) -> Result<Value, SberpayError> {
        let payload = self.build_payload(order);
        let response = self.transport.post_operation(REGISTER_OPERATION, payload)?;
        let body = response.json()?;

        if self.logger.is_initialized() {
            let message = format!(
                "Order #{} registration for amount {}",
                order.order_number, order.amount
            );
            if let Err(e) = self.logger.log_outcome(&body, &message) {
                tracing::warn!(error = %e, order_number = %order.order_number, "failed to log registration outcome");
            }
        }

        Ok(body)
    }

    /// Register an order given a major-unit amount.
    pub fn register_order(
        &self,
        order_number: &str,
        amount: f64,
        return_url: &str,
        fail_url: &str,
    ) -> Result<Value, SberpayError> {
        let order = OrderRequest::new(order_number, Amount::from_major(amount)?, return_url, fail_url);
        self.register(&order)
    }

    /// The outcome logger.
    pub fn logger(&self) -> &OutcomeLogger {
        &self.logger
    }

    /// The authenticated transport.
    pub fn transport(&self) -> &AuthenticatedTransport {
        &self.transport
    }
}
