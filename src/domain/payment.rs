use {
    super::error::LedgerError,
    super::money::Money,
    chrono::{DateTime, Utc},
    derive_more::Display,
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

/// Provider-issued checkout session identifier, the idempotency key.
/// Opaque on purpose: real sessions carry a `cs_` prefix but the format is
/// the provider's to change, so only emptiness is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, LedgerError> {
        let id = id.into();
        if id.is_empty() {
            return Err(LedgerError::Validation(
                "session id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = LedgerError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(LedgerError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// Outcome of the conditional write. Both arms are success; the split only
/// feeds the ack body and the log line.
#[derive(Debug)]
pub enum UpsertOutcome {
    /// First delivery for this session id inserted a row.
    Created(Uuid),
    /// Redelivery converged an existing row.
    Updated(Uuid),
}

/// Full payment row for the read side.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub session_id: SessionId,
    pub money: Money,
    pub status: PaymentStatus,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
}

/// For INSERT. The id is generated here via Uuid::now_v7().
#[derive(Debug, Clone)]
pub struct NewPayment {
    id: Uuid,
    session_id: SessionId,
    money: Money,
    status: PaymentStatus,
    customer_email: String,
}

pub struct NewPaymentParams {
    pub session_id: SessionId,
    pub money: Money,
    pub status: PaymentStatus,
    pub customer_email: String,
}

impl NewPayment {
    pub fn new(params: NewPaymentParams) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id: params.session_id,
            money: params.money,
            status: params.status,
            customer_email: params.customer_email,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn status(&self) -> &PaymentStatus {
        &self.status
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }
}
