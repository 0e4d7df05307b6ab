pub mod clubs;
pub mod competitions;
pub mod payments;
pub mod registrations;
pub mod users;

use fedportal_sdk::objects::{
    CompetitionStatus as SdkCompetitionStatus, PaymentPurpose as SdkPaymentPurpose,
    PaymentStatus as SdkPaymentStatus, RegistrationKind as SdkRegistrationKind,
};

/// Payment status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `fedportal_sdk::objects::PaymentStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "payment_status")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Expired,
    Cancelled,
}

impl From<PaymentStatus> for SdkPaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => SdkPaymentStatus::Pending,
            PaymentStatus::Processing => SdkPaymentStatus::Processing,
            PaymentStatus::Success => SdkPaymentStatus::Success,
            PaymentStatus::Failed => SdkPaymentStatus::Failed,
            PaymentStatus::Expired => SdkPaymentStatus::Expired,
            PaymentStatus::Cancelled => SdkPaymentStatus::Cancelled,
        }
    }
}

impl From<SdkPaymentStatus> for PaymentStatus {
    fn from(value: SdkPaymentStatus) -> Self {
        match value {
            SdkPaymentStatus::Pending => PaymentStatus::Pending,
            SdkPaymentStatus::Processing => PaymentStatus::Processing,
            SdkPaymentStatus::Success => PaymentStatus::Success,
            SdkPaymentStatus::Failed => PaymentStatus::Failed,
            SdkPaymentStatus::Expired => PaymentStatus::Expired,
            SdkPaymentStatus::Cancelled => PaymentStatus::Cancelled,
        }
    }
}

/// Payment purpose for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "payment_purpose")]
pub enum PaymentPurpose {
    Membership,
    Competition,
}

impl From<PaymentPurpose> for SdkPaymentPurpose {
    fn from(value: PaymentPurpose) -> Self {
        match value {
            PaymentPurpose::Membership => SdkPaymentPurpose::Membership,
            PaymentPurpose::Competition => SdkPaymentPurpose::Competition,
        }
    }
}

impl From<SdkPaymentPurpose> for PaymentPurpose {
    fn from(value: SdkPaymentPurpose) -> Self {
        match value {
            SdkPaymentPurpose::Membership => PaymentPurpose::Membership,
            SdkPaymentPurpose::Competition => PaymentPurpose::Competition,
        }
    }
}

/// Registration kind for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "registration_kind")]
pub enum RegistrationKind {
    Preliminary,
    Individual,
}

impl From<RegistrationKind> for SdkRegistrationKind {
    fn from(value: RegistrationKind) -> Self {
        match value {
            RegistrationKind::Preliminary => SdkRegistrationKind::Preliminary,
            RegistrationKind::Individual => SdkRegistrationKind::Individual,
        }
    }
}

impl From<SdkRegistrationKind> for RegistrationKind {
    fn from(value: SdkRegistrationKind) -> Self {
        match value {
            SdkRegistrationKind::Preliminary => RegistrationKind::Preliminary,
            SdkRegistrationKind::Individual => RegistrationKind::Individual,
        }
    }
}

/// Competition status for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "competition_status")]
pub enum CompetitionStatus {
    Draft,
    Open,
    Closed,
    Finished,
}

impl From<CompetitionStatus> for SdkCompetitionStatus {
    fn from(value: CompetitionStatus) -> Self {
        match value {
            CompetitionStatus::Draft => SdkCompetitionStatus::Draft,
            CompetitionStatus::Open => SdkCompetitionStatus::Open,
            CompetitionStatus::Closed => SdkCompetitionStatus::Closed,
            CompetitionStatus::Finished => SdkCompetitionStatus::Finished,
        }
    }
}

impl From<SdkCompetitionStatus> for CompetitionStatus {
    fn from(value: SdkCompetitionStatus) -> Self {
        match value {
            SdkCompetitionStatus::Draft => CompetitionStatus::Draft,
            SdkCompetitionStatus::Open => CompetitionStatus::Open,
            SdkCompetitionStatus::Closed => CompetitionStatus::Closed,
            SdkCompetitionStatus::Finished => CompetitionStatus::Finished,
        }
    }
}

/// Federation role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "user_role")]
pub enum UserRole {
    Member,
    ClubManager,
    Admin,
}
