//! Inbound and outbound shapes of lead data.
//!
//! Request bodies are deserialized leniently (every field optional) and then
//! checked by [`Validate`], so a missing required field is reported with the
//! same field-level detail as a length or range violation.

use crate::errors::{AppError, FieldError};
use crate::models::{FieldUpdate, Lead, LeadChanges, LeadFilter, NewLead};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

pub const NAME_MAX_LEN: usize = 255;
pub const JOB_TITLE_MAX_LEN: usize = 255;
pub const PHONE_NUMBER_MAX_LEN: usize = 50;
pub const COMPANY_MAX_LEN: usize = 255;
pub const EMAIL_MAX_LEN: usize = 255;
pub const INDUSTRY_MAX_LEN: usize = 100;

/// Converts a parsed request body into its validated form.
pub trait Validate {
    type Output;

    /// Checks every constraint, returning all violations found.
    fn validate(self) -> Result<Self::Output, Vec<FieldError>>;
}

/// Body of `POST /leads`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateLeadRequest {
    /// Required, 1-255 characters.
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
    /// Required, 1-255 characters.
    pub company: Option<String>,
    pub email: Option<String>,
    #[schema(minimum = 0)]
    pub headcount: Option<i64>,
    pub industry: Option<String>,
}

/// Body of `PUT /leads/{id}`. Omitted fields are left unchanged, `null` clears them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLeadRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub job_title: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone_number: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub company: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, minimum = 0)]
    pub headcount: FieldUpdate<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub industry: FieldUpdate<String>,
}

/// Lead as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: i64,
    pub name: String,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
    pub company: String,
    pub email: Option<String>,
    pub headcount: Option<i32>,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            job_title: lead.job_title,
            phone_number: lead.phone_number,
            company: lead.company,
            email: lead.email,
            headcount: lead.headcount,
            industry: lead.industry,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

/// Collects violations while a request is being checked.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn length(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(field, format!("must be at most {} characters", max));
        }
    }

    fn non_empty(&mut self, field: &str, value: &str, max: usize) {
        if value.is_empty() {
            self.fail(field, "must not be empty");
        } else {
            self.length(field, value, max);
        }
    }

    fn required(&mut self, field: &str, value: Option<String>, max: usize) -> String {
        match value {
            Some(value) => {
                self.non_empty(field, &value, max);
                value
            }
            None => {
                self.fail(field, "field required");
                String::new()
            }
        }
    }

    fn optional(&mut self, field: &str, value: Option<String>, max: usize) -> Option<String> {
        if let Some(value) = &value {
            self.length(field, value, max);
        }
        value
    }

    fn headcount(&mut self, value: i64) -> i32 {
        if value < 0 {
            self.fail("headcount", "must be greater than or equal to 0");
            return 0;
        }
        i32::try_from(value).unwrap_or_else(|_| {
            self.fail("headcount", format!("must be at most {}", i32::MAX));
            0
        })
    }

    /// Replaceable but never clearable field.
    fn replacement(
        &mut self,
        field: &str,
        value: FieldUpdate<String>,
        max: usize,
    ) -> Option<String> {
        match value {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Clear => {
                self.fail(field, "must not be null");
                None
            }
            FieldUpdate::Set(value) => {
                self.non_empty(field, &value, max);
                Some(value)
            }
        }
    }

    fn clearable(
        &mut self,
        field: &str,
        value: FieldUpdate<String>,
        max: usize,
    ) -> FieldUpdate<String> {
        if let FieldUpdate::Set(value) = &value {
            self.length(field, value, max);
        }
        value
    }

    fn finish<T>(self, output: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(output)
        } else {
            Err(self.errors)
        }
    }
}

impl Validate for CreateLeadRequest {
    type Output = NewLead;

    fn validate(self) -> Result<NewLead, Vec<FieldError>> {
        let mut check = Checker::default();
        let lead = NewLead {
            name: check.required("name", self.name, NAME_MAX_LEN),
            job_title: check.optional("job_title", self.job_title, JOB_TITLE_MAX_LEN),
            phone_number: check.optional(
                "phone_number",
                self.phone_number,
                PHONE_NUMBER_MAX_LEN,
            ),
            company: check.required("company", self.company, COMPANY_MAX_LEN),
            email: check.optional("email", self.email, EMAIL_MAX_LEN),
            headcount: self.headcount.map(|h| check.headcount(h)),
            industry: check.optional("industry", self.industry, INDUSTRY_MAX_LEN),
        };
        check.finish(lead)
    }
}

impl Validate for UpdateLeadRequest {
    type Output = LeadChanges;

    fn validate(self) -> Result<LeadChanges, Vec<FieldError>> {
        let mut check = Checker::default();
        let changes = LeadChanges {
            name: check.replacement("name", self.name, NAME_MAX_LEN),
            job_title: check.clearable("job_title", self.job_title, JOB_TITLE_MAX_LEN),
            phone_number: check.clearable(
                "phone_number",
                self.phone_number,
                PHONE_NUMBER_MAX_LEN,
            ),
            company: check.replacement("company", self.company, COMPANY_MAX_LEN),
            email: check.clearable("email", self.email, EMAIL_MAX_LEN),
            headcount: self.headcount.map(|h| check.headcount(h)),
            industry: check.clearable("industry", self.industry, INDUSTRY_MAX_LEN),
        };
        check.finish(changes)
    }
}

/// JSON body extractor that runs [`Validate`] before the handler is invoked.
///
/// Unreadable bodies become `AppError::BadRequest`, wrongly typed fields and
/// constraint violations become `AppError::Validation`.
pub struct ValidatedJson<T: Validate>(pub T::Output);

/// Maps a body rejection onto `AppError`, keeping transport statuses such as 413.
fn body_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::BytesRejection(inner) => {
            AppError::Rejected(inner.status(), inner.body_text())
        }
        other => AppError::BadRequest(other.body_text()),
    }
}

/// Names a deserialization failure after the JSON path it occurred at.
fn type_violation(err: serde_path_to_error::Error<serde_json::Error>) -> FieldError {
    let path = err.path().to_string();
    let field = if path == "." { "body".to_string() } else { path };
    FieldError::new(field, err.into_inner().to_string())
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: Validate + DeserializeOwned + Send,
    T::Output: Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        let payload: T = serde_path_to_error::deserialize(body)
            .map_err(|err| AppError::Validation(vec![type_violation(err)]))?;

        payload.validate().map(Self).map_err(AppError::Validation)
    }
}

/// Lead identifier from the URL path.
pub struct LeadId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for LeadId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(id))
    }
}

/// List filters from the query string.
pub struct LeadQuery(pub LeadFilter);

#[async_trait]
impl<S> FromRequestParts<S> for LeadQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(filter) = Query::<LeadFilter>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(filter))
    }
}
