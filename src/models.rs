use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::FromRow;
use utoipa::IntoParams;

// ============ Database Models ============

/// A sales prospect as stored in the `leads` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Lead {
    /// Store-assigned identifier, never reused.
    pub id: i64,
    /// Contact name.
    pub name: String,
    /// Job title of the contact.
    pub job_title: Option<String>,
    /// Free-form phone number.
    pub phone_number: Option<String>,
    /// Company the contact works for.
    pub company: String,
    /// Contact email.
    pub email: Option<String>,
    /// Company headcount, never negative.
    pub headcount: Option<i32>,
    /// Industry sector.
    pub industry: Option<String>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update, `None` until the lead is first modified.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated fields for a lead about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
    pub company: String,
    pub email: Option<String>,
    pub headcount: Option<i32>,
    pub industry: Option<String>,
}

impl NewLead {
    /// Builds the stored record for this input.
    pub fn into_lead(self, id: i64, created_at: DateTime<Utc>) -> Lead {
        Lead {
            id,
            name: self.name,
            job_title: self.job_title,
            phone_number: self.phone_number,
            company: self.company,
            email: self.email,
            headcount: self.headcount,
            industry: self.industry,
            created_at,
            updated_at: None,
        }
    }
}

// ============ Partial Updates ============

/// Tri-state value of a field in a partial update.
///
/// In JSON an absent key is `Unchanged`, an explicit `null` is `Clear` and any
/// other value is `Set`. Fields using it need `#[serde(default)]` so that a
/// missing key falls back to `Unchanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// Converts the value while keeping the update state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::Unchanged => FieldUpdate::Unchanged,
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)),
        }
    }

    /// Writes the update into `slot`, leaving it alone when unchanged.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Clear => *slot = None,
            FieldUpdate::Set(value) => *slot = Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}

/// Validated partial update for an existing lead.
///
/// `name` and `company` can be replaced but never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChanges {
    pub name: Option<String>,
    pub job_title: FieldUpdate<String>,
    pub phone_number: FieldUpdate<String>,
    pub company: Option<String>,
    pub email: FieldUpdate<String>,
    pub headcount: FieldUpdate<i32>,
    pub industry: FieldUpdate<String>,
}

impl LeadChanges {
    /// True when the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.job_title.is_unchanged()
            && self.phone_number.is_unchanged()
            && self.email.is_unchanged()
            && self.headcount.is_unchanged()
            && self.industry.is_unchanged()
    }

    /// Applies the supplied fields to `lead` in place. Timestamps are left to the caller.
    pub fn apply(self, lead: &mut Lead) {
        if let Some(name) = self.name {
            lead.name = name;
        }
        if let Some(company) = self.company {
            lead.company = company;
        }
        self.job_title.apply_to(&mut lead.job_title);
        self.phone_number.apply_to(&mut lead.phone_number);
        self.email.apply_to(&mut lead.email);
        self.headcount.apply_to(&mut lead.headcount);
        self.industry.apply_to(&mut lead.industry);
    }
}

// ============ Query Parameters ============

/// Optional filters accepted by `GET /leads`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    /// Exact industry match. An empty value imposes no constraint.
    pub industry: Option<String>,
    /// Inclusive lower bound on headcount.
    pub headcount_min: Option<i64>,
    /// Inclusive upper bound on headcount.
    pub headcount_max: Option<i64>,
}

impl LeadFilter {
    /// Industry constraint, with blank values treated as absent.
    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref().filter(|i| !i.is_empty())
    }

    /// Whether `lead` satisfies every supplied filter.
    ///
    /// A lead without a headcount never satisfies a headcount bound.
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(industry) = self.industry() {
            if lead.industry.as_deref() != Some(industry) {
                return false;
            }
        }

        if self.headcount_min.is_none() && self.headcount_max.is_none() {
            return true;
        }

        let Some(headcount) = lead.headcount.map(i64::from) else {
            return false;
        };
        self.headcount_min.map_or(true, |min| headcount >= min)
            && self.headcount_max.map_or(true, |max| headcount <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn lead(industry: Option<&str>, headcount: Option<i32>) -> Lead {
        NewLead {
            name: "Jane Doe".to_string(),
            job_title: None,
            phone_number: None,
            company: "Acme".to_string(),
            email: None,
            headcount,
            industry: industry.map(str::to_string),
        }
        .into_lead(1, Utc::now())
    }

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default)]
        email: FieldUpdate<String>,
    }

    #[test]
    fn field_update_distinguishes_absent_null_and_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"email": null}"#).unwrap();
        let set: Probe = serde_json::from_str(r#"{"email": "a@b.co"}"#).unwrap();

        assert_eq!(absent.email, FieldUpdate::Unchanged);
        assert_eq!(null.email, FieldUpdate::Clear);
        assert_eq!(set.email, FieldUpdate::Set("a@b.co".to_string()));
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let mut target = lead(Some("Software"), Some(10));
        target.email = Some("jane@acme.io".to_string());

        let changes = LeadChanges {
            headcount: FieldUpdate::Set(25),
            email: FieldUpdate::Clear,
            ..LeadChanges::default()
        };
        changes.apply(&mut target);

        assert_eq!(target.headcount, Some(25));
        assert_eq!(target.email, None);
        assert_eq!(target.industry.as_deref(), Some("Software"));
        assert_eq!(target.name, "Jane Doe");
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(LeadChanges::default().is_empty());
        let changes = LeadChanges {
            industry: FieldUpdate::Clear,
            ..LeadChanges::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = LeadFilter {
            headcount_min: Some(10),
            headcount_max: Some(50),
            ..LeadFilter::default()
        };
        assert!(filter.matches(&lead(None, Some(10))));
        assert!(filter.matches(&lead(None, Some(50))));
        assert!(!filter.matches(&lead(None, Some(9))));
        assert!(!filter.matches(&lead(None, Some(51))));
        assert!(!filter.matches(&lead(None, None)));
    }

    #[test]
    fn filter_industry_is_exact_and_blank_is_ignored() {
        let software = LeadFilter {
            industry: Some("Software".to_string()),
            ..LeadFilter::default()
        };
        assert!(software.matches(&lead(Some("Software"), None)));
        assert!(!software.matches(&lead(Some("software"), None)));
        assert!(!software.matches(&lead(None, None)));

        let blank = LeadFilter {
            industry: Some(String::new()),
            ..LeadFilter::default()
        };
        assert!(blank.matches(&lead(None, None)));
    }
}
