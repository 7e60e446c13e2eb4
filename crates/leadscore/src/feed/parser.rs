use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::scoring::{Activity, ActivityMetadata, ActivityType, ContactId};

use super::ActivityImportError;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<Activity>, ActivityImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut activities = Vec::new();

    for (index, record) in csv_reader.deserialize::<FeedRow>().enumerate() {
        // Header occupies the first line of the export.
        let line = index + 2;
        let row = record?;
        activities.push(row.into_activity(line)?);
    }

    Ok(activities)
}

#[derive(Debug, Deserialize)]
struct FeedRow {
    #[serde(rename = "Type")]
    activity_type: String,
    #[serde(rename = "Action", default, deserialize_with = "empty_string_as_none")]
    action: Option<String>,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(
        rename = "Contact ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    contact_id: Option<String>,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(
        rename = "Cookie ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    cookie_id: Option<String>,
    #[serde(rename = "Page", default, deserialize_with = "empty_string_as_none")]
    page: Option<String>,
    #[serde(
        rename = "File Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    file_name: Option<String>,
    #[serde(
        rename = "Link URL",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    link_url: Option<String>,
    #[serde(rename = "Form ID", default, deserialize_with = "empty_string_as_none")]
    form_id: Option<String>,
    #[serde(
        rename = "Duration Seconds",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    duration_seconds: Option<String>,
    #[serde(
        rename = "Watch Seconds",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    watch_seconds: Option<String>,
    #[serde(
        rename = "Total Seconds",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    total_seconds: Option<String>,
}

impl FeedRow {
    fn into_activity(self, line: usize) -> Result<Activity, ActivityImportError> {
        let activity_type = ActivityType::from_label(&self.activity_type).ok_or_else(|| {
            ActivityImportError::Row {
                line,
                message: format!("unknown activity type '{}'", self.activity_type),
            }
        })?;

        let timestamp =
            parse_timestamp(&self.timestamp).ok_or_else(|| ActivityImportError::Row {
                line,
                message: format!("unparseable timestamp '{}'", self.timestamp),
            })?;

        let metadata = ActivityMetadata {
            page: self.page,
            file_name: self.file_name,
            link_url: self.link_url,
            form_id: self.form_id,
            duration_seconds: parse_seconds(self.duration_seconds.as_deref(), line)?,
            watch_duration_seconds: parse_seconds(self.watch_seconds.as_deref(), line)?,
            total_duration_seconds: parse_seconds(self.total_seconds.as_deref(), line)?,
        };

        Ok(Activity {
            activity_type,
            action: self
                .action
                .unwrap_or_else(|| activity_type.label().to_string()),
            timestamp,
            contact_id: self.contact_id.map(ContactId),
            email: self.email,
            cookie_id: self.cookie_id,
            metadata,
        })
    }
}

fn parse_seconds(value: Option<&str>, line: usize) -> Result<Option<u32>, ActivityImportError> {
    value
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| ActivityImportError::Row {
                line,
                message: format!("invalid duration '{raw}'"),
            })
        })
        .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_timestamp_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(value)
}
