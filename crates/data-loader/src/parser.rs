//! Parser for the persisted catalog files.
//!
//! The catalog is three JSON arrays:
//! - `users.json`: traveler profiles with travel history
//! - `destinations.json`: destinations merged with their sustainability record
//! - `activities.json`: activities keyed by destination
//!
//! Raw records are deserialized into lenient `Raw*` structs first and then
//! normalized into the domain types. In particular, list-ish fields
//! (`eco_certifications`, `interests`, transportation options) arrive from
//! upstream exports either as JSON arrays or as delimited strings; they are
//! normalized to `Vec<String>` here so nothing downstream ever branches on
//! the original representation.

use crate::error::{DataError, Result};
use crate::types::{Activity, Destination, SustainabilityMetrics, User};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A field that may be a JSON array of strings or a single delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    List(Vec<String>),
    Text(String),
}

/// A field that may be a JSON array of ids or a single delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdsOrText {
    List(Vec<u32>),
    Text(String),
}

/// Normalize a list-or-string field to a canonical ordered list of tags.
///
/// The literal "None" (any case) and empty entries are dropped; string input
/// is split on commas or semicolons.
fn normalize_tags(value: Option<StringOrList>) -> Vec<String> {
    let split_text = |text: &str| {
        text.split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
            .map(String::from)
            .collect()
    };

    match value {
        None => Vec::new(),
        Some(StringOrList::List(items)) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
            .map(String::from)
            .collect(),
        Some(StringOrList::Text(text)) => split_text(&text),
    }
}

/// Normalize a list-or-string id field.
fn normalize_ids(value: Option<IdsOrText>, field: &str) -> Result<Vec<u32>> {
    match value {
        None => Ok(Vec::new()),
        Some(IdsOrText::List(ids)) => Ok(ids),
        Some(IdsOrText::Text(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| DataError::InvalidValue {
                    field: field.to_string(),
                    value: token.to_string(),
                })
            })
            .collect(),
    }
}

/// Read a whole JSON array file into raw records.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound {
        path: path.display().to_string(),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| DataError::Parse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawUser {
    user_id: u32,
    age_group: String,
    #[serde(default)]
    interests: Option<StringOrList>,
    sustainability_preference: f32,
    travel_style: String,
    #[serde(default)]
    budget_level: Option<u8>,
    #[serde(default)]
    travel_history: Option<IdsOrText>,
}

/// Parse the users.json file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let raw: Vec<RawUser> = read_records(path)?;
    raw.into_iter()
        .map(|r| {
            Ok(User {
                id: r.user_id,
                age_group: r.age_group,
                interests: normalize_tags(r.interests),
                sustainability_preference: r.sustainability_preference,
                travel_style: r.travel_style,
                budget_level: r.budget_level.unwrap_or(3),
                travel_history: normalize_ids(r.travel_history, "travel_history")?,
            })
        })
        .collect()
}

// =============================================================================
// Destinations
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawDestination {
    destination_id: u32,
    name: String,
    country: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    climate: String,
    landscape_type: String,
    category: String,
    #[serde(default)]
    carbon_footprint_score: Option<f32>,
    #[serde(default)]
    water_consumption_score: Option<f32>,
    #[serde(default)]
    waste_management_score: Option<f32>,
    #[serde(default)]
    biodiversity_impact_score: Option<f32>,
    #[serde(default)]
    local_economy_support_score: Option<f32>,
    #[serde(default)]
    overall_sustainability_score: Option<f32>,
    #[serde(default, alias = "sustainable_transportation_options")]
    transportation_options: Option<StringOrList>,
    #[serde(default)]
    eco_certifications: Option<StringOrList>,
}

/// Parse the destinations.json file
pub fn parse_destinations(path: &Path) -> Result<Vec<Destination>> {
    let raw: Vec<RawDestination> = read_records(path)?;
    Ok(raw
        .into_iter()
        .map(|r| Destination {
            id: r.destination_id,
            name: r.name,
            country: r.country,
            region: r.region,
            climate: r.climate,
            landscape_type: r.landscape_type,
            category: r.category,
            metrics: SustainabilityMetrics {
                carbon_footprint: r.carbon_footprint_score,
                water_consumption: r.water_consumption_score,
                waste_management: r.waste_management_score,
                biodiversity_impact: r.biodiversity_impact_score,
                local_economy_support: r.local_economy_support_score,
            },
            overall_sustainability_score: r.overall_sustainability_score,
            transportation_options: normalize_tags(r.transportation_options),
            eco_certifications: normalize_tags(r.eco_certifications),
        })
        .collect())
}

// =============================================================================
// Activities
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawActivity {
    activity_id: u32,
    name: String,
    #[serde(default)]
    description: String,
    category: String,
    destination_id: u32,
    #[serde(default)]
    eco_friendliness: Option<f32>,
    #[serde(default)]
    environmental_impact_score: Option<f32>,
    #[serde(default)]
    local_community_benefit_score: Option<f32>,
}

/// Parse the activities.json file.
///
/// `eco_friendliness` may be stored directly, or derived from the raw impact
/// and community-benefit scores: the mean of inverted impact (10 - impact)
/// and benefit, which lands back on the 0-10 scale.
pub fn parse_activities(path: &Path) -> Result<Vec<Activity>> {
    let raw: Vec<RawActivity> = read_records(path)?;
    raw.into_iter()
        .map(|r| {
            let eco_friendliness = match (
                r.eco_friendliness,
                r.environmental_impact_score,
                r.local_community_benefit_score,
            ) {
                (Some(direct), _, _) => direct,
                (None, Some(impact), Some(benefit)) => ((10.0 - impact) + benefit) / 2.0,
                _ => {
                    return Err(DataError::Parse {
                        file: path.display().to_string(),
                        reason: format!(
                            "activity {} has neither eco_friendliness nor impact/benefit scores",
                            r.activity_id
                        ),
                    });
                }
            };
            Ok(Activity {
                id: r.activity_id,
                name: r.name,
                description: r.description,
                category: r.category,
                destination_id: r.destination_id,
                eco_friendliness,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_parse_users_with_string_lists() {
        let file = write_temp(
            r#"[{
                "user_id": 1,
                "age_group": "25-34",
                "interests": "Nature, Culture",
                "sustainability_preference": 8.5,
                "travel_style": "Eco-conscious",
                "budget_level": 2,
                "travel_history": "3, 7"
            }]"#,
        );

        let users = parse_users(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].interests, vec!["Nature", "Culture"]);
        assert_eq!(users[0].travel_history, vec![3, 7]);
    }

    #[test]
    fn test_parse_users_with_array_lists() {
        let file = write_temp(
            r#"[{
                "user_id": 2,
                "age_group": "35-44",
                "interests": ["Adventure"],
                "sustainability_preference": 5.0,
                "travel_style": "Budget",
                "travel_history": [1]
            }]"#,
        );

        let users = parse_users(file.path()).unwrap();
        assert_eq!(users[0].interests, vec!["Adventure"]);
        assert_eq!(users[0].travel_history, vec![1]);
        assert_eq!(users[0].budget_level, 3, "missing budget defaults to mid");
    }

    #[test]
    fn test_parse_destination_normalizes_certifications() {
        let file = write_temp(
            r#"[{
                "destination_id": 10,
                "name": "Costa Verde",
                "country": "Costa Rica",
                "landscape_type": "Forest",
                "category": "Nature",
                "carbon_footprint_score": 8.0,
                "water_consumption_score": 7.0,
                "eco_certifications": "Green Globe,EarthCheck",
                "sustainable_transportation_options": ["Bike Sharing"]
            }]"#,
        );

        let destinations = parse_destinations(file.path()).unwrap();
        let dest = &destinations[0];
        assert_eq!(dest.eco_certifications, vec!["Green Globe", "EarthCheck"]);
        assert_eq!(dest.transportation_options, vec!["Bike Sharing"]);
        assert_eq!(dest.metrics.carbon_footprint, Some(8.0));
        assert_eq!(dest.metrics.waste_management, None, "absent metric stays None");
    }

    #[test]
    fn test_parse_destination_treats_none_as_empty() {
        let file = write_temp(
            r#"[{
                "destination_id": 11,
                "name": "Gray Harbor",
                "country": "Norway",
                "landscape_type": "Coastal",
                "category": "Relaxation",
                "eco_certifications": "None"
            }]"#,
        );

        let destinations = parse_destinations(file.path()).unwrap();
        assert!(destinations[0].eco_certifications.is_empty());
    }

    #[test]
    fn test_parse_activity_derives_eco_friendliness() {
        let file = write_temp(
            r#"[{
                "activity_id": 1,
                "name": "Rainforest Walk",
                "category": "Nature",
                "destination_id": 10,
                "environmental_impact_score": 2.0,
                "local_community_benefit_score": 8.0
            }]"#,
        );

        let activities = parse_activities(file.path()).unwrap();
        // ((10 - 2) + 8) / 2 = 8.0
        assert!((activities[0].eco_friendliness - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_activity_without_scores_fails() {
        let file = write_temp(
            r#"[{
                "activity_id": 2,
                "name": "Mystery Tour",
                "category": "Adventure",
                "destination_id": 10
            }]"#,
        );

        let result = parse_activities(file.path());
        assert!(result.is_err(), "activity without any eco score should fail");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = parse_users(Path::new("/nonexistent/users.json"));
        assert!(matches!(result, Err(DataError::FileNotFound { .. })));
    }
}
