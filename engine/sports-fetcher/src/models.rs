use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `eventsround` response wrapper; the API sends `null` for an empty round
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Option<Vec<UpstreamEvent>>,
}

/// A single match event as published by the upstream API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamEvent {
    #[serde(rename = "idEvent", deserialize_with = "lenient_string")]
    pub id: String,

    /// Missing or blank on malformed events, which consumers skip
    #[serde(rename = "strHomeTeam", default, deserialize_with = "lenient_name")]
    pub home_team: Option<String>,

    #[serde(rename = "strAwayTeam", default, deserialize_with = "lenient_name")]
    pub away_team: Option<String>,

    #[serde(rename = "dateEvent", default)]
    pub date_event: Option<String>,

    #[serde(rename = "strTime", default)]
    pub time: Option<String>,

    #[serde(rename = "strVenue", default)]
    pub venue: Option<String>,

    #[serde(rename = "intRound", default, deserialize_with = "lenient_u32")]
    pub round: Option<u32>,

    #[serde(rename = "intHomeScore", default, deserialize_with = "lenient_u32")]
    pub home_score: Option<u32>,

    #[serde(rename = "intAwayScore", default, deserialize_with = "lenient_u32")]
    pub away_score: Option<u32>,
}

/// `lookuptable` response wrapper
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TableResponse {
    #[serde(default)]
    pub table: Option<Vec<UpstreamTableRow>>,
}

/// A league table row as published by the upstream API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamTableRow {
    #[serde(rename = "strTeam")]
    pub team: String,

    #[serde(rename = "intRank", default, deserialize_with = "lenient_u32")]
    pub rank: Option<u32>,

    #[serde(rename = "intPlayed", default, deserialize_with = "lenient_u32")]
    pub played: Option<u32>,

    #[serde(rename = "intWin", default, deserialize_with = "lenient_u32")]
    pub win: Option<u32>,

    #[serde(rename = "intDraw", default, deserialize_with = "lenient_u32")]
    pub draw: Option<u32>,

    #[serde(rename = "intLoss", default, deserialize_with = "lenient_u32")]
    pub loss: Option<u32>,

    #[serde(rename = "intGoalsFor", default, deserialize_with = "lenient_u32")]
    pub goals_for: Option<u32>,

    #[serde(rename = "intGoalsAgainst", default, deserialize_with = "lenient_u32")]
    pub goals_against: Option<u32>,

    #[serde(rename = "intPoints", default, deserialize_with = "lenient_u32")]
    pub points: Option<u32>,

    #[serde(rename = "strBadge", default)]
    pub badge: Option<String>,
}

/// Integers arrive as numbers, numeric strings, empty strings or null
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_with_string_scores() {
        let json = r#"{
            "idEvent": "1032723",
            "strHomeTeam": "Omonia",
            "strAwayTeam": "APOEL",
            "dateEvent": "2024-03-02",
            "strTime": "17:00:00",
            "strVenue": "GSP Stadium",
            "intRound": "26",
            "intHomeScore": "2",
            "intAwayScore": "1"
        }"#;

        let event: UpstreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.round, Some(26));
        assert_eq!(event.home_score, Some(2));
        assert_eq!(event.away_score, Some(1));
    }

    #[test]
    fn test_unplayed_event_has_no_scores() {
        let json = r#"{
            "idEvent": 99,
            "strHomeTeam": "AEK",
            "strAwayTeam": "Anorthosis",
            "dateEvent": "2024-04-20",
            "intRound": 30,
            "intHomeScore": null,
            "intAwayScore": ""
        }"#;

        let event: UpstreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "99");
        assert_eq!(event.round, Some(30));
        assert_eq!(event.home_score, None);
        assert_eq!(event.away_score, None);
        assert_eq!(event.venue, None);
    }

    #[test]
    fn test_event_without_teams_still_decodes() {
        let json = r#"{
            "idEvent": "1032800",
            "strAwayTeam": "  ",
            "dateEvent": "2024-03-02",
            "intRound": "26"
        }"#;

        let event: UpstreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "1032800");
        assert_eq!(event.home_team, None);
        assert_eq!(event.away_team, None);
    }

    #[test]
    fn test_null_events_is_empty_round() {
        let response: EventsResponse = serde_json::from_str(r#"{"events": null}"#).unwrap();
        assert!(response.events.is_none());
    }
}
