//! Raw wire types — serde shapes for deserializing EduSports API responses.
//! The backend is inconsistent about envelopes and field presence, so every
//! field is optional here; the mapping layer in client.rs produces the clean
//! domain types.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// List envelope normalization
// ---------------------------------------------------------------------------

/// List payloads arrive in three shapes depending on the endpoint:
/// `{ "data": [...] }`, `{ "content": [...] }` (paged endpoints), or a bare
/// array. All normalize to a flat `Vec<T>`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Data { data: Vec<T> },
    Content { content: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Data { data } => data,
            ListEnvelope::Content { content } => content,
            ListEnvelope::Plain(items) => items,
        }
    }
}

impl<T> Default for ListEnvelope<T> {
    fn default() -> Self {
        ListEnvelope::Plain(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournament {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "maxTeams")]
    pub max_teams: Option<u32>,
    #[serde(rename = "currentTeams")]
    pub current_teams: Option<u32>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>, // ISO 8601
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "winnerTeam")]
    pub winner_team: Option<WireTeam>,
    #[serde(rename = "runnerUpTeam")]
    pub runner_up_team: Option<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeam {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "registrationStatus")]
    pub registration_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Matches / bracket
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: Option<String>,
    pub round: Option<u32>,
    pub team1: Option<WireTeam>,
    pub team2: Option<WireTeam>,
    #[serde(rename = "team1Score")]
    pub team1_score: Option<u32>,
    #[serde(rename = "team2Score")]
    pub team2_score: Option<u32>,
    #[serde(rename = "winnerTeam")]
    pub winner_team: Option<WireTeam>,
    pub status: Option<String>,
}

/// Bracket payloads come either pre-grouped into rounds or as a flat match
/// list the client must group itself.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireBracket {
    pub rounds: Option<Vec<WireRound>>,
    pub matches: Option<Vec<WireMatch>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireRound {
    #[serde(rename = "roundNumber", alias = "round", alias = "number")]
    pub number: Option<u32>,
    pub matches: Option<Vec<WireMatch>>,
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireArticle {
    pub id: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub attachments: Vec<WireAttachment>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireAttachment {
    pub id: Option<String>,
    pub url: Option<String>,
}

/// Error bodies from the backend; 422 responses carry a validation detail in
/// one of these fields.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireError {
    pub message: Option<String>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl WireError {
    pub fn detail(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.detail.clone())
            .or_else(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_accepts_data_wrapper() {
        let items: ListEnvelope<WireTeam> =
            serde_json::from_str(r#"{"data": [{"id": "t1", "name": "Eagles"}]}"#).unwrap();
        let items = items.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("t1"));
    }

    #[test]
    fn envelope_accepts_content_wrapper() {
        let items: ListEnvelope<WireTeam> =
            serde_json::from_str(r#"{"content": [{"id": "t1"}, {"id": "t2"}]}"#).unwrap();
        assert_eq!(items.into_items().len(), 2);
    }

    #[test]
    fn envelope_accepts_bare_array() {
        let items: ListEnvelope<WireTeam> =
            serde_json::from_str(r#"[{"id": "t1"}]"#).unwrap();
        assert_eq!(items.into_items().len(), 1);
    }

    #[test]
    fn envelope_tolerates_empty_shapes() {
        let a: ListEnvelope<WireMatch> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let b: ListEnvelope<WireMatch> = serde_json::from_str("[]").unwrap();
        assert!(a.into_items().is_empty());
        assert!(b.into_items().is_empty());
    }

    #[test]
    fn wire_match_tolerates_missing_fields() {
        let m: WireMatch = serde_json::from_str(r#"{"id": "m1"}"#).unwrap();
        assert_eq!(m.id.as_deref(), Some("m1"));
        assert!(m.round.is_none());
        assert!(m.team1.is_none());
    }

    #[test]
    fn wire_round_accepts_number_aliases() {
        let r: WireRound = serde_json::from_str(r#"{"roundNumber": 2, "matches": []}"#).unwrap();
        assert_eq!(r.number, Some(2));
        let r: WireRound = serde_json::from_str(r#"{"number": 3}"#).unwrap();
        assert_eq!(r.number, Some(3));
    }

    #[test]
    fn wire_error_prefers_message_field() {
        let e: WireError =
            serde_json::from_str(r#"{"message": "name taken", "error": "conflict"}"#).unwrap();
        assert_eq!(e.detail().as_deref(), Some("name taken"));
    }
}
