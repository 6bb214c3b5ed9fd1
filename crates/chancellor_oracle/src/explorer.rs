//! Opening explorer client: per-move outcome counts of real games.

use chancellor_core::MoveStats;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OracleError;
use crate::settings::OracleSettings;
use crate::transport::{HttpTransport, Request, Retrying, Transport};

/// Opening name reported for the empty move sequence.
pub const STARTING_POSITION: &str = "Starting Position";
/// Opening name reported when the explorer knows none.
pub const UNKNOWN_OPENING: &str = "Unknown Opening";

/// Time-control class of the games counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Speed {
    UltraBullet,
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Correspondence,
}

impl Speed {
    pub fn as_str(self) -> &'static str {
        match self {
            Speed::UltraBullet => "ultraBullet",
            Speed::Bullet => "bullet",
            Speed::Blitz => "blitz",
            Speed::Rapid => "rapid",
            Speed::Classical => "classical",
            Speed::Correspondence => "correspondence",
        }
    }
}

/// Whose move the statistics are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    /// The side the repertoire is built for
    Us,
    /// The opponent, whose replies are weighted by how often they occur
    They,
}

/// Rating bands and speeds the explorer should count games from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerFilter {
    pub ratings: Vec<u16>,
    pub speeds: Vec<Speed>,
}

impl ExplorerFilter {
    /// No filtering at all.
    pub fn any() -> Self {
        Self {
            ratings: Vec::new(),
            speeds: Vec::new(),
        }
    }

    pub fn ratings_param(&self) -> String {
        self.ratings
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn speeds_param(&self) -> String {
        self.speeds
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Filters for our moves and for opponent replies.
///
/// Opponent replies are drawn from a wider, lower-rated band of games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerFilters {
    pub us: ExplorerFilter,
    pub they: ExplorerFilter,
}

impl ExplorerFilters {
    pub fn for_mover(&self, mover: Mover) -> &ExplorerFilter {
        match mover {
            Mover::Us => &self.us,
            Mover::They => &self.they,
        }
    }
}

impl Default for ExplorerFilters {
    fn default() -> Self {
        Self {
            us: ExplorerFilter {
                ratings: vec![2000, 2200, 2500],
                speeds: vec![
                    Speed::Bullet,
                    Speed::Blitz,
                    Speed::Rapid,
                    Speed::Classical,
                    Speed::Correspondence,
                ],
            },
            they: ExplorerFilter {
                ratings: vec![1600, 1800, 2000, 2200, 2500],
                speeds: vec![
                    Speed::UltraBullet,
                    Speed::Bullet,
                    Speed::Blitz,
                    Speed::Rapid,
                    Speed::Classical,
                ],
            },
        }
    }
}

/// Source of candidate moves with aggregated outcomes.
pub trait MoveStatistics {
    /// Moves played after `play`, counted over games matching `mover`'s filter.
    fn fetch_moves(
        &self,
        play: &[MoveStats],
        mover: Mover,
        filters: &ExplorerFilters,
    ) -> Result<Vec<MoveStats>, OracleError>;

    fn fetch_opening_name(&self, play: &[MoveStats]) -> Result<String, OracleError>;
}

impl<T: MoveStatistics + ?Sized> MoveStatistics for &T {
    fn fetch_moves(
        &self,
        play: &[MoveStats],
        mover: Mover,
        filters: &ExplorerFilters,
    ) -> Result<Vec<MoveStats>, OracleError> {
        (**self).fetch_moves(play, mover, filters)
    }

    fn fetch_opening_name(&self, play: &[MoveStats]) -> Result<String, OracleError> {
        (**self).fetch_opening_name(play)
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    moves: Vec<MoveStats>,
    #[serde(default)]
    opening: Option<Opening>,
}

#[derive(Debug, Deserialize)]
struct Opening {
    name: String,
}

pub struct ExplorerClient<T = Retrying<HttpTransport>> {
    transport: T,
    endpoint: String,
}

impl ExplorerClient {
    pub fn from_settings(settings: &OracleSettings) -> Result<Self, OracleError> {
        let transport = Retrying::new(
            HttpTransport::new(settings.timeout())?,
            settings.retry.clone(),
        );
        Ok(Self::new(transport, settings.explorer_url.clone()))
    }
}

impl<T: Transport> ExplorerClient<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    fn request(&self, play: &[MoveStats], filter: &ExplorerFilter) -> Request {
        let play = play
            .iter()
            .map(|m| m.uci.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Request::get(&self.endpoint)
            .param("variant", "standard")
            .param("topGames", "0")
            .param("recentGames", "0")
            .param("speeds", filter.speeds_param())
            .param("ratings", filter.ratings_param())
            .param("play", play)
    }

    fn query(&self, request: &Request) -> Result<ExplorerResponse, OracleError> {
        let reply = self.transport.get(request)?;
        if !reply.is_success() {
            return Err(OracleError::Status {
                url: request.url.clone(),
                status: reply.status,
            });
        }
        serde_json::from_str(&reply.body).map_err(|source| OracleError::Decode {
            url: request.url.clone(),
            source,
        })
    }
}

impl<T: Transport> MoveStatistics for ExplorerClient<T> {
    fn fetch_moves(
        &self,
        play: &[MoveStats],
        mover: Mover,
        filters: &ExplorerFilters,
    ) -> Result<Vec<MoveStats>, OracleError> {
        let request = self.request(play, filters.for_mover(mover));
        let response = self.query(&request)?;
        debug!(
            play = request.value("play").unwrap_or_default(),
            ?mover,
            moves = response.moves.len(),
            "fetched move statistics"
        );
        Ok(response.moves)
    }

    fn fetch_opening_name(&self, play: &[MoveStats]) -> Result<String, OracleError> {
        if play.is_empty() {
            return Ok(STARTING_POSITION.to_string());
        }
        let response = self.query(&self.request(play, &ExplorerFilter::any()))?;
        Ok(response
            .opening
            .map(|o| o.name)
            .unwrap_or_else(|| UNKNOWN_OPENING.to_string()))
    }
}

#[cfg(test)]
#[path = "explorer_tests.rs"]
mod explorer_tests;
