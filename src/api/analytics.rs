use super::types::{AnalyticsSummary, GenreStats, MessageResponse, Trends};
use super::{segment, Backend};
use crate::gateway::{Call, Collaborator, Failure};

impl Backend {
    pub async fn summary(&self) -> Result<AnalyticsSummary, Failure> {
        let call = Call::get(Collaborator::Analytics, "/analytics/summary").authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn trends(&self) -> Result<Trends, Failure> {
        let call = Call::get(Collaborator::Analytics, "/analytics/trends").authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn genre_stats(&self, genre: &str) -> Result<GenreStats, Failure> {
        let call = Call::get(Collaborator::Analytics, format!("/genres/{}/analytics", segment(genre))).authed();
        self.gateway().call(call).await?.json()
    }

    /// Play event. Callers fire this and only log the outcome.
    pub async fn record_play(&self, track_id: &str) -> Result<(), Failure> {
        let call = Call::post(Collaborator::Analytics, "/history")
            .authed()
            .query("track_id", track_id);
        let _: MessageResponse = self.gateway().call(call).await?.json()?;
        Ok(())
    }
}
