use super::types::{
    GenreTracksEnvelope, GenresEnvelope, Mood, Prediction, RecommendationsEnvelope, ScoredTrack,
    SearchEnvelope, VibeVector,
};
use super::{segment, Backend};
use crate::gateway::{Call, Collaborator, Failure};

impl Backend {
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::get(Collaborator::Recommender, "/search")
            .query("q", query)
            .query("limit", limit);
        let envelope: SearchEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.results)
    }

    pub async fn similar_to(&self, track_id: &str, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::get(Collaborator::Recommender, format!("/recommendations/{}", segment(track_id)))
            .query("limit", limit);
        let envelope: RecommendationsEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.recommendations)
    }

    pub async fn by_mood(&self, mood: Mood, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::get(Collaborator::Recommender, format!("/recommendations/mood/{}", mood.as_str()))
            .query("limit", limit);
        let envelope: RecommendationsEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.recommendations)
    }

    pub async fn by_vector(&self, vibe: &VibeVector, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::post(Collaborator::Recommender, "/recommendations/custom")
            .query("limit", limit)
            .json(vibe)?;
        let envelope: RecommendationsEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.recommendations)
    }

    pub async fn personalized(&self, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::post(Collaborator::Recommender, "/recommendations/personalized")
            .authed()
            .query("limit", limit);
        let envelope: RecommendationsEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.recommendations)
    }

    pub async fn genres(&self) -> Result<Vec<String>, Failure> {
        let call = Call::get(Collaborator::Recommender, "/genres");
        let envelope: GenresEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.genres)
    }

    pub async fn tracks_of(&self, genre: &str, limit: u32) -> Result<Vec<ScoredTrack>, Failure> {
        let call = Call::get(Collaborator::Recommender, format!("/genres/{}/tracks", segment(genre)))
            .query("limit", limit);
        let envelope: GenreTracksEnvelope = self.gateway().call(call).await?.json()?;
        Ok(envelope.tracks)
    }

    pub async fn classify(&self, vibe: &VibeVector) -> Result<Prediction, Failure> {
        let call = Call::post(Collaborator::Recommender, "/classify").json(vibe)?;
        self.gateway().call(call).await?.json()
    }
}
