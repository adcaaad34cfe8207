use super::types::{
    CreatedPlaylist, CustomPlaylistRequest, MessageResponse, Mood, PlaylistDetail, PlaylistSummary,
    WorkoutResult, WorkoutSpec,
};
use super::Backend;
use crate::gateway::{Call, Collaborator, Failure};

/// What the playlist service regenerates matches from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSeed {
    Mood(Mood),
    Track(String),
}

impl Backend {
    pub async fn playlists(&self) -> Result<Vec<PlaylistSummary>, Failure> {
        let call = Call::get(Collaborator::Playlist, "/playlists").authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn playlist(&self, id: i64) -> Result<PlaylistDetail, Failure> {
        let call = Call::get(Collaborator::Playlist, format!("/playlists/{}", id)).authed();
        self.gateway().call(call).await?.json()
    }

    pub async fn generate_from_seed(
        &self,
        name: &str,
        seed: &PlaylistSeed,
        limit: u32,
    ) -> Result<CreatedPlaylist, Failure> {
        let call = Call::post(Collaborator::Playlist, "/playlists/generate")
            .authed()
            .query("name", name)
            .query("limit", limit);
        let call = match seed {
            PlaylistSeed::Mood(mood) => call.query("mood", mood.as_str()),
            PlaylistSeed::Track(track_id) => call.query("seed_track_id", track_id),
        };
        self.gateway().call(call).await?.json()
    }

    pub async fn generate_custom(&self, request: &CustomPlaylistRequest) -> Result<CreatedPlaylist, Failure> {
        let call = Call::post(Collaborator::Playlist, "/playlists/custom")
            .authed()
            .json(request)?;
        self.gateway().call(call).await?.json()
    }

    pub async fn workout(&self, spec: &WorkoutSpec) -> Result<WorkoutResult, Failure> {
        let call = Call::post(Collaborator::Playlist, "/playlists/workout")
            .authed()
            .json(spec)?;
        let result: WorkoutResult = self.gateway().call(call).await?.json()?;
        Ok(result.complete(spec))
    }

    pub async fn add_track(&self, playlist_id: i64, track_id: &str) -> Result<(), Failure> {
        let call = Call::post(Collaborator::Playlist, format!("/playlists/{}/tracks", playlist_id))
            .authed()
            .query("track_id", track_id);
        let _: MessageResponse = self.gateway().call(call).await?.json()?;
        Ok(())
    }
}
