use tracing::trace;

use super::traits::{Merge, fill_nonzero, fill_option, fill_positive, fill_text};
use crate::models::{
    Album, Artist, Collection, Episode, ItemList, MediaContent, MediaData, Movie, Playlist, Season,
    Series, Track,
};

impl Merge for Movie {
    fn merge(&mut self, other: &Movie) {
        self.details.merge(&other.details);
        fill_text(&mut self.trailer_url, &other.trailer_url);
        fill_text(&mut self.edition, &other.edition);
    }
}

impl Merge for Series {
    fn merge(&mut self, other: &Series) {
        self.details.merge(&other.details);
        fill_nonzero(&mut self.season_count, other.season_count);
        fill_nonzero(&mut self.episode_count, other.episode_count);
        fill_text(&mut self.network, &other.network);
        fill_text(&mut self.status, &other.status);
    }
}

impl Merge for Season {
    fn merge(&mut self, other: &Season) {
        self.details.merge(&other.details);
        fill_positive(&mut self.number, other.number);
        fill_option(&mut self.series_id, &other.series_id);
        fill_text(&mut self.series_title, &other.series_title);
        self.merge_episode_ids(other);
    }
}

impl Merge for Episode {
    fn merge(&mut self, other: &Episode) {
        self.details.merge(&other.details);
        fill_positive(&mut self.number, other.number);
        fill_positive(&mut self.season_number, other.season_number);
        fill_option(&mut self.series_id, &other.series_id);
        fill_option(&mut self.season_id, &other.season_id);
        fill_text(&mut self.series_title, &other.series_title);
    }
}

impl Merge for Artist {
    fn merge(&mut self, other: &Artist) {
        self.details.merge(&other.details);
        self.merge_track_ids_by_album(other);
    }
}

impl Merge for Album {
    fn merge(&mut self, other: &Album) {
        self.details.merge(&other.details);
        fill_option(&mut self.artist_id, &other.artist_id);
        fill_text(&mut self.artist_name, &other.artist_name);
        fill_nonzero(&mut self.track_count, other.track_count);
        fill_nonzero(&mut self.disc_count, other.disc_count);
        fill_text(&mut self.release_type, &other.release_type);
    }
}

impl Merge for Track {
    fn merge(&mut self, other: &Track) {
        self.details.merge(&other.details);
        fill_option(&mut self.album_id, &other.album_id);
        fill_option(&mut self.artist_id, &other.artist_id);
        fill_text(&mut self.album_name, &other.album_name);
        fill_text(&mut self.artist_name, &other.artist_name);
        fill_positive(&mut self.number, other.number);
        fill_positive(&mut self.disc_number, other.disc_number);
        fill_text(&mut self.composer, &other.composer);
    }
}

/// Flags and sync snapshots shared by both list kinds.
fn merge_list_common(target: &mut ItemList, other: &ItemList) {
    target.details.merge(&other.details);
    target.is_public |= other.is_public;
    target.is_smart |= other.is_smart;
    for state in other.sync_states.iter() {
        target.sync_states.merge(state.clone());
    }
}

impl Merge for Playlist {
    /// Playlist order belongs to whoever created it, so entries are only
    /// adopted when this playlist has none.
    fn merge(&mut self, other: &Playlist) {
        merge_list_common(self, other);
        if self.is_empty() {
            self.extend_items(other.items());
        }
    }
}

impl Merge for Collection {
    fn merge(&mut self, other: &Collection) {
        let mut list = std::mem::take(self).into_inner();
        merge_list_common(&mut list, other);
        list.extend_items(other.items());
        // Dropping the other side's duplicates also rebuilds the index.
        *self = Collection::from(list);
    }
}

macro_rules! impl_merge_from_content {
    ($($variant:ident),* $(,)?) => {
        $(
            impl Merge<MediaContent> for $variant {
                fn merge(&mut self, other: &MediaContent) {
                    match other {
                        MediaContent::$variant(other) => Merge::<$variant>::merge(self, other),
                        _ => trace!(
                            receiver = %self.media_type(),
                            other = %other.media_type(),
                            "Skipping merge of mismatched media types"
                        ),
                    }
                }
            }
        )*
    };
}

impl_merge_from_content!(
    Movie, Series, Season, Episode, Artist, Album, Track, Playlist, Collection
);

impl Merge for MediaContent {
    fn merge(&mut self, other: &MediaContent) {
        match self {
            MediaContent::Movie(inner) => inner.merge(other),
            MediaContent::Series(inner) => inner.merge(other),
            MediaContent::Season(inner) => inner.merge(other),
            MediaContent::Episode(inner) => inner.merge(other),
            MediaContent::Artist(inner) => inner.merge(other),
            MediaContent::Album(inner) => inner.merge(other),
            MediaContent::Track(inner) => inner.merge(other),
            MediaContent::Playlist(inner) => inner.merge(other),
            MediaContent::Collection(inner) => inner.merge(other),
        }
    }
}
