use super::traits::{
    Merge, fill_nonzero_option, fill_option, fill_positive_option, fill_string, fill_text,
    merge_by_key, merge_values,
};
use crate::models::{Artwork, MediaDetails};

impl Merge for MediaDetails {
    fn merge(&mut self, other: &MediaDetails) {
        fill_string(&mut self.title, &other.title);
        fill_text(&mut self.sort_title, &other.sort_title);
        fill_text(&mut self.original_title, &other.original_title);
        fill_text(&mut self.description, &other.description);
        fill_text(&mut self.tagline, &other.tagline);

        fill_option(&mut self.release_date, &other.release_date);
        fill_positive_option(&mut self.release_year, other.release_year);
        fill_option(&mut self.added_at, &other.added_at);
        fill_option(&mut self.updated_at, &other.updated_at);

        merge_values(&mut self.genres, &other.genres);
        merge_values(&mut self.tags, &other.tags);
        merge_values(&mut self.studios, &other.studios);

        fill_text(&mut self.content_rating, &other.content_rating);
        fill_text(&mut self.language, &other.language);

        self.external_ids.merge(&other.external_ids);
        merge_by_key(&mut self.ratings, &other.ratings, |r| r.source.to_ascii_lowercase());
        fill_option(&mut self.user_rating, &other.user_rating);
        self.artwork.merge(&other.artwork);

        fill_nonzero_option(&mut self.duration, other.duration);
        if !self.is_favorite {
            self.is_favorite = other.is_favorite;
        }
    }
}

impl Merge for Artwork {
    fn merge(&mut self, other: &Artwork) {
        fill_text(&mut self.poster, &other.poster);
        fill_text(&mut self.background, &other.background);
        fill_text(&mut self.banner, &other.banner);
        fill_text(&mut self.thumbnail, &other.thumbnail);
        fill_text(&mut self.logo, &other.logo);
    }
}
