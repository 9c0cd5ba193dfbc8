// Fixed content rendered when the store is unconfigured or returns nothing.

use chrono::NaiveDate;
use tracing::info;

use crate::content::model::{
    BlockStyle, BodyBlock, FullReview, Location, PriceTier, ReviewSummary, RickFactor, Scores,
    SiteSettings,
};

struct Mock {
    slug: &'static str,
    name: &'static str,
    cuisine: &'static str,
    price: PriceTier,
    date: (i32, u32, u32),
    scores: [f32; 4],
    city: &'static str,
    state: &'static str,
    summary: &'static str,
    rick: (f32, &'static str),
}

const MOCKS: [Mock; 6] = [
    Mock {
        slug: "ember-and-ash",
        name: "Ember & Ash",
        cuisine: "Wood-fired American",
        price: PriceTier::Upscale,
        date: (2024, 9, 14),
        scores: [9.0, 9.0, 8.0, 7.0],
        city: "Austin",
        state: "TX",
        summary: "A brisket that ruins every other brisket.",
        rick: (10.0, "The pitmaster walked us through the smoker at midnight."),
    },
    Mock {
        slug: "pho-real",
        name: "Pho Real",
        cuisine: "Vietnamese",
        price: PriceTier::Budget,
        date: (2024, 7, 2),
        scores: [9.0, 7.0, 8.0, 10.0],
        city: "Houston",
        state: "TX",
        summary: "Broth simmered for eighteen hours and it shows.",
        rick: (8.0, "Free extra basil without asking."),
    },
    Mock {
        slug: "osteria-lupa",
        name: "Osteria Lupa",
        cuisine: "Italian",
        price: PriceTier::Upscale,
        date: (2024, 3, 9),
        scores: [9.0, 8.0, 9.0, 10.0],
        city: "Portland",
        state: "OR",
        summary: "Hand-cut pasta and a cacio e pepe worth the drive.",
        rick: (9.0, "Nonna's recipe, Nonna's portion sizes."),
    },
    Mock {
        slug: "saffron-lane",
        name: "Saffron Lane",
        cuisine: "Persian",
        price: PriceTier::Moderate,
        date: (2023, 12, 1),
        scores: [8.0, 9.0, 9.0, 8.0],
        city: "Los Angeles",
        state: "CA",
        summary: "Tahdig with the crunch of a thousand autumns.",
        rick: (9.0, "Saffron tea on the house after dessert."),
    },
    Mock {
        slug: "koji-counter",
        name: "Koji Counter",
        cuisine: "Japanese",
        price: PriceTier::Splurge,
        date: (2023, 8, 20),
        scores: [10.0, 8.0, 10.0, 6.0],
        city: "Seattle",
        state: "WA",
        summary: "Eleven seats, nineteen courses, zero regrets.",
        rick: (10.0, "The chef remembered our names from a year before."),
    },
    Mock {
        slug: "taqueria-la-luna",
        name: "Taqueria La Luna",
        cuisine: "Mexican",
        price: PriceTier::Budget,
        date: (2023, 5, 6),
        scores: [9.0, 8.0, 7.0, 10.0],
        city: "San Antonio",
        state: "TX",
        summary: "Al pastor carved straight off the trompo.",
        rick: (7.0, "Salsa bar with six kinds of heat."),
    },
];

impl Mock {
    fn summary(&self) -> ReviewSummary {
        let (y, m, d) = self.date;
        let [taste, vibe, service, value] = self.scores;
        ReviewSummary {
            id: format!("fallback-{}", self.slug),
            name: self.name.to_string(),
            slug: self.slug.to_string(),
            cuisine: self.cuisine.to_string(),
            price_range: self.price,
            hero_image: None,
            summary: self.summary.to_string(),
            visit_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            scores: Scores::new(taste, vibe, service, value),
        }
    }

    fn full(&self) -> FullReview {
        FullReview {
            summary: self.summary(),
            location: Some(Location {
                city: self.city.to_string(),
                state: Some(self.state.to_string()),
                coordinates: None,
            }),
            gallery: Vec::new(),
            body: vec![
                BodyBlock {
                    style: BlockStyle::H2,
                    text: "The verdict".to_string(),
                },
                BodyBlock {
                    style: BlockStyle::Normal,
                    text: self.summary.to_string(),
                },
            ],
            rick_factor: Some(RickFactor {
                score: self.rick.0,
                description: self.rick.1.to_string(),
            }),
        }
    }
}

/// The six fallback summaries, newest visit first.
pub fn fallback_summaries() -> Vec<ReviewSummary> {
    MOCKS.iter().map(Mock::summary).collect()
}

pub fn fallback_review(slug: &str) -> Option<FullReview> {
    MOCKS.iter().find(|m| m.slug == slug).map(Mock::full)
}

pub fn fallback_slugs() -> Vec<String> {
    MOCKS.iter().map(|m| m.slug.to_string()).collect()
}

pub fn fallback_settings() -> SiteSettings {
    SiteSettings {
        title: "Plate Notes".to_string(),
        tagline: "Honest reviews, one table at a time.".to_string(),
        about: vec![
            "We eat out, we take notes, we score four things: taste, vibe, service and value."
                .to_string(),
            "Every review also carries a Rick Factor, the thing that made the night.".to_string(),
        ],
    }
}

/// The fallback activates exactly when the adapter returned nothing.
pub fn summaries_or_fallback(fetched: Vec<ReviewSummary>) -> (Vec<ReviewSummary>, bool) {
    if fetched.is_empty() {
        info!("no reviews from content source, rendering fallback set");
        (fallback_summaries(), true)
    } else {
        (fetched, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_valid_records_newest_first() {
        let summaries = fallback_summaries();
        assert_eq!(summaries.len(), 6);
        for summary in &summaries {
            assert!(summary.validate().is_ok(), "{} invalid", summary.slug);
        }
        for pair in summaries.windows(2) {
            assert!(pair[0].visit_date > pair[1].visit_date);
        }
    }

    #[test]
    fn every_fallback_has_full_detail() {
        for slug in fallback_slugs() {
            let review = fallback_review(&slug).expect("detail exists");
            assert!(review.validate().is_ok());
            assert!(review.gallery.is_empty());
        }
        assert!(fallback_review("nowhere").is_none());
    }

    #[test]
    fn fallback_only_when_empty() {
        let (list, used) = summaries_or_fallback(Vec::new());
        assert!(used);
        assert_eq!(list.len(), 6);

        let partial = vec![fallback_summaries().remove(2)];
        let (list, used) = summaries_or_fallback(partial);
        assert!(!used);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].slug, "osteria-lupa");
    }
}
