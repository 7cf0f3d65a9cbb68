use crate::types::HeroId;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

pub fn api_heroes(base: &str) -> String {
    format!("{base}/heroes")
}

pub fn api_hero(base: &str, id: HeroId) -> String {
    format!("{base}/heroes/{id}")
}

/// Search endpoint. The `name` query parameter is attached by the caller so
/// the term gets encoded.
pub fn api_hero_search(base: &str) -> String {
    format!("{base}/heroes/")
}
