pub(crate) const GENRES: [(u32, &str); 9] = [
    (1, "Personal Growth"),
    (2, "Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

pub(crate) const UNKNOWN_GENRE: &str = "Unknown Genre";

pub(crate) fn genre_title(id: u32) -> &'static str {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, title)| *title)
        .unwrap_or(UNKNOWN_GENRE)
}

pub(crate) fn genre_id_by_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if let Ok(id) = name.parse::<u32>() {
        return Some(id);
    }
    GENRES
        .iter()
        .find(|(_, title)| title.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}

pub(crate) fn genre_titles(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| genre_title(*id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cycles the genre filter: all → 1 → … → 9 → all.
pub(crate) fn next_genre_filter(current: Option<u32>) -> Option<u32> {
    match current {
        None => GENRES.first().map(|(id, _)| *id),
        Some(id) => {
            let idx = GENRES.iter().position(|(genre_id, _)| *genre_id == id)?;
            GENRES.get(idx + 1).map(|(id, _)| *id)
        }
    }
}
