/// Catalog identifier of a movie genre
pub type GenreId = i32;

/// Reserved genre that is never sent as a genre filter
///
/// The catalog has no genre with this id; selecting it translates into a
/// keyword filter on [`ADULT_KEYWORD`] instead.
pub const ADULT_GENRE_ID: GenreId = 445;

/// Keyword searched in place of the adult genre
pub const ADULT_KEYWORD: &str = "erotic";

/// A selectable genre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub name: &'static str,
    pub id: GenreId,
}

const fn genre(name: &'static str, id: GenreId) -> Genre {
    Genre { name, id }
}

/// Genres offered in the preferences menu, in display order
pub const GENRES: [Genre; 20] = [
    genre("Action", 28),
    genre("Adventure", 12),
    genre("Adult", ADULT_GENRE_ID),
    genre("Animation", 16),
    genre("Comedy", 35),
    genre("Crime", 80),
    genre("Documentary", 99),
    genre("Drama", 18),
    genre("Family", 10751),
    genre("Fantasy", 14),
    genre("History", 36),
    genre("Horror", 27),
    genre("Music", 10402),
    genre("Mystery", 9648),
    genre("Romance", 10749),
    genre("Science Fiction", 878),
    genre("TV Movie", 10770),
    genre("Thriller", 53),
    genre("War", 10752),
    genre("Western", 37),
];

/// Read-only view over the fixed genre list
pub struct GenreCatalog;

impl GenreCatalog {
    pub fn all() -> &'static [Genre] {
        &GENRES
    }

    pub fn contains(id: GenreId) -> bool {
        GENRES.iter().any(|g| g.id == id)
    }

    pub fn name_of(id: GenreId) -> Option<&'static str> {
        GENRES.iter().find(|g| g.id == id).map(|g| g.name)
    }
}
