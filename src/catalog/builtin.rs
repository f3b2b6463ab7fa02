//! Built-in Tashkent dataset and the text matching used by catalog searches.

use chrono::{DateTime, Utc};

use super::types::{Book, Library, LibraryStatus};

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinLibrary {
    id: u32,
    name: &'static str,
    address: &'static str,
    description: &'static str,
    phone: &'static str,
    email: &'static str,
    website: &'static str,
    working_hours: &'static str,
    books_count: u64,
    lat: f64,
    lon: f64,
    status: LibraryStatus,
    created_at: &'static str,
}

const BUILTIN_LIBRARIES: &[BuiltinLibrary] = &[
    BuiltinLibrary {
        id: 1,
        name: "Alisher Navoiy nomidagi O'zbekiston Milliy kutubxonasi",
        address: "Toshkent sh., Navoiy ko'chasi, 1-uy",
        description: "O'zbekistondagi eng yirik kutubxona. 1870-yilda Toshkent jamoat kutubxonasi sifatida tashkil etilgan.",
        phone: "+998 71 232 83 94",
        email: "info@natlib.uz",
        website: "https://natlib.uz",
        working_hours: "Dushanba-Shanba: 9:00 - 20:00, Yakshanba: Dam olish kuni",
        books_count: 7_000_000,
        lat: 41.311081, lon: 69.280624,
        status: LibraryStatus::Active,
        created_at: "2023-01-15T10:30:00Z",
    },
    BuiltinLibrary {
        id: 2,
        name: "Mirzo Ulug'bek nomidagi O'zbekiston Milliy universiteti kutubxonasi",
        address: "Toshkent sh., Universitet ko'chasi, 4-uy",
        description: "1918-yilda tashkil etilgan, O'zbekistondagi eng qadimiy akademik kutubxonalardan biri.",
        phone: "+998 71 246 95 31",
        email: "library@nuu.uz",
        website: "https://nuu.uz/library",
        working_hours: "Dushanba-Juma: 9:00 - 18:00, Shanba: 9:00 - 15:00, Yakshanba: Dam olish kuni",
        books_count: 1_500_000,
        lat: 41.341456, lon: 69.284787,
        status: LibraryStatus::Active,
        created_at: "2023-02-20T14:15:00Z",
    },
    BuiltinLibrary {
        id: 3,
        name: "Toshkent axborot texnologiyalari universiteti kutubxonasi",
        address: "Toshkent sh., Amir Temur shoh ko'chasi, 108-uy",
        description: "Axborot texnologiyalari, telekommunikatsiya va dasturlash sohasidagi adabiyotlarga boy kutubxona.",
        phone: "+998 71 238 64 20",
        email: "library@tuit.uz",
        website: "https://tuit.uz/library",
        working_hours: "Dushanba-Juma: 9:00 - 18:00, Shanba: 9:00 - 14:00, Yakshanba: Dam olish kuni",
        books_count: 500_000,
        lat: 41.341176, lon: 69.287303,
        status: LibraryStatus::Pending,
        created_at: "2023-05-10T09:45:00Z",
    },
    BuiltinLibrary {
        id: 4,
        name: "O'zbekiston Fanlar akademiyasi kutubxonasi",
        address: "Toshkent sh., Ziyolilar ko'chasi, 70-uy",
        description: "Ilmiy adabiyotlar va tadqiqot materiallariga boy, olimlar uchun muhim manba.",
        phone: "+998 71 262 74 58",
        email: "library@academy.uz",
        website: "https://academy.uz/library",
        working_hours: "Dushanba-Juma: 9:00 - 17:00, Shanba-Yakshanba: Dam olish kuni",
        books_count: 3_000_000,
        lat: 41.325876, lon: 69.290123,
        status: LibraryStatus::Active,
        created_at: "2023-03-05T11:20:00Z",
    },
    BuiltinLibrary {
        id: 5,
        name: "Toshkent davlat sharqshunoslik instituti kutubxonasi",
        address: "Toshkent sh., Shahrisabz ko'chasi, 25-uy",
        description: "Sharq tillari, madaniyati va tarixi bo'yicha noyob kitoblar to'plamiga ega.",
        phone: "+998 71 233 40 50",
        email: "library@tashgiv.uz",
        website: "https://tashgiv.uz/library",
        working_hours: "Dushanba-Juma: 9:00 - 18:00, Shanba: 9:00 - 13:00, Yakshanba: Dam olish kuni",
        books_count: 800_000,
        lat: 41.318765, lon: 69.254321,
        status: LibraryStatus::Inactive,
        created_at: "2023-04-18T16:30:00Z",
    },
    BuiltinLibrary {
        id: 6,
        name: "O'zbekiston davlat jahon tillari universiteti kutubxonasi",
        address: "Toshkent sh., Kichik halqa yo'li, 21-a uy",
        description: "Chet tillari va lingvistika sohasidagi adabiyotlarga ixtisoslashgan.",
        phone: "+998 71 230 12 91",
        email: "library@uzswlu.uz",
        website: "https://uzswlu.uz/library",
        working_hours: "Dushanba-Juma: 9:00 - 18:00, Shanba: 9:00 - 14:00, Yakshanba: Dam olish kuni",
        books_count: 600_000,
        lat: 41.328901, lon: 69.268765,
        status: LibraryStatus::Pending,
        created_at: "2023-06-22T13:10:00Z",
    },
];

struct BuiltinBook {
    id: u32,
    title: &'static str,
    author: &'static str,
    year: i32,
    held_by: &'static [u32],
}

const BUILTIN_BOOKS: &[BuiltinBook] = &[
    BuiltinBook { id: 1, title: "O'tkan kunlar", author: "Abdulla Qodiriy", year: 1925, held_by: &[1, 2] },
    BuiltinBook { id: 2, title: "Kecha va kunduz", author: "Cho'lpon", year: 1936, held_by: &[1] },
    BuiltinBook { id: 3, title: "Sarob", author: "Abdulla Qahhor", year: 1943, held_by: &[3] },
    BuiltinBook { id: 4, title: "Shum bola", author: "G'afur G'ulom", year: 1936, held_by: &[1, 4] },
    BuiltinBook { id: 5, title: "Yulduzli tunlar", author: "Pirimqul Qodirov", year: 1978, held_by: &[1] },
    BuiltinBook { id: 6, title: "Navoiy", author: "Oybek", year: 1944, held_by: &[2] },
    BuiltinBook { id: 7, title: "Qo'shchinor chiroqlari", author: "Abdulla Qahhor", year: 1951, held_by: &[3] },
    BuiltinBook { id: 8, title: "Ulug'bek xazinasi", author: "Odil Yoqubov", year: 1973, held_by: &[1] },
    BuiltinBook { id: 9, title: "Qutlug' qon", author: "Oybek", year: 1940, held_by: &[2] },
    BuiltinBook { id: 10, title: "Mening o'g'rigina bolam", author: "G'afur G'ulom", year: 1965, held_by: &[4] },
    BuiltinBook { id: 11, title: "Boburnoma", author: "Zahiriddin Muhammad Bobur", year: 1530, held_by: &[5] },
    BuiltinBook { id: 12, title: "Xamsa", author: "Alisher Navoiy", year: 1483, held_by: &[5] },
    BuiltinBook { id: 13, title: "Ingliz tili grammatikasi", author: "Raymond Murphy", year: 2019, held_by: &[6] },
    BuiltinBook { id: 14, title: "Nemis tili lug'ati", author: "Muallif jamoasi", year: 2020, held_by: &[6] },
];

fn builtin_to_library(lib: &BuiltinLibrary) -> Library {
    Library {
        id: lib.id,
        name: lib.name.to_string(),
        address: lib.address.to_string(),
        description: Some(lib.description.to_string()),
        phone: Some(lib.phone.to_string()),
        email: Some(lib.email.to_string()),
        website: Some(lib.website.to_string()),
        working_hours: Some(lib.working_hours.to_string()),
        books_count: lib.books_count,
        latitude: lib.lat,
        longitude: lib.lon,
        status: lib.status,
        created_at: DateTime::parse_from_rfc3339(lib.created_at)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
    }
}

/// The full built-in library list, in id order.
pub fn builtin_libraries() -> Vec<Library> {
    BUILTIN_LIBRARIES.iter().map(builtin_to_library).collect()
}

/// The full built-in book list, in id order.
pub fn builtin_books() -> Vec<Book> {
    BUILTIN_BOOKS
        .iter()
        .map(|b| Book {
            id: b.id,
            title: b.title.to_string(),
            author: b.author.to_string(),
            year: Some(b.year),
            library_ids: b.held_by.to_vec(),
        })
        .collect()
}

// ─── Text matching ──────────────────────────────────────────────

/// Compute edit distance between two strings (Levenshtein).
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let n = b.len();

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Case-insensitive substring match of `query` against any of `fields`.
/// The query must already be trimmed and lowercased.
pub(crate) fn contains_any(fields: &[&str], query: &str) -> bool {
    fields.iter().any(|f| f.to_lowercase().contains(query))
}

/// Fuzzy match: the whole field, or any single word of it, within edit
/// distance 2 of `query`. The query must already be trimmed and lowercased.
pub(crate) fn fuzzy_any(fields: &[&str], query: &str) -> bool {
    const MAX_EDITS: usize = 2;
    fields.iter().any(|f| {
        let field = f.to_lowercase();
        edit_distance(&field, query) <= MAX_EDITS
            || field.split_whitespace().any(|w| edit_distance(w, query) <= MAX_EDITS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_libraries() {
        let libs = builtin_libraries();
        assert_eq!(libs.len(), 6);
        assert_eq!(libs[0].id, 1);
        assert!((libs[0].latitude - 41.311081).abs() < 1e-9);
        assert_eq!(libs[1].status, LibraryStatus::Active);
        assert_eq!(libs[2].status, LibraryStatus::Pending);
        assert_eq!(libs[4].status, LibraryStatus::Inactive);
        assert_eq!(
            libs[0].created_at.map(|d| d.to_rfc3339()),
            Some("2023-01-15T10:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_builtin_books_reference_known_libraries() {
        let lib_ids: Vec<u32> = builtin_libraries().iter().map(|l| l.id).collect();
        for book in builtin_books() {
            assert!(!book.library_ids.is_empty(), "{} has no holdings", book.title);
            for id in &book.library_ids {
                assert!(lib_ids.contains(id), "{} references unknown library {}", book.title, id);
            }
        }
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("sarob", "sarop"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any(&["Shum bola", "G'afur G'ulom"], "bola"));
        assert!(contains_any(&["Shum bola", "G'afur G'ulom"], "g'ulom"));
        assert!(!contains_any(&["Shum bola"], "sarob"));
    }

    #[test]
    fn test_fuzzy_any() {
        // one word of a multi-word title
        assert!(fuzzy_any(&["Yulduzli tunlar"], "tunlr"));
        // whole short title
        assert!(fuzzy_any(&["Xamsa"], "hamsa"));
        assert!(!fuzzy_any(&["Xamsa"], "boburnoma"));
    }
}
