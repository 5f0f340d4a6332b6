//! Startup bootstrap that fills an empty guestbook with sample entries.

use tracing::info;

use crate::{
    models::entry::GuestbookEntry,
    services::entry_store::{EntryStore, StoreResult},
};

fn sample_entries() -> Vec<GuestbookEntry> {
    vec![
        GuestbookEntry::new(
            "H4xx0r",
            "first!!!",
            Some("https://camo.githubusercontent.com/270d432a1df2cfd1ac26a6ad54689bb80ed6bd608b26d8b403aa1bc6ec93974e/68747470733a2f2f6834636b65722e6f72672f696d672f6834636b6572322e504e47".into()),
        ),
        GuestbookEntry::new(
            "Arni",
            "Hasta la vista, baby",
            Some("https://i.ebayimg.com/images/g/7koAAOSw8L5b9bE8/s-l400.jpg".into()),
        ),
        GuestbookEntry::new(
            "Duke Nukem",
            "It's time to kick ass and chew bubble gum. And I'm all out of gum.",
            Some("https://i0.wp.com/www.plauschangriff.de/wp-content/uploads/2018/07/dukenukem.jpg?fit=500%2C500&ssl=1".into()),
        ),
        GuestbookEntry::new(
            "Gump1337",
            "Mama always said life was like a box of chocolates. You never know what you're gonna get.",
            Some("https://img.freepik.com/free-vector/cute-astronaut-cat-lying-planet-animal-space_138676-2038.jpg?w=2000".into()),
        ),
    ]
}

/// Insert the sample entries if, and only if, the store is empty.
///
/// Returns how many entries were written, so repeated runs report zero.
pub async fn seed_entries(store: &dyn EntryStore) -> StoreResult<usize> {
    if store.count().await? > 0 {
        info!("Guestbook already populated, skipping seed data");
        return Ok(0);
    }

    let entries = sample_entries();
    for entry in &entries {
        store.save(entry).await?;
    }
    info!("Seeded guestbook with {} entries", entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, services::entry_store::SqliteEntryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let store = SqliteEntryStore::new(Arc::new(pool));

        assert_eq!(seed_entries(&store).await.unwrap(), 4);
        assert_eq!(seed_entries(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 4);

        let entries = store.find_all().await.unwrap();
        assert_eq!(entries[0].name(), "H4xx0r");
        assert!(entries.iter().all(|e| e.image_url().is_some()));
        assert_eq!(
            entries[2].image_url(),
            Some("https://i0.wp.com/www.plauschangriff.de/wp-content/uploads/2018/07/dukenukem.jpg?fit=500%2C500&ssl=1")
        );
    }
}
